//! HTTP client for the API, shared by the CLI and by embedding applications.

mod resource;

pub use resource::{Resource, ResourceState};

use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Unable to retrieve authentication token.")]
    MissingToken,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-2xx response; carries the body text, or a generic message when empty
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Empty response body")]
    EmptyBody,
}

/// Bearer-authenticated JSON client
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and decode the JSON body. `Ok(None)` for 204 or an empty body.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Option<T>, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!("{} {}", method, url);
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                format!("Request failed with status {}", status.as_u16())
            } else {
                text
            };
            return Err(ClientError::Status { status, message });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request::<T, ()>(Method::GET, path, None)
            .await?
            .ok_or(ClientError::EmptyBody)
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body))
            .await?
            .ok_or(ClientError::EmptyBody)
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body))
            .await?
            .ok_or(ClientError::EmptyBody)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.request::<serde_json::Value, ()>(Method::DELETE, path, None)
            .await
            .map(|_| ())
    }

    /// Unauthenticated liveness probe
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        let response = self.http.get(format!("{}/health", self.base_url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                message: format!("Request failed with status {}", status.as_u16()),
            });
        }
        Ok(response.json().await?)
    }
}

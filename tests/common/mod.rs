#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use neuromate_api::auth::{issue_token, JwtIdentity};
use neuromate_api::config::AppConfig;
use neuromate_api::database::memory::MemoryStore;
use neuromate_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// In-process API bound to a free port, backed by a fresh in-memory store
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::from_source(|key| match key {
            "DATABASE_URL" => Some("postgres://unused/neuromate_test".to_string()),
            "AUTH_JWT_SECRET" => Some(SECRET.to_string()),
            "API_ENABLE_REQUEST_LOGGING" => Some("false".to_string()),
            _ => None,
        })?;
        let identity = JwtIdentity::from_config(&config.auth)?;
        let store = Arc::new(MemoryStore::new());

        let state = AppState {
            store: store.clone(),
            identity: Arc::new(identity),
            config: Arc::new(config),
        };

        // Bound before returning, so requests never race server startup
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url,
            store,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn token(&self, user: &str) -> String {
        issue_token(SECRET, user, chrono::Duration::hours(1)).expect("sign test token")
    }

    /// Send a request as `user` (or anonymously) and decode the JSON body, if any
    pub async fn send(
        &self,
        method: Method,
        user: Option<&str>,
        path: &str,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(user) = user {
            request = request.bearer_auth(self.token(user));
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
        };
        Ok((status, value))
    }

    pub async fn get(&self, user: &str, path: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, Some(user), path, None).await
    }

    pub async fn post(&self, user: &str, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, Some(user), path, Some(body)).await
    }

    pub async fn patch(&self, user: &str, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, Some(user), path, Some(body)).await
    }

    pub async fn delete(&self, user: &str, path: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, Some(user), path, None).await
    }

    /// POST and assert 201, returning the created row
    pub async fn create(&self, user: &str, path: &str, body: Value) -> Result<Value> {
        let (status, row) = self.post(user, path, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "POST {} failed: {} {}", path, status, row);
        Ok(row)
    }

    /// Document -> lesson -> flashcard chain owned by `user`
    pub async fn seed_flashcard(&self, user: &str) -> Result<(Value, Value, Value)> {
        let document = self
            .create(user, "/api/documents", json!({ "text": "Photosynthesis converts light to chemical energy." }))
            .await?;
        let lesson = self
            .create(
                user,
                "/api/lessons",
                json!({ "documentId": document["id"], "title": "Photosynthesis" }),
            )
            .await?;
        let flashcard = self
            .create(
                user,
                "/api/flashcards",
                json!({ "lessonId": lesson["id"], "front": "Where does it happen?", "back": "Chloroplasts" }),
            )
            .await?;
        Ok((document, lesson, flashcard))
    }
}

pub fn id(row: &Value) -> &str {
    row["id"].as_str().expect("row has a string id")
}

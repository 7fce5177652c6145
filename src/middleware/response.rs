use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Successful handler output: a status code and the bare row(s) as JSON.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK with the value as the body
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            status_code: StatusCode::CREATED,
        }
    }
}

impl ApiResponse<()> {
    /// 204 No Content with an empty body
    pub fn no_content() -> Self {
        Self {
            data: None,
            status_code: StatusCode::NO_CONTENT,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self.data {
            Some(data) if self.status_code != StatusCode::NO_CONTENT => {
                (self.status_code, Json(data)).into_response()
            }
            _ => self.status_code.into_response(),
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

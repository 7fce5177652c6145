// Protected handlers (bearer JWT required, mounted under /api)
//
// Every handler follows the same pipeline: validate the body, check that the
// caller owns the target (or the parent being referenced), run the store
// operation, respond with the bare row(s).
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;

pub mod documents;
pub mod flashcards;
pub mod lessons;
pub mod profiles;
pub mod progress;
pub mod quiz_attempts;
pub mod quizzes;
pub mod reviews;

/// `:id` path segment. Anything that is not a UUID cannot name a row, so it
/// is rejected as 404 rather than 400.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub Uuid);

#[axum::async_trait]
impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found("Resource not found"))?;

        Uuid::parse_str(&raw)
            .map(ResourceId)
            .map_err(|_| ApiError::not_found("Resource not found"))
    }
}

// Public handlers (no authentication required)
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiError;

/// GET /health - static liveness probe
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "NeuroMate API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health (public)",
            "resources": "/api/{documents,lessons,quizzes,quiz-attempts,flashcards,reviews}[/:id] (protected)",
            "singletons": "/api/{profiles,progress} (protected)",
        }
    }))
}

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::not_found("Resource not found")
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}

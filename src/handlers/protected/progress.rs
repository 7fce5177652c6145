use axum::{extract::State, Extension};

use crate::database::apply_singleton_changes;
use crate::database::models::{Progress, ProgressChanges};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static UPDATE: Schema = Schema::new(
    "progress update",
    &[
        Field::optional("lessonsCompleted", Rule::non_negative_int()),
        Field::optional("quizzesTaken", Rule::non_negative_int()),
        Field::optional("avgScore", Rule::Number { min: Some(0.0), max: Some(100.0) }).nullable(),
        Field::optional("flashcardsCreated", Rule::non_negative_int()),
        Field::optional("streakDays", Rule::non_negative_int()),
    ],
);

impl Payload for ProgressChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/progress - zeroed counters on first read
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Progress> {
    let row = state.store.progress().ensure(&user.user_id).await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/progress
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(changes): Validated<ProgressChanges>,
) -> ApiResult<Progress> {
    let progress = state.store.progress();
    progress.ensure(&user.user_id).await?;

    let row = apply_singleton_changes(progress, &user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Progress not found"))?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/progress - idempotent
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<()> {
    state.store.progress().delete(&user.user_id).await?;
    Ok(ApiResponse::no_content())
}

use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::ResourceId;
use crate::database::models::{NewQuizAttempt, QuizAttempt, QuizAttemptChanges};
use crate::database::{apply_changes, Scope};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{OwnershipResolver, ResourceKind};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static CREATE: Schema = Schema::new(
    "quiz attempt",
    &[
        Field::required("quizId", Rule::Uuid),
        Field::required("answers", Rule::Json),
        Field::optional("score", Rule::int_range(0, 100)).nullable(),
    ],
);

static UPDATE: Schema = Schema::new(
    "quiz attempt update",
    &[
        Field::optional("answers", Rule::Json),
        Field::optional("score", Rule::int_range(0, 100)).nullable(),
    ],
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuizAttempt {
    pub quiz_id: Uuid,
    pub answers: Value,
    #[serde(default)]
    pub score: Option<i32>,
}

impl Payload for CreateQuizAttempt {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

impl Payload for QuizAttemptChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/quiz-attempts
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<QuizAttempt>> {
    let rows = state
        .store
        .quiz_attempts()
        .list(Scope::Owner(user.user_id))
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// POST /api/quiz-attempts
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(body): Validated<CreateQuizAttempt>,
) -> ApiResult<QuizAttempt> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Quiz, body.quiz_id, &user.user_id)
        .await?;

    let row = state
        .store
        .quiz_attempts()
        .insert(NewQuizAttempt {
            quiz_id: body.quiz_id,
            user_id: user.user_id,
            answers: body.answers,
            score: body.score,
        })
        .await?;
    Ok(ApiResponse::created(row))
}

/// GET /api/quiz-attempts/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<QuizAttempt> {
    let row = OwnershipResolver::new(state.store.as_ref())
        .fetch_owned(state.store.quiz_attempts(), id, &user.user_id)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/quiz-attempts/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
    Validated(changes): Validated<QuizAttemptChanges>,
) -> ApiResult<QuizAttempt> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::QuizAttempt, id, &user.user_id)
        .await?;

    let row = apply_changes(state.store.quiz_attempts(), id, changes)
        .await?
        .ok_or_else(|| ResourceKind::QuizAttempt.not_found())?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/quiz-attempts/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<()> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::QuizAttempt, id, &user.user_id)
        .await?;

    state.store.quiz_attempts().delete(id).await?;
    Ok(ApiResponse::no_content())
}

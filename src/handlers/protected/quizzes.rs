use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::ResourceId;
use crate::database::models::{NewQuiz, Quiz, QuizChanges};
use crate::database::{apply_changes, list_quizzes_for_user};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{OwnershipResolver, ResourceKind};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static CREATE: Schema = Schema::new(
    "quiz",
    &[
        Field::required("lessonId", Rule::Uuid),
        Field::required("questions", Rule::Json),
    ],
);

static UPDATE: Schema = Schema::new(
    "quiz update",
    &[
        Field::optional("lessonId", Rule::Uuid),
        Field::optional("questions", Rule::Json),
    ],
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuiz {
    pub lesson_id: Uuid,
    pub questions: Value,
}

impl Payload for CreateQuiz {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

impl Payload for QuizChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/quizzes - quizzes under any lesson the caller owns
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Quiz>> {
    let rows = list_quizzes_for_user(state.store.as_ref(), &user.user_id).await?;
    Ok(ApiResponse::ok(rows))
}

/// POST /api/quizzes
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(body): Validated<CreateQuiz>,
) -> ApiResult<Quiz> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Lesson, body.lesson_id, &user.user_id)
        .await?;

    let row = state
        .store
        .quizzes()
        .insert(NewQuiz {
            lesson_id: body.lesson_id,
            questions: body.questions,
        })
        .await?;
    Ok(ApiResponse::created(row))
}

/// GET /api/quizzes/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Quiz> {
    let row = OwnershipResolver::new(state.store.as_ref())
        .fetch_owned(state.store.quizzes(), id, &user.user_id)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/quizzes/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
    Validated(changes): Validated<QuizChanges>,
) -> ApiResult<Quiz> {
    let resolver = OwnershipResolver::new(state.store.as_ref());
    resolver.assert_owned(ResourceKind::Quiz, id, &user.user_id).await?;
    if let Some(lesson_id) = changes.lesson_id {
        resolver
            .assert_owned(ResourceKind::Lesson, lesson_id, &user.user_id)
            .await?;
    }

    let row = apply_changes(state.store.quizzes(), id, changes)
        .await?
        .ok_or_else(|| ResourceKind::Quiz.not_found())?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/quizzes/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<()> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Quiz, id, &user.user_id)
        .await?;

    state.store.quizzes().delete(id).await?;
    Ok(ApiResponse::no_content())
}

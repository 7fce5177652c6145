use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::ResourceId;
use crate::database::models::{Flashcard, FlashcardChanges, NewFlashcard};
use crate::database::{apply_changes, Scope};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{OwnershipResolver, ResourceKind};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static CREATE: Schema = Schema::new(
    "flashcard",
    &[
        Field::required("lessonId", Rule::Uuid),
        Field::required("front", Rule::text(1)),
        Field::required("back", Rule::text(1)),
        Field::optional("hint", Rule::trimmed(0, None)).nullable(),
        Field::optional("nextReviewDate", Rule::Timestamp).nullable(),
    ],
);

static UPDATE: Schema = Schema::new(
    "flashcard update",
    &[
        Field::optional("lessonId", Rule::Uuid),
        Field::optional("front", Rule::text(1)),
        Field::optional("back", Rule::text(1)),
        Field::optional("hint", Rule::trimmed(0, None)).nullable(),
        Field::optional("nextReviewDate", Rule::Timestamp).nullable(),
        Field::optional("reviewCount", Rule::non_negative_int()),
    ],
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlashcard {
    pub lesson_id: Uuid,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default)]
    pub next_review_date: Option<DateTime<Utc>>,
}

impl Payload for CreateFlashcard {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

impl Payload for FlashcardChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/flashcards
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Flashcard>> {
    let rows = state
        .store
        .flashcards()
        .list(Scope::Owner(user.user_id))
        .await?;
    Ok(ApiResponse::ok(rows))
}

/// POST /api/flashcards
///
/// The lesson must belong to the caller; otherwise nothing is inserted.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(body): Validated<CreateFlashcard>,
) -> ApiResult<Flashcard> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Lesson, body.lesson_id, &user.user_id)
        .await?;

    let row = state
        .store
        .flashcards()
        .insert(NewFlashcard {
            lesson_id: body.lesson_id,
            user_id: user.user_id,
            front: body.front,
            back: body.back,
            hint: body.hint,
            next_review_date: body.next_review_date,
        })
        .await?;
    Ok(ApiResponse::created(row))
}

/// GET /api/flashcards/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Flashcard> {
    let row = OwnershipResolver::new(state.store.as_ref())
        .fetch_owned(state.store.flashcards(), id, &user.user_id)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/flashcards/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
    Validated(changes): Validated<FlashcardChanges>,
) -> ApiResult<Flashcard> {
    let resolver = OwnershipResolver::new(state.store.as_ref());
    resolver
        .assert_owned(ResourceKind::Flashcard, id, &user.user_id)
        .await?;
    if let Some(lesson_id) = changes.lesson_id {
        resolver
            .assert_owned(ResourceKind::Lesson, lesson_id, &user.user_id)
            .await?;
    }

    let row = apply_changes(state.store.flashcards(), id, changes)
        .await?
        .ok_or_else(|| ResourceKind::Flashcard.not_found())?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/flashcards/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<()> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Flashcard, id, &user.user_id)
        .await?;

    state.store.flashcards().delete(id).await?;
    Ok(ApiResponse::no_content())
}

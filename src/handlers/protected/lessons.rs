use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use super::ResourceId;
use crate::database::models::{Lesson, LessonChanges, NewLesson};
use crate::database::{apply_changes, list_lessons_for_user};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{OwnershipResolver, ResourceKind};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static CREATE: Schema = Schema::new(
    "lesson",
    &[
        Field::required("documentId", Rule::Uuid),
        Field::required("title", Rule::text(1)),
        Field::optional("summary", Rule::text(1)).nullable(),
        Field::optional("bullets", Rule::TextList { trim: false }).nullable(),
        Field::optional("keyTerms", Rule::TextList { trim: false }).nullable(),
    ],
);

static UPDATE: Schema = Schema::new(
    "lesson update",
    &[
        Field::optional("documentId", Rule::Uuid),
        Field::optional("title", Rule::text(1)),
        Field::optional("summary", Rule::text(1)).nullable(),
        Field::optional("bullets", Rule::TextList { trim: false }).nullable(),
        Field::optional("keyTerms", Rule::TextList { trim: false }).nullable(),
    ],
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLesson {
    pub document_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub bullets: Option<Vec<String>>,
    #[serde(default)]
    pub key_terms: Option<Vec<String>>,
}

impl Payload for CreateLesson {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

impl Payload for LessonChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/lessons - lessons under any of the caller's documents
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Lesson>> {
    let rows = list_lessons_for_user(state.store.as_ref(), &user.user_id).await?;
    Ok(ApiResponse::ok(rows))
}

/// POST /api/lessons
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(body): Validated<CreateLesson>,
) -> ApiResult<Lesson> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Document, body.document_id, &user.user_id)
        .await?;

    let row = state
        .store
        .lessons()
        .insert(NewLesson {
            document_id: body.document_id,
            title: body.title,
            summary: body.summary,
            bullets: body.bullets,
            key_terms: body.key_terms,
        })
        .await?;
    Ok(ApiResponse::created(row))
}

/// GET /api/lessons/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Lesson> {
    let row = OwnershipResolver::new(state.store.as_ref())
        .fetch_owned(state.store.lessons(), id, &user.user_id)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/lessons/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
    Validated(changes): Validated<LessonChanges>,
) -> ApiResult<Lesson> {
    let resolver = OwnershipResolver::new(state.store.as_ref());
    resolver
        .assert_owned(ResourceKind::Lesson, id, &user.user_id)
        .await?;
    // Moving under another document requires owning that one too
    if let Some(document_id) = changes.document_id {
        resolver
            .assert_owned(ResourceKind::Document, document_id, &user.user_id)
            .await?;
    }

    let row = apply_changes(state.store.lessons(), id, changes)
        .await?
        .ok_or_else(|| ResourceKind::Lesson.not_found())?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/lessons/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<()> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Lesson, id, &user.user_id)
        .await?;

    state.store.lessons().delete(id).await?;
    Ok(ApiResponse::no_content())
}

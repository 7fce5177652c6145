use axum::{extract::State, Extension};
use serde::Deserialize;

use super::ResourceId;
use crate::database::models::{Document, DocumentChanges, NewDocument};
use crate::database::{apply_changes, Scope};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{OwnershipResolver, ResourceKind};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static CREATE: Schema = Schema::new(
    "document",
    &[
        Field::required("text", Rule::text(1)),
        Field::optional("sourceUrl", Rule::Url),
    ],
);

static UPDATE: Schema = Schema::new(
    "document update",
    &[
        Field::optional("text", Rule::text(1)),
        Field::optional("sourceUrl", Rule::Url),
    ],
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    pub text: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Payload for CreateDocument {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

impl Payload for DocumentChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/documents - the caller's documents, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Document>> {
    let rows = state.store.documents().list(Scope::Owner(user.user_id)).await?;
    Ok(ApiResponse::ok(rows))
}

/// POST /api/documents
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(body): Validated<CreateDocument>,
) -> ApiResult<Document> {
    let row = state
        .store
        .documents()
        .insert(NewDocument {
            user_id: user.user_id,
            text: body.text,
            source_url: body.source_url,
        })
        .await?;

    tracing::info!(document_id = %row.id, "document created");
    Ok(ApiResponse::created(row))
}

/// GET /api/documents/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Document> {
    let row = OwnershipResolver::new(state.store.as_ref())
        .fetch_owned(state.store.documents(), id, &user.user_id)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/documents/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
    Validated(changes): Validated<DocumentChanges>,
) -> ApiResult<Document> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Document, id, &user.user_id)
        .await?;

    let row = apply_changes(state.store.documents(), id, changes)
        .await?
        .ok_or_else(|| ResourceKind::Document.not_found())?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/documents/:id
///
/// Lessons under the document are left in place; they simply become
/// unreachable through the ownership walk.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<()> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Document, id, &user.user_id)
        .await?;

    state.store.documents().delete(id).await?;
    Ok(ApiResponse::no_content())
}

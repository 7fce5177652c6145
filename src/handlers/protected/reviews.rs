use axum::{extract::State, Extension};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::ResourceId;
use crate::database::models::{NewReview, Review, ReviewChanges};
use crate::database::{apply_changes, Scope};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::ownership::{OwnershipResolver, ResourceKind};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

const QUALITY: Rule = Rule::int_range(0, 5);
const INTERVAL: Rule = Rule::Number { min: Some(0.0), max: None };
const EASE: Rule = Rule::Number { min: None, max: None };

static CREATE: Schema = Schema::new(
    "review",
    &[
        Field::required("flashcardId", Rule::Uuid),
        Field::optional("reviewDate", Rule::Timestamp),
        Field::required("quality", QUALITY),
        Field::optional("newInterval", INTERVAL).nullable(),
        Field::optional("newEf", EASE).nullable(),
    ],
);

static UPDATE: Schema = Schema::new(
    "review update",
    &[
        Field::optional("reviewDate", Rule::Timestamp),
        Field::optional("quality", QUALITY),
        Field::optional("newInterval", INTERVAL).nullable(),
        Field::optional("newEf", EASE).nullable(),
    ],
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReview {
    pub flashcard_id: Uuid,
    #[serde(default)]
    pub review_date: Option<DateTime<Utc>>,
    pub quality: i32,
    #[serde(default)]
    pub new_interval: Option<f64>,
    #[serde(default)]
    pub new_ef: Option<f64>,
}

impl Payload for CreateReview {
    fn schema() -> &'static Schema {
        &CREATE
    }
}

impl Payload for ReviewChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/reviews - newest review date first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Review>> {
    let rows = state.store.reviews().list(Scope::Owner(user.user_id)).await?;
    Ok(ApiResponse::ok(rows))
}

/// POST /api/reviews
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(body): Validated<CreateReview>,
) -> ApiResult<Review> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Flashcard, body.flashcard_id, &user.user_id)
        .await?;

    let row = state
        .store
        .reviews()
        .insert(NewReview {
            flashcard_id: body.flashcard_id,
            user_id: user.user_id,
            review_date: body.review_date,
            quality: body.quality,
            new_interval: body.new_interval,
            new_ef: body.new_ef,
        })
        .await?;
    Ok(ApiResponse::created(row))
}

/// GET /api/reviews/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<Review> {
    let row = OwnershipResolver::new(state.store.as_ref())
        .fetch_owned(state.store.reviews(), id, &user.user_id)
        .await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/reviews/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
    Validated(changes): Validated<ReviewChanges>,
) -> ApiResult<Review> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Review, id, &user.user_id)
        .await?;

    let row = apply_changes(state.store.reviews(), id, changes)
        .await?
        .ok_or_else(|| ResourceKind::Review.not_found())?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/reviews/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ResourceId(id): ResourceId,
) -> ApiResult<()> {
    OwnershipResolver::new(state.store.as_ref())
        .assert_owned(ResourceKind::Review, id, &user.user_id)
        .await?;

    state.store.reviews().delete(id).await?;
    Ok(ApiResponse::no_content())
}

use axum::{extract::State, Extension};

use crate::database::apply_singleton_changes;
use crate::database::models::{Profile, ProfileChanges};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::{Field, Payload, Rule, Schema, Validated};
use crate::AppState;

static UPDATE: Schema = Schema::new(
    "profile update",
    &[
        Field::optional("fullName", Rule::trimmed(1, Some(200))),
        Field::optional("grade", Rule::trimmed(1, Some(100))).nullable(),
        Field::optional("subjects", Rule::TextList { trim: true }).nullable(),
    ],
);

impl Payload for ProfileChanges {
    fn schema() -> &'static Schema {
        &UPDATE
    }
}

/// GET /api/profiles - the caller's profile, created blank on first read
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Profile> {
    let row = state.store.profiles().ensure(&user.user_id).await?;
    Ok(ApiResponse::ok(row))
}

/// PATCH /api/profiles
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Validated(changes): Validated<ProfileChanges>,
) -> ApiResult<Profile> {
    let profiles = state.store.profiles();
    profiles.ensure(&user.user_id).await?;

    let row = apply_singleton_changes(profiles, &user.user_id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(ApiResponse::ok(row))
}

/// DELETE /api/profiles - idempotent
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<()> {
    state.store.profiles().delete(&user.user_id).await?;
    Ok(ApiResponse::no_content())
}

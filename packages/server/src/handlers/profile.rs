use axum::extract::State;
use axum::Json;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{client_profile, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::profile::{ProfilePayload, UpdateProfileRequest, validate_update_profile};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/me",
    tag = "Profile",
    operation_id = "getProfile",
    summary = "The caller's profile",
    description = "Merged account and client-profile payload. A profile row is \
        created on first read for accounts that never had one.",
    responses(
        (status = 200, description = "Profile", body = ProfilePayload),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ProfilePayload>, AppError> {
    let user = find_user(&state.db, auth_user.user_id).await?;
    let profile = get_or_create_profile(&state.db, user.id).await?;

    Ok(Json(ProfilePayload::from_models(user, profile)))
}

#[utoipa::path(
    patch,
    path = "/me",
    tag = "Profile",
    operation_id = "updateProfile",
    summary = "Update the caller's profile",
    description = "Partial update across the account (name, email) and the client \
        profile (company, phone, address).",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfilePayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Email already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_profile(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> Result<Json<ProfilePayload>, AppError> {
    validate_update_profile(&payload)?;

    let user = find_user(&state.db, auth_user.user_id).await?;
    let profile = get_or_create_profile(&state.db, user.id).await?;

    let mut user_model: user::ActiveModel = user.into();
    if let Some(first_name) = payload.first_name {
        user_model.first_name = Set(first_name);
    }
    if let Some(last_name) = payload.last_name {
        user_model.last_name = Set(last_name);
    }
    if let Some(email) = payload.email {
        user_model.email = Set(email.trim().to_string());
    }
    let user = user_model
        .update(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Email is already registered".into())
            }
            _ => AppError::from(e),
        })?;

    let mut profile_model: client_profile::ActiveModel = profile.into();
    if let Some(company_name) = payload.company_name {
        profile_model.company_name = Set(company_name);
    }
    if let Some(phone) = payload.phone {
        profile_model.phone = Set(phone);
    }
    if let Some(address) = payload.address {
        profile_model.address = Set(address);
    }
    profile_model.updated_at = Set(Utc::now());
    let profile = profile_model.update(&state.db).await?;

    Ok(Json(ProfilePayload::from_models(user, profile)))
}

async fn find_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::TokenInvalid)
}

async fn get_or_create_profile(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<client_profile::Model, AppError> {
    if let Some(existing) = client_profile::Entity::find()
        .filter(client_profile::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = client_profile::ActiveModel {
        user_id: Set(user_id),
        company_name: Set(String::new()),
        phone: Set(String::new()),
        address: Set(String::new()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    match created {
        Ok(profile) => Ok(profile),
        // Lost a creation race; the row exists now.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            client_profile::Entity::find()
                .filter(client_profile::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| AppError::Internal("Profile missing after conflict".into()))
        }
        Err(e) => Err(e.into()),
    }
}

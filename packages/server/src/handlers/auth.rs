use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::emails;
use crate::entity::{auth_token, client_profile, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AuthResponse, LoginRequest, RegisterRequest, UserPayload, validate_login_request,
    validate_register_request,
};
use crate::state::AppState;
use crate::utils::{password, token};

#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    operation_id = "register",
    summary = "Register a client account",
    description = "Creates a user, its client profile, and a bearer token in one \
        transaction, then sends a welcome email. Rate limited per username.",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username or email taken (USERNAME_TAKEN, CONFLICT)", body = ErrorBody),
        (status = 429, description = "Too many attempts (RATE_LIMITED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_register_request(&payload)?;

    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();

    state
        .login_limiter
        .check(&username)
        .map_err(|retry_after| AppError::RateLimited { retry_after })?;

    let email_taken = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .is_some();
    if email_taken {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let new_user = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password: Set(hash),
        first_name: Set(payload.first_name.unwrap_or_default()),
        last_name: Set(payload.last_name.unwrap_or_default()),
        is_staff: Set(false),
        created_at: Set(now),
        ..Default::default()
    };

    let user = new_user.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Registration race: unique constraint caught on insert");
            AppError::UsernameTaken
        }
        _ => AppError::from(e),
    })?;

    client_profile::ActiveModel {
        user_id: Set(user.id),
        company_name: Set(payload.company_name.unwrap_or_default()),
        phone: Set(payload.phone.unwrap_or_default()),
        address: Set(String::new()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let key = token::generate_token();
    auth_token::ActiveModel {
        key: Set(key.clone()),
        user_id: Set(user.id),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    emails::send_welcome(&state, &user).await;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token: key,
            user: UserPayload::from(user),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with username and password",
    description = "Returns the account's bearer token, creating one if none exists. \
        Rate limited per username.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad credentials (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 429, description = "Too many attempts (RATE_LIMITED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_login_request(&payload)?;

    let username = payload.username.trim();

    state
        .login_limiter
        .check(username)
        .map_err(|retry_after| AppError::RateLimited { retry_after })?;

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = password::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    // Soft-disabled clients cannot log in.
    if !user.is_staff {
        let disabled = client_profile::Entity::find()
            .filter(client_profile::Column::UserId.eq(user.id))
            .filter(client_profile::Column::IsActive.eq(false))
            .one(&state.db)
            .await?
            .is_some();
        if disabled {
            return Err(AppError::InvalidCredentials);
        }
    }

    let key = match auth_token::Entity::find()
        .filter(auth_token::Column::UserId.eq(user.id))
        .one(&state.db)
        .await?
    {
        Some(existing) => existing.key,
        None => {
            let key = token::generate_token();
            auth_token::ActiveModel {
                key: Set(key.clone()),
                user_id: Set(user.id),
                created_at: Set(Utc::now()),
            }
            .insert(&state.db)
            .await?;
            key
        }
    };

    state.login_limiter.reset(username);

    Ok(Json(AuthResponse {
        token: key,
        user: UserPayload::from(user),
    }))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Revoke the caller's token",
    description = "Deletes the bearer token; any later request with it gets 401.",
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    auth_token::Entity::delete_many()
        .filter(auth_token::Column::UserId.eq(auth_user.user_id))
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "me",
    summary = "Current account",
    responses(
        (status = 200, description = "Current user", body = UserPayload),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserPayload>, AppError> {
    let user = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    Ok(Json(UserPayload::from(user)))
}

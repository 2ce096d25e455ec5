use axum::extract::State;
use axum::Json;
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::email_preferences;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::preferences::{PreferencesPayload, UpdatePreferencesRequest};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Preferences",
    operation_id = "getEmailPreferences",
    summary = "The caller's notification toggles",
    description = "The row is created with defaults on first read.",
    responses(
        (status = 200, description = "Preferences", body = PreferencesPayload),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_preferences(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PreferencesPayload>, AppError> {
    let prefs = get_or_create(&state.db, auth_user.user_id).await?;
    Ok(Json(PreferencesPayload::from(prefs)))
}

#[utoipa::path(
    patch,
    path = "/",
    tag = "Preferences",
    operation_id = "updateEmailPreferences",
    summary = "Update notification toggles",
    description = "Partial update; absent toggles keep their value.",
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Updated preferences", body = PreferencesPayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn update_preferences(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdatePreferencesRequest>,
) -> Result<Json<PreferencesPayload>, AppError> {
    let prefs = get_or_create(&state.db, auth_user.user_id).await?;
    let mut model: email_preferences::ActiveModel = prefs.into();

    if let Some(v) = payload.project_updates {
        model.project_updates = Set(v);
    }
    if let Some(v) = payload.ticket_comments {
        model.ticket_comments = Set(v);
    }
    if let Some(v) = payload.ticket_status_changes {
        model.ticket_status_changes = Set(v);
    }
    if let Some(v) = payload.new_files {
        model.new_files = Set(v);
    }
    if let Some(v) = payload.weekly_summary {
        model.weekly_summary = Set(v);
    }
    model.updated_at = Set(Utc::now());

    let updated = model.update(&state.db).await?;
    Ok(Json(PreferencesPayload::from(updated)))
}

async fn get_or_create(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<email_preferences::Model, AppError> {
    if let Some(existing) = email_preferences::Entity::find()
        .filter(email_preferences::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = email_preferences::ActiveModel {
        user_id: Set(user_id),
        project_updates: Set(true),
        ticket_comments: Set(true),
        ticket_status_changes: Set(true),
        new_files: Set(true),
        weekly_summary: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    match created {
        Ok(prefs) => Ok(prefs),
        // Lost a creation race; the row exists now.
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            email_preferences::Entity::find()
                .filter(email_preferences::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| AppError::Internal("Preferences missing after conflict".into()))
        }
        Err(e) => Err(e.into()),
    }
}

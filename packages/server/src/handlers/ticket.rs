use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use common::TicketStatus;
use sea_orm::*;
use serde::Deserialize;
use tracing::instrument;

use crate::emails;
use crate::entity::{ticket, ticket_comment, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::project::touch_project;
use crate::models::ticket::{
    CommentPayload, CreateCommentRequest, CreateTicketRequest, TicketDetail, TicketSummary,
    UpdateTicketRequest, validate_create_comment, validate_create_ticket, validate_update_ticket,
};
use crate::policy;
use crate::state::AppState;

/// Query string for the ticket list.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct TicketListQuery {
    /// Restrict to one project.
    pub project: Option<i32>,
    /// Restrict to one status.
    pub status: Option<TicketStatus>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Tickets",
    operation_id = "listTickets",
    summary = "List visible tickets",
    description = "Clients see tickets they filed plus tickets on their projects; \
        staff see everything. Newest first, annotated with the visible comment count.",
    params(TicketListQuery),
    responses(
        (status = 200, description = "Ticket list", body = [TicketSummary]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_tickets(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TicketListQuery>,
) -> Result<Json<Vec<TicketSummary>>, AppError> {
    let mut find = ticket::Entity::find().filter(policy::ticket_scope(&auth_user));
    if let Some(project_id) = query.project {
        find = find.filter(ticket::Column::ProjectId.eq(project_id));
    }
    if let Some(status) = query.status {
        find = find.filter(ticket::Column::Status.eq(status));
    }

    let tickets = find
        .order_by_desc(ticket::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut rows = Vec::with_capacity(tickets.len());
    for t in tickets {
        let count = visible_comment_count(&state.db, &auth_user, t.id).await?;
        rows.push(TicketSummary::from_model(t, count));
    }

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Tickets",
    operation_id = "createTicket",
    summary = "Open a ticket",
    description = "The caller becomes the reporter. An optional project link must be \
        visible to the caller. The admin mailbox is notified.",
    request_body = CreateTicketRequest,
    responses(
        (status = 201, description = "Ticket created", body = TicketDetail),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_ticket(&payload)?;

    if let Some(project_id) = payload.project_id {
        policy::find_project(&state.db, &auth_user, project_id).await?;
    }

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let created = ticket::ActiveModel {
        project_id: Set(payload.project_id),
        created_by: Set(auth_user.user_id),
        assigned_to: Set(None),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        ticket_type: Set(payload.ticket_type.unwrap_or_default()),
        status: Set(TicketStatus::Open),
        priority: Set(payload.priority.unwrap_or_default()),
        created_at: Set(now),
        updated_at: Set(now),
        resolved_at: Set(None),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(project_id) = created.project_id {
        touch_project(&txn, project_id, now).await?;
    }
    txn.commit().await?;

    let creator = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or(AppError::TokenInvalid)?;
    emails::notify_ticket_created(&state, &created, &creator).await;

    let detail = build_detail(&state, &auth_user, created).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "getTicket",
    summary = "Ticket detail",
    description = "Full ticket payload with its comment thread oldest first. \
        Internal notes are omitted for non-staff callers.",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket detail", body = TicketDetail),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = id))]
pub async fn get_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TicketDetail>, AppError> {
    let ticket = policy::find_ticket(&state.db, &auth_user, id).await?;
    Ok(Json(build_detail(&state, &auth_user, ticket).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Tickets",
    operation_id = "updateTicket",
    summary = "Update a ticket",
    description = "Partial update of status, priority, type, assignment, or text. \
        Entering `resolved` stamps `resolved_at` once; the stamp survives later \
        transitions.",
    params(("id" = i32, Path, description = "Ticket ID")),
    request_body = UpdateTicketRequest,
    responses(
        (status = 200, description = "Updated ticket", body = TicketDetail),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_id = id))]
pub async fn update_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTicketRequest>,
) -> Result<Json<TicketDetail>, AppError> {
    validate_update_ticket(&payload)?;

    let ticket = policy::find_ticket(&state.db, &auth_user, id).await?;
    let resolved_at = ticket.resolved_at;
    let mut model: ticket::ActiveModel = ticket.into();

    if let Some(title) = payload.title {
        model.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        model.description = Set(description);
    }
    if let Some(priority) = payload.priority {
        model.priority = Set(priority);
    }
    if let Some(ticket_type) = payload.ticket_type {
        model.ticket_type = Set(ticket_type);
    }
    if let Some(assigned_to) = payload.assigned_to {
        auth_user.require_staff()?;
        model.assigned_to = Set(assigned_to);
    }
    if let Some(status) = payload.status {
        model.status = Set(status);
        if status == TicketStatus::Resolved && resolved_at.is_none() {
            model.resolved_at = Set(Some(Utc::now()));
        }
    }
    model.updated_at = Set(Utc::now());

    let updated = model.update(&state.db).await?;
    Ok(Json(build_detail(&state, &auth_user, updated).await?))
}

#[utoipa::path(
    post,
    path = "/{id}/comments",
    tag = "Tickets",
    operation_id = "createTicketComment",
    summary = "Comment on a ticket",
    description = "Appends to the thread and bumps the ticket's `updated_at`. The \
        reporter is notified unless they wrote the comment or opted out. Only staff \
        may post internal notes.",
    params(("id" = i32, Path, description = "Ticket ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentPayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(ticket_id = id))]
pub async fn create_comment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_comment(&payload)?;
    if payload.is_internal {
        auth_user.require_staff()?;
    }

    let ticket = policy::find_ticket(&state.db, &auth_user, id).await?;
    let now = Utc::now();

    let txn = state.db.begin().await?;

    let comment = ticket_comment::ActiveModel {
        ticket_id: Set(id),
        user_id: Set(auth_user.user_id),
        comment: Set(payload.comment),
        is_internal: Set(payload.is_internal),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut bump: ticket::ActiveModel = ticket.clone().into();
    bump.updated_at = Set(now);
    bump.update(&txn).await?;

    txn.commit().await?;

    emails::notify_ticket_comment(&state, &ticket, &comment).await;

    Ok((StatusCode::CREATED, Json(CommentPayload::from(comment))))
}

#[utoipa::path(
    post,
    path = "/{id}/resolve",
    tag = "Tickets",
    operation_id = "resolveTicket",
    summary = "Resolve a ticket",
    description = "Shortcut for setting the status to `resolved`. Idempotent for the \
        `resolved_at` stamp.",
    params(("id" = i32, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Resolved ticket", body = TicketDetail),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Ticket not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(ticket_id = id))]
pub async fn resolve_ticket(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TicketDetail>, AppError> {
    let ticket = policy::find_ticket(&state.db, &auth_user, id).await?;
    let resolved_at = ticket.resolved_at;
    let mut model: ticket::ActiveModel = ticket.into();

    model.status = Set(TicketStatus::Resolved);
    if resolved_at.is_none() {
        model.resolved_at = Set(Some(Utc::now()));
    }
    model.updated_at = Set(Utc::now());

    let updated = model.update(&state.db).await?;
    Ok(Json(build_detail(&state, &auth_user, updated).await?))
}

async fn visible_comment_count(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
    ticket_id: i32,
) -> Result<u64, AppError> {
    let mut find = ticket_comment::Entity::find()
        .filter(ticket_comment::Column::TicketId.eq(ticket_id));
    if !auth_user.is_staff {
        find = find.filter(ticket_comment::Column::IsInternal.eq(false));
    }
    Ok(find.count(db).await?)
}

async fn build_detail(
    state: &AppState,
    auth_user: &AuthUser,
    t: ticket::Model,
) -> Result<TicketDetail, AppError> {
    let mut find = ticket_comment::Entity::find()
        .filter(ticket_comment::Column::TicketId.eq(t.id))
        .order_by_asc(ticket_comment::Column::CreatedAt);
    if !auth_user.is_staff {
        find = find.filter(ticket_comment::Column::IsInternal.eq(false));
    }
    let comments = find.all(&state.db).await?;

    Ok(TicketDetail {
        id: t.id,
        project_id: t.project_id,
        created_by: t.created_by,
        assigned_to: t.assigned_to,
        title: t.title,
        description: t.description,
        ticket_type: t.ticket_type,
        status: t.status,
        priority: t.priority,
        comments: comments.into_iter().map(CommentPayload::from).collect(),
        created_at: t.created_at,
        updated_at: t.updated_at,
        resolved_at: t.resolved_at,
    })
}

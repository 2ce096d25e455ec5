use common::{Priority, TicketStatus, TicketType};
use serde::{Deserialize, Serialize};

use crate::entity::{ticket, ticket_comment};
use crate::error::AppError;
use crate::models::shared::validate_title;

/// One row in the ticket list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketSummary {
    #[schema(example = 12)]
    pub id: i32,
    pub project_id: Option<i32>,
    pub created_by: i32,
    pub assigned_to: Option<i32>,
    #[schema(example = "Login page broken on mobile")]
    pub title: String,
    pub ticket_type: TicketType,
    pub status: TicketStatus,
    pub priority: Priority,
    /// Comments visible to the caller.
    pub comment_count: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TicketSummary {
    pub fn from_model(t: ticket::Model, comment_count: u64) -> Self {
        Self {
            id: t.id,
            project_id: t.project_id,
            created_by: t.created_by,
            assigned_to: t.assigned_to,
            title: t.title,
            ticket_type: t.ticket_type,
            status: t.status,
            priority: t.priority,
            comment_count,
            created_at: t.created_at,
            updated_at: t.updated_at,
            resolved_at: t.resolved_at,
        }
    }
}

/// Full ticket payload with its comment thread, oldest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TicketDetail {
    pub id: i32,
    pub project_id: Option<i32>,
    pub created_by: i32,
    pub assigned_to: Option<i32>,
    pub title: String,
    pub description: String,
    pub ticket_type: TicketType,
    pub status: TicketStatus,
    pub priority: Priority,
    pub comments: Vec<CommentPayload>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Request body for ticket creation.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTicketRequest {
    #[schema(example = "Login page broken on mobile")]
    pub title: String,
    pub description: String,
    /// Optional project link; must be visible to the caller.
    pub project_id: Option<i32>,
    pub ticket_type: Option<TicketType>,
    pub priority: Option<Priority>,
}

pub fn validate_create_ticket(payload: &CreateTicketRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    Ok(())
}

/// Request body for partial ticket updates.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
    pub ticket_type: Option<TicketType>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub assigned_to: Option<Option<i32>>,
}

pub fn validate_update_ticket(payload: &UpdateTicketRequest) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(description) = &payload.description
        && description.trim().is_empty()
    {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    Ok(())
}

/// Request body for adding a comment.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCommentRequest {
    pub comment: String,
    /// Staff-only flag; internal notes never reach the client.
    #[serde(default)]
    pub is_internal: bool,
}

pub fn validate_create_comment(payload: &CreateCommentRequest) -> Result<(), AppError> {
    if payload.comment.trim().is_empty() {
        return Err(AppError::Validation("Comment must not be empty".into()));
    }
    Ok(())
}

/// A single comment on a ticket.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CommentPayload {
    pub id: i32,
    pub ticket_id: i32,
    pub user_id: i32,
    pub comment: String,
    pub is_internal: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ticket_comment::Model> for CommentPayload {
    fn from(c: ticket_comment::Model) -> Self {
        Self {
            id: c.id,
            ticket_id: c.ticket_id,
            user_id: c.user_id,
            comment: c.comment,
            is_internal: c.is_internal,
            created_at: c.created_at,
        }
    }
}

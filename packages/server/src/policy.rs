//! Ownership checks shared by the handlers.
//!
//! Staff accounts see everything. Clients see their own projects, the
//! records under those projects, and tickets they filed themselves. A
//! record that exists but belongs to someone else yields 403, not 404.

use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entity::{project, ticket};
use crate::error::AppError;
use crate::extractors::AuthUser;

/// Filter limiting a project query to what `user` may see.
pub fn project_scope(user: &AuthUser) -> Condition {
    if user.is_staff {
        Condition::all()
    } else {
        Condition::all().add(project::Column::ClientId.eq(user.user_id))
    }
}

/// Filter limiting a ticket query to what `user` may see: tickets they
/// filed, plus tickets on projects they own.
pub fn ticket_scope(user: &AuthUser) -> Condition {
    if user.is_staff {
        return Condition::all();
    }

    let owned_projects = Query::select()
        .column(project::Column::Id)
        .from(project::Entity)
        .and_where(project::Column::ClientId.eq(user.user_id))
        .to_owned();

    Condition::any()
        .add(ticket::Column::CreatedBy.eq(user.user_id))
        .add(ticket::Column::ProjectId.in_subquery(owned_projects))
}

/// Load a project and verify `user` may access it.
pub async fn find_project(
    db: &DatabaseConnection,
    user: &AuthUser,
    project_id: i32,
) -> Result<project::Model, AppError> {
    let project = project::Entity::find_by_id(project_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {project_id} not found")))?;

    if !user.is_staff && project.client_id != user.user_id {
        return Err(AppError::PermissionDenied);
    }

    Ok(project)
}

/// Load a ticket and verify `user` may access it.
pub async fn find_ticket(
    db: &DatabaseConnection,
    user: &AuthUser,
    ticket_id: i32,
) -> Result<ticket::Model, AppError> {
    let ticket = ticket::Entity::find_by_id(ticket_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {ticket_id} not found")))?;

    if user.is_staff || ticket.created_by == user.user_id {
        return Ok(ticket);
    }

    if let Some(project_id) = ticket.project_id {
        let owns = project::Entity::find_by_id(project_id)
            .filter(project::Column::ClientId.eq(user.user_id))
            .one(db)
            .await?
            .is_some();
        if owns {
            return Ok(ticket);
        }
    }

    Err(AppError::PermissionDenied)
}

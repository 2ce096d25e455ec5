use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use common::{ProjectStatus, TicketStatus};
use sea_orm::sea_query::Query as DbQuery;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{project, project_update, ticket, ticket_comment};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::{ActivityResponse, StatsResponse};
use crate::models::project::UpdatePayload;
use crate::models::ticket::TicketSummary;
use crate::policy;
use crate::state::AppState;

/// Items per section in the activity feed.
const ACTIVITY_LIMIT: u64 = 10;

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Dashboard",
    operation_id = "dashboardStats",
    summary = "Aggregate counters",
    description = "Project and ticket totals plus updates from the trailing 7 days. \
        Staff totals span all clients; a client only sees their own records.",
    responses(
        (status = 200, description = "Counters", body = StatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let total_projects = project::Entity::find()
        .filter(policy::project_scope(&auth_user))
        .count(&state.db)
        .await?;

    let active_projects = project::Entity::find()
        .filter(policy::project_scope(&auth_user))
        .filter(project::Column::Status.eq(ProjectStatus::InProgress))
        .count(&state.db)
        .await?;

    let open: Vec<TicketStatus> = TicketStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_open())
        .collect();
    let open_tickets = ticket::Entity::find()
        .filter(policy::ticket_scope(&auth_user))
        .filter(ticket::Column::Status.is_in(open))
        .count(&state.db)
        .await?;

    let week_ago = Utc::now() - Duration::days(7);
    let recent_updates_count = scoped_updates(&auth_user)
        .filter(project_update::Column::CreatedAt.gt(week_ago))
        .count(&state.db)
        .await?;

    Ok(Json(StatsResponse {
        total_projects,
        active_projects,
        open_tickets,
        recent_updates_count,
    }))
}

#[utoipa::path(
    get,
    path = "/activity",
    tag = "Dashboard",
    operation_id = "dashboardActivity",
    summary = "Recent activity feed",
    description = "The latest project updates and tickets in scope, newest first.",
    responses(
        (status = 200, description = "Activity feed", body = ActivityResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ActivityResponse>, AppError> {
    let updates = scoped_updates(&auth_user)
        .order_by_desc(project_update::Column::CreatedAt)
        .limit(ACTIVITY_LIMIT)
        .all(&state.db)
        .await?;

    let tickets = ticket::Entity::find()
        .filter(policy::ticket_scope(&auth_user))
        .order_by_desc(ticket::Column::CreatedAt)
        .limit(ACTIVITY_LIMIT)
        .all(&state.db)
        .await?;

    let mut recent_tickets = Vec::with_capacity(tickets.len());
    for t in tickets {
        let mut find = ticket_comment::Entity::find()
            .filter(ticket_comment::Column::TicketId.eq(t.id));
        if !auth_user.is_staff {
            find = find.filter(ticket_comment::Column::IsInternal.eq(false));
        }
        let count = find.count(&state.db).await?;
        recent_tickets.push(TicketSummary::from_model(t, count));
    }

    Ok(Json(ActivityResponse {
        recent_updates: updates.into_iter().map(UpdatePayload::from).collect(),
        recent_tickets,
    }))
}

fn scoped_updates(auth_user: &AuthUser) -> Select<project_update::Entity> {
    let find = project_update::Entity::find();
    if auth_user.is_staff {
        return find;
    }

    let owned = DbQuery::select()
        .column(project::Column::Id)
        .from(project::Entity)
        .and_where(project::Column::ClientId.eq(auth_user.user_id))
        .to_owned();

    find.filter(project_update::Column::ProjectId.in_subquery(owned))
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::emails;
use crate::entity::{
    project, project_file, project_milestone, project_update, ticket, ticket_comment, user,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::file::FilePayload;
use crate::models::project::{
    CreateMilestoneRequest, CreateProjectRequest, CreateUpdateRequest, MilestonePayload,
    ProjectDetail, ProjectSummary, UpdateMilestoneRequest, UpdatePayload, UpdateProjectRequest,
    validate_create_milestone, validate_create_project, validate_create_update,
    validate_update_milestone, validate_update_project,
};
use crate::models::ticket::TicketSummary;
use crate::policy;
use crate::state::AppState;
use crate::utils::slug;

/// Attempts when the slug unique constraint races a concurrent create.
const SLUG_INSERT_ATTEMPTS: usize = 3;

#[utoipa::path(
    get,
    path = "/",
    tag = "Projects",
    operation_id = "listProjects",
    summary = "List visible projects",
    description = "Staff see every project; clients see their own. Newest first, \
        each row annotated with open ticket and file counts.",
    responses(
        (status = 200, description = "Project list", body = [ProjectSummary]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_projects(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectSummary>>, AppError> {
    let projects = project::Entity::find()
        .filter(policy::project_scope(&auth_user))
        .order_by_desc(project::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut rows = Vec::with_capacity(projects.len());
    for p in projects {
        let open_tickets = count_open_tickets(&state.db, p.id).await?;
        let files = project_file::Entity::find()
            .filter(project_file::Column::ProjectId.eq(p.id))
            .count(&state.db)
            .await?;
        rows.push(ProjectSummary::from_model(p, open_tickets, files));
    }

    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Projects",
    operation_id = "createProject",
    summary = "Create a project",
    description = "Staff may create for any client via `client_id`; a client can only \
        create for themself. The slug is derived from the title server-side.",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectDetail),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_project(&payload)?;

    let client_id = match payload.client_id {
        Some(id) if id != auth_user.user_id => {
            auth_user.require_staff()?;
            user::Entity::find_by_id(id)
                .one(&state.db)
                .await?
                .ok_or_else(|| AppError::Validation(format!("Client {id} does not exist")))?;
            id
        }
        _ => auth_user.user_id,
    };

    let title = payload.title.trim().to_string();
    let base = slug::slugify(&title);
    let now = Utc::now();

    let mut last_err = None;
    for _ in 0..SLUG_INSERT_ATTEMPTS {
        let candidate = allocate_slug(&state.db, &base).await?;

        let model = project::ActiveModel {
            client_id: Set(client_id),
            title: Set(title.clone()),
            slug: Set(candidate),
            description: Set(payload.description.clone().unwrap_or_default()),
            status: Set(payload.status.unwrap_or_default()),
            priority: Set(payload.priority.unwrap_or_default()),
            start_date: Set(payload.start_date),
            estimated_completion: Set(payload.estimated_completion),
            actual_completion: Set(None),
            deliverables: Set(payload.deliverables.clone().unwrap_or_default()),
            progress_percentage: Set(payload.progress_percentage.unwrap_or(0)),
            staging_url: Set(payload.staging_url.clone()),
            production_url: Set(payload.production_url.clone()),
            repository_url: Set(payload.repository_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            last_activity: Set(now),
            ..Default::default()
        };

        match model.insert(&state.db).await {
            Ok(created) => {
                let detail = build_detail(&state, &auth_user, created).await?;
                return Ok((StatusCode::CREATED, Json(detail)));
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                tracing::debug!("Slug race, retrying with a new candidate");
                last_err = Some(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(format!(
        "Could not allocate a unique slug: {}",
        last_err.map(|e| e.to_string()).unwrap_or_default()
    )))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Projects",
    operation_id = "getProject",
    summary = "Project detail",
    description = "Full project payload with nested updates, tickets, files, and \
        milestones. Internal visibility rules apply to the nested records.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project detail", body = ProjectDetail),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(project_id = id))]
pub async fn get_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProjectDetail>, AppError> {
    let project = policy::find_project(&state.db, &auth_user, id).await?;
    Ok(Json(build_detail(&state, &auth_user, project).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Projects",
    operation_id = "updateProject",
    summary = "Update a project",
    description = "Partial update. Absent fields are untouched; explicit null clears \
        nullable fields. The slug never changes.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = ProjectDetail),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = id))]
pub async fn update_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateProjectRequest>,
) -> Result<Json<ProjectDetail>, AppError> {
    validate_update_project(&payload)?;

    let project = policy::find_project(&state.db, &auth_user, id).await?;
    let mut model: project::ActiveModel = project.into();

    if let Some(title) = payload.title {
        model.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        model.description = Set(description);
    }
    if let Some(status) = payload.status {
        model.status = Set(status);
    }
    if let Some(priority) = payload.priority {
        model.priority = Set(priority);
    }
    if let Some(progress) = payload.progress_percentage {
        model.progress_percentage = Set(progress);
    }
    if let Some(deliverables) = payload.deliverables {
        model.deliverables = Set(deliverables);
    }
    if let Some(start_date) = payload.start_date {
        model.start_date = Set(start_date);
    }
    if let Some(estimated) = payload.estimated_completion {
        model.estimated_completion = Set(estimated);
    }
    if let Some(actual) = payload.actual_completion {
        model.actual_completion = Set(actual);
    }
    if let Some(url) = payload.staging_url {
        model.staging_url = Set(url);
    }
    if let Some(url) = payload.production_url {
        model.production_url = Set(url);
    }
    if let Some(url) = payload.repository_url {
        model.repository_url = Set(url);
    }
    model.updated_at = Set(Utc::now());

    let updated = model.update(&state.db).await?;
    Ok(Json(build_detail(&state, &auth_user, updated).await?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Projects",
    operation_id = "deleteProject",
    summary = "Delete a project",
    description = "Deletes the project and everything under it (updates, tickets and \
        their comments, files, milestones) in one transaction. Stored file content \
        is removed once no other record references it.",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(project_id = id))]
pub async fn delete_project(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    policy::find_project(&state.db, &auth_user, id).await?;

    let ticket_ids: Vec<i32> = ticket::Entity::find()
        .filter(ticket::Column::ProjectId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let orphan_hashes: Vec<String> = project_file::Entity::find()
        .filter(project_file::Column::ProjectId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|f| f.content_hash)
        .collect();

    let txn = state.db.begin().await?;

    if !ticket_ids.is_empty() {
        ticket_comment::Entity::delete_many()
            .filter(ticket_comment::Column::TicketId.is_in(ticket_ids.clone()))
            .exec(&txn)
            .await?;
        ticket::Entity::delete_many()
            .filter(ticket::Column::Id.is_in(ticket_ids))
            .exec(&txn)
            .await?;
    }
    project_update::Entity::delete_many()
        .filter(project_update::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;
    project_file::Entity::delete_many()
        .filter(project_file::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;
    project_milestone::Entity::delete_many()
        .filter(project_milestone::Column::ProjectId.eq(id))
        .exec(&txn)
        .await?;
    project::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    // Best effort blob cleanup once the rows are gone.
    for hash in orphan_hashes {
        crate::handlers::file::delete_blob_if_unreferenced(&state, &hash).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/updates",
    tag = "Projects",
    operation_id = "createProjectUpdate",
    summary = "Append a project update",
    description = "Adds a timeline entry, bumps the project's last activity, and \
        notifies the owning client unless they opted out.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreateUpdateRequest,
    responses(
        (status = 201, description = "Update created", body = UpdatePayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = id))]
pub async fn create_project_update(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_update(&payload)?;

    let project = policy::find_project(&state.db, &auth_user, id).await?;
    let now = Utc::now();

    let txn = state.db.begin().await?;

    let update = project_update::ActiveModel {
        project_id: Set(id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        created_by: Set(Some(auth_user.user_id)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    touch_project(&txn, id, now).await?;
    txn.commit().await?;

    emails::notify_project_update(&state, &project, &update).await;

    Ok((StatusCode::CREATED, Json(UpdatePayload::from(update))))
}

#[utoipa::path(
    post,
    path = "/{id}/milestones",
    tag = "Milestones",
    operation_id = "createMilestone",
    summary = "Add a milestone",
    description = "Staff only. Position defaults to the end of the list.",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = CreateMilestoneRequest,
    responses(
        (status = 201, description = "Milestone created", body = MilestonePayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = id))]
pub async fn create_milestone(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateMilestoneRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff()?;
    validate_create_milestone(&payload)?;

    policy::find_project(&state.db, &auth_user, id).await?;

    let position = match payload.position {
        Some(pos) => pos,
        None => {
            let count = project_milestone::Entity::find()
                .filter(project_milestone::Column::ProjectId.eq(id))
                .count(&state.db)
                .await?;
            i32::try_from(count).unwrap_or(i32::MAX)
        }
    };

    let milestone = project_milestone::ActiveModel {
        project_id: Set(id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.unwrap_or_default()),
        status: Set(payload.status.unwrap_or_default()),
        target_date: Set(payload.target_date),
        completed_date: Set(None),
        position: Set(position),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    let today = Utc::now().date_naive();
    Ok((
        StatusCode::CREATED,
        Json(MilestonePayload::from_model(milestone, today)),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}/milestones/{mid}",
    tag = "Milestones",
    operation_id = "updateMilestone",
    summary = "Update a milestone",
    description = "Staff only. Marking a milestone completed without an explicit \
        completed date stamps today.",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("mid" = i32, Path, description = "Milestone ID"),
    ),
    request_body = UpdateMilestoneRequest,
    responses(
        (status = 200, description = "Updated milestone", body = MilestonePayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Milestone not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(project_id = id, milestone_id = mid))]
pub async fn update_milestone(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, mid)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateMilestoneRequest>,
) -> Result<Json<MilestonePayload>, AppError> {
    auth_user.require_staff()?;
    validate_update_milestone(&payload)?;

    let milestone = find_milestone(&state.db, id, mid).await?;
    let was_completed = milestone.status == common::MilestoneStatus::Completed;
    let mut model: project_milestone::ActiveModel = milestone.into();

    if let Some(title) = payload.title {
        model.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        model.description = Set(description);
    }
    if let Some(position) = payload.position {
        model.position = Set(position);
    }
    if let Some(target) = payload.target_date {
        model.target_date = Set(target);
    }
    if let Some(completed) = payload.completed_date {
        model.completed_date = Set(completed);
    }
    if let Some(status) = payload.status {
        model.status = Set(status);
        if status == common::MilestoneStatus::Completed
            && !was_completed
            && payload.completed_date.is_none()
        {
            model.completed_date = Set(Some(Utc::now().date_naive()));
        }
    }

    let updated = model.update(&state.db).await?;
    Ok(Json(MilestonePayload::from_model(
        updated,
        Utc::now().date_naive(),
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}/milestones/{mid}",
    tag = "Milestones",
    operation_id = "deleteMilestone",
    summary = "Delete a milestone",
    description = "Staff only.",
    params(
        ("id" = i32, Path, description = "Project ID"),
        ("mid" = i32, Path, description = "Milestone ID"),
    ),
    responses(
        (status = 204, description = "Milestone deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Milestone not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(project_id = id, milestone_id = mid))]
pub async fn delete_milestone(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, mid)): Path<(i32, i32)>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff()?;

    find_milestone(&state.db, id, mid).await?;
    project_milestone::Entity::delete_by_id(mid)
        .exec(&state.db)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Bump a project's `last_activity` inside the caller's transaction.
pub async fn touch_project<C: ConnectionTrait>(
    db: &C,
    project_id: i32,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<(), DbErr> {
    project::Entity::update_many()
        .col_expr(project::Column::LastActivity, Expr::value(at))
        .filter(project::Column::Id.eq(project_id))
        .exec(db)
        .await?;
    Ok(())
}

async fn count_open_tickets(db: &DatabaseConnection, project_id: i32) -> Result<u64, AppError> {
    let open: Vec<common::TicketStatus> = common::TicketStatus::ALL
        .iter()
        .copied()
        .filter(|s| s.is_open())
        .collect();

    Ok(ticket::Entity::find()
        .filter(ticket::Column::ProjectId.eq(project_id))
        .filter(ticket::Column::Status.is_in(open))
        .count(db)
        .await?)
}

async fn find_milestone(
    db: &DatabaseConnection,
    project_id: i32,
    milestone_id: i32,
) -> Result<project_milestone::Model, AppError> {
    project_milestone::Entity::find_by_id(milestone_id)
        .filter(project_milestone::Column::ProjectId.eq(project_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Milestone {milestone_id} not found")))
}

async fn build_detail(
    state: &AppState,
    auth_user: &AuthUser,
    p: project::Model,
) -> Result<ProjectDetail, AppError> {
    let updates = project_update::Entity::find()
        .filter(project_update::Column::ProjectId.eq(p.id))
        .order_by_desc(project_update::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let tickets = ticket::Entity::find()
        .filter(ticket::Column::ProjectId.eq(p.id))
        .order_by_desc(ticket::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let mut ticket_rows = Vec::with_capacity(tickets.len());
    for t in tickets {
        let mut comments = ticket_comment::Entity::find()
            .filter(ticket_comment::Column::TicketId.eq(t.id));
        if !auth_user.is_staff {
            comments = comments.filter(ticket_comment::Column::IsInternal.eq(false));
        }
        let count = comments.count(&state.db).await?;
        ticket_rows.push(TicketSummary::from_model(t, count));
    }

    let files = project_file::Entity::find()
        .filter(project_file::Column::ProjectId.eq(p.id))
        .order_by_desc(project_file::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let files = files
        .into_iter()
        .filter(|f| auth_user.is_staff || !f.is_confidential)
        .map(FilePayload::from)
        .collect();

    let milestones = project_milestone::Entity::find()
        .filter(project_milestone::Column::ProjectId.eq(p.id))
        .order_by_asc(project_milestone::Column::Position)
        .all(&state.db)
        .await?;
    let today = Utc::now().date_naive();
    let milestones = milestones
        .into_iter()
        .map(|m| MilestonePayload::from_model(m, today))
        .collect();

    let open_tickets_count = count_open_tickets(&state.db, p.id).await?;

    Ok(ProjectDetail {
        id: p.id,
        client_id: p.client_id,
        title: p.title,
        slug: p.slug,
        description: p.description,
        status: p.status,
        priority: p.priority,
        progress_percentage: p.progress_percentage,
        start_date: p.start_date,
        estimated_completion: p.estimated_completion,
        actual_completion: p.actual_completion,
        deliverables: p.deliverables,
        staging_url: p.staging_url,
        production_url: p.production_url,
        repository_url: p.repository_url,
        open_tickets_count,
        updates: updates.into_iter().map(UpdatePayload::from).collect(),
        tickets: ticket_rows,
        files,
        milestones,
        last_activity: p.last_activity,
        created_at: p.created_at,
        updated_at: p.updated_at,
    })
}

async fn allocate_slug(db: &DatabaseConnection, base: &str) -> Result<String, AppError> {
    for candidate in slug::candidates(base).take(50) {
        let taken = project::Entity::find()
            .filter(project::Column::Slug.eq(&candidate))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
    }
    Err(AppError::Internal(format!(
        "No free slug found for base '{base}'"
    )))
}

use chrono::NaiveDate;
use common::{MilestoneStatus, Priority, ProjectStatus};
use serde::{Deserialize, Serialize};

use crate::entity::{project, project_milestone, project_update};
use crate::error::AppError;
use crate::models::file::FilePayload;
use crate::models::shared::{validate_progress, validate_title};
use crate::models::ticket::TicketSummary;

/// One row in the project list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectSummary {
    #[schema(example = 7)]
    pub id: i32,
    pub client_id: i32,
    #[schema(example = "Website Redesign")]
    pub title: String,
    #[schema(example = "website-redesign")]
    pub slug: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    #[schema(example = 60)]
    pub progress_percentage: i32,
    pub start_date: Option<NaiveDate>,
    pub estimated_completion: Option<NaiveDate>,
    /// Tickets on this project that are not resolved or closed.
    pub open_tickets_count: u64,
    pub files_count: u64,
    pub last_activity: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ProjectSummary {
    pub fn from_model(p: project::Model, open_tickets_count: u64, files_count: u64) -> Self {
        Self {
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
            open_tickets_count,
            files_count,
            last_activity: p.last_activity,
            created_at: p.created_at,
        }
    }
}

/// Full project payload with nested records.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProjectDetail {
    pub id: i32,
    pub client_id: i32,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress_percentage: i32,
    pub start_date: Option<NaiveDate>,
    pub estimated_completion: Option<NaiveDate>,
    pub actual_completion: Option<NaiveDate>,
    pub deliverables: String,
    pub staging_url: Option<String>,
    pub production_url: Option<String>,
    pub repository_url: Option<String>,
    pub open_tickets_count: u64,
    pub updates: Vec<UpdatePayload>,
    pub tickets: Vec<TicketSummary>,
    pub files: Vec<FilePayload>,
    pub milestones: Vec<MilestonePayload>,
    pub last_activity: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Request body for project creation.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProjectRequest {
    #[schema(example = "Website Redesign")]
    pub title: String,
    pub description: Option<String>,
    /// Staff may create on behalf of any client; non-staff must omit this
    /// or pass their own id.
    pub client_id: Option<i32>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub start_date: Option<NaiveDate>,
    pub estimated_completion: Option<NaiveDate>,
    pub deliverables: Option<String>,
    pub progress_percentage: Option<i32>,
    pub staging_url: Option<String>,
    pub production_url: Option<String>,
    pub repository_url: Option<String>,
}

pub fn validate_create_project(payload: &CreateProjectRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if let Some(progress) = payload.progress_percentage {
        validate_progress(progress)?;
    }
    Ok(())
}

/// Request body for partial project updates. Absent fields are untouched;
/// explicit `null` clears nullable fields.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress_percentage: Option<i32>,
    pub deliverables: Option<String>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub estimated_completion: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub actual_completion: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub staging_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub production_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub repository_url: Option<Option<String>>,
}

pub fn validate_update_project(payload: &UpdateProjectRequest) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(progress) = payload.progress_percentage {
        validate_progress(progress)?;
    }
    Ok(())
}

/// Request body for appending a project update.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUpdateRequest {
    #[schema(example = "Staging environment live")]
    pub title: String,
    pub description: String,
}

pub fn validate_create_update(payload: &CreateUpdateRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    Ok(())
}

/// A timeline entry on a project.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UpdatePayload {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: String,
    pub created_by: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<project_update::Model> for UpdatePayload {
    fn from(u: project_update::Model) -> Self {
        Self {
            id: u.id,
            project_id: u.project_id,
            title: u.title,
            description: u.description,
            created_by: u.created_by,
            created_at: u.created_at,
        }
    }
}

/// Request body for milestone creation.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMilestoneRequest {
    #[schema(example = "Design sign-off")]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<MilestoneStatus>,
    pub target_date: Option<NaiveDate>,
    pub position: Option<i32>,
}

pub fn validate_create_milestone(payload: &CreateMilestoneRequest) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if let Some(pos) = payload.position
        && pos < 0
    {
        return Err(AppError::Validation("Position must be >= 0".into()));
    }
    Ok(())
}

/// Request body for partial milestone updates.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateMilestoneRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<MilestoneStatus>,
    pub position: Option<i32>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub target_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "crate::models::shared::double_option")]
    pub completed_date: Option<Option<NaiveDate>>,
}

pub fn validate_update_milestone(payload: &UpdateMilestoneRequest) -> Result<(), AppError> {
    if let Some(title) = &payload.title {
        validate_title(title)?;
    }
    if let Some(pos) = payload.position
        && pos < 0
    {
        return Err(AppError::Validation("Position must be >= 0".into()));
    }
    Ok(())
}

/// A project milestone.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MilestonePayload {
    pub id: i32,
    pub project_id: i32,
    pub title: String,
    pub description: String,
    pub status: MilestoneStatus,
    pub target_date: Option<NaiveDate>,
    pub completed_date: Option<NaiveDate>,
    pub position: i32,
    /// Past its target date without being completed.
    pub is_overdue: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MilestonePayload {
    pub fn from_model(m: project_milestone::Model, today: NaiveDate) -> Self {
        let is_overdue = m.status != MilestoneStatus::Completed
            && m.target_date.is_some_and(|target| target < today);
        Self {
            id: m.id,
            project_id: m.project_id,
            title: m.title,
            description: m.description,
            status: m.status,
            target_date: m.target_date,
            completed_date: m.completed_date,
            position: m.position,
            is_overdue,
            created_at: m.created_at,
        }
    }
}

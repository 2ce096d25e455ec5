use serde::{Deserialize, Serialize};

use crate::entity::email_preferences;

/// The caller's notification toggles.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PreferencesPayload {
    pub project_updates: bool,
    pub ticket_comments: bool,
    pub ticket_status_changes: bool,
    pub new_files: bool,
    pub weekly_summary: bool,
}

impl From<email_preferences::Model> for PreferencesPayload {
    fn from(p: email_preferences::Model) -> Self {
        Self {
            project_updates: p.project_updates,
            ticket_comments: p.ticket_comments,
            ticket_status_changes: p.ticket_status_changes,
            new_files: p.new_files,
            weekly_summary: p.weekly_summary,
        }
    }
}

/// Partial toggle update; absent fields keep their value.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdatePreferencesRequest {
    pub project_updates: Option<bool>,
    pub ticket_comments: Option<bool>,
    pub ticket_status_changes: Option<bool>,
    pub new_files: Option<bool>,
    pub weekly_summary: Option<bool>,
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user notification toggles. A row is materialized lazily on first
/// read; until then every toggle behaves as its default.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "email_preferences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: HasOne<super::user::Entity>,

    pub project_updates: bool,
    pub ticket_comments: bool,
    pub ticket_status_changes: bool,
    pub new_files: bool,
    /// Off by default; the digest is opt-in.
    pub weekly_summary: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

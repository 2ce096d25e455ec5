use common::{Priority, ProjectStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning client.
    pub client_id: i32,
    #[sea_orm(belongs_to, from = "client_id", to = "id")]
    pub client: HasOne<super::user::Entity>,

    pub title: String,
    /// Derived from the title at creation, disambiguated with `-1`, `-2`, …
    /// suffixes. Immutable once set; the unique constraint is the final
    /// arbiter under concurrent creates.
    #[sea_orm(unique)]
    pub slug: String,
    pub description: String,

    pub status: ProjectStatus,
    pub priority: Priority,

    pub start_date: Option<Date>,
    pub estimated_completion: Option<Date>,
    pub actual_completion: Option<Date>,

    pub deliverables: String,
    /// 0-100.
    pub progress_percentage: i32,

    pub staging_url: Option<String>,
    pub production_url: Option<String>,
    pub repository_url: Option<String>,

    #[sea_orm(has_many)]
    pub updates: HasMany<super::project_update::Entity>,

    #[sea_orm(has_many)]
    pub tickets: HasMany<super::ticket::Entity>,

    #[sea_orm(has_many)]
    pub files: HasMany<super::project_file::Entity>,

    #[sea_orm(has_many)]
    pub milestones: HasMany<super::project_milestone::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Bumped whenever a related record (update, ticket, file) is written.
    pub last_activity: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

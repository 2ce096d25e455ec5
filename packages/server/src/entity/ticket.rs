use common::{Priority, TicketStatus, TicketType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// NULL for tickets not tied to a project.
    pub project_id: Option<i32>,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: Option<super::project::Entity>,

    /// The reporting client.
    pub created_by: i32,
    pub assigned_to: Option<i32>,

    pub title: String,
    pub description: String,

    pub ticket_type: TicketType,
    pub status: TicketStatus,
    pub priority: Priority,

    #[sea_orm(has_many)]
    pub comments: HasMany<super::ticket_comment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Stamped on the first transition into `resolved`; kept as a
    /// historical marker if the ticket is later reopened.
    pub resolved_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub ticket_id: i32,
    #[sea_orm(belongs_to, from = "ticket_id", to = "id")]
    pub ticket: HasOne<super::ticket::Entity>,

    pub user_id: i32,

    pub comment: String,
    /// Internal notes are stored on the thread but hidden from non-staff.
    pub is_internal: bool,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

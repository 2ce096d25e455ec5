use common::FileCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// File metadata row. The bytes themselves live in the content-addressed
/// blob store under `content_hash`.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project_file")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub project_id: i32,
    #[sea_orm(belongs_to, from = "project_id", to = "id")]
    pub project: HasOne<super::project::Entity>,

    /// Display name shown in the portal, defaulting to the upload's
    /// file name.
    pub name: String,
    pub description: String,
    pub category: FileCategory,

    /// Hex SHA-256 digest keying the blob store. Two rows may share a
    /// hash; blob deletion only happens when no row references it.
    pub content_hash: String,
    pub file_name: String,
    /// NULL when the size was never recorded.
    pub file_size: Option<i64>,

    /// Confidential files are served to staff only.
    pub is_confidential: bool,

    pub uploaded_by: Option<i32>,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

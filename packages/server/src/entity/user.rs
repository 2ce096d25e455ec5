use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    /// Argon2 hash, never the plaintext.
    pub password: String,

    pub first_name: String,
    pub last_name: String,

    /// Staff accounts see and mutate every portal record.
    pub is_staff: bool,

    #[sea_orm(has_one)]
    pub profile: HasOne<super::client_profile::Entity>,

    #[sea_orm(has_many)]
    pub projects: HasMany<super::project::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

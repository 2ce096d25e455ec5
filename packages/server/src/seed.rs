use chrono::Utc;
use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AuthConfig;
use crate::entity::{project_file, ticket, user};
use crate::utils::password;

/// Create the bootstrap admin account when configured and not yet present.
pub async fn ensure_admin(db: &DatabaseConnection, auth: &AuthConfig) -> Result<(), DbErr> {
    let (Some(username), Some(pass)) = (&auth.admin_username, &auth.admin_password) else {
        return Ok(());
    };

    let exists = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }

    let hash = password::hash_password(pass)
        .map_err(|e| DbErr::Custom(format!("Admin password hash error: {e}")))?;

    let model = user::ActiveModel {
        username: Set(username.clone()),
        email: Set(auth.admin_email.clone().unwrap_or_default()),
        password: Set(hash),
        first_name: Set(String::new()),
        last_name: Set(String::new()),
        is_staff: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!("Seeded admin account '{username}'"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Ticket listing and dashboard queries:
    // SELECT ... FROM ticket WHERE created_by = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_ticket_created_by_created")
        .table(ticket::Entity)
        .col(ticket::Column::CreatedBy)
        .col(ticket::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_ticket_created_by_created exists"),
        Err(e) => {
            tracing::warn!("Failed to create index idx_ticket_created_by_created: {}", e);
        }
    }

    // Blob refcount check before deleting stored content:
    // SELECT COUNT(*) FROM project_file WHERE content_hash = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_project_file_content_hash")
        .table(project_file::Entity)
        .col(project_file::Column::ContentHash)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_project_file_content_hash exists"),
        Err(e) => {
            tracing::warn!("Failed to create index idx_project_file_content_hash: {}", e);
        }
    }

    Ok(())
}

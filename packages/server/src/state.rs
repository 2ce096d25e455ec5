use std::sync::Arc;

use common::mailer::Mailer;
use common::storage::BlobStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::ratelimit::LoginRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub blob_store: Arc<dyn BlobStore>,
    pub mailer: Arc<dyn Mailer>,
    pub login_limiter: Arc<LoginRateLimiter>,
}

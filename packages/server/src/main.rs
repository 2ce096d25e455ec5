use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use common::mailer::LogMailer;
use common::storage::FilesystemBlobStore;
use tracing::info;

use server::config::AppConfig;
use server::database::init_db;
use server::ratelimit::LoginRateLimiter;
use server::seed;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let config = AppConfig::load()?;

    let db = init_db(&config.database.url).await?;
    seed::ensure_admin(&db, &config.auth).await?;
    seed::ensure_indexes(&db).await?;

    let blob_store = FilesystemBlobStore::new(
        PathBuf::from(&config.storage.files_dir),
        config.storage.max_file_size,
    )
    .await?;

    let state = AppState {
        db,
        blob_store: Arc::new(blob_store),
        mailer: Arc::new(LogMailer),
        login_limiter: Arc::new(LoginRateLimiter::new(
            config.auth.login_max_attempts,
            Duration::from_secs(config.auth.login_window_secs),
        )),
        config: Arc::new(config),
    };

    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, server::build_router(state)).await?;

    Ok(())
}

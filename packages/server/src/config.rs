use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub files_dir: String,
    /// Upload size cap in bytes.
    pub max_file_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// Display name used in subjects and bodies.
    pub site_name: String,
    pub site_url: String,
    pub from_address: String,
    /// Mailbox that receives new-ticket alerts.
    pub admin_address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Failed-login attempts allowed per account within the window.
    pub login_max_attempts: u32,
    pub login_window_secs: u64,
    /// Optional bootstrap admin, created at startup if the username is free.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub admin_email: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub email: EmailConfig,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("storage.files_dir", "./data/files")?
            .set_default("storage.max_file_size", 50 * 1024 * 1024)?
            .set_default("email.site_name", "Client Portal")?
            .set_default("email.site_url", "http://localhost:3000")?
            .set_default("email.from_address", "noreply@localhost")?
            .set_default("email.admin_address", "admin@localhost")?
            .set_default("auth.login_max_attempts", 5)?
            .set_default("auth.login_window_secs", 300)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., PORTAL__DATABASE__URL)
            .add_source(Environment::with_prefix("PORTAL").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Connection pool ceiling; tune per deployment size.
    pub db_max_connections: u32,
    pub openai_api_key: String,
    /// Directory where uploaded resume files are stored.
    pub resume_dir: String,
    /// Optional HTTP mail relay. When unset, notifications are dropped with a log line.
    pub mail_webhook_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse::<u32>()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            resume_dir: std::env::var("RESUME_UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads/resumes".to_string()),
            mail_webhook_url: std::env::var("MAIL_WEBHOOK_URL").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

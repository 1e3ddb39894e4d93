mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod llm_client;
mod models;
mod notify;
mod resume;
mod routes;
mod schedule;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::context_store::ResumeContextStore;
use crate::interview::store::{InterviewStore, PgInterviewStore};
use crate::interview::timeout::{spawn_schedule_sweep, SCHEDULE_SWEEP_INTERVAL_SECS};
use crate::llm_client::OpenAiClient;
use crate::notify::{NoopMailer, Notifier, WebhookMailer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config).await?;
    let store: Arc<dyn InterviewStore> = Arc::new(PgInterviewStore::new(db.clone()));

    // Initialize reasoning engine client
    let engine = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    info!("Engine client initialized (model: {})", llm_client::MODEL);

    // Initialize mail delivery
    let notifier: Arc<dyn Notifier> = match &config.mail_webhook_url {
        Some(url) => Arc::new(WebhookMailer::new(url.clone())),
        None => Arc::new(NoopMailer),
    };

    // In-flight session context is not durable: any session that was active
    // before a restart has lost its resume context and will surface a
    // Conflict on the next answer.
    let resume_contexts = Arc::new(ResumeContextStore::new());

    // Background sweep for past-due scheduled interviews
    spawn_schedule_sweep(db.clone(), SCHEDULE_SWEEP_INTERVAL_SECS);

    // Build app state
    let state = AppState {
        db,
        store,
        engine,
        resume_contexts,
        notifier,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

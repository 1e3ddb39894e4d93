use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::interview::context_store::ResumeContextStore;
use crate::interview::store::InterviewStore;
use crate::llm_client::ReasoningEngine;
use crate::notify::Notifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Session-lifecycle persistence behind a trait, same seam as the engine.
    pub store: Arc<dyn InterviewStore>,
    /// Reasoning engine behind a trait so tests can inject deterministic fakes.
    pub engine: Arc<dyn ReasoningEngine>,
    /// Transient per-session interview context, retired at session end.
    pub resume_contexts: Arc<ResumeContextStore>,
    /// Fire-and-forget mail delivery.
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
}

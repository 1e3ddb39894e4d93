//! Resume Context Store — transient per-session interview context.
//!
//! Keyed by session id and retired when the session ends, so nothing leaks
//! across sequential sessions of the same user. The lock guards pure map
//! access only; it is never held across an engine call or any other await
//! point (entries are handed out as `Arc` clones).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Everything the question generator needs for one session, captured once
/// at session start so the resume is not re-extracted every turn.
#[derive(Debug)]
pub struct ResumeContext {
    pub resume_text: String,
    pub job_title: String,
    pub job_description: String,
}

/// Process-wide map of active session contexts.
#[derive(Default)]
pub struct ResumeContextStore {
    entries: Mutex<HashMap<Uuid, Arc<ResumeContext>>>,
}

impl ResumeContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the context for a newly started session.
    pub fn insert(&self, session_id: Uuid, context: ResumeContext) -> Arc<ResumeContext> {
        let context = Arc::new(context);
        self.entries
            .lock()
            .expect("resume context lock poisoned")
            .insert(session_id, context.clone());
        context
    }

    pub fn get(&self, session_id: Uuid) -> Option<Arc<ResumeContext>> {
        self.entries
            .lock()
            .expect("resume context lock poisoned")
            .get(&session_id)
            .cloned()
    }

    /// Retires the context when its session ends. Idempotent.
    pub fn remove(&self, session_id: Uuid) {
        self.entries
            .lock()
            .expect("resume context lock poisoned")
            .remove(&session_id);
    }
}

//! Timeout Sweeper — background expiry of stale sessions and past-due
//! scheduled interviews.
//!
//! A session's deadline is absolute: `start_time + 30 minutes`, regardless
//! of activity. Expiry goes through the same conditional UPDATE as every
//! other session end, so racing with an in-flight turn is safe — whichever
//! side flips `is_active` first wins and the other becomes a no-op.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::interview::context_store::ResumeContextStore;
use crate::interview::session::close_session;
use crate::interview::store::InterviewStore;

/// Fixed wall-clock session lifetime, measured from start_time.
pub const SESSION_TIMEOUT_MINUTES: i64 = 30;

/// How often past-due scheduled interviews are swept.
pub const SCHEDULE_SWEEP_INTERVAL_SECS: u64 = 300;

/// The instant at which a session started at `start_time` expires.
pub fn session_deadline(start_time: DateTime<Utc>) -> DateTime<Utc> {
    start_time + Duration::minutes(SESSION_TIMEOUT_MINUTES)
}

/// Schedules one expiry watch for a newly started session.
pub fn spawn_session_watch(
    store: Arc<dyn InterviewStore>,
    contexts: Arc<ResumeContextStore>,
    session_id: Uuid,
    start_time: DateTime<Utc>,
) {
    tokio::spawn(async move {
        let remaining = (session_deadline(start_time) - Utc::now())
            .to_std()
            .unwrap_or_default();
        tokio::time::sleep(remaining).await;

        match close_session(store.as_ref(), &contexts, session_id).await {
            Ok(Some(_)) => info!("Session {session_id} timed out and has been ended"),
            Ok(None) => debug!("Session {session_id} already ended before its deadline"),
            Err(e) => error!("Failed to expire session {session_id}: {e}"),
        }
    });
}

/// Spawns the periodic sweep that completes past-due scheduled interviews.
pub fn spawn_schedule_sweep(db: PgPool, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        info!("Scheduled-interview sweep started ({interval_secs}s interval)");

        loop {
            ticker.tick().await;
            match sweep_past_due(&db).await {
                Ok(0) => {}
                Ok(n) => info!("Marked {n} past-due scheduled interviews as completed"),
                Err(e) => error!("Scheduled-interview sweep failed: {e}"),
            }
        }
    });
}

/// Completes every scheduled interview whose date and time have passed.
async fn sweep_past_due(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE scheduled_interviews
        SET is_completed = TRUE
        WHERE is_completed = FALSE
          AND (interview_date + interview_time) <= NOW()
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

//! Persistence seam for the session lifecycle.
//!
//! The Session Manager drives every lifecycle query through this trait so
//! the state machine can be exercised with an in-memory store in tests,
//! the same way `ReasoningEngine` lets tests script the engine. The
//! production implementation wraps `PgPool`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::interview::{QnaRow, SessionRow};
use crate::models::resume::ResumeUploadRow;

#[async_trait]
pub trait InterviewStore: Send + Sync {
    async fn active_session(&self, user_id: Uuid) -> Result<Option<SessionRow>, sqlx::Error>;

    async fn session_for_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SessionRow>, sqlx::Error>;

    async fn is_session_active(&self, session_id: Uuid) -> Result<bool, sqlx::Error>;

    async fn create_session(&self, user_id: Uuid) -> Result<SessionRow, sqlx::Error>;

    /// Conditionally ends a session. Returns the end_time when this call
    /// did the ending, `None` when the session was already inactive. The
    /// update must be atomic so end_time is set exactly once no matter how
    /// the sweeper and request handlers race.
    async fn mark_session_ended(
        &self,
        session_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error>;

    async fn latest_resume_upload(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ResumeUploadRow>, sqlx::Error>;

    async fn find_turn(
        &self,
        qna_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<QnaRow>, sqlx::Error>;

    /// Closes a turn: answer, score and optional model answer land in one
    /// atomic update.
    async fn record_answer(
        &self,
        qna_id: Uuid,
        answer: &str,
        score: i16,
        generated_answer: Option<&str>,
    ) -> Result<(), sqlx::Error>;

    /// Number of turns recorded so far; the next turn ordinal is count + 1.
    async fn turn_count(&self, session_id: Uuid) -> Result<i64, sqlx::Error>;

    /// Opens a new turn: question issued, answer fields null.
    async fn insert_open_turn(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        question: &str,
    ) -> Result<QnaRow, sqlx::Error>;
}

/// PostgreSQL-backed store used in production.
pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn active_session(&self, user_id: Uuid) -> Result<Option<SessionRow>, sqlx::Error> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT * FROM sessions WHERE user_id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn session_for_user(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn is_session_active(&self, session_id: Uuid) -> Result<bool, sqlx::Error> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM sessions WHERE id = $1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(active.unwrap_or(false))
    }

    async fn create_session(&self, user_id: Uuid) -> Result<SessionRow, sqlx::Error> {
        sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, is_active, start_time)
            VALUES ($1, $2, TRUE, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
    }

    async fn mark_session_ended(
        &self,
        session_id: Uuid,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            UPDATE sessions
            SET is_active = FALSE, end_time = NOW()
            WHERE id = $1 AND is_active = TRUE
            RETURNING end_time
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn latest_resume_upload(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ResumeUploadRow>, sqlx::Error> {
        sqlx::query_as::<_, ResumeUploadRow>(
            "SELECT * FROM resume_uploads WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_turn(
        &self,
        qna_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<QnaRow>, sqlx::Error> {
        sqlx::query_as::<_, QnaRow>("SELECT * FROM qna WHERE id = $1 AND session_id = $2")
            .bind(qna_id)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn record_answer(
        &self,
        qna_id: Uuid,
        answer: &str,
        score: i16,
        generated_answer: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE qna
            SET answer_given = $1, score = $2, generated_answer = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(answer)
        .bind(score)
        .bind(generated_answer)
        .bind(qna_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn turn_count(&self, session_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM qna WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
    }

    async fn insert_open_turn(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        question: &str,
    ) -> Result<QnaRow, sqlx::Error> {
        sqlx::query_as::<_, QnaRow>(
            r#"
            INSERT INTO qna (id, user_id, session_id, question_asked)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(session_id)
        .bind(question)
        .fetch_one(&self.pool)
        .await
    }
}

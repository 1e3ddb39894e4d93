use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One continuous interview attempt. At most one row per user may have
/// `is_active = true` at any instant; a session is ended exactly once
/// (is_active flipped, end_time set) and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_active: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// One question/answer/score turn. Created with the answer fields null when
/// the question is issued; answered exactly once, atomically. Creation order
/// within a session defines the turn sequence.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QnaRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub question_asked: String,
    pub answer_given: Option<String>,
    pub score: Option<i16>,
    pub generated_answer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A scheduled interview slot. Flipped to completed by confirmation or by
/// the periodic sweep once the scheduled moment has passed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduledInterviewRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub interview_date: NaiveDate,
    pub interview_time: NaiveTime,
    pub is_completed: bool,
}

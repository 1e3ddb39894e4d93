use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered candidate. `job_title` / `job_description` describe the role
/// the candidate is interviewing for and seed question generation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub job_title: Option<String>,
    pub job_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

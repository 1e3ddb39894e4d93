//! Axum route handlers for interview scheduling.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::interview::ScheduledInterviewRow;
use crate::notify::Notifier;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleInterviewRequest {
    pub candidate_name: String,
    pub candidate_email: String,
    pub interview_date: NaiveDate,
    pub interview_time: NaiveTime,
}

/// POST /api/v1/schedule
///
/// Books an interview slot and sends the candidate an invite. The invite is
/// fire-and-forget; scheduling succeeds even if mail delivery does not.
pub async fn handle_schedule_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<ScheduleInterviewRequest>,
) -> Result<Json<ScheduledInterviewRow>, AppError> {
    if request.candidate_name.trim().is_empty() {
        return Err(AppError::Validation(
            "candidate_name cannot be empty".to_string(),
        ));
    }
    if !request.candidate_email.contains('@') {
        return Err(AppError::Validation(
            "candidate_email is not a valid address".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, ScheduledInterviewRow>(
        r#"
        INSERT INTO scheduled_interviews
            (id, user_id, candidate_name, candidate_email, interview_date, interview_time)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(request.candidate_name.trim())
    .bind(request.candidate_email.trim())
    .bind(request.interview_date)
    .bind(request.interview_time)
    .fetch_one(&state.db)
    .await?;

    let body = format!(
        "Hi {},\n\nYour interview is scheduled for {} at {}.\n\nGood luck!",
        row.candidate_name, row.interview_date, row.interview_time
    );
    state
        .notifier
        .send(&row.candidate_email, "Interview scheduled", &body, false)
        .await;

    info!("Scheduled interview {} for user {}", row.id, user.id);

    Ok(Json(row))
}

/// GET /api/v1/schedule
pub async fn handle_list_scheduled(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ScheduledInterviewRow>>, AppError> {
    let rows = sqlx::query_as::<_, ScheduledInterviewRow>(
        "SELECT * FROM scheduled_interviews WHERE user_id = $1 \
         ORDER BY interview_date, interview_time",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// POST /api/v1/schedule/:id/complete
///
/// Confirms an interview took place. Conflict when already completed
/// (by a previous confirmation or the sweep).
pub async fn handle_complete_scheduled(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ScheduledInterviewRow>, AppError> {
    let existing = sqlx::query_as::<_, ScheduledInterviewRow>(
        "SELECT * FROM scheduled_interviews WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Scheduled interview not found".to_string()))?;

    if existing.is_completed {
        return Err(AppError::Conflict(
            "Interview is already marked completed".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, ScheduledInterviewRow>(
        r#"
        UPDATE scheduled_interviews
        SET is_completed = TRUE
        WHERE id = $1 AND is_completed = FALSE
        RETURNING *
        "#,
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::Conflict("Interview is already marked completed".to_string()))?;

    Ok(Json(row))
}

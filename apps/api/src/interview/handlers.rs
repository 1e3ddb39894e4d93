//! Axum route handlers for the interview API.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::interview::report::{compile_report, InterviewReport};
use crate::interview::session::{
    end_session, start_session, submit_answer, EndSessionResponse, StartSessionResponse,
    SubmitAnswerResponse,
};
use crate::models::interview::QnaRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    pub qna_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct EndInterviewRequest {
    pub session_id: Uuid,
}

/// POST /api/v1/interview/start
///
/// Opens a session from the caller's latest resume and returns the
/// icebreaker question.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<StartSessionResponse>, AppError> {
    Ok(Json(
        start_session(
            &state.store,
            state.engine.as_ref(),
            &state.resume_contexts,
            &user,
        )
        .await?,
    ))
}

/// POST /api/v1/interview/answer
///
/// Scores the submitted answer and returns the next question, or reports
/// that the session ended.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    Ok(Json(
        submit_answer(
            state.store.as_ref(),
            state.engine.as_ref(),
            &state.resume_contexts,
            &user,
            request.qna_id,
            request.answer.trim(),
        )
        .await?,
    ))
}

/// POST /api/v1/interview/end
pub async fn handle_end_interview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(request): Json<EndInterviewRequest>,
) -> Result<Json<EndSessionResponse>, AppError> {
    Ok(Json(
        end_session(
            state.store.as_ref(),
            &state.resume_contexts,
            &user,
            request.session_id,
        )
        .await?,
    ))
}

/// GET /api/v1/interview/report/:session_id
pub async fn handle_interview_report(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewReport>, AppError> {
    Ok(Json(compile_report(&state, &user, session_id).await?))
}

/// GET /api/v1/interview/history
///
/// All of the caller's past turns, newest first.
pub async fn handle_qna_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<QnaRow>>, AppError> {
    let records = sqlx::query_as::<_, QnaRow>(
        "SELECT * FROM qna WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(records))
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers as interview;
use crate::resume::handlers as resumes;
use crate::schedule::handlers as schedule;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume upload
        .route("/api/v1/resumes", post(resumes::handle_upload_resume))
        // Interview session loop
        .route(
            "/api/v1/interview/start",
            post(interview::handle_start_interview),
        )
        .route(
            "/api/v1/interview/answer",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interview/end",
            post(interview::handle_end_interview),
        )
        .route(
            "/api/v1/interview/report/:session_id",
            get(interview::handle_interview_report),
        )
        .route(
            "/api/v1/interview/history",
            get(interview::handle_qna_history),
        )
        // Scheduling
        .route(
            "/api/v1/schedule",
            post(schedule::handle_schedule_interview).get(schedule::handle_list_scheduled),
        )
        .route(
            "/api/v1/schedule/:id/complete",
            post(schedule::handle_complete_scheduled),
        )
        .with_state(state)
}

//! Report Compiler — aggregates a session's turns into a scored report.
//!
//! The arithmetic is a pure function over the QnA rows; only the optional
//! study-suggestion paragraph touches the engine, and that call degrades to
//! a fixed sentence instead of failing the report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::prompts::{
    SUGGESTIONS_MAX_TOKENS, SUGGESTIONS_SYSTEM, SUGGESTIONS_TEMPERATURE,
};
use crate::interview::scoring::IMPROVEMENT_THRESHOLD;
use crate::llm_client::ReasoningEngine;
use crate::models::interview::{QnaRow, SessionRow};
use crate::models::user::User;
use crate::state::AppState;

const NO_SUGGESTIONS_NEEDED: &str =
    "No specific study suggestions needed; all answers were rated sufficiently.";
const SUGGESTIONS_FALLBACK: &str = "Unable to fetch study suggestions due to an internal issue.";

#[derive(Debug, Serialize)]
pub struct SessionDetails {
    pub session_id: Uuid,
    pub user_email: String,
    pub start_time: DateTime<Utc>,
    /// None while the session is still in progress.
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct PerformanceSummary {
    pub total_questions: i64,
    pub total_score: i64,
    pub max_possible_score: i64,
}

#[derive(Debug, Serialize)]
pub struct ImprovementArea {
    pub question: String,
    pub answer_given: Option<String>,
    pub suggested_answer: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InterviewReport {
    pub session: SessionDetails,
    pub summary: PerformanceSummary,
    pub improvement_areas: Vec<ImprovementArea>,
    pub study_suggestions: String,
}

/// Compiles the report for a caller-owned session.
pub async fn compile_report(
    state: &AppState,
    user: &User,
    session_id: Uuid,
) -> Result<InterviewReport, AppError> {
    let session =
        sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

    let records = sqlx::query_as::<_, QnaRow>(
        "SELECT * FROM qna WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session.id)
    .fetch_all(&state.db)
    .await?;

    if records.is_empty() {
        return Err(AppError::NotFound(
            "No interview turns recorded for this session".to_string(),
        ));
    }

    let (summary, improvement_areas) = summarize(&records);

    let study_suggestions = if improvement_areas.is_empty() {
        NO_SUGGESTIONS_NEEDED.to_string()
    } else {
        let prompt = build_suggestions_prompt(&improvement_areas);
        match state
            .engine
            .complete(
                SUGGESTIONS_SYSTEM,
                &prompt,
                SUGGESTIONS_MAX_TOKENS,
                SUGGESTIONS_TEMPERATURE,
            )
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!("Study-suggestion call failed for session {session_id}: {e}");
                SUGGESTIONS_FALLBACK.to_string()
            }
        }
    };

    Ok(InterviewReport {
        session: SessionDetails {
            session_id: session.id,
            user_email: user.email.clone(),
            start_time: session.start_time,
            end_time: session.end_time,
        },
        summary,
        improvement_areas,
        study_suggestions,
    })
}

/// Pure aggregation over a session's turns.
///
/// total_score sums only answered turns; improvement areas are exactly the
/// turns scored below the improvement threshold.
pub fn summarize(records: &[QnaRow]) -> (PerformanceSummary, Vec<ImprovementArea>) {
    let total_questions = records.len() as i64;
    let total_score: i64 = records
        .iter()
        .filter_map(|r| r.score)
        .map(|s| s as i64)
        .sum();

    let improvement_areas = records
        .iter()
        .filter(|r| matches!(r.score, Some(s) if s < IMPROVEMENT_THRESHOLD))
        .map(|r| ImprovementArea {
            question: r.question_asked.clone(),
            answer_given: r.answer_given.clone(),
            suggested_answer: r.generated_answer.clone(),
        })
        .collect();

    (
        PerformanceSummary {
            total_questions,
            total_score,
            max_possible_score: total_questions * 5,
        },
        improvement_areas,
    )
}

/// Seeds the study-suggestion request with the weakly answered questions.
fn build_suggestions_prompt(areas: &[ImprovementArea]) -> String {
    let mut prompt =
        String::from("Provide detailed study suggestions based on the following interview topics:\n");
    for area in areas {
        prompt.push_str("- ");
        prompt.push_str(&area.question);
        prompt.push('\n');
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(question: &str, score: Option<i16>) -> QnaRow {
        QnaRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            question_asked: question.to_string(),
            answer_given: score.map(|_| "an answer".to_string()),
            score,
            generated_answer: score.filter(|s| *s < IMPROVEMENT_THRESHOLD).map(|_| {
                "A stronger answer would mention concrete outcomes.".to_string()
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn totals_sum_only_answered_turns() {
        let records = vec![
            turn("Q1", Some(4)),
            turn("Q2", Some(2)),
            turn("Q3", None), // open turn, never answered
        ];

        let (summary, _) = summarize(&records);
        assert_eq!(summary.total_questions, 3);
        assert_eq!(summary.total_score, 6);
        assert_eq!(summary.max_possible_score, 15);
    }

    #[test]
    fn total_score_never_exceeds_maximum() {
        let records = vec![turn("Q1", Some(5)), turn("Q2", Some(5))];
        let (summary, _) = summarize(&records);
        assert!(summary.total_score <= summary.max_possible_score);
    }

    #[test]
    fn improvement_areas_are_exactly_the_weak_turns() {
        let records = vec![
            turn("Strong question", Some(4)),
            turn("Weak question", Some(2)),
            turn("Borderline question", Some(3)),
            turn("Unanswered question", None),
        ];

        let (_, areas) = summarize(&records);
        assert_eq!(areas.len(), 1);
        assert_eq!(areas[0].question, "Weak question");
        assert!(areas[0].suggested_answer.is_some());
    }

    #[test]
    fn empty_scores_produce_zero_totals() {
        let records = vec![turn("Q1", None)];
        let (summary, areas) = summarize(&records);
        assert_eq!(summary.total_score, 0);
        assert!(areas.is_empty());
    }

    #[test]
    fn suggestions_prompt_lists_weak_questions() {
        let areas = vec![
            ImprovementArea {
                question: "Question 2: Explain your testing approach".to_string(),
                answer_given: Some("we test".to_string()),
                suggested_answer: None,
            },
            ImprovementArea {
                question: "Question 4: Describe a production incident".to_string(),
                answer_given: None,
                suggested_answer: None,
            },
        ];

        let prompt = build_suggestions_prompt(&areas);
        assert!(prompt.contains("- Question 2: Explain your testing approach"));
        assert!(prompt.contains("- Question 4: Describe a production incident"));
    }
}

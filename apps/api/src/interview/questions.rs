//! Question Generator — builds the next prompt from the session context and
//! asks the reasoning engine for a single conversational question.
//!
//! No local fallback question exists: an engine failure propagates as
//! `AppError::Engine` and the caller decides what the turn outcome is.

use crate::errors::AppError;
use crate::interview::context_store::ResumeContext;
use crate::interview::phase::TurnPhase;
use crate::interview::prompts::{INTERVIEWER_SYSTEM, QUESTION_MAX_TOKENS, QUESTION_TEMPERATURE};
use crate::llm_client::ReasoningEngine;

/// Generates the question for the given 1-based turn ordinal.
///
/// The result carries its turn number: `Question N: …`.
pub async fn generate_question(
    engine: &dyn ReasoningEngine,
    context: &ResumeContext,
    turn: i64,
    previous_answer: Option<&str>,
) -> Result<String, AppError> {
    let prompt = build_question_prompt(context, turn, previous_answer);

    let question = engine
        .complete(
            INTERVIEWER_SYSTEM,
            &prompt,
            QUESTION_MAX_TOKENS,
            QUESTION_TEMPERATURE,
        )
        .await
        .map_err(|e| AppError::Engine(format!("Question generation failed: {e}")))?;

    Ok(format!("Question {turn}: {}", question.trim()))
}

/// Deterministic prompt template: context, resume text, optional follow-up
/// hook, then the phase instruction.
fn build_question_prompt(
    context: &ResumeContext,
    turn: i64,
    previous_answer: Option<&str>,
) -> String {
    let phase = TurnPhase::for_turn(turn);
    let instruction = phase.instruction(&context.job_title, &context.job_description);

    let mut prompt = format!(
        "Generate a concise and conversational interview question.\n\
         Context: job title ({}) and job description ({}).\n\
         Resume content:\n{}\n",
        context.job_title, context.job_description, context.resume_text
    );

    if let Some(answer) = previous_answer {
        prompt.push_str(&format!(
            "Follow up naturally on the candidate's previous answer: {answer}\n"
        ));
    }

    prompt.push_str(&instruction);
    prompt
}

//! Answer Scorer & Improver.
//!
//! HARD CONTRACT: neither scoring nor improvement ever fails the turn.
//! An unusable or missing engine response scores the fixed default of 3;
//! an improvement failure yields a fixed apology string. The anomaly is
//! logged for observability and the interview flow continues.

use tracing::warn;

use crate::interview::prompts::{
    ASSISTANT_SYSTEM, IMPROVE_FALLBACK, IMPROVE_MAX_TOKENS, IMPROVE_PROMPT_TEMPLATE,
    IMPROVE_TEMPERATURE, SCORE_MAX_TOKENS, SCORE_PROMPT_TEMPLATE, SCORE_TEMPERATURE,
};
use crate::llm_client::ReasoningEngine;

/// Score applied when the engine response cannot be used.
pub const DEFAULT_SCORE: i16 = 3;

/// Answers scoring below this get a model answer generated.
pub const IMPROVEMENT_THRESHOLD: i16 = 3;

/// Rates a free-text answer 1-5. Infallible by design.
pub async fn score_answer(engine: &dyn ReasoningEngine, answer: &str) -> i16 {
    let prompt = SCORE_PROMPT_TEMPLATE.replace("{answer}", answer);

    match engine
        .complete(ASSISTANT_SYSTEM, &prompt, SCORE_MAX_TOKENS, SCORE_TEMPERATURE)
        .await
    {
        Ok(raw) => parse_score(&raw).unwrap_or_else(|| {
            warn!("Unusable score {raw:?} from engine; falling back to {DEFAULT_SCORE}");
            DEFAULT_SCORE
        }),
        Err(e) => {
            warn!("Scoring call failed ({e}); falling back to {DEFAULT_SCORE}");
            DEFAULT_SCORE
        }
    }
}

/// Produces a concise model answer for a weakly answered question.
/// Infallible by design — engine failure yields a fixed apology.
pub async fn improve_answer(engine: &dyn ReasoningEngine, question: &str) -> String {
    let prompt = IMPROVE_PROMPT_TEMPLATE.replace("{question}", question);

    match engine
        .complete(
            ASSISTANT_SYSTEM,
            &prompt,
            IMPROVE_MAX_TOKENS,
            IMPROVE_TEMPERATURE,
        )
        .await
    {
        Ok(answer) => answer.trim().to_string(),
        Err(e) => {
            warn!("Answer improvement failed ({e}); returning fallback text");
            IMPROVE_FALLBACK.to_string()
        }
    }
}

/// Strict integer parse of the engine's rating output.
/// Accepts surrounding whitespace and a trailing period; anything else,
/// or a value outside [1, 5], is rejected.
fn parse_score(raw: &str) -> Option<i16> {
    let token = raw.trim().split_whitespace().next()?;
    let token = token.trim_end_matches(['.', ',']);
    let value: i64 = token.parse().ok()?;
    (1..=5).contains(&value).then_some(value as i16)
}

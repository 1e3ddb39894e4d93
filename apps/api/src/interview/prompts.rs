// All engine prompt constants and sampling budgets for the interview module.
// Question generation stays short and conversational; scoring gets a tiny
// output budget because only a single digit is expected back.

/// System prompt for question generation.
pub const INTERVIEWER_SYSTEM: &str =
    "You are an expert interviewer conducting a friendly and engaging interview.";

/// System prompt for scoring and answer improvement.
pub const ASSISTANT_SYSTEM: &str = "You are a helpful assistant.";

/// System prompt for the report's study-suggestion paragraph.
pub const SUGGESTIONS_SYSTEM: &str = "You are an expert assistant providing study suggestions.";

pub const QUESTION_MAX_TOKENS: u32 = 80;
pub const QUESTION_TEMPERATURE: f32 = 0.8;

pub const SCORE_MAX_TOKENS: u32 = 10;
pub const SCORE_TEMPERATURE: f32 = 0.3;

pub const IMPROVE_MAX_TOKENS: u32 = 120;
pub const IMPROVE_TEMPERATURE: f32 = 0.5;

pub const SUGGESTIONS_MAX_TOKENS: u32 = 200;
pub const SUGGESTIONS_TEMPERATURE: f32 = 0.7;

/// Rating instruction. Replace `{answer}` before sending.
pub const SCORE_PROMPT_TEMPLATE: &str = "Analyze the following answer and rate it on a scale \
    from 1 to 5, where 1 is very poor and 5 is excellent. Consider clarity, relevance, \
    and detail in the answer. Respond with just the number (1-5).\n\n\
    Candidate's answer: {answer}\n\n\
    Score (1-5):";

/// Model-answer instruction. Replace `{question}` before sending.
pub const IMPROVE_PROMPT_TEMPLATE: &str = "Provide a concise and clear answer (2-3 lines) \
    to the following interview question:\n\n\
    Question: {question}\n\n\
    Answer:";

/// Returned in place of a model answer when the engine is unavailable.
/// Part of the "scoring and improvement never fail the turn" contract.
pub const IMPROVE_FALLBACK: &str =
    "Sorry, I couldn't generate an answer at the moment. Please try again later.";

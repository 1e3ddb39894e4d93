//! Turn phase policy — which style of question each turn gets.
//!
//! The phase is a pure function of the turn ordinal, independent of
//! persistence timing: turn 1 breaks the ice, turn 2 covers role
//! experience, everything after digs into the resume.

/// The question-style bucket for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Opening,
    Experience,
    Deepening,
}

impl TurnPhase {
    /// Derives the phase from the 1-based turn ordinal.
    pub fn for_turn(ordinal: i64) -> Self {
        match ordinal {
            i64::MIN..=1 => TurnPhase::Opening,
            2 => TurnPhase::Experience,
            _ => TurnPhase::Deepening,
        }
    }

    /// The phase-specific instruction embedded in the question prompt.
    ///
    /// The opening instruction references the job title only — no resume or
    /// technical content is allowed into the icebreaker.
    pub fn instruction(&self, job_title: &str, job_description: &str) -> String {
        match self {
            TurnPhase::Opening => format!(
                "Start with a friendly question to break the ice, based on their job title: {job_title}. \
                 Do not ask about technical skills yet."
            ),
            TurnPhase::Experience => format!(
                "Ask about their experience in the role: {job_title}. \
                 Use details from the job description: {job_description}."
            ),
            TurnPhase::Deepening => {
                "Focus on their skills, accomplishments, or notable projects mentioned in their resume."
                    .to_string()
            }
        }
    }
}

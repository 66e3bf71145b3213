use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Please answer the remaining questions: {}", .missing.join(", "))]
    IncompleteAnswer { missing: Vec<String> },

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Invalid answer for '{question}': {reason}")]
    InvalidAnswer { question: String, reason: String },

    #[error("Invalid questionnaire: {0}")]
    InvalidQuestionnaire(String),
}

impl IntakeError {
    pub(crate) fn invalid(question: &str, reason: impl Into<String>) -> Self {
        IntakeError::InvalidAnswer {
            question: question.to_string(),
            reason: reason.into(),
        }
    }
}

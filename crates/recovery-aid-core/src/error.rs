use thiserror::Error;

use recovery_aid_advice::{AdviceError, ConfigurationError};
use recovery_aid_intake::IntakeError;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    Intake(#[from] IntakeError),

    #[error("{0}")]
    AdviceService(#[from] AdviceError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("This session has already been submitted")]
    AlreadySubmitted,
}

impl SessionError {
    /// The unanswered question ids, when submission was rejected as incomplete
    pub fn missing_questions(&self) -> Option<&[String]> {
        match self {
            SessionError::Intake(IntakeError::IncompleteAnswer { missing }) => Some(missing),
            _ => None,
        }
    }
}

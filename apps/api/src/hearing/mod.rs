//! Hearing: the guided question flow that collects trip preferences and
//! compiles them into a prompt for the chat transport.

pub mod catalog;
pub mod handlers;
pub mod labels;
pub mod preferences;
pub mod prompts;
pub mod session;
pub mod store;

use thiserror::Error;

pub use catalog::StepCatalog;
pub use session::HearingSession;
pub use store::SessionStore;

#[derive(Debug, Error, PartialEq)]
pub enum HearingError {
    #[error("Step '{0}' is not in the catalog")]
    UnknownStep(String),

    #[error("Step '{0}' does not take answers")]
    NotAQuestion(String),

    #[error("Step '{0}' does not support this kind of selection")]
    WrongSelectionMode(String),

    #[error("'{value}' is not an option of step '{step}'")]
    UnknownOption { step: String, value: String },

    #[error("Step '{0}' needs an answer")]
    MissingAnswer(String),

    #[error("'{value}' is not a valid answer for step '{step}'")]
    InvalidValue { step: String, value: String },

    #[error("Step '{0}' is required and cannot be skipped")]
    SkipRequired(String),

    #[error("Step '{0}' already has an answer; proceed instead of skipping")]
    AlreadyAnswered(String),

    #[error("Step '{0}' is not the confirmation step")]
    NotAtConfirmation(String),

    #[error("Step '{0}' was already visited")]
    Revisit(String),

    #[error("Hearing is already completed")]
    AlreadyCompleted,
}

impl HearingError {
    /// Errors caused by the session's state rather than by the submitted answer.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            HearingError::UnknownStep(_)
                | HearingError::NotAQuestion(_)
                | HearingError::WrongSelectionMode(_)
                | HearingError::AlreadyAnswered(_)
                | HearingError::NotAtConfirmation(_)
                | HearingError::Revisit(_)
                | HearingError::AlreadyCompleted
        )
    }
}

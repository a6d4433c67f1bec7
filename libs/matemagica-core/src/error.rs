//! Error types for matemagica-core.

use thiserror::Error;

/// Result type alias using QuizError.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors reported by the quiz session.
///
/// None of these are fatal: the worst outcome is a rejected action or a
/// return to the menu.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    #[error("operation or level not selected")]
    Configuration,

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("insufficient XP: {required} required, {available} available")]
    InsufficientXp { required: u32, available: u32 },

    #[error("action not available in {0} mode")]
    WrongMode(&'static str),

    #[error("no active round")]
    NoActiveRound,

    #[error("question already answered")]
    AlreadyAnswered,

    #[error("no saved mistakes to train")]
    NoMistakes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_insufficient_xp() {
        let error = QuizError::InsufficientXp {
            required: 250,
            available: 12,
        };
        assert_eq!(
            error.to_string(),
            "insufficient XP: 250 required, 12 available"
        );
    }

    #[test]
    fn test_error_display_unknown_operation() {
        let error = QuizError::UnknownOperation("modulo".to_string());
        assert_eq!(error.to_string(), "unknown operation: modulo");
    }

    #[test]
    fn test_error_display_wrong_mode() {
        let error = QuizError::WrongMode("rapid");
        assert_eq!(error.to_string(), "action not available in rapid mode");
    }
}

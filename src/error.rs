//! Error taxonomy for the optimization engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the orchestrator and its collaborators.
///
/// Missing records and ownership mismatches both map to [`Error::NotFound`]
/// so callers cannot distinguish "does not exist" from "not yours".
/// Failures inside a strategy are reported through [`Error::Execution`],
/// whose message is deliberately generic; full detail goes to the server
/// log only.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("An error occurred during optimization")]
    Execution,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_entity() {
        let err = Error::NotFound("optimization run");
        assert_eq!(err.to_string(), "optimization run not found");
    }

    #[test]
    fn test_execution_message_is_generic() {
        // The user-facing message must never carry internal detail.
        assert_eq!(
            Error::Execution.to_string(),
            "An error occurred during optimization"
        );
    }
}

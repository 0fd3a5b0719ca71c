//! Error taxonomy for backend collaborator operations.
//!
//! Three classes matter to the UI: validation failures rejected before any
//! request is sent, request failures from the collaborator, and authorization
//! mismatches. Every failure is terminal for that attempt - nothing is
//! retried automatically, and no failure takes down the session.

use thiserror::Error;

/// Errors surfaced by the backend collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Input rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The operation requires an authenticated actor.
    #[error("not signed in")]
    Unauthenticated,

    /// The actor is authenticated but not allowed to do this
    /// (wrong room password, deleting a room it does not own).
    #[error("{0}")]
    Forbidden(String),

    /// The referenced row does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The request reached the collaborator and failed there, or never got
    /// through at all.
    #[error("request failed: {0}")]
    Request(String),
}

impl BackendError {
    /// Whether this failure was rejected locally, before any request.
    ///
    /// Validation failures need no rollback: no request was sent, so no
    /// state changed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Unauthenticated)
    }

    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a request failure.
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_need_no_rollback() {
        assert!(BackendError::validation("empty name").is_validation());
        assert!(BackendError::Unauthenticated.is_validation());
    }

    #[test]
    fn request_failures_are_not_validation() {
        assert!(!BackendError::request("connection reset").is_validation());
        assert!(!BackendError::Forbidden("incorrect password".into()).is_validation());
        assert!(!BackendError::NotFound("room").is_validation());
    }
}

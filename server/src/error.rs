//! Shared error type for data-layer operations.
//!
//! Handlers need to tell user mistakes (re-render the form) apart from
//! database failures (log and return 500), so operations surface the two
//! as distinct variants.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpError {
    /// The submitted input was rejected; the message is safe to show.
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl OpError {
    pub fn invalid(message: impl Into<String>) -> Self {
        OpError::Invalid(message.into())
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, OpError::Invalid(_))
    }
}

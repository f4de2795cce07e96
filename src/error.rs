// The one error class the engine surfaces to its callers.
//
// Everything else (platform outages, missing bios, a broken embedding model)
// degrades to absence inside the engine and never reaches the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorrelationError {
    /// A required identifier was missing or a parameter was out of range.
    /// Raised before any fetch is attempted.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl CorrelationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CorrelationError::InvalidRequest(message.into())
    }
}

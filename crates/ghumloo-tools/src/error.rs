//! Error types for the hotel API tools.

use ghumloo_core::error::GhumlooError;

/// Errors raised by the tool clients.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{field} must be a YYYY-MM-DD date, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<ToolError> for GhumlooError {
    fn from(err: ToolError) -> Self {
        GhumlooError::Api(err.to_string())
    }
}

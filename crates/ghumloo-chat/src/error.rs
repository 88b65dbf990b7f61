//! Error types for the conversational layer.

use ghumloo_core::error::GhumlooError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("maximum retries exceeded: no final answer after {0} tool rounds")]
    ToolRoundsExceeded(u32),
    #[error("storage error: {0}")]
    StorageError(String),
}

impl ChatError {
    /// True for errors caused by the caller's input rather than the system.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ChatError::EmptyMessage | ChatError::MessageTooLong(_))
    }
}

impl From<GhumlooError> for ChatError {
    fn from(err: GhumlooError) -> Self {
        match err {
            GhumlooError::Llm(msg) => ChatError::Llm(msg),
            other => ChatError::StorageError(other.to_string()),
        }
    }
}

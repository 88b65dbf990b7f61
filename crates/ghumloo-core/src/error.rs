use thiserror::Error;

/// Top-level error type for the Ghumloo assistant.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for GhumlooError` where they cross crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GhumlooError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<toml::de::Error> for GhumlooError {
    fn from(err: toml::de::Error) -> Self {
        GhumlooError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GhumlooError {
    fn from(err: toml::ser::Error) -> Self {
        GhumlooError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GhumlooError {
    fn from(err: serde_json::Error) -> Self {
        GhumlooError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Ghumloo operations.
pub type Result<T> = std::result::Result<T, GhumlooError>;

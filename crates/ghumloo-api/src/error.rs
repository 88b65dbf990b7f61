//! API error types and the JSON response envelope.
//!
//! Successful and failed replies share one shape:
//! `{status, message, data: [{answer}]}`. Errors always carry a null answer.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use ghumloo_chat::ChatError;

// =============================================================================
// Envelope
// =============================================================================

/// One answer slot in the envelope's `data` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerData {
    pub answer: Option<String>,
}

/// JSON body returned by every endpoint except `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: bool,
    pub message: String,
    pub data: Vec<AnswerData>,
}

impl Envelope {
    pub fn success(message: impl Into<String>, answer: Option<String>) -> Self {
        Self {
            status: true,
            message: message.into(),
            data: vec![AnswerData { answer }],
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: false,
            message: message.into(),
            data: vec![AnswerData { answer: None }],
        }
    }
}

// =============================================================================
// ApiError
// =============================================================================

/// API error type mapped to an HTTP status and a failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 400: empty, oversized or malformed request.
    #[error("{0}")]
    BadRequest(String),
    /// 404: no answer, or unknown session.
    #[error("{0}")]
    NotFound(String),
    /// 429: the reasoning engine gave up after too many tool rounds.
    #[error("Maximum retry limit reached")]
    TooManyRequests,
    /// 502: an upstream service answered with a gateway error.
    #[error("Bad Gateway")]
    BadGateway,
    /// 500: anything unexpected. The detail is exposed to the caller.
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadGateway => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "Request failed");
        }
        (status, Json(Envelope::failure(self.to_string()))).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            e if e.is_invalid_input() => ApiError::BadRequest(e.to_string()),
            ChatError::SessionNotFound(id) => ApiError::NotFound(format!("Session not found: {}", id)),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Turns a handler panic into a 500 envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(detail).into_response()
}

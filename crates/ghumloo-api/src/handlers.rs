//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Envelope};
use crate::state::AppState;

/// Header carrying the session key on requests and responses.
pub const SESSION_HEADER: &str = "x-session-id";

const SUCCESS_MESSAGE: &str = "Data fetched successfully";
const NO_ANSWER_MESSAGE: &str = "No answer found";

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
}

/// Map a final answer to an error status by its text.
///
/// Engine failures reach the caller as apology answers, so the status is
/// recovered from the wording.
pub fn classify_answer(answer: &str) -> Result<(), ApiError> {
    if answer.is_empty() {
        return Err(ApiError::NotFound(NO_ANSWER_MESSAGE.to_string()));
    }
    let lower = answer.to_lowercase();
    if lower.contains("maximum retries") {
        return Err(ApiError::TooManyRequests);
    }
    if lower.contains("bad gateway") {
        return Err(ApiError::BadGateway);
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /ask - run one conversational turn.
///
/// The session key comes from the body, then the `x-session-id` header, and
/// falls back to the default session.
pub async fn ask(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        payload.map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e.body_text())))?;

    let session_key = request.session_id.or_else(|| {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    });

    let outcome = state
        .orchestrator
        .turn(session_key.as_deref(), &request.message)
        .await?;

    classify_answer(&outcome.answer)?;

    let mut response = Json(Envelope::success(SUCCESS_MESSAGE, Some(outcome.answer))).into_response();
    if let Ok(value) = HeaderValue::from_str(&outcome.session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    Ok(response)
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.orchestrator.session_count(),
    })
}

/// DELETE /sessions/{id} - forget a conversation.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope>, ApiError> {
    state.orchestrator.reset(&id)?;
    tracing::info!(session = %id, "Session deleted via API");
    Ok(Json(Envelope::success("Session deleted", None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(answer: &str) -> StatusCode {
        match classify_answer(answer) {
            Ok(()) => StatusCode::OK,
            Err(e) => e.status_code(),
        }
    }

    #[test]
    fn test_classify_answer() {
        assert_eq!(status_of("Rooms start at 4200."), StatusCode::OK);
        assert_eq!(status_of(""), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of("Sorry, error occurred: Maximum Retries exceeded"),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status_of("Sorry, error occurred: 502 BAD GATEWAY"),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_retry_check_wins_over_gateway() {
        assert_eq!(
            status_of("maximum retries after bad gateway"),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_other_apologies_are_ok() {
        assert_eq!(
            status_of("Sorry, error occurred: LLM error: request failed: timeout"),
            StatusCode::OK
        );
    }
}

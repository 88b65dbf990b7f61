//! HTTP surface for the Ghumloo assistant.
//!
//! Exposes `POST /ask` plus health and session management endpoints. Every
//! `/ask` reply uses the `{status, message, data: [{answer}]}` envelope.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, Envelope};
pub use routes::{create_router, start_server};
pub use state::AppState;

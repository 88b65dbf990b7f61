//! Application state shared across route handlers.

use std::sync::Arc;
use std::time::Instant;

use ghumloo_chat::HotelChatOrchestrator;

/// Shared application state, cheap to clone into each handler.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<HotelChatOrchestrator>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: HotelChatOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            start_time: Instant::now(),
        }
    }
}

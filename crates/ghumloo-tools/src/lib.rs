//! Clients for the remote hotel APIs used as reasoning-engine tools.
//!
//! Each client is a thin, best-effort wrapper: transport problems are turned
//! into explicit outcomes instead of propagating as hard failures.

pub mod dates;
pub mod error;
pub mod rate_plan;
pub mod search;

pub use dates::{current_date, StayDates};
pub use error::ToolError;
pub use rate_plan::{RatePlanClient, RatePlanSource};
pub use search::{HotelDirectory, HotelSearchClient, SearchOutcome};

/// Build the shared HTTP client used by the tool clients.
pub fn http_client() -> Result<reqwest::Client, ToolError> {
    reqwest::Client::builder()
        .user_agent(concat!("ghumloo-assistant/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ToolError::Transport(e.to_string()))
}

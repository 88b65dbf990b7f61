//! Rate-plan lookup client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use ghumloo_core::config::HotelApiConfig;
use ghumloo_core::types::HotelId;

use crate::dates::StayDates;
use crate::error::ToolError;

/// Anything that can price a stay at a given hotel.
#[async_trait]
pub trait RatePlanSource: Send + Sync {
    /// Returns the remote JSON response untouched.
    async fn rate_plan(&self, hotel_id: &HotelId, stay: &StayDates) -> Result<Value, ToolError>;
}

/// HTTP client for the rate-plan endpoint.
pub struct RatePlanClient {
    http: reqwest::Client,
    rate_plan_url: String,
    timeout: Duration,
}

impl RatePlanClient {
    pub fn new(http: reqwest::Client, config: &HotelApiConfig) -> Self {
        Self {
            http,
            rate_plan_url: config.rate_plan_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl RatePlanSource for RatePlanClient {
    async fn rate_plan(&self, hotel_id: &HotelId, stay: &StayDates) -> Result<Value, ToolError> {
        let check_in = stay.check_in_str();
        let check_out = stay.check_out_str();
        debug!(hotel_id = %hotel_id, %check_in, %check_out, "Fetching rate plan");

        let response = self
            .http
            .get(&self.rate_plan_url)
            .query(&[
                ("hotel_id", hotel_id.as_str()),
                ("checkIn", check_in.as_str()),
                ("checkOut", check_out.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(hotel_id = %hotel_id, error = %e, "Rate plan request failed");
                ToolError::Transport(e.to_string())
            })?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::Decode(e.to_string()))
    }
}

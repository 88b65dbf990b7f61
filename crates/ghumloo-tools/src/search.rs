//! Paginated hotel search client.
//!
//! Walks the listing endpoint page by page and accumulates every hotel it
//! returns. Pagination is best-effort: the first failing page ends the walk
//! and whatever was collected so far is still reported as a success.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use ghumloo_core::config::HotelApiConfig;
use ghumloo_core::types::HotelListing;

use crate::error::ToolError;

/// Result of a hotel search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// At least one hotel was found. `hotels` holds every accumulated result
    /// in API order; `total` is its length.
    Found {
        hotels: Vec<HotelListing>,
        total: usize,
    },
    /// Nothing was accumulated (empty result, `status: false`, or a failure
    /// on the very first page).
    NotFound,
}

/// Anything that can look hotels up by free-text query.
#[async_trait]
pub trait HotelDirectory: Send + Sync {
    async fn search(&self, query: &str) -> SearchOutcome;
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    status: Option<bool>,
    #[serde(default)]
    data: Option<SearchData>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchData {
    #[serde(default)]
    hotels: Option<Vec<HotelListing>>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
struct Pagination {
    #[serde(default, deserialize_with = "lenient_page")]
    current_page_number: Option<u32>,
    #[serde(default, deserialize_with = "lenient_page")]
    last_page: Option<u32>,
}

/// Page numbers arrive as numbers or numeric strings depending on the backend.
fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PageNumber {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<PageNumber>::deserialize(deserializer)? {
        Some(PageNumber::Number(n)) => Some(n),
        Some(PageNumber::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

// =============================================================================
// HotelSearchClient
// =============================================================================

/// HTTP client for the hotel listing endpoint.
pub struct HotelSearchClient {
    http: reqwest::Client,
    search_url: String,
    timeout: Duration,
    max_pages: u32,
}

impl HotelSearchClient {
    /// Create a client for the endpoint described by `config`.
    pub fn new(http: reqwest::Client, config: &HotelApiConfig) -> Self {
        Self {
            http,
            search_url: config.search_url.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_pages: config.max_pages,
        }
    }

    /// Fetch and decode a single page.
    async fn fetch_page(&self, query: &str, page: u32) -> Result<SearchEnvelope, ToolError> {
        let page_param = page.to_string();
        let response = self
            .http
            .get(&self.search_url)
            .query(&[("search", query), ("page", page_param.as_str())])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        response
            .json::<SearchEnvelope>()
            .await
            .map_err(|e| ToolError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HotelDirectory for HotelSearchClient {
    async fn search(&self, query: &str) -> SearchOutcome {
        let mut hotels: Vec<HotelListing> = Vec::new();
        let mut page: u32 = 1;

        loop {
            if self.max_pages != 0 && page > self.max_pages {
                warn!(query, max_pages = self.max_pages, "Page limit reached; stopping search");
                break;
            }

            let envelope = match self.fetch_page(query, page).await {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!(query, page, error = %e, "Hotel search page failed; keeping partial results");
                    break;
                }
            };

            if !envelope.status.unwrap_or(false) {
                debug!(query, page, "Listing API reported status=false");
                break;
            }

            let data = envelope.data.unwrap_or_default();
            let batch = data.hotels.unwrap_or_default();
            if batch.is_empty() {
                break;
            }
            hotels.extend(batch);

            let pagination = data.pagination.unwrap_or_default();
            let current = pagination.current_page_number.unwrap_or(page);
            let last = pagination.last_page.unwrap_or(1);
            if current >= last {
                break;
            }
            page += 1;
        }

        if hotels.is_empty() {
            info!(query, "Hotel search returned no results");
            return SearchOutcome::NotFound;
        }

        let total = hotels.len();
        info!(query, total, pages = page, "Hotel search completed");
        SearchOutcome::Found { hotels, total }
    }
}

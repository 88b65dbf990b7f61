//! Tools exposed to the reasoning engine.
//!
//! Every call returns JSON; failures come back as `{"error": "..."}` objects
//! so the engine can explain them to the user.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use ghumloo_core::types::{HotelId, HotelListing};
use ghumloo_tools::{current_date, HotelDirectory, RatePlanSource, SearchOutcome, StayDates, ToolError};

use crate::engine::{ToolCall, ToolExecutor, ToolSpec};
use crate::index::HotelMemory;

pub const GET_HOTELS: &str = "get_hotels";
pub const GET_RATE_PLAN: &str = "get_rate_plan";
pub const GET_CURRENT_DATE: &str = "get_current_date";

const INVALID_DATES: &str = "Dates must be in YYYY-MM-DD format";

/// Declarations for the three hotel tools.
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            GET_HOTELS,
            "Search Ghumloo hotels by free text (city, area or hotel name). Stores the results so later messages can refer to them by name or option number.",
            json!({
                "type": "object",
                "properties": {
                    "user_query": { "type": "string", "description": "Search text, e.g. 'Taj' or 'hotels in Noida'" }
                },
                "required": ["user_query"]
            }),
        ),
        ToolSpec::new(
            GET_RATE_PLAN,
            "Fetch room rates and availability for one hotel. Dates MUST be YYYY-MM-DD.",
            json!({
                "type": "object",
                "properties": {
                    "id": { "type": "integer", "description": "Hotel id" },
                    "checkIn": { "type": "string", "description": "Check-in date, YYYY-MM-DD" },
                    "checkOut": { "type": "string", "description": "Check-out date, YYYY-MM-DD" }
                },
                "required": ["id", "checkIn", "checkOut"]
            }),
        ),
        ToolSpec::without_arguments(GET_CURRENT_DATE, "Return today's date as YYYY-MM-DD."),
    ]
}

fn error_value(message: impl std::fmt::Display) -> Value {
    json!({ "error": message.to_string() })
}

fn str_arg<'a>(args: &'a Value, name: &'static str) -> Result<&'a str, ToolError> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or(ToolError::MissingArgument(name))
}

fn id_arg(args: &Value) -> Result<HotelId, ToolError> {
    args.get("id")
        .filter(|v| !v.is_null())
        .and_then(|v| serde_json::from_value::<HotelId>(v.clone()).ok())
        .filter(|id| !id.is_empty())
        .ok_or(ToolError::MissingArgument("id"))
}

// =============================================================================
// HotelToolbox
// =============================================================================

/// Tool executor bound to one session's hotel memory.
pub struct HotelToolbox {
    directory: Arc<dyn HotelDirectory>,
    rates: Arc<dyn RatePlanSource>,
    memory: Arc<Mutex<HotelMemory>>,
    preview_limit: usize,
}

impl HotelToolbox {
    pub fn new(
        directory: Arc<dyn HotelDirectory>,
        rates: Arc<dyn RatePlanSource>,
        memory: Arc<Mutex<HotelMemory>>,
        preview_limit: usize,
    ) -> Self {
        Self {
            directory,
            rates,
            memory,
            preview_limit,
        }
    }

    fn with_memory<T>(&self, f: impl FnOnce(&mut HotelMemory) -> T) -> Result<T, String> {
        let mut memory = self
            .memory
            .lock()
            .map_err(|e| format!("hotel memory lock poisoned: {}", e))?;
        Ok(f(&mut memory))
    }

    async fn get_hotels(&self, args: &Value) -> Value {
        let query = match str_arg(args, "user_query") {
            Ok(q) => q,
            Err(e) => return error_value(e),
        };

        match self.directory.search(query).await {
            SearchOutcome::Found { hotels, total } => {
                if let Err(e) = self.with_memory(|m| m.remember_search(&hotels)) {
                    return error_value(e);
                }
                info!(query, total, "Hotel search stored in memory");
                let preview: Vec<&HotelListing> = hotels.iter().take(self.preview_limit).collect();
                json!({
                    "status": true,
                    "message": "Success",
                    "total_hotels": total,
                    "hotels": preview,
                    "memory_updated": true
                })
            }
            SearchOutcome::NotFound => {
                info!(query, "No hotels found");
                json!({ "status": false, "message": "No hotels found", "hotels": [] })
            }
        }
    }

    async fn get_rate_plan(&self, args: &Value) -> Value {
        let (hotel_id, check_in, check_out) =
            match (id_arg(args), str_arg(args, "checkIn"), str_arg(args, "checkOut")) {
                (Ok(id), Ok(ci), Ok(co)) => (id, ci, co),
                (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => return error_value(e),
            };

        let stay = match StayDates::parse(check_in, check_out) {
            Ok(stay) => stay,
            Err(e) => {
                debug!(error = %e, "Rejected rate plan dates");
                return error_value(INVALID_DATES);
            }
        };

        // Focus moves before the remote call, whatever its outcome.
        if let Err(e) = self.with_memory(|m| m.focus_on(hotel_id.clone())) {
            return error_value(e);
        }

        match self.rates.rate_plan(&hotel_id, &stay).await {
            Ok(body) => body,
            Err(e) => {
                warn!(hotel_id = %hotel_id, error = %e, "Rate plan lookup failed");
                error_value(e)
            }
        }
    }
}

#[async_trait]
impl ToolExecutor for HotelToolbox {
    async fn execute(&self, call: &ToolCall) -> Value {
        debug!(tool = %call.name, "Tool call");
        match call.name.as_str() {
            GET_HOTELS => self.get_hotels(&call.args).await,
            GET_RATE_PLAN => self.get_rate_plan(&call.args).await,
            GET_CURRENT_DATE => Value::String(current_date()),
            other => error_value(format!("unknown tool: {}", other)),
        }
    }
}

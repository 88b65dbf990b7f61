use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{GhumlooError, Result};

/// Top-level configuration for the Ghumloo assistant.
///
/// Loaded from `~/.ghumloo/config.toml` by default. Each section corresponds
/// to one collaborator the assistant talks to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GhumlooConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub hotel_api: HotelApiConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl GhumlooConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GhumlooConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GhumlooError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values that would make the service unusable.
    pub fn validate(&self) -> Result<()> {
        if self.hotel_api.request_timeout_secs == 0 {
            return Err(GhumlooError::Config(
                "hotel_api.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.hotel_api.preview_limit == 0 {
            return Err(GhumlooError::Config(
                "hotel_api.preview_limit must be greater than 0".to_string(),
            ));
        }
        if self.llm.request_timeout_secs == 0 {
            return Err(GhumlooError::Config(
                "llm.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.llm.max_tool_rounds == 0 {
            return Err(GhumlooError::Config(
                "llm.max_tool_rounds must be greater than 0".to_string(),
            ));
        }
        if self.chat.default_session.trim().is_empty() {
            return Err(GhumlooError::Config(
                "chat.default_session must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Remote hotel listing and rate-plan endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelApiConfig {
    /// Paginated hotel search endpoint.
    pub search_url: String,
    /// Rate-plan lookup endpoint.
    pub rate_plan_url: String,
    /// Timeout applied to every individual page or rate-plan request.
    pub request_timeout_secs: u64,
    /// Number of hotels handed back to the reasoning engine per search.
    pub preview_limit: usize,
    /// Upper bound on pages fetched per search. 0 disables the bound.
    pub max_pages: u32,
}

impl Default for HotelApiConfig {
    fn default() -> Self {
        Self {
            search_url: "https://apibook.ghumloo.com/api/mobile/get-hotel".to_string(),
            rate_plan_url: "https://partner.ghumloo.com/api/rate-plan-by-hotel".to_string(),
            request_timeout_secs: 10,
            preview_limit: 5,
            max_pages: 100,
        }
    }
}

/// Reasoning engine (Gemini) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the generative language REST API.
    pub base_url: String,
    /// Model name, e.g. "gemini-2.5-flash".
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Output token cap per model call.
    pub max_output_tokens: u32,
    /// Maximum number of tool-call rounds within a single turn.
    pub max_tool_rounds: u32,
    /// Timeout for each model call.
    pub request_timeout_secs: u64,
    /// Replaces the built-in system instruction when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            max_output_tokens: 4096,
            max_tool_rounds: 25,
            request_timeout_secs: 60,
            system_prompt: None,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum accepted user message length in characters. 0 accepts any length.
    pub max_message_length: usize,
    /// Session key used when a caller does not supply one.
    pub default_session: String,
    /// Idle minutes after which a session is replaced. 0 keeps sessions forever.
    pub session_timeout_minutes: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 0,
            default_session: "default".to_string(),
            session_timeout_minutes: 0,
        }
    }
}

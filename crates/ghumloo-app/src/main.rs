//! Ghumloo application binary - composition root.
//!
//! 1. Load `.env`, CLI flags and the TOML configuration
//! 2. Build the hotel API clients and the Gemini reasoning engine
//! 3. Either answer a single `--ask` question or serve the HTTP API

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter};

use ghumloo_api::{start_server, AppState};
use ghumloo_chat::{GeminiEngine, HotelChatOrchestrator};
use ghumloo_core::config::GhumlooConfig;
use ghumloo_core::error::GhumlooError;
use ghumloo_tools::{http_client, HotelSearchClient, RatePlanClient};

use crate::cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = CliArgs::parse();

    // The filter starts from RUST_LOG or --log-level and is swapped for the
    // configured level once the file is read.
    let env_filter = EnvFilter::try_from_default_env().ok();
    let filter_pinned = env_filter.is_some() || args.log_level.is_some();
    let initial = env_filter.unwrap_or_else(|| EnvFilter::new(args.resolve_log_level("info")));
    let (filter, filter_handle) = reload::Layer::new(initial);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ghumloo assistant v{}", env!("CARGO_PKG_VERSION"));

    let config_file = args.resolve_config_path();
    let mut config = GhumlooConfig::load_or_default(&config_file);
    if !filter_pinned {
        filter_handle.reload(EnvFilter::new(args.resolve_log_level(&config.general.log_level)))?;
    }
    config.general.port = args.resolve_port(config.general.port);

    let api_key = config.llm.api_key().ok_or_else(|| {
        GhumlooError::Llm(format!(
            "no API key found; set {} in the environment or .env",
            config.llm.api_key_env
        ))
    })?;

    let http = http_client()?;
    let orchestrator = HotelChatOrchestrator::new(
        Arc::new(GeminiEngine::new(http.clone(), &config.llm, api_key)),
        Arc::new(HotelSearchClient::new(http.clone(), &config.hotel_api)),
        Arc::new(RatePlanClient::new(http, &config.hotel_api)),
        &config,
    );
    tracing::info!(model = %config.llm.model, "Reasoning engine ready");

    if let Some(message) = args.ask {
        let outcome = orchestrator.turn(None, &message).await?;
        println!("Response: {}", outcome.answer);
        return Ok(());
    }

    start_server(&config.general, AppState::new(orchestrator)).await?;
    Ok(())
}

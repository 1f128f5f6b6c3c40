//! # wearsyncd — wearsync daemon
//!
//! Composition root that wires the BLE adapter to the observation
//! dispatcher and keeps one wearable connected.
//!
//! ## Responsibilities
//! - Load configuration (`wearsync.toml`, env vars)
//! - Initialise tracing
//! - Register the log sink (and the JSON-lines sink when configured)
//! - Open the host BLE adapter
//! - Run the connection manager until it exits or Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no decoding or session logic belongs here.

mod config;
mod sink;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use wearsync_adapter_ble::BtleplugGateway;
use wearsync_app::connection_manager::ConnectionManager;
use wearsync_app::dispatcher::ObservationDispatcher;

use crate::config::Config;
use crate::sink::{JsonLinesSink, LogSink};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    let dispatcher = Arc::new(ObservationDispatcher::new());
    dispatcher.subscribe_all(LogSink);
    if let Some(path) = &config.sink.jsonl_path {
        dispatcher.subscribe_all(JsonLinesSink::append(path)?);
        tracing::info!(path = %path.display(), "writing observations as JSON lines");
    }

    let gateway = Arc::new(BtleplugGateway::new(config.ble.clone()).await?);
    let mut manager = ConnectionManager::new(gateway, dispatcher, config.connection_options());
    let target = config.target();

    tracing::info!(%target, "wearsyncd started");
    tokio::select! {
        result = manager.run(&target) => result?,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("interrupted, shutting down");
        }
    }
    manager.shutdown();

    Ok(())
}

//! # breezed — breeze daemon
//!
//! Composition root that wires the engine to its adapters and runs the
//! tick loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the device and calendar adapters
//! - Construct the control service, injecting adapters via port traits
//! - Drive evaluation ticks on a fixed interval
//! - Handle graceful shutdown (SIGINT), tearing the engine down so no
//!   cooldowns or revert entries are orphaned
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no arbitration logic belongs here.

mod config;

use breeze_adapter_virtual::{FixedSchedule, VirtualUnit};
use breeze_domain::time::now;
use breeze_engine::service::ControlService;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let engine_config = config.engine_config()?;
    let mut service = ControlService::new(
        engine_config,
        VirtualUnit::default(),
        FixedSchedule::default(),
    );

    let tick = std::time::Duration::from_secs(config.service.tick_seconds);
    tracing::info!(tick_seconds = config.service.tick_seconds, "breezed running");

    let mut interval = tokio::time::interval(tick);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(err) = service.run_once(now()).await {
                    tracing::error!(%err, "tick failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                service.shutdown();
                break;
            }
        }
    }

    Ok(())
}

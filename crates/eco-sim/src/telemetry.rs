//! Tracing setup for the simulation runner.

use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,eco_sim=info,eco_world=info";

pub fn init_telemetry(json: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    info!(json, "Telemetry initialized");
    Ok(())
}

//! Boot — logging init, config load, state creation.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::EngineConfig;
use crate::state::{EngineState, SharedState};

/// Initialise the tracing / logging subsystem.
///
/// Diagnostics go to stderr only: stdout belongs to the transport.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load and validate configuration, then build the shared state.
pub fn boot() -> Result<(SharedState, EngineConfig), Box<dyn std::error::Error>> {
    info!("Starting Loglens engine v0.1.0");

    let config = EngineConfig::load()?;
    config.validate()?;
    info!(
        sample_lines = config.sample_lines,
        target_buckets = config.target_buckets,
        "Loaded configuration"
    );

    let state = Arc::new(EngineState::new(config.clone()));
    info!("Initialized shared engine state");

    Ok((state, config))
}

//! # Observability Infrastructure
//!
//! Structured logging for the provider core via the tracing ecosystem.
//! Registration and referent decisions emit events; secret values never
//! appear in any of them.

use crate::errors::{KeyplaneError, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Logging configuration for the process embedding the core
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON-formatted events instead of human-readable ones
    pub json_format: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_format: false }
    }
}

/// Initialize the tracing subscriber.
///
/// Call once from the process entry point before building the provider
/// schema so registration events are captured.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let result = if config.json_format {
        tracing_subscriber::fmt().with_env_filter(filter).json().try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|err| {
        KeyplaneError::config(format!("failed to initialize tracing subscriber: {}", err))
    })?;

    info!(log_level = %config.log_level, json = config.json_format, "Tracing initialized");
    Ok(())
}

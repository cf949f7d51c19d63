/*!
 * Logging functionality for LabFlow.
 *
 * This module provides tracing setup and utilities for consistent logging
 * across the LabFlow ecosystem.
 */
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Initialize the logging system with default configuration
pub fn init() -> Result<()> {
    init_with_filter("info")
}

/// Initialize the logging system with a specific filter
///
/// # Arguments
///
/// * `filter` - The log filter string (e.g., "info", "debug", "labflow=trace")
pub fn init_with_filter(filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    Ok(())
}

/// A type alias for a tracing span
pub type Span = tracing::Span;

/// Create a new span for an instrument
///
/// # Arguments
///
/// * `name` - The instrument name
/// * `resource` - An optional resource identifier of its adapter
pub fn instrument_span(name: &str, resource: Option<&str>) -> Span {
    match resource {
        Some(resource) => tracing::info_span!("instrument", name = %name, resource = %resource),
        None => tracing::info_span!("instrument", name = %name),
    }
}

/// Create a new span for an operation
///
/// # Arguments
///
/// * `name` - The name of the operation
/// * `instrument` - The instrument performing the operation
pub fn operation_span(name: &str, instrument: &str) -> Span {
    tracing::info_span!("operation", name = %name, instrument = %instrument)
}

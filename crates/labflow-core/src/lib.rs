/*!
 * LabFlow Core
 *
 * This crate provides the core functionality shared by all LabFlow crates:
 * the value model, the error taxonomy, configuration, and logging.
 */

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

/// Re-export of dependencies that are part of the public API
pub mod deps {
    pub use anyhow;
    pub use serde;
    pub use tracing;
}

/// LabFlow core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library initialization
pub fn init() -> Result<(), error::Error> {
    logging::init()?;
    tracing::info!("LabFlow Core {} initialized", VERSION);
    Ok(())
}

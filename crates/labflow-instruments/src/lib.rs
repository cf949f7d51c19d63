/*!
 * LabFlow Instruments
 *
 * This crate provides adapter abstractions, the property framework,
 * instrument drivers, and the convention harness for the LabFlow
 * measurement system.
 */

#![warn(missing_docs)]

// Re-export core types
pub use labflow_core::prelude;

pub mod adapter;
pub mod adapters;
pub mod channel;
pub mod conventions;
pub mod drivers;
pub mod idn;
pub mod instrument;
pub mod property;
pub mod registry;

// Re-export the pieces most drivers and call sites need
pub use adapter::{Adapter, AdapterOptions, SharedAdapter};
pub use adapters::{MockAdapter, SimAdapter};
pub use channel::{Channel, ChannelId};
pub use idn::Identification;
pub use instrument::{Instrument, InstrumentCore, InstrumentInfo};
pub use property::{Access, Property, Validator, ValueKind};
pub use registry::{DriverEntry, DriverMetadata, DriverRegistry};

/// LabFlow instruments crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the instrument system
pub fn init() -> Result<(), labflow_core::error::Error> {
    tracing::info!("LabFlow Instruments {} initialized", VERSION);
    Ok(())
}

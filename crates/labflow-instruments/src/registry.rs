/*!
 * Driver registry for LabFlow.
 *
 * Drivers are registered explicitly: the registry maps a driver identifier
 * to a connector plus per-driver convention metadata. The convention
 * harness walks this registry instead of introspecting the crate; a driver
 * that is not registered does not exist to it.
 */
use std::collections::BTreeMap;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use labflow_core::error::{Error, Result};

use crate::adapter::SharedAdapter;
use crate::drivers::tektronix;
use crate::instrument::Instrument;

/// A function constructing an instrument from an adapter and optional name
pub type Connector =
    fn(SharedAdapter, Option<String>) -> BoxFuture<'static, Result<Box<dyn Instrument>>>;

/// Per-driver convention metadata
///
/// Carried with each registration, this replaces free-floating allow-lists:
/// a driver that cannot satisfy one of the harness checks says so where it
/// is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverMetadata {
    /// The driver cannot accept a generic adapter
    pub requires_physical_adapter: bool,
    /// Construction needs device responses a stand-in cannot provide
    pub communicates_on_connect: bool,
    /// The registration models a channel as a full instrument
    pub channel_as_instrument: bool,
    /// Property descriptions do not yet follow the docstring convention
    pub docstring_grandfathered: bool,
    /// The driver does not yet declare the SCPI inclusion flag
    pub scpi_flag_grandfathered: bool,
}

/// One registered driver
#[derive(Debug, Clone)]
pub struct DriverEntry {
    /// The driver identifier, unique within a registry
    pub id: &'static str,
    /// Convention metadata for the harness
    pub metadata: DriverMetadata,
    /// Constructor for the driver's instrument type
    pub connector: Connector,
}

/// Registry of instrument drivers
#[derive(Debug, Default)]
pub struct DriverRegistry {
    entries: BTreeMap<&'static str, DriverEntry>,
}

impl DriverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of every driver shipped with this crate
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(DriverEntry {
                id: tektronix::TBS2000B_DRIVER_ID,
                metadata: DriverMetadata::default(),
                connector: connect_tbs2000b,
            })
            .expect("builtin driver ids are unique");
        registry
    }

    /// Register a driver
    ///
    /// A duplicate identifier is rejected; registration order is not
    /// significant, iteration is by identifier.
    pub fn register(&mut self, entry: DriverEntry) -> Result<()> {
        if self.entries.contains_key(entry.id) {
            return Err(Error::other(format!(
                "Driver '{}' is already registered",
                entry.id
            )));
        }
        debug!("Registered driver '{}'", entry.id);
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    /// Look up a driver by identifier
    pub fn get(&self, id: &str) -> Option<&DriverEntry> {
        self.entries.get(id)
    }

    /// Iterate over all registered drivers
    pub fn iter(&self) -> impl Iterator<Item = &DriverEntry> {
        self.entries.values()
    }

    /// The registered driver identifiers
    pub fn ids(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Number of registered drivers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Construct an instrument through a registered driver
    pub async fn connect(
        &self,
        id: &str,
        adapter: SharedAdapter,
        name: Option<String>,
    ) -> Result<Box<dyn Instrument>> {
        let entry = self
            .get(id)
            .ok_or_else(|| Error::other(format!("Driver '{}' is not registered", id)))?;
        (entry.connector)(adapter, name).await
    }
}

fn connect_tbs2000b(
    adapter: SharedAdapter,
    name: Option<String>,
) -> BoxFuture<'static, Result<Box<dyn Instrument>>> {
    Box::pin(async move {
        let instrument = tektronix::Tbs2000b::connect(adapter, name).await?;
        Ok(Box::new(instrument) as Box<dyn Instrument>)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::MockAdapter;

    #[test]
    fn test_builtin_contains_tbs2000b() {
        let registry = DriverRegistry::builtin();
        assert!(!registry.is_empty());
        assert!(registry.get(tektronix::TBS2000B_DRIVER_ID).is_some());
        assert_eq!(registry.ids(), vec![tektronix::TBS2000B_DRIVER_ID]);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = DriverRegistry::builtin();
        let entry = registry
            .get(tektronix::TBS2000B_DRIVER_ID)
            .cloned()
            .unwrap();
        assert!(registry.register(entry).is_err());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_through_registry() {
        let registry = DriverRegistry::builtin();
        let adapter = Arc::new(MockAdapter::new());
        let instrument = registry
            .connect(
                tektronix::TBS2000B_DRIVER_ID,
                adapter,
                Some("bench scope".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(instrument.name(), "bench scope");
        assert_eq!(instrument.channels().len(), 4);
    }

    #[tokio::test]
    async fn test_connect_unknown_driver() {
        let registry = DriverRegistry::builtin();
        let adapter = Arc::new(MockAdapter::new());
        assert!(registry.connect("acme.nope", adapter, None).await.is_err());
    }
}

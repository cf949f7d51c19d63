/*!
 * Instrument trait and core instrument abstractions.
 *
 * An instrument is a named collection of declared properties, an optional
 * set of channels, and exactly one communication adapter fixed at
 * construction. Construction is where all identification happens; a
 * malformed identification aborts it and no partial instrument is ever
 * returned.
 */
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use labflow_core::error::{Error, Result};
use labflow_core::types::Value;

use crate::adapter::SharedAdapter;
use crate::channel::{Channel, ChannelId};
use crate::idn::Identification;
use crate::property::Property;

/// Instrument information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentInfo {
    /// The human-readable instrument name
    pub name: String,
    /// The registry identifier of the driver
    pub driver: String,
    /// Manufacturer reported by the device, if queried
    pub manufacturer: Option<String>,
    /// Model reported by the device, if queried
    pub model: Option<String>,
    /// Serial number reported by the device, if queried
    pub serial: Option<String>,
    /// Firmware revision reported by the device, if queried
    pub firmware: Option<String>,
    /// Whether the driver includes the common SCPI command set
    ///
    /// `None` means the driver never declared it; the convention harness
    /// flags that.
    pub scpi: Option<bool>,
}

impl InstrumentInfo {
    /// Create an info block with identity fields unset
    pub fn new<N: Into<String>, D: Into<String>>(name: N, driver: D) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
            manufacturer: None,
            model: None,
            serial: None,
            firmware: None,
            scpi: None,
        }
    }

    /// Declare whether the common SCPI command set is included
    pub fn with_scpi(mut self, scpi: bool) -> Self {
        self.scpi = Some(scpi);
        self
    }

    /// Fill the identity fields from a parsed identification
    pub fn with_identification(mut self, idn: &Identification) -> Self {
        self.manufacturer = Some(idn.manufacturer.clone());
        self.model = Some(idn.model.clone());
        self.serial = Some(idn.serial.clone());
        self.firmware = Some(idn.firmware.clone());
        self
    }
}

/// The core instrument trait
#[async_trait]
pub trait Instrument: Send + Sync + Debug {
    /// Get the instrument information
    fn info(&self) -> &InstrumentInfo;

    /// Get the instrument name
    fn name(&self) -> &str {
        &self.info().name
    }

    /// Get the adapter the instrument is bound to
    fn adapter(&self) -> &SharedAdapter;

    /// Get the declared properties of the instrument itself
    fn properties(&self) -> &[Property];

    /// Get the channels of the instrument
    fn channels(&self) -> &[Channel] {
        &[]
    }

    /// Look up a channel by identifier
    fn channel(&self, id: &ChannelId) -> Option<&Channel> {
        self.channels().iter().find(|c| c.id() == id)
    }

    /// Look up a declared property by name
    fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name() == name)
    }

    /// Whether the driver declared the common SCPI command set as included
    fn supports_scpi(&self) -> bool {
        self.info().scpi.unwrap_or(false)
    }

    /// Read a declared property; every read is a fresh query
    async fn read_property(&self, name: &str) -> Result<Value> {
        let property = self.property(name).ok_or_else(|| {
            Error::validation(format!(
                "Property '{}' is not declared on instrument '{}'",
                name,
                self.name()
            ))
        })?;
        property.read(self.adapter().as_ref()).await
    }

    /// Write a declared property; validation happens before anything is sent
    async fn write_property(&self, name: &str, value: Value) -> Result<()> {
        let property = self.property(name).ok_or_else(|| {
            Error::validation(format!(
                "Property '{}' is not declared on instrument '{}'",
                name,
                self.name()
            ))
        })?;
        property.write(self.adapter().as_ref(), value).await
    }

    /// Send a raw command through the adapter
    async fn write(&self, command: &str) -> Result<()> {
        self.adapter().write(command).await
    }

    /// Send a raw query through the adapter
    async fn query(&self, command: &str) -> Result<String> {
        self.adapter().query(command).await
    }

    /// Query and parse the identification string (`*IDN?`)
    async fn identification(&self) -> Result<Identification> {
        self.require_scpi()?;
        let reply = self.query("*IDN?").await?;
        reply.parse()
    }

    /// Reset the instrument (`*RST`, no response expected)
    async fn reset(&self) -> Result<()> {
        self.require_scpi()?;
        debug!("Resetting instrument '{}'", self.name());
        self.write("*RST").await
    }

    /// Query the event status register (`*ESR?`)
    async fn event_status(&self) -> Result<i64> {
        self.require_scpi()?;
        let reply = self.query("*ESR?").await?;
        reply.trim().parse().map_err(|_| {
            Error::validation(format!(
                "Event status reply '{}' is not numeric",
                reply.trim()
            ))
        })
    }

    /// Fail unless the driver declared SCPI support
    fn require_scpi(&self) -> Result<()> {
        if self.supports_scpi() {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "Instrument '{}' does not include the common SCPI command set",
                self.name()
            )))
        }
    }
}

/// Composable state shared by instrument implementations
///
/// Drivers embed an `InstrumentCore` and delegate the trait accessors to
/// it; the adapter binding is fixed here and never swapped.
#[derive(Debug)]
pub struct InstrumentCore {
    info: InstrumentInfo,
    adapter: SharedAdapter,
    properties: Vec<Property>,
    channels: Vec<Channel>,
}

impl InstrumentCore {
    /// Create the core state of an instrument
    pub fn new(
        info: InstrumentInfo,
        adapter: SharedAdapter,
        properties: Vec<Property>,
        channels: Vec<Channel>,
    ) -> Self {
        Self {
            info,
            adapter,
            properties,
            channels,
        }
    }

    /// The instrument information
    pub fn info(&self) -> &InstrumentInfo {
        &self.info
    }

    /// The bound adapter
    pub fn adapter(&self) -> &SharedAdapter {
        &self.adapter
    }

    /// The declared properties
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// The channels
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }
}

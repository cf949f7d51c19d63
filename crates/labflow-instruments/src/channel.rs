/*!
 * Channels: addressable sub-scopes of an instrument.
 *
 * A channel shares its parent's adapter and carries its own copy of the
 * per-channel property declarations; every command template is rendered
 * with the channel identifier before it goes on the wire. Channels only
 * exist inside a parent instrument.
 */
use std::fmt;

use serde::{Deserialize, Serialize};

use labflow_core::error::{Error, Result};
use labflow_core::types::Value;

use crate::adapter::SharedAdapter;
use crate::property::{Property, CHANNEL_PLACEHOLDER};

/// Identifier of a channel within its parent instrument
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelId {
    /// A numeric channel index
    Index(u32),
    /// A textual channel label
    Label(String),
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Index(i) => write!(f, "{}", i),
            ChannelId::Label(s) => write!(f, "{}", s),
        }
    }
}

impl From<u32> for ChannelId {
    fn from(i: u32) -> Self {
        ChannelId::Index(i)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId::Label(s.to_string())
    }
}

/// One addressable hardware line of an instrument
#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    adapter: SharedAdapter,
    properties: Vec<Property>,
}

impl Channel {
    /// Create a channel over its parent's adapter
    pub fn new(id: ChannelId, adapter: SharedAdapter, properties: Vec<Property>) -> Self {
        Self {
            id,
            adapter,
            properties,
        }
    }

    /// The channel identifier
    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    /// The declared properties of this channel
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a declared property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Read a declared property, parameterized by this channel
    pub async fn read_property(&self, name: &str) -> Result<Value> {
        let property = self.require_property(name)?;
        property
            .read_scoped(self.adapter.as_ref(), Some(&self.id.to_string()))
            .await
    }

    /// Write a declared property, parameterized by this channel
    pub async fn write_property(&self, name: &str, value: Value) -> Result<()> {
        let property = self.require_property(name)?;
        property
            .write_scoped(self.adapter.as_ref(), Some(&self.id.to_string()), value)
            .await
    }

    /// Send a raw command, substituting this channel's identifier
    pub async fn write(&self, command: &str) -> Result<()> {
        self.adapter.write(&self.render(command)).await
    }

    /// Send a raw query, substituting this channel's identifier
    pub async fn query(&self, command: &str) -> Result<String> {
        self.adapter.query(&self.render(command)).await
    }

    fn render(&self, command: &str) -> String {
        command.replace(CHANNEL_PLACEHOLDER, &self.id.to_string())
    }

    fn require_property(&self, name: &str) -> Result<&Property> {
        self.property(name).ok_or_else(|| {
            Error::validation(format!(
                "Property '{}' is not declared on channel {}",
                name, self.id
            ))
        })
    }
}

/// Create one channel per identifier over a shared declaration set
///
/// The multi-channel factory: every channel receives the same property
/// declarations, differing only in the identifier substituted into their
/// command templates.
pub fn create_channels<I, F>(adapter: &SharedAdapter, ids: I, declare: F) -> Vec<Channel>
where
    I: IntoIterator<Item = ChannelId>,
    F: Fn() -> Vec<Property>,
{
    ids.into_iter()
        .map(|id| Channel::new(id, adapter.clone(), declare()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::MockAdapter;
    use crate::property::Validator;

    fn declarations() -> Vec<Property> {
        vec![
            Property::control(
                "coupling",
                "CH{ch}:COUPling?",
                "CH{ch}:COUPling",
                "Control the input coupling of the channel.",
            )
            .with_validator(Validator::DiscreteSet(vec![
                "DC".into(),
                "AC".into(),
                "GND".into(),
            ])),
        ]
    }

    #[tokio::test]
    async fn test_channel_substitutes_identifier() {
        let adapter = Arc::new(MockAdapter::new().with_reply("CH2:COUPling?", "DC"));
        let channel = Channel::new(ChannelId::Index(2), adapter.clone(), declarations());

        let value = channel.read_property("coupling").await.unwrap();
        assert_eq!(value, Value::String("DC".to_string()));

        channel
            .write_property("coupling", Value::from("AC"))
            .await
            .unwrap();
        assert_eq!(adapter.commands(), vec!["CH2:COUPling?", "CH2:COUPling AC"]);
    }

    #[tokio::test]
    async fn test_undeclared_property_is_rejected() {
        let adapter: SharedAdapter = Arc::new(MockAdapter::new());
        let channel = Channel::new(ChannelId::Index(1), adapter, declarations());
        assert!(channel.read_property("bandwidth").await.is_err());
    }

    #[tokio::test]
    async fn test_raw_command_rendering() {
        let adapter = Arc::new(MockAdapter::new());
        let channel = Channel::new(
            ChannelId::Label("MATH".to_string()),
            adapter.clone(),
            Vec::new(),
        );
        channel.write("{ch}:DEFine 1").await.unwrap();
        assert_eq!(adapter.commands(), vec!["MATH:DEFine 1"]);
    }

    #[test]
    fn test_create_channels() {
        let adapter: SharedAdapter = Arc::new(MockAdapter::new());
        let channels = create_channels(&adapter, (1..=4).map(ChannelId::Index), declarations);
        assert_eq!(channels.len(), 4);
        assert_eq!(channels[0].id(), &ChannelId::Index(1));
        assert_eq!(channels[3].id(), &ChannelId::Index(4));
        assert!(channels.iter().all(|c| c.property("coupling").is_some()));
    }
}

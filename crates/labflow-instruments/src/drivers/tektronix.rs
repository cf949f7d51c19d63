/*!
 * Tektronix oscilloscope drivers.
 */
use async_trait::async_trait;
use tracing::{debug, info};

use labflow_core::error::Result;
use labflow_core::types::Value;

use crate::adapter::SharedAdapter;
use crate::channel::{create_channels, Channel, ChannelId};
use crate::idn::Identification;
use crate::instrument::{Instrument, InstrumentCore, InstrumentInfo};
use crate::property::{Property, Validator, ValueKind};

/// Registry identifier of the TBS 2000B driver
pub const TBS2000B_DRIVER_ID: &str = "tektronix.tbs2000b";

/// Name used when the caller does not supply one
pub const TBS2000B_DEFAULT_NAME: &str = "TBS-2XXX";

/// Tektronix TBS 2000B series oscilloscope
///
/// The channel count is not configured: it is discovered at connection
/// time from the identification string, whose model field encodes it as
/// the trailing digit (TBS2XXNB has N channels).
#[derive(Debug)]
pub struct Tbs2000b {
    core: InstrumentCore,
}

impl Tbs2000b {
    /// Connect to the oscilloscope over an adapter
    ///
    /// Queries `*IDN?` once, derives the channel count from the model
    /// field, and creates one measurement channel per index `1..=n`. A
    /// malformed identification aborts the connection.
    pub async fn connect(adapter: SharedAdapter, name: Option<String>) -> Result<Self> {
        let name = name.unwrap_or_else(|| TBS2000B_DEFAULT_NAME.to_string());

        let reply = adapter.query("*IDN?").await?;
        let idn: Identification = reply.parse()?;
        let count = idn.channel_count()?;
        debug!(
            "{} reported model {} with {} channels",
            name, idn.model, count
        );

        let channels = create_channels(
            &adapter,
            (1..=count).map(ChannelId::Index),
            Self::channel_properties,
        );

        let info = InstrumentInfo::new(name, TBS2000B_DRIVER_ID)
            .with_identification(&idn)
            .with_scpi(true);

        info!(
            "Connected to {} {} on {}",
            idn.manufacturer,
            idn.model,
            adapter.resource()
        );

        Ok(Self {
            core: InstrumentCore::new(info, adapter, Self::instrument_properties(), channels),
        })
    }

    /// Automatically configure the instrument (`AUTOS EXEC;`, no response)
    pub async fn auto_setup(&self) -> Result<()> {
        debug!("Auto-setup on '{}'", self.name());
        self.write("AUTOS EXEC;").await
    }

    fn instrument_properties() -> Vec<Property> {
        vec![
            Property::measurement("id", "*IDN?", "Get the instrument identification string."),
            Property::measurement(
                "status",
                "*ESR?",
                "Get the contents of the event status register.",
            )
            .with_kind(ValueKind::Integer),
        ]
    }

    fn channel_properties() -> Vec<Property> {
        vec![
            Property::control(
                "scale",
                "CH{ch}:SCAle?",
                "CH{ch}:SCAle",
                "Control the vertical scale of the channel in volts per division.",
            )
            .with_validator(Validator::Range {
                min: 0.001,
                max: 10.0,
            })
            .with_kind(ValueKind::Float),
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
            Property::control(
                "probe",
                "CH{ch}:PRObe:GAIN?",
                "CH{ch}:PRObe:GAIN",
                "Control the probe attenuation gain factor of the channel.",
            )
            .with_validator(Validator::DiscreteSet(vec![
                Value::Float(0.1),
                Value::Float(1.0),
                Value::Float(10.0),
            ]))
            .with_kind(ValueKind::Float),
            Property::control(
                "label",
                "CH{ch}:LABel?",
                "CH{ch}:LABel",
                "Control the label attached to the channel display.",
            )
            .with_kind(ValueKind::Text),
        ]
    }
}

#[async_trait]
impl Instrument for Tbs2000b {
    fn info(&self) -> &InstrumentInfo {
        self.core.info()
    }

    fn adapter(&self) -> &SharedAdapter {
        self.core.adapter()
    }

    fn properties(&self) -> &[Property] {
        self.core.properties()
    }

    fn channels(&self) -> &[Channel] {
        self.core.channels()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::MockAdapter;

    const IDN: &str = "TEKTRONIX,TBS2204B,C012345,CF:91.1CT FV:1.04";

    #[tokio::test]
    async fn test_channel_count_from_identification() {
        let adapter = Arc::new(MockAdapter::with_identification(IDN));
        let scope = Tbs2000b::connect(adapter, None).await.unwrap();

        assert_eq!(scope.channels().len(), 4);
        let ids: Vec<&ChannelId> = scope.channels().iter().map(Channel::id).collect();
        assert_eq!(
            ids,
            vec![
                &ChannelId::Index(1),
                &ChannelId::Index(2),
                &ChannelId::Index(3),
                &ChannelId::Index(4)
            ]
        );
        assert_eq!(scope.info().model.as_deref(), Some("TBS2204B"));
        assert_eq!(scope.info().scpi, Some(true));
    }

    #[tokio::test]
    async fn test_default_name() {
        let adapter = Arc::new(MockAdapter::with_identification(IDN));
        let scope = Tbs2000b::connect(adapter, None).await.unwrap();
        assert_eq!(scope.name(), TBS2000B_DEFAULT_NAME);
    }

    #[tokio::test]
    async fn test_malformed_identification_aborts_connection() {
        let adapter = Arc::new(MockAdapter::with_identification("TEKTRONIX"));
        assert!(Tbs2000b::connect(adapter, None).await.is_err());

        let adapter = Arc::new(MockAdapter::with_identification("TEKTRONIX,SCOPE,0,0"));
        assert!(Tbs2000b::connect(adapter, None).await.is_err());
    }

    #[tokio::test]
    async fn test_auto_setup_command() {
        let adapter = Arc::new(MockAdapter::with_identification(IDN));
        let scope = Tbs2000b::connect(adapter.clone(), None).await.unwrap();
        scope.auto_setup().await.unwrap();
        assert!(adapter.commands().contains(&"AUTOS EXEC;".to_string()));
    }
}

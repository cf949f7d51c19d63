/*!
 * Declared attributes for LabFlow instruments.
 *
 * A property is a small accessor object pairing command templates with
 * validation: reading renders the query template and parses the reply,
 * writing validates the value first and only then formats and sends the
 * set command. Properties are composed into instruments and channels at
 * construction time; there is no attribute interception and no caching,
 * every read is a fresh round trip.
 */
use serde::{Deserialize, Serialize};
use tracing::trace;

use labflow_core::error::{Error, Result};
use labflow_core::types::Value;

use crate::adapter::Adapter;

/// The first words permitted in a property description
///
/// `Control` marks read-write, `Measure` and `Get` read-only, `Set`
/// write-only. The convention harness checks this; declaration does not.
pub const DOC_PREFIXES: &[&str] = &["Control", "Measure", "Set", "Get"];

/// Placeholder substituted with the channel identifier in command templates
pub const CHANNEL_PLACEHOLDER: &str = "{ch}";

/// Access mode of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    /// Read-only property
    ReadOnly,
    /// Write-only property
    WriteOnly,
    /// Read-write property
    ReadWrite,
}

/// The value type a property reads back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// Keep whatever the response parses into
    Auto,
    /// The response must be an integer
    Integer,
    /// The response must be numeric
    Float,
    /// The response is kept as a string
    Text,
}

/// Validation applied to a value before a set command is sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Validator {
    /// Accept any value
    Any,
    /// The value must be one of a discrete set
    DiscreteSet(Vec<Value>),
    /// The value must be numeric and within an inclusive range
    Range {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
}

impl Validator {
    /// Validate a value against the rule
    pub fn validate(&self, property: &str, value: &Value) -> Result<()> {
        match self {
            Validator::Any => Ok(()),
            Validator::DiscreteSet(allowed) => {
                if allowed.iter().any(|candidate| values_match(candidate, value)) {
                    Ok(())
                } else {
                    Err(Error::validation(format!(
                        "Value {} is not in the discrete set for property '{}'",
                        value, property
                    )))
                }
            }
            Validator::Range { min, max } => {
                let number = value.as_float().ok_or_else(|| {
                    Error::validation(format!(
                        "Value {} for property '{}' is not numeric",
                        value, property
                    ))
                })?;
                if number < *min || number > *max {
                    return Err(Error::validation(format!(
                        "Value {} for property '{}' is outside [{}, {}]",
                        number, property, min, max
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Compare two values, coercing between integer and float
fn values_match(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    match (a.as_float(), b.as_float()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// A declared attribute backed by command templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    name: String,
    description: String,
    get_command: Option<String>,
    set_command: Option<String>,
    validator: Validator,
    kind: ValueKind,
}

impl Property {
    /// Declare a read-only property backed by a query command
    pub fn measurement<N, G, D>(name: N, get_command: G, description: D) -> Self
    where
        N: Into<String>,
        G: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            get_command: Some(get_command.into()),
            set_command: None,
            validator: Validator::Any,
            kind: ValueKind::Auto,
        }
    }

    /// Declare a read-write property backed by a query and a set command
    pub fn control<N, G, S, D>(name: N, get_command: G, set_command: S, description: D) -> Self
    where
        N: Into<String>,
        G: Into<String>,
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            get_command: Some(get_command.into()),
            set_command: Some(set_command.into()),
            validator: Validator::Any,
            kind: ValueKind::Auto,
        }
    }

    /// Declare a write-only property backed by a set command
    pub fn setting<N, S, D>(name: N, set_command: S, description: D) -> Self
    where
        N: Into<String>,
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            get_command: None,
            set_command: Some(set_command.into()),
            validator: Validator::Any,
            kind: ValueKind::Auto,
        }
    }

    /// Attach a validator applied before every write
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Constrain the type read back from the device
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// The property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The validator applied before writes
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// The access mode derived from the declared command templates
    pub fn access(&self) -> Access {
        match (&self.get_command, &self.set_command) {
            (Some(_), Some(_)) => Access::ReadWrite,
            (Some(_), None) => Access::ReadOnly,
            _ => Access::WriteOnly,
        }
    }

    /// The first word of the description
    pub fn doc_prefix(&self) -> Option<&str> {
        self.description.split_whitespace().next()
    }

    /// Whether the description starts with one of the convention words
    pub fn has_convention_doc(&self) -> bool {
        self.doc_prefix()
            .map(|word| DOC_PREFIXES.contains(&word))
            .unwrap_or(false)
    }

    /// Whether the command templates are parameterized by a channel
    pub fn is_channel_scoped(&self) -> bool {
        let scoped = |template: &Option<String>| {
            template
                .as_deref()
                .map(|t| t.contains(CHANNEL_PLACEHOLDER))
                .unwrap_or(false)
        };
        scoped(&self.get_command) || scoped(&self.set_command)
    }

    /// Read the property through an adapter
    pub async fn read(&self, adapter: &dyn Adapter) -> Result<Value> {
        self.read_scoped(adapter, None).await
    }

    /// Write the property through an adapter
    pub async fn write(&self, adapter: &dyn Adapter, value: Value) -> Result<()> {
        self.write_scoped(adapter, None, value).await
    }

    /// Read, substituting a channel identifier into the query template
    pub(crate) async fn read_scoped(
        &self,
        adapter: &dyn Adapter,
        channel: Option<&str>,
    ) -> Result<Value> {
        let template = self.get_command.as_deref().ok_or_else(|| {
            Error::validation(format!("Property '{}' is write-only", self.name))
        })?;
        let command = self.render(template, channel)?;
        trace!(property = %self.name, command = %command, "property read");
        let response = adapter.query(&command).await?;
        self.cast(Value::parse_scpi(&response))
    }

    /// Write, substituting a channel identifier into the set template
    pub(crate) async fn write_scoped(
        &self,
        adapter: &dyn Adapter,
        channel: Option<&str>,
        value: Value,
    ) -> Result<()> {
        let template = self.set_command.as_deref().ok_or_else(|| {
            Error::validation(format!("Property '{}' is read-only", self.name))
        })?;

        // Validation happens before anything goes on the wire.
        self.validator.validate(&self.name, &value)?;

        let header = self.render(template, channel)?;
        let command = if header.contains("{value}") {
            header.replace("{value}", &value.to_scpi())
        } else {
            format!("{} {}", header, value.to_scpi())
        };
        trace!(property = %self.name, command = %command, "property write");
        adapter.write(&command).await
    }

    fn render(&self, template: &str, channel: Option<&str>) -> Result<String> {
        if template.contains(CHANNEL_PLACEHOLDER) {
            let channel = channel.ok_or_else(|| {
                Error::validation(format!(
                    "Property '{}' must be accessed through a channel",
                    self.name
                ))
            })?;
            Ok(template.replace(CHANNEL_PLACEHOLDER, channel))
        } else {
            Ok(template.to_string())
        }
    }

    fn cast(&self, value: Value) -> Result<Value> {
        match self.kind {
            ValueKind::Auto => Ok(value),
            ValueKind::Integer => value
                .as_integer()
                .map(Value::Integer)
                .ok_or_else(|| self.cast_error(&value, "an integer")),
            ValueKind::Float => value
                .as_float()
                .map(Value::Float)
                .ok_or_else(|| self.cast_error(&value, "a number")),
            ValueKind::Text => Ok(Value::String(value.to_scpi())),
        }
    }

    fn cast_error(&self, value: &Value, expected: &str) -> Error {
        Error::validation(format!(
            "Response {:?} for property '{}' is not {}",
            value, self.name, expected
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MockAdapter;

    fn scale() -> Property {
        Property::control(
            "scale",
            "CH{ch}:SCAle?",
            "CH{ch}:SCAle",
            "Control the vertical scale of the channel in volts per division.",
        )
        .with_validator(Validator::Range { min: 0.001, max: 10.0 })
    }

    #[test]
    fn test_access_modes() {
        assert_eq!(
            Property::measurement("id", "*IDN?", "Get the identification.").access(),
            Access::ReadOnly
        );
        assert_eq!(scale().access(), Access::ReadWrite);
        assert_eq!(
            Property::setting("clear", "CLS {value}", "Set the status clear.").access(),
            Access::WriteOnly
        );
    }

    #[test]
    fn test_doc_prefix_convention() {
        let p = Property::measurement("status", "*ESR?", "Get the event status register.");
        assert_eq!(p.doc_prefix(), Some("Get"));
        assert!(p.has_convention_doc());

        let p = Property::measurement("status", "*ESR?", "Fetches the event status register.");
        assert!(!p.has_convention_doc());
    }

    #[test]
    fn test_channel_scoping() {
        assert!(scale().is_channel_scoped());
        assert!(!Property::measurement("id", "*IDN?", "Get the identification.").is_channel_scoped());
    }

    #[test]
    fn test_validator_range() {
        let v = Validator::Range { min: 0.0, max: 10.0 };
        assert!(v.validate("scale", &Value::Float(5.0)).is_ok());
        assert!(v.validate("scale", &Value::Integer(10)).is_ok());
        assert!(v.validate("scale", &Value::Float(10.5)).is_err());
        assert!(v.validate("scale", &Value::String("DC".into())).is_err());
    }

    #[test]
    fn test_validator_discrete_set() {
        let v = Validator::DiscreteSet(vec!["DC".into(), "AC".into(), "GND".into()]);
        assert!(v.validate("coupling", &Value::from("AC")).is_ok());
        assert!(v.validate("coupling", &Value::from("HF")).is_err());

        // Numeric coercion across integer and float members
        let v = Validator::DiscreteSet(vec![Value::Float(1.0), Value::Float(10.0)]);
        assert!(v.validate("probe", &Value::Integer(10)).is_ok());
        assert!(v.validate("probe", &Value::Integer(2)).is_err());
    }

    #[tokio::test]
    async fn test_read_parses_response() {
        let adapter = MockAdapter::new().with_reply("CH2:SCAle?", "5.0E-1");
        let value = scale().read_scoped(&adapter, Some("2")).await.unwrap();
        assert_eq!(value, Value::Float(0.5));
    }

    #[tokio::test]
    async fn test_write_renders_channel_and_value() {
        let adapter = MockAdapter::new();
        scale()
            .write_scoped(&adapter, Some("3"), Value::Integer(2))
            .await
            .unwrap();
        assert_eq!(adapter.commands(), vec!["CH3:SCAle 2"]);
    }

    #[tokio::test]
    async fn test_invalid_write_sends_nothing() {
        let adapter = MockAdapter::new();
        let err = scale()
            .write_scoped(&adapter, Some("1"), Value::Float(99.0))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(adapter.commands().is_empty());
    }

    #[tokio::test]
    async fn test_channel_scoped_read_requires_channel() {
        let adapter = MockAdapter::new();
        let err = scale().read(&adapter).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(adapter.commands().is_empty());
    }

    #[tokio::test]
    async fn test_kind_cast_failure() {
        let adapter = MockAdapter::new().with_reply("FREQ?", "oops");
        let p = Property::measurement("frequency", "FREQ?", "Measure the frequency in hertz.")
            .with_kind(ValueKind::Float);
        let err = p.read(&adapter).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_write_only_read_is_rejected() {
        let adapter = MockAdapter::new();
        let p = Property::setting("autoset", "AUTOS EXEC;{value}", "Set the automatic setup.");
        assert!(p.read(&adapter).await.is_err());
    }
}

/*!
 * Communication adapter abstraction for LabFlow.
 *
 * An adapter performs the raw command round trips against physical or
 * simulated hardware. Instruments never talk to a transport directly; they
 * hold exactly one adapter for their whole lifetime and funnel every
 * declared attribute through it.
 */
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use labflow_core::error::{Error, Result};
use labflow_core::types::Value;

/// Adapter trait for message-based instrument communication
///
/// `write` sends a command with no response expected; `query` sends a
/// command and reads back a single response string. Timeout enforcement is
/// the adapter's responsibility; this layer never retries.
#[async_trait]
pub trait Adapter: Send + Sync + Debug {
    /// Get the resource identifier this adapter is bound to
    fn resource(&self) -> &str;

    /// Send a command to the device
    async fn write(&self, command: &str) -> Result<()>;

    /// Send a command to the device and read back the response
    async fn query(&self, command: &str) -> Result<String>;
}

/// A shared, reference-counted adapter handle
///
/// An instrument and its channels hold clones of the same handle; the
/// binding is fixed at construction and never swapped.
pub type SharedAdapter = Arc<dyn Adapter>;

/// Options for constructing an adapter
///
/// Adapters are constructed from a resource identifier plus these options.
/// Every adapter consumes the option keys it understands and rejects the
/// rest by name through [`reject_unknown_options`].
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    /// The round-trip timeout for adapter operations
    pub timeout: Option<Duration>,
    /// Additional adapter-specific options
    pub options: HashMap<String, Value>,
}

impl AdapterOptions {
    /// Creates a new instance of adapter options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout for adapter operations
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds an adapter-specific option
    pub fn with_option<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Gets an adapter-specific option
    pub fn get_option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    /// Gets a string option
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_option(key).and_then(|v| v.as_str()).map(String::from)
    }

    /// Gets an integer option
    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.get_option(key).and_then(Value::as_integer)
    }

    /// Gets the timeout or a default value
    pub fn timeout_or(&self, default: Duration) -> Duration {
        self.timeout.unwrap_or(default)
    }
}

/// Reject any option key the adapter does not recognize
///
/// The error message names the offending keyword and the adapter type, so
/// a mistyped option surfaces at construction instead of being silently
/// ignored.
pub fn reject_unknown_options(
    adapter_type: &str,
    options: &AdapterOptions,
    known: &[&str],
) -> Result<()> {
    for key in options.options.keys() {
        if !known.contains(&key.as_str()) {
            return Err(Error::validation(format!(
                "'{}' is not a valid attribute for type {}",
                key, adapter_type
            )));
        }
    }
    Ok(())
}

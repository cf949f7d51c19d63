/*!
 * Stand-in adapter for tests and convention checks.
 */
use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::trace;

use labflow_core::error::Result;

use crate::adapter::Adapter;

/// The identification string the stand-in reports by default
///
/// The model field ends in a digit so that drivers which derive their
/// channel count from the identification still construct.
pub const DEFAULT_IDN: &str = "LabFlow,SIM2004B,000000,0.0";

/// A recording stand-in adapter
///
/// Every written command is logged; queries are answered from a
/// programmable reply table with a catch-all default of `"0"`. The common
/// identity and status queries are pre-populated so drivers that
/// communicate during construction can be built without hardware.
#[derive(Debug)]
pub struct MockAdapter {
    resource: String,
    replies: HashMap<String, String>,
    log: Mutex<Vec<String>>,
}

impl MockAdapter {
    /// Create a stand-in with the default reply table
    pub fn new() -> Self {
        Self::with_identification(DEFAULT_IDN)
    }

    /// Create a stand-in reporting a specific identification string
    pub fn with_identification<S: Into<String>>(idn: S) -> Self {
        let mut replies = HashMap::new();
        replies.insert("*IDN?".to_string(), idn.into());
        replies.insert("*ESR?".to_string(), "0".to_string());
        Self {
            resource: "MOCK::INSTR".to_string(),
            replies,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Add a canned reply for a query
    pub fn with_reply<C: Into<String>, R: Into<String>>(mut self, command: C, reply: R) -> Self {
        self.replies.insert(command.into(), reply.into());
        self
    }

    /// The commands sent so far, writes and queries alike, in order
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Default for MockAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockAdapter {
    fn resource(&self) -> &str {
        &self.resource
    }

    async fn write(&self, command: &str) -> Result<()> {
        trace!("mock write: {}", command);
        self.log.lock().unwrap().push(command.to_string());
        Ok(())
    }

    async fn query(&self, command: &str) -> Result<String> {
        trace!("mock query: {}", command);
        self.log.lock().unwrap().push(command.to_string());
        let reply = self
            .replies
            .get(command)
            .cloned()
            .unwrap_or_else(|| "0".to_string());
        Ok(reply)
    }
}

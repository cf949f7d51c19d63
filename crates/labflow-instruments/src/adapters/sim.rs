/*!
 * Simulated protocol backend.
 *
 * `SimAdapter` behaves like a small SCPI instrument: set commands update an
 * internal response table, the matching queries read it back, and a query
 * nothing ever answered models a device timeout. Unlike the recording
 * stand-in, it validates its construction options strictly.
 */
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use labflow_core::error::{Error, Result};

use crate::adapter::{reject_unknown_options, Adapter, AdapterOptions};
use crate::adapters::mock::DEFAULT_IDN;

/// Option keys understood by [`SimAdapter::open`]
const KNOWN_OPTIONS: &[&str] = &["timeout_ms", "terminator", "idn"];

/// A simulated SCPI instrument behind the [`Adapter`] trait
#[derive(Debug)]
pub struct SimAdapter {
    resource: String,
    timeout: Duration,
    replies: Mutex<HashMap<String, String>>,
    log: Mutex<Vec<String>>,
}

impl SimAdapter {
    /// Open a simulated instrument on a resource
    ///
    /// Understood option keys are `timeout_ms`, `terminator` and `idn`;
    /// any other key is rejected with an error naming it.
    pub fn open<S: Into<String>>(resource: S, options: AdapterOptions) -> Result<Self> {
        reject_unknown_options("SimAdapter", &options, KNOWN_OPTIONS)?;

        let timeout = options
            .get_integer("timeout_ms")
            .map(|ms| Duration::from_millis(ms as u64))
            .unwrap_or_else(|| options.timeout_or(Duration::from_millis(2000)));
        let idn = options
            .get_string("idn")
            .unwrap_or_else(|| DEFAULT_IDN.to_string());

        let mut replies = HashMap::new();
        replies.insert("*IDN?".to_string(), idn);
        replies.insert("*ESR?".to_string(), "0".to_string());

        Ok(Self {
            resource: resource.into(),
            timeout,
            replies: Mutex::new(replies),
            log: Mutex::new(Vec::new()),
        })
    }

    /// The commands sent so far, writes and queries alike, in order
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Adapter for SimAdapter {
    fn resource(&self) -> &str {
        &self.resource
    }

    async fn write(&self, command: &str) -> Result<()> {
        trace!("sim write: {}", command);
        self.log.lock().unwrap().push(command.to_string());

        // A set command updates the value its query form reads back.
        if let Some((header, argument)) = command.split_once(' ') {
            let key = format!("{}?", header.trim_end_matches(';'));
            self.replies
                .lock()
                .unwrap()
                .insert(key, argument.trim().to_string());
        }
        Ok(())
    }

    async fn query(&self, command: &str) -> Result<String> {
        trace!("sim query: {}", command);
        self.log.lock().unwrap().push(command.to_string());
        self.replies
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .ok_or_else(|| {
                Error::communication(format!(
                    "no response to '{}' on {} within {:?}",
                    command, self.resource, self.timeout
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_unknown_option() {
        let options = AdapterOptions::new().with_option("kwarg_test", true);
        let err = SimAdapter::open("SIM::INSTR", options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: 'kwarg_test' is not a valid attribute for type SimAdapter"
        );
    }

    #[tokio::test]
    async fn test_identity_and_status() {
        let options = AdapterOptions::new().with_option("idn", "ACME,SCOPE42B,1,1.0");
        let adapter = SimAdapter::open("SIM::INSTR", options).unwrap();
        assert_eq!(adapter.query("*IDN?").await.unwrap(), "ACME,SCOPE42B,1,1.0");
        assert_eq!(adapter.query("*ESR?").await.unwrap(), "0");
    }

    #[tokio::test]
    async fn test_set_then_query_round_trip() {
        let adapter = SimAdapter::open("SIM::INSTR", AdapterOptions::new()).unwrap();
        adapter.write("CH1:SCAle 0.5").await.unwrap();
        assert_eq!(adapter.query("CH1:SCAle?").await.unwrap(), "0.5");
    }

    #[tokio::test]
    async fn test_unanswered_query_is_communication_error() {
        let adapter = SimAdapter::open("SIM::INSTR", AdapterOptions::new()).unwrap();
        let err = adapter.query("NOPE?").await.unwrap_err();
        assert!(matches!(err, Error::Communication(_)));
    }
}

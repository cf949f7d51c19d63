/*!
 * Convention harness for LabFlow drivers.
 *
 * Structural checks applied to every driver in a registry, with no real
 * hardware: constructions run against the recording stand-in adapter, the
 * keyword check against the simulated protocol backend. A driver opts out
 * of an individual check through the metadata on its registration, and the
 * skip is reported, not silent.
 */
use std::fmt;

use tracing::debug;

use labflow_core::error::Error;

use crate::adapter::{AdapterOptions, SharedAdapter};
use crate::adapters::{MockAdapter, SimAdapter};
use crate::instrument::Instrument;
use crate::property::Property;
use crate::registry::{DriverEntry, DriverRegistry};

/// Name handed to every driver by the name-argument check
pub const TEST_NAME: &str = "Name_Test";

/// Option key used by the unknown-option check
pub const UNKNOWN_OPTION_KEY: &str = "kwarg_test";

/// The checks the harness runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    /// Constructing with a stand-in adapter must succeed
    AdapterArgument,
    /// A supplied name must be readable back unchanged
    NameArgument,
    /// An unrecognized adapter option must fail naming the option
    UnknownOption,
    /// The SCPI inclusion flag must be declared explicitly
    ScpiFlag,
    /// Every property description must start with a convention word
    DocstringConvention,
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckKind::AdapterArgument => "adapter-argument",
            CheckKind::NameArgument => "name-argument",
            CheckKind::UnknownOption => "unknown-option",
            CheckKind::ScpiFlag => "scpi-flag",
            CheckKind::DocstringConvention => "docstring-convention",
        };
        write!(f, "{}", name)
    }
}

/// The result of one check on one driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// The check passed
    Passed,
    /// The check did not run, with the reason
    Skipped(String),
    /// The check failed, with the failure message
    Failed(String),
}

/// One check outcome, attributable to a driver
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    /// The driver identifier
    pub driver: String,
    /// Which check ran
    pub check: CheckKind,
    /// How it went
    pub status: CheckStatus,
}

impl CheckOutcome {
    fn new(entry: &DriverEntry, check: CheckKind, status: CheckStatus) -> Self {
        Self {
            driver: entry.id.to_string(),
            check,
            status,
        }
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            CheckStatus::Passed => write!(f, "{}: {} passed", self.driver, self.check),
            CheckStatus::Skipped(reason) => {
                write!(f, "{}: {} skipped ({})", self.driver, self.check, reason)
            }
            CheckStatus::Failed(message) => {
                write!(f, "{}: {} failed: {}", self.driver, self.check, message)
            }
        }
    }
}

/// Reason a construction-based check cannot run for a driver, if any
fn construction_skip(entry: &DriverEntry) -> Option<String> {
    let meta = &entry.metadata;
    if meta.requires_physical_adapter {
        Some(format!("{} does not accept a generic adapter", entry.id))
    } else if meta.communicates_on_connect {
        Some(format!("{} requires device communication to connect", entry.id))
    } else if meta.channel_as_instrument {
        Some(format!("{} is a channel, not an instrument", entry.id))
    } else {
        None
    }
}

async fn construct(entry: &DriverEntry, name: Option<String>) -> Result<Box<dyn Instrument>, Error> {
    let adapter: SharedAdapter = std::sync::Arc::new(MockAdapter::new());
    (entry.connector)(adapter, name).await
}

/// Constructing with a stand-in adapter must succeed
pub async fn check_adapter_argument(entry: &DriverEntry) -> CheckOutcome {
    if let Some(reason) = construction_skip(entry) {
        return CheckOutcome::new(entry, CheckKind::AdapterArgument, CheckStatus::Skipped(reason));
    }
    let status = match construct(entry, None).await {
        Ok(_) => CheckStatus::Passed,
        Err(e) => CheckStatus::Failed(format!("construction failed: {}", e)),
    };
    CheckOutcome::new(entry, CheckKind::AdapterArgument, status)
}

/// A supplied name must read back unchanged
pub async fn check_name_argument(entry: &DriverEntry) -> CheckOutcome {
    if let Some(reason) = construction_skip(entry) {
        return CheckOutcome::new(entry, CheckKind::NameArgument, CheckStatus::Skipped(reason));
    }
    let status = match construct(entry, Some(TEST_NAME.to_string())).await {
        Ok(instrument) if instrument.name() == TEST_NAME => CheckStatus::Passed,
        Ok(instrument) => CheckStatus::Failed(format!(
            "name reads back as '{}', not '{}'",
            instrument.name(),
            TEST_NAME
        )),
        Err(e) => CheckStatus::Failed(format!("construction failed: {}", e)),
    };
    CheckOutcome::new(entry, CheckKind::NameArgument, status)
}

/// An unrecognized option handed to the adapter must fail naming it
///
/// The simulated backend stands in for the transport: the driver is never
/// reached because the adapter refuses to open.
pub async fn check_unknown_option(entry: &DriverEntry) -> CheckOutcome {
    if let Some(reason) = construction_skip(entry) {
        return CheckOutcome::new(entry, CheckKind::UnknownOption, CheckStatus::Skipped(reason));
    }
    let options = AdapterOptions::new().with_option(UNKNOWN_OPTION_KEY, true);
    let status = match SimAdapter::open("SIM::INSTR", options) {
        Err(e) => {
            let message = e.to_string();
            if message.contains(&format!("'{}'", UNKNOWN_OPTION_KEY)) {
                CheckStatus::Passed
            } else {
                CheckStatus::Failed(format!(
                    "rejection does not name the offending option: {}",
                    message
                ))
            }
        }
        Ok(_) => CheckStatus::Failed("unrecognized option was accepted".to_string()),
    };
    CheckOutcome::new(entry, CheckKind::UnknownOption, status)
}

/// The SCPI inclusion flag must be declared explicitly
pub async fn check_scpi_flag(entry: &DriverEntry) -> CheckOutcome {
    if entry.metadata.scpi_flag_grandfathered {
        return CheckOutcome::new(
            entry,
            CheckKind::ScpiFlag,
            CheckStatus::Skipped(format!("{} does not yet declare the SCPI flag", entry.id)),
        );
    }
    if let Some(reason) = construction_skip(entry) {
        return CheckOutcome::new(entry, CheckKind::ScpiFlag, CheckStatus::Skipped(reason));
    }
    let status = match construct(entry, None).await {
        Ok(instrument) if instrument.info().scpi.is_some() => CheckStatus::Passed,
        Ok(_) => CheckStatus::Failed("SCPI inclusion flag left undeclared".to_string()),
        Err(e) => CheckStatus::Failed(format!("construction failed: {}", e)),
    };
    CheckOutcome::new(entry, CheckKind::ScpiFlag, status)
}

/// Every property description must start with a convention word
///
/// Covers the instrument's own properties and those of every channel.
pub async fn check_docstring_convention(entry: &DriverEntry) -> CheckOutcome {
    if entry.metadata.docstring_grandfathered {
        return CheckOutcome::new(
            entry,
            CheckKind::DocstringConvention,
            CheckStatus::Skipped(format!("{} has to be refactored later on", entry.id)),
        );
    }
    if let Some(reason) = construction_skip(entry) {
        return CheckOutcome::new(entry, CheckKind::DocstringConvention, CheckStatus::Skipped(reason));
    }
    let instrument = match construct(entry, None).await {
        Ok(instrument) => instrument,
        Err(e) => {
            return CheckOutcome::new(
                entry,
                CheckKind::DocstringConvention,
                CheckStatus::Failed(format!("construction failed: {}", e)),
            )
        }
    };

    let mut offenders: Vec<String> = Vec::new();
    let mut inspect = |scope: &str, property: &Property| {
        if !property.has_convention_doc() {
            offenders.push(format!(
                "{}.{} starts with '{}'",
                scope,
                property.name(),
                property.doc_prefix().unwrap_or("")
            ));
        }
    };
    for property in instrument.properties() {
        inspect(entry.id, property);
    }
    for channel in instrument.channels() {
        for property in channel.properties() {
            inspect(&format!("{}.ch{}", entry.id, channel.id()), property);
        }
    }

    let status = if offenders.is_empty() {
        CheckStatus::Passed
    } else {
        CheckStatus::Failed(offenders.join("; "))
    };
    CheckOutcome::new(entry, CheckKind::DocstringConvention, status)
}

/// Run every check for every registered driver
pub async fn run_all(registry: &DriverRegistry) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::new();
    for entry in registry.iter() {
        debug!("Checking driver '{}'", entry.id);
        outcomes.push(check_adapter_argument(entry).await);
        outcomes.push(check_name_argument(entry).await);
        outcomes.push(check_unknown_option(entry).await);
        outcomes.push(check_scpi_flag(entry).await);
        outcomes.push(check_docstring_convention(entry).await);
    }
    outcomes
}

/// The failed outcomes of a run
pub fn failures(outcomes: &[CheckOutcome]) -> Vec<&CheckOutcome> {
    outcomes
        .iter()
        .filter(|o| matches!(o.status, CheckStatus::Failed(_)))
        .collect()
}

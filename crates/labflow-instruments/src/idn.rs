/*!
 * Identification string handling.
 *
 * The `*IDN?` reply is a comma-separated string of manufacturer, model,
 * serial number and firmware revision. For instrument families that encode
 * their channel count in the model number (Tektronix TBS2XXNB: N channels),
 * the count is the trailing digit of the model field.
 */
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use labflow_core::error::{Error, Result};

/// A parsed `*IDN?` reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    /// Manufacturer name (first field)
    pub manufacturer: String,
    /// Model number (second field)
    pub model: String,
    /// Serial number (third field, may be empty)
    pub serial: String,
    /// Firmware revision (fourth field, may be empty)
    pub firmware: String,
}

impl FromStr for Identification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if fields.len() < 2 {
            return Err(Error::construction(format!(
                "identification string '{}' has fewer than two comma-separated fields",
                trimmed
            )));
        }
        Ok(Self {
            manufacturer: fields[0].to_string(),
            model: fields[1].to_string(),
            serial: fields.get(2).copied().unwrap_or_default().to_string(),
            firmware: fields.get(3).copied().unwrap_or_default().to_string(),
        })
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.manufacturer, self.model, self.serial, self.firmware
        )
    }
}

impl Identification {
    /// The channel count encoded as the trailing digit of the model field
    ///
    /// Model numbers may carry a revision suffix after the digit (TBS2204B
    /// is a four-channel TBS2XXNB); the suffix letters are stripped before
    /// the digit is taken. One-shot and unverified against the hardware: a
    /// model with no trailing digit fails construction of the calling
    /// driver.
    pub fn channel_count(&self) -> Result<u32> {
        let stem = self.model.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        stem.chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| {
                Error::construction(format!(
                    "model '{}' does not end in a channel-count digit",
                    self.model
                ))
            })
    }
}

/*!
 * Error types for the LabFlow core crate.
 */
use thiserror::Error;

/// Error type for LabFlow operations
#[derive(Error, Debug)]
pub enum Error {
    /// Adapter I/O failure or device timeout; never retried at this layer
    #[error("Communication error: {0}")]
    Communication(String),

    /// A value fell outside its declared range or set, or a device response
    /// could not be parsed into the expected type
    #[error("Validation error: {0}")]
    Validation(String),

    /// Device construction failed, typically on a malformed identification
    /// string; no partial device is ever returned
    #[error("Construction error: {0}")]
    Construction(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other error
    #[error("Other error: {0}")]
    Other(String),
}

/// Result type for LabFlow operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new communication error
    pub fn communication<S: AsRef<str>>(msg: S) -> Self {
        Error::Communication(msg.as_ref().to_string())
    }

    /// Create a new validation error
    pub fn validation<S: AsRef<str>>(msg: S) -> Self {
        Error::Validation(msg.as_ref().to_string())
    }

    /// Create a new construction error
    pub fn construction<S: AsRef<str>>(msg: S) -> Self {
        Error::Construction(msg.as_ref().to_string())
    }

    /// Create a new configuration error
    pub fn config<S: AsRef<str>>(msg: S) -> Self {
        Error::Config(msg.as_ref().to_string())
    }

    /// Create a new timeout error
    pub fn timeout<S: AsRef<str>>(msg: S) -> Self {
        Error::Timeout(msg.as_ref().to_string())
    }

    /// Create a new other error
    pub fn other<S: AsRef<str>>(msg: S) -> Self {
        Error::Other(msg.as_ref().to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Error types for the strip reader
//!
//! Startup errors (no sensor, serial port refused) are fatal and bubble up
//! through [`AppResult`]. Data-path errors (a dropped frame, a failed packet
//! write) are logged at the call site and the scan loop keeps running.

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Sensor-related errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    /// Serial link errors
    #[error("Link error: {0}")]
    Link(#[from] LinkError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Image sensor errors
#[derive(Debug, Error)]
pub enum SensorError {
    /// No capture devices found
    #[error("No capture devices found")]
    NoDeviceFound,
    /// Sensor initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
    /// Sensor disconnected during operation
    #[error("Sensor disconnected")]
    Disconnected,
    /// Sensor negotiated a pixel format we cannot read
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// A single frame capture failed
    #[error("Capture failed: {0}")]
    CaptureFailed(String),
}

/// Report link errors
#[derive(Debug, Error)]
pub enum LinkError {
    /// Opening the port failed
    #[error("Failed to open {port}: {reason}")]
    OpenFailed {
        /// Port path as given on the command line
        port: String,
        /// Underlying driver message
        reason: String,
    },
    /// A packet write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),
}

// Conversion from String for ad-hoc error sites
impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::WriteFailed(err.to_string())
    }
}

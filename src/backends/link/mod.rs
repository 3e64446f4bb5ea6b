// SPDX-License-Identifier: MPL-2.0

//! Report link backends
//!
//! A report link carries finished packets to the downstream flow
//! controller. The protocol is one way: packets go out, nothing comes
//! back, and a failed write costs one packet but never stops the scan.

pub mod serial;

pub use serial::SerialLink;

use crate::errors::LinkError;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Transport for outbound packets
pub trait ReportLink {
    /// Human-readable link name for logs
    fn name(&self) -> &str;

    /// Queue one packet for transmission
    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError>;
}

/// Link that prints packets to stdout, for dry runs without hardware
pub struct StdoutLink;

impl ReportLink for StdoutLink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", String::from_utf8_lossy(bytes))?;
        Ok(())
    }
}

/// Link that records packets in memory
///
/// Clones share the same store, so a caller can hand one clone to the scan
/// loop and read the traffic back through another. Used by the probe
/// command and the integration tests.
#[derive(Clone, Default)]
pub struct MemoryLink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryLink {
    /// Create an empty link
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every packet sent so far, oldest first
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ReportLink for MemoryLink {
    fn name(&self) -> &str {
        "memory"
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(bytes.to_vec());
        }
        Ok(())
    }
}

/// Names of serial ports present on the system
pub fn available_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
        Err(_) => Vec::new(),
    }
}

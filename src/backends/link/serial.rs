// SPDX-License-Identifier: MPL-2.0

//! Serial port report link
//!
//! The downstream flow controller listens on a UART at 115200 8N1 and acts
//! on whatever packets arrive. There is no acknowledgement in the protocol,
//! so writes are flushed and forgotten.

use crate::backends::link::ReportLink;
use crate::constants::serial;
use crate::errors::LinkError;
use serialport::SerialPort;
use std::io::Write;
use std::time::Duration;
use tracing::info;

/// Report link over a serial port
pub struct SerialLink {
    name: String,
    port: Box<dyn SerialPort>,
}

impl SerialLink {
    /// Open a serial port at the protocol baud rate
    pub fn open(port_path: &str) -> Result<Self, LinkError> {
        let port = serialport::new(port_path, serial::BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .timeout(Duration::from_millis(serial::WRITE_TIMEOUT_MS))
            .open()
            .map_err(|e| LinkError::OpenFailed {
                port: port_path.to_string(),
                reason: e.to_string(),
            })?;

        info!(port = port_path, baud = serial::BAUD_RATE, "Serial link opened");

        Ok(Self {
            name: format!("serial:{}", port_path),
            port,
        })
    }
}

impl ReportLink for SerialLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }
}

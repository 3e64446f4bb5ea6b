// SPDX-License-Identifier: MPL-2.0

//! StripScan - reader pipeline for a quad chemical test strip
//!
//! This library contains the full scan path of the strip reader: sensor
//! capture, per-region measurement, slot aggregation, and serial report
//! framing.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Image sensor and report link abstraction
//! - [`imaging`]: RGB565 conversion, luminance and blob extraction
//! - [`pipeline`]: Region cycling, aggregation, framing and the scan loop
//! - [`constants`]: Compiled-in device configuration
//! - [`errors`]: Error taxonomy shared across the crate
//!
//! # Example
//!
//! ```ignore
//! // Headless scan against the built-in pattern:
//! // stripscan run --simulate --stdout --cycles 4
//! ```

pub mod backends;
pub mod constants;
pub mod errors;
pub mod imaging;
pub mod pipeline;

// Re-export commonly used types
pub use backends::link::{MemoryLink, ReportLink, SerialLink, StdoutLink};
pub use backends::sensor::{ImageSensor, SensorFrame, SensorRotation, SimSensor, V4lSensor};
pub use errors::{AppError, AppResult};
pub use pipeline::{FrameCollector, Packetizer, RegionTable, Report, ScanRunner, ScanScheduler};

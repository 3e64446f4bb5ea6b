// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for frame capture and packet transport
//!
//! This module provides hardware-facing implementations for:
//! - Frame capture via V4L2 (plus a simulated sensor for dry runs)
//! - Packet transport over a serial UART (plus stdout/memory stand-ins)
//!
//! # Architecture
//!
//! The backend layer keeps hardware access out of the scan pipeline, which
//! only sees the two traits:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Scan Pipeline                  │
//! └──────────┬──────────────────────┬───────────┘
//!            │ ImageSensor          │ ReportLink
//! ┌──────────┴──────────┐ ┌─────────┴───────────┐
//! │       Sensor        │ │        Link         │
//! │  ┌──────┐ ┌──────┐  │ │  ┌──────┐ ┌──────┐  │
//! │  │ V4L2 │ │ Sim  │  │ │  │ UART │ │Stdout│  │
//! │  └──────┘ └──────┘  │ │  └──────┘ └──────┘  │
//! └─────────────────────┘ └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`sensor`]: RGB565 frame capture and the frame/window types
//! - [`link`]: outbound packet transport to the flow controller

pub mod link;
pub mod sensor;

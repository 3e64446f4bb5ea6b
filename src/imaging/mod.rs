// SPDX-License-Identifier: GPL-3.0-only

//! Pixel-level analysis of sensor frames
//!
//! # Modules
//!
//! - [`convert`]: RGB565 conversion, luma, and window smoothing
//! - [`blobs`]: connected-component extraction over a color mask

pub mod blobs;
pub mod convert;

// SPDX-License-Identifier: GPL-3.0-only
// Shared types for image sensor backends

//! Image sensor backends
//!
//! A sensor backend produces QVGA RGB565 frames for the scan loop. Two
//! implementations exist: a V4L2 capture device for the bench reader and a
//! simulated sensor for tests and dry runs.

pub mod sim;
pub mod v4l2;

use crate::errors::SensorError;
use std::sync::Arc;

pub use sim::SimSensor;
pub use v4l2::V4lSensor;

/// Bytes per RGB565 pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// A rectangular window in sensor coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in pixels
    pub w: u32,
    /// Height in pixels
    pub h: u32,
}

impl CropRect {
    /// Create a new rectangle
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Area of the rectangle in pixels
    pub fn area(&self) -> u32 {
        self.w * self.h
    }
}

impl std::fmt::Display for CropRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.w, self.h, self.x, self.y)
    }
}

/// Sensor rotation in degrees (clockwise)
///
/// The sensor board is mounted at whatever angle the enclosure dictates, so
/// deployments correct the frame orientation in software before any window
/// geometry is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    pub fn from_degrees_int(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// A single RGB565 frame from the sensor
///
/// Pixel words are stored little-endian, two bytes per pixel, row-major with
/// no row padding. Frames are cheap to clone; the buffer is shared.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    data: Arc<[u8]>,
    width: u32,
    height: u32,
}

impl SensorFrame {
    /// Wrap a raw RGB565 buffer, validating its size against the dimensions
    pub fn from_bytes(data: Arc<[u8]>, width: u32, height: u32) -> Option<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return None;
        }
        Some(Self {
            data,
            width,
            height,
        })
    }

    /// Build a frame from pixel words
    pub fn from_words(words: &[u16], width: u32, height: u32) -> Option<Self> {
        if words.len() != width as usize * height as usize {
            return None;
        }
        // cast_slice yields the little-endian wire layout; all supported
        // hosts are little-endian
        let bytes: Arc<[u8]> = bytemuck::cast_slice(words).into();
        Some(Self {
            data: bytes,
            width,
            height,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw little-endian RGB565 bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decode the buffer into pixel words
    pub fn words(&self) -> Vec<u16> {
        // copies, so the Arc buffer needs no alignment guarantee
        bytemuck::pod_collect_to_vec(&self.data[..])
    }

    /// Pixel word at (x, y); callers keep coordinates in bounds
    pub fn pixel(&self, x: u32, y: u32) -> u16 {
        let idx = (y * self.width + x) as usize * BYTES_PER_PIXEL;
        u16::from_le_bytes([self.data[idx], self.data[idx + 1]])
    }

    /// Copy out a window of the frame
    ///
    /// Returns `None` when the rectangle is empty or falls outside the
    /// frame, so a bad window skips the frame instead of tearing pixels
    /// from the wrong rows.
    pub fn crop(&self, rect: CropRect) -> Option<SensorFrame> {
        if rect.w == 0 || rect.h == 0 {
            return None;
        }
        let right = rect.x.checked_add(rect.w)?;
        let bottom = rect.y.checked_add(rect.h)?;
        if right > self.width || bottom > self.height {
            return None;
        }
        let stride = self.width as usize * BYTES_PER_PIXEL;
        let row_len = rect.w as usize * BYTES_PER_PIXEL;
        let mut out = Vec::with_capacity(rect.h as usize * row_len);
        for row in rect.y..bottom {
            let start = row as usize * stride + rect.x as usize * BYTES_PER_PIXEL;
            out.extend_from_slice(&self.data[start..start + row_len]);
        }
        Some(SensorFrame {
            data: out.into(),
            width: rect.w,
            height: rect.h,
        })
    }

    /// Rotate the frame clockwise by the given amount
    ///
    /// `None` is free (the buffer is shared); the other rotations remap
    /// every pixel word into a fresh buffer.
    pub fn rotated(&self, rotation: SensorRotation) -> SensorFrame {
        if rotation == SensorRotation::None {
            return self.clone();
        }
        let src = self.words();
        let (sw, sh) = (self.width as usize, self.height as usize);
        let (dw, dh) = if rotation.swaps_dimensions() {
            (sh, sw)
        } else {
            (sw, sh)
        };
        let mut dst = vec![0u16; sw * sh];
        for y in 0..dh {
            for x in 0..dw {
                let (sx, sy) = match rotation {
                    SensorRotation::None => (x, y),
                    SensorRotation::Rotate90 => (y, sh - 1 - x),
                    SensorRotation::Rotate180 => (sw - 1 - x, sh - 1 - y),
                    SensorRotation::Rotate270 => (sw - 1 - y, x),
                };
                dst[y * dw + x] = src[sy * sw + sx];
            }
        }
        SensorFrame::from_words(&dst, dw as u32, dh as u32)
            .expect("rotated buffer should match dimensions")
    }
}

/// Image sensor abstraction used by the scan loop
///
/// Implementations block in `capture_frame` until a frame arrives or their
/// capture timeout expires. A failed capture is reported as an error and the
/// caller decides whether to keep going; only construction failures are
/// treated as fatal.
pub trait ImageSensor {
    /// Human-readable source name for logs
    fn name(&self) -> &str;

    /// Block until the next frame is available
    fn capture_frame(&mut self) -> Result<SensorFrame, SensorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> SensorFrame {
        let words: Vec<u16> = (0..width * height).map(|i| i as u16).collect();
        SensorFrame::from_words(&words, width, height).unwrap()
    }

    #[test]
    fn test_from_bytes_validates_size() {
        let data: Arc<[u8]> = vec![0u8; 8].into();
        assert!(SensorFrame::from_bytes(data.clone(), 2, 2).is_some());
        assert!(
            SensorFrame::from_bytes(data, 3, 2).is_none(),
            "short buffer must be rejected"
        );
    }

    #[test]
    fn test_words_round_trip() {
        let frame = gradient_frame(4, 2);
        assert_eq!(frame.words(), (0u16..8).collect::<Vec<_>>());
        assert_eq!(frame.pixel(3, 1), 7);
    }

    #[test]
    fn test_crop_copies_window() {
        let frame = gradient_frame(4, 4);
        let window = frame.crop(CropRect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(window.width(), 2);
        assert_eq!(window.height(), 2);
        assert_eq!(window.words(), vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_crop_out_of_bounds() {
        let frame = gradient_frame(4, 4);
        assert!(frame.crop(CropRect::new(3, 0, 2, 2)).is_none());
        assert!(frame.crop(CropRect::new(0, 0, 0, 2)).is_none());
        assert!(
            frame.crop(CropRect::new(u32::MAX, 0, 2, 2)).is_none(),
            "overflow in the right edge must not panic"
        );
    }

    #[test]
    fn test_rotate_90_remaps_corners() {
        let frame = gradient_frame(3, 2);
        // 0 1 2      3 0
        // 3 4 5  ->  4 1
        //            5 2
        let rotated = frame.rotated(SensorRotation::Rotate90);
        assert_eq!(rotated.width(), 2);
        assert_eq!(rotated.height(), 3);
        assert_eq!(rotated.words(), vec![3, 0, 4, 1, 5, 2]);
    }

    #[test]
    fn test_rotate_180_twice_is_identity() {
        let frame = gradient_frame(4, 3);
        let twice = frame
            .rotated(SensorRotation::Rotate180)
            .rotated(SensorRotation::Rotate180);
        assert_eq!(twice.words(), frame.words());
    }

    #[test]
    fn test_rotation_parsing() {
        assert_eq!(SensorRotation::from_degrees_int(90), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees_int(-90), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees_int(450), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees_int(0), SensorRotation::None);
        assert!(SensorRotation::Rotate270.swaps_dimensions());
        assert!(!SensorRotation::Rotate180.swaps_dimensions());
    }
}

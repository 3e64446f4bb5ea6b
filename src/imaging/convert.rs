// SPDX-License-Identifier: GPL-3.0-only
//! RGB565 pixel conversion and window statistics
//!
//! The sensor delivers 16-bit RGB565 words. Everything downstream wants
//! either 8-bit RGB triplets or a scalar luma, so the conversions live here
//! in one place for both measurement modes.

use crate::backends::sensor::SensorFrame;

/// Expand an RGB565 word to an 8-bit RGB triplet
///
/// RGB565 layout: `rrrrrggg gggbbbbb` (bits 15..0). The low bits of each
/// 8-bit channel are filled by replicating the high bits, so full-scale 565
/// maps to full-scale 888.
pub fn rgb565_to_rgb(word: u16) -> [u8; 3] {
    let r5 = ((word >> 11) & 0x1F) as u8;
    let g6 = ((word >> 5) & 0x3F) as u8;
    let b5 = (word & 0x1F) as u8;
    [
        (r5 << 3) | (r5 >> 2),
        (g6 << 2) | (g6 >> 4),
        (b5 << 3) | (b5 >> 2),
    ]
}

/// Pack an 8-bit RGB triplet into an RGB565 word
pub fn rgb_to_rgb565(rgb: [u8; 3]) -> u16 {
    let r5 = (rgb[0] >> 3) as u16;
    let g6 = (rgb[1] >> 2) as u16;
    let b5 = (rgb[2] >> 3) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Luma of an RGB triplet using BT.601 coefficients
pub fn luma(rgb: [u8; 3]) -> f64 {
    0.299 * rgb[0] as f64 + 0.587 * rgb[1] as f64 + 0.114 * rgb[2] as f64
}

/// Mean luma over a whole frame or window
///
/// An empty frame yields 0.0 rather than NaN so downstream truncation
/// stays well defined.
pub fn mean_luma(frame: &SensorFrame) -> f64 {
    let words = frame.words();
    if words.is_empty() {
        return 0.0;
    }
    let sum: f64 = words.iter().map(|&w| luma(rgb565_to_rgb(w))).sum();
    sum / words.len() as f64
}

/// Smooth a frame with a 3x3 gaussian kernel
///
/// Kernel is the standard [1 2 1; 2 4 2; 1 2 1] / 16, applied per channel
/// in 8-bit RGB space with edge rows and columns replicated. Knocks the
/// sensor noise off a window before blob extraction.
pub fn gaussian3(frame: &SensorFrame) -> SensorFrame {
    const KERNEL: [[u32; 3]; 3] = [[1, 2, 1], [2, 4, 2], [1, 2, 1]];

    let w = frame.width() as i64;
    let h = frame.height() as i64;
    let rgb: Vec<[u8; 3]> = frame.words().iter().map(|&p| rgb565_to_rgb(p)).collect();
    let mut out = vec![0u16; rgb.len()];

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u32; 3];
            for (ky, row) in KERNEL.iter().enumerate() {
                for (kx, &k) in row.iter().enumerate() {
                    let sy = (y + ky as i64 - 1).clamp(0, h - 1);
                    let sx = (x + kx as i64 - 1).clamp(0, w - 1);
                    let px = rgb[(sy * w + sx) as usize];
                    acc[0] += k * px[0] as u32;
                    acc[1] += k * px[1] as u32;
                    acc[2] += k * px[2] as u32;
                }
            }
            out[(y * w + x) as usize] =
                rgb_to_rgb565([(acc[0] / 16) as u8, (acc[1] / 16) as u8, (acc[2] / 16) as u8]);
        }
    }

    SensorFrame::from_words(&out, frame.width(), frame.height())
        .expect("smoothed buffer should match dimensions")
}

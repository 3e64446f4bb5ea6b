// SPDX-License-Identifier: GPL-3.0-only
//! Connected-component blob extraction
//!
//! Finds contiguous runs of reagent-colored pixels inside a strip window.
//! Components are grown with a 4-connected flood fill over a color mask,
//! then filtered by pixel count and bounding-box area so specks of dust
//! do not register as a pad.

use crate::backends::sensor::{CropRect, SensorFrame};
use crate::constants::measure;
use crate::imaging::convert::rgb565_to_rgb;

/// Inclusive RGB bounds describing a target color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRange {
    /// (min, max) for the red channel
    pub r: (u8, u8),
    /// (min, max) for the green channel
    pub g: (u8, u8),
    /// (min, max) for the blue channel
    pub b: (u8, u8),
}

impl ColorRange {
    /// Bounds of the developed reagent color
    pub fn reagent() -> Self {
        Self {
            r: measure::REAGENT_RED,
            g: measure::REAGENT_GREEN,
            b: measure::REAGENT_BLUE,
        }
    }

    /// Check whether a pixel falls inside the range
    pub fn contains(&self, rgb: [u8; 3]) -> bool {
        self.r.0 <= rgb[0]
            && rgb[0] <= self.r.1
            && self.g.0 <= rgb[1]
            && rgb[1] <= self.g.1
            && self.b.0 <= rgb[2]
            && rgb[2] <= self.b.1
    }
}

/// One connected component of in-range pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    /// Number of pixels in the component
    pub pixels: u32,
    /// Bounding box in frame coordinates
    pub rect: CropRect,
    /// Unweighted centroid of the member pixels
    pub centroid: (f64, f64),
}

impl Blob {
    /// Bounding-box area in pixels
    pub fn bbox_area(&self) -> u32 {
        self.rect.area()
    }
}

/// Find all blobs of in-range pixels in a frame
///
/// A component is kept when it has at least `min_pixels` member pixels and
/// its bounding box covers at least `min_area` pixels. Candidates are
/// returned in scan order; callers pick the one they want.
pub fn find_blobs(
    frame: &SensorFrame,
    range: &ColorRange,
    min_pixels: usize,
    min_area: u32,
) -> Vec<Blob> {
    let w = frame.width() as usize;
    let h = frame.height() as usize;
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let mask: Vec<bool> = frame
        .words()
        .iter()
        .map(|&word| range.contains(rgb565_to_rgb(word)))
        .collect();
    let mut visited = vec![false; mask.len()];
    let mut blobs = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        // Grow the component with a 4-connected flood fill
        let mut queue = vec![start];
        visited[start] = true;
        let mut pixels = 0u32;
        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        let (mut sum_x, mut sum_y) = (0u64, 0u64);

        while let Some(idx) = queue.pop() {
            let x = idx % w;
            let y = idx / w;
            pixels += 1;
            sum_x += x as u64;
            sum_y += y as u64;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            for (dx, dy) in [(0i64, 1i64), (0, -1), (1, 0), (-1, 0)] {
                let nx = x as i64 + dx;
                let ny = y as i64 + dy;
                if nx < 0 || nx >= w as i64 || ny < 0 || ny >= h as i64 {
                    continue;
                }
                let nidx = ny as usize * w + nx as usize;
                if mask[nidx] && !visited[nidx] {
                    visited[nidx] = true;
                    queue.push(nidx);
                }
            }
        }

        let rect = CropRect::new(
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        );
        if pixels as usize >= min_pixels && rect.area() >= min_area {
            blobs.push(Blob {
                pixels,
                rect,
                centroid: (
                    sum_x as f64 / pixels as f64,
                    sum_y as f64 / pixels as f64,
                ),
            });
        }
    }

    blobs
}

// SPDX-License-Identifier: GPL-3.0-only

//! Frame collection: one frame in, at most one sample out
//!
//! The collector crops the active region's window out of a frame and
//! reduces it to a single scalar. Two measurement modes exist, mirroring
//! the two chemistries the reader supports: flat pads are measured by mean
//! intensity, speckled pads by the size of the developed blob.

use crate::backends::sensor::SensorFrame;
use crate::constants::measure;
use crate::imaging::blobs::{self, ColorRange};
use crate::imaging::convert;
use crate::pipeline::regions::Region;

/// How a window becomes a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleSource {
    /// Mean window luma scaled by a fixed gain
    Intensity {
        /// Multiplier applied to the mean luma
        gain: f64,
    },
    /// Pixel count of the largest reagent-colored blob in the window
    Blobs {
        /// Color bounds for the developed reagent
        range: ColorRange,
        /// Minimum pixel count for a candidate
        min_pixels: usize,
        /// Minimum bounding-box area for a candidate
        min_area: u32,
        /// Smooth the window before extraction
        smooth: bool,
    },
}

impl SampleSource {
    /// Intensity mode with the build-time gain
    pub fn intensity() -> Self {
        SampleSource::Intensity {
            gain: measure::INTENSITY_GAIN,
        }
    }

    /// Blob mode with the build-time reagent bounds and thresholds
    pub fn blobs() -> Self {
        SampleSource::Blobs {
            range: ColorRange::reagent(),
            min_pixels: measure::BLOB_MIN_PIXELS,
            min_area: measure::BLOB_MIN_AREA,
            smooth: true,
        }
    }

    /// Short mode name for logs
    pub fn name(&self) -> &'static str {
        match self {
            SampleSource::Intensity { .. } => "intensity",
            SampleSource::Blobs { .. } => "blobs",
        }
    }
}

/// Turns frames into per-region samples
#[derive(Debug, Clone)]
pub struct FrameCollector {
    source: SampleSource,
}

impl FrameCollector {
    /// Collector for the given measurement mode
    pub fn new(source: SampleSource) -> Self {
        Self { source }
    }

    /// Short mode name for logs
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Measure one region on one frame
    ///
    /// Returns `None` when the window cannot be cropped from the frame or
    /// when blob mode finds no candidate; the frame then contributes
    /// nothing to the slot.
    pub fn collect(&self, frame: &SensorFrame, region: &Region) -> Option<f64> {
        let window = frame.crop(region.window)?;
        match &self.source {
            SampleSource::Intensity { gain } => Some(convert::mean_luma(&window) * gain),
            SampleSource::Blobs {
                range,
                min_pixels,
                min_area,
                smooth,
            } => {
                let window = if *smooth {
                    convert::gaussian3(&window)
                } else {
                    window
                };
                blobs::find_blobs(&window, range, *min_pixels, *min_area)
                    .into_iter()
                    .max_by_key(|b| b.pixels)
                    .map(|b| b.pixels as f64)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sensor::CropRect;

    fn region_at(x: u32, y: u32, w: u32, h: u32) -> Region {
        Region {
            id: 1,
            window: CropRect::new(x, y, w, h),
        }
    }

    fn white_frame(width: u32, height: u32) -> SensorFrame {
        SensorFrame::from_words(&vec![0xFFFFu16; (width * height) as usize], width, height)
            .unwrap()
    }

    #[test]
    fn test_intensity_scales_mean_luma() {
        let collector = FrameCollector::new(SampleSource::intensity());
        let frame = white_frame(16, 16);
        let sample = collector.collect(&frame, &region_at(2, 2, 8, 8)).unwrap();
        // White window: luma 255, gain 4
        assert!((sample - 1020.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_outside_frame_is_no_sample() {
        let collector = FrameCollector::new(SampleSource::intensity());
        let frame = white_frame(16, 16);
        assert!(collector.collect(&frame, &region_at(12, 12, 8, 8)).is_none());
    }

    #[test]
    fn test_blobs_counts_largest_pad() {
        // Unsmoothed so the pad size is exact
        let collector = FrameCollector::new(SampleSource::Blobs {
            range: ColorRange::reagent(),
            min_pixels: 4,
            min_area: 4,
            smooth: false,
        });
        let green = crate::imaging::convert::rgb_to_rgb565([0, 200, 0]);
        let mut words = vec![0u16; 256];
        // 6x4 pad at (2, 2) and a 2x2 speck at (12, 12), both in a 16x16 frame
        for y in 2..6 {
            for x in 2..8 {
                words[y * 16 + x] = green;
            }
        }
        for y in 12..14 {
            for x in 12..14 {
                words[y * 16 + x] = green;
            }
        }
        let frame = SensorFrame::from_words(&words, 16, 16).unwrap();
        let sample = collector.collect(&frame, &region_at(0, 0, 16, 16)).unwrap();
        assert!((sample - 24.0).abs() < 1e-9, "largest pad has 24 pixels");
    }

    #[test]
    fn test_blobs_without_candidate_is_no_sample() {
        let collector = FrameCollector::new(SampleSource::blobs());
        let frame = white_frame(16, 16);
        assert!(
            collector.collect(&frame, &region_at(0, 0, 16, 16)).is_none(),
            "white window holds no reagent-colored pixels"
        );
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Simulated image sensor
//!
//! Serves a fixed RGB565 frame on every capture: either a synthetic carrier
//! pattern or an image file scaled to the sensor resolution. Used for dry
//! runs on machines without the reader hardware and as the sensor in the
//! integration tests.

use crate::backends::sensor::{ImageSensor, SensorFrame};
use crate::constants::geometry;
use crate::errors::SensorError;
use crate::imaging::convert::rgb_to_rgb565;
use image::imageops::FilterType;
use std::path::Path;
use tracing::info;

/// Green level painted into each strip window of the synthetic pattern
///
/// All four sit inside the reagent color bounds so both measurement modes
/// see every pad.
const PAD_GREEN_LEVELS: [u8; geometry::REGION_COUNT] = [96, 128, 192, 240];

/// Gray level of the carrier background in the synthetic pattern
const BACKGROUND_LEVEL: u8 = 24;

/// Sensor stand-in that replays one frame forever
pub struct SimSensor {
    name: String,
    frame: SensorFrame,
    frames_served: u64,
}

impl SimSensor {
    /// Sensor serving the synthetic carrier pattern
    ///
    /// The pattern is a dark field with each strip window filled by a flat
    /// green pad, brighter from left to right.
    pub fn test_pattern() -> Self {
        let width = geometry::FRAME_WIDTH;
        let height = geometry::FRAME_HEIGHT;
        let background = rgb_to_rgb565([BACKGROUND_LEVEL, BACKGROUND_LEVEL, BACKGROUND_LEVEL]);
        let mut words = vec![background; (width * height) as usize];
        for (index, &x) in geometry::WINDOW_X.iter().enumerate() {
            let pad = rgb_to_rgb565([0, PAD_GREEN_LEVELS[index], 0]);
            for row in geometry::WINDOW_Y..geometry::WINDOW_Y + geometry::WINDOW_HEIGHT {
                for col in x..x + geometry::WINDOW_WIDTH {
                    words[(row * width + col) as usize] = pad;
                }
            }
        }
        let frame = SensorFrame::from_words(&words, width, height)
            .expect("pattern buffer should match dimensions");
        Self {
            name: "test-pattern".to_string(),
            frame,
            frames_served: 0,
        }
    }

    /// Sensor serving an image file, scaled to the sensor resolution
    pub fn from_image(path: &Path) -> Result<Self, SensorError> {
        info!(path = %path.display(), "Loading still image");

        let img = image::open(path).map_err(|e| {
            SensorError::InitializationFailed(format!(
                "failed to load image '{}': {}",
                path.display(),
                e
            ))
        })?;

        let width = geometry::FRAME_WIDTH;
        let height = geometry::FRAME_HEIGHT;
        let rgb = image::imageops::resize(&img.to_rgb8(), width, height, FilterType::Triangle);
        let words: Vec<u16> = rgb
            .pixels()
            .map(|p| rgb_to_rgb565([p.0[0], p.0[1], p.0[2]]))
            .collect();
        let frame = SensorFrame::from_words(&words, width, height).ok_or_else(|| {
            SensorError::InitializationFailed("scaled image has wrong pixel count".to_string())
        })?;

        info!(width, height, "Still image loaded");

        Ok(Self {
            name: format!("image:{}", path.display()),
            frame,
            frames_served: 0,
        })
    }

    /// Sensor serving an arbitrary pre-built frame
    pub fn with_frame(frame: SensorFrame) -> Self {
        Self {
            name: "fixed-frame".to_string(),
            frame,
            frames_served: 0,
        }
    }

    /// Number of frames handed out so far
    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }
}

impl ImageSensor for SimSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn capture_frame(&mut self) -> Result<SensorFrame, SensorError> {
        self.frames_served += 1;
        Ok(self.frame.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sensor::CropRect;
    use crate::imaging::convert::rgb565_to_rgb;

    #[test]
    fn test_pattern_dimensions() {
        let mut sensor = SimSensor::test_pattern();
        let frame = sensor.capture_frame().unwrap();
        assert_eq!(frame.width(), geometry::FRAME_WIDTH);
        assert_eq!(frame.height(), geometry::FRAME_HEIGHT);
        assert_eq!(sensor.frames_served(), 1);
    }

    #[test]
    fn test_pattern_pads_are_green() {
        let mut sensor = SimSensor::test_pattern();
        let frame = sensor.capture_frame().unwrap();
        for (index, &x) in geometry::WINDOW_X.iter().enumerate() {
            let window = frame
                .crop(CropRect::new(
                    x,
                    geometry::WINDOW_Y,
                    geometry::WINDOW_WIDTH,
                    geometry::WINDOW_HEIGHT,
                ))
                .unwrap();
            let [r, g, b] = rgb565_to_rgb(window.pixel(0, 0));
            assert_eq!(r, 0, "pad {} red channel", index + 1);
            assert_eq!(b, 0, "pad {} blue channel", index + 1);
            assert!(
                g >= 90,
                "pad {} green level {} too dark for the reagent range",
                index + 1,
                g
            );
        }
    }

    #[test]
    fn test_pads_brighten_left_to_right() {
        let mut sensor = SimSensor::test_pattern();
        let frame = sensor.capture_frame().unwrap();
        let greens: Vec<u8> = geometry::WINDOW_X
            .iter()
            .map(|&x| rgb565_to_rgb(frame.pixel(x + 1, geometry::WINDOW_Y + 1))[1])
            .collect();
        for pair in greens.windows(2) {
            assert!(pair[0] < pair[1], "pads must brighten left to right");
        }
    }
}

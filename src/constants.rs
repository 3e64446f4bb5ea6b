// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! The reader has no runtime configuration surface. Window geometry, slot
//! timing, measurement tuning and the wire format are fixed at build time
//! and changed here when the carrier or the protocol changes.

/// Sensor and carrier geometry
pub mod geometry {
    /// Capture frame width in pixels (QVGA)
    pub const FRAME_WIDTH: u32 = 320;

    /// Capture frame height in pixels (QVGA)
    pub const FRAME_HEIGHT: u32 = 240;

    /// Number of strip windows on the carrier
    pub const REGION_COUNT: usize = 4;

    /// Strip window width in pixels
    pub const WINDOW_WIDTH: u32 = 38;

    /// Strip window height in pixels
    pub const WINDOW_HEIGHT: u32 = 20;

    /// Left edge of each strip window, in sensor coordinates
    ///
    /// Measured against the bench fixture; the pads sit on uneven centers
    /// so these are individual offsets rather than a pitch formula.
    pub const WINDOW_X: [u32; REGION_COUNT] = [33, 106, 184, 257];

    /// Top edge shared by all strip windows
    pub const WINDOW_Y: u32 = 95;
}

/// Scan cadence constants
pub mod timing {
    /// Frames spent on one window before its value is finalized
    ///
    /// Counted in captured frames, not wall-clock time. If the sensor runs
    /// slower than expected the slot stretches with it.
    pub const FRAMES_PER_SLOT: u32 = 3;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// How long a capture backend waits for the next frame before the
    /// scheduler treats the frame as missed
    pub const CAPTURE_TIMEOUT_MS: u64 = 500;
}

/// Measurement tuning
pub mod measure {
    /// Multiplier applied to the mean window luma before aggregation
    ///
    /// Scales the 0-255 luma range onto the 0-1020 band the downstream
    /// controller was calibrated against.
    pub const INTENSITY_GAIN: f64 = 4.0;

    /// Minimum pixel count for a blob candidate
    pub const BLOB_MIN_PIXELS: usize = 20;

    /// Minimum bounding-box area for a blob candidate
    pub const BLOB_MIN_AREA: u32 = 20;

    /// Inclusive RGB bounds for the reagent color, (min, max) per channel
    pub const REAGENT_RED: (u8, u8) = (0, 120);
    pub const REAGENT_GREEN: (u8, u8) = (96, 255);
    pub const REAGENT_BLUE: (u8, u8) = (0, 120);
}

/// Wire framing constants
pub mod wire {
    /// Leading marker byte of every report and packet
    pub const HEAD: u8 = b'A';

    /// Trailing marker byte of every report and packet
    pub const TAIL: u8 = b'B';

    /// Digits per encoded slot value
    pub const VALUE_WIDTH: usize = 4;

    /// Largest value the fixed-width field can carry
    pub const VALUE_MAX: u32 = 9999;

    /// Packet length on the wire: head + index digit + two values + tail
    pub const PACKET_LEN: usize = 2 + 1 + 2 * VALUE_WIDTH;

    /// Report length for the quad carrier: head + four values + tail
    pub const REPORT_LEN: usize = 2 + super::geometry::REGION_COUNT * VALUE_WIDTH;
}

/// Serial link constants
pub mod serial {
    /// UART baud rate expected by the downstream controller
    pub const BAUD_RATE: u32 = 115_200;

    /// Write timeout for a single packet
    pub const WRITE_TIMEOUT_MS: u64 = 100;

    /// Port used when none is given on the command line
    pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
}

/// Capture device constants
pub mod capture {
    /// Device used when none is given on the command line
    pub const DEFAULT_DEVICE: &str = "/dev/video0";

    /// Number of mmap buffers to queue on the capture stream
    pub const BUFFER_COUNT: u32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_fit_frame() {
        for x in geometry::WINDOW_X {
            assert!(
                x + geometry::WINDOW_WIDTH <= geometry::FRAME_WIDTH,
                "window at x={} overruns the frame",
                x
            );
        }
        assert!(geometry::WINDOW_Y + geometry::WINDOW_HEIGHT <= geometry::FRAME_HEIGHT);
    }

    #[test]
    fn test_wire_lengths() {
        assert_eq!(wire::PACKET_LEN, 11);
        assert_eq!(wire::REPORT_LEN, 18);
        assert_eq!(wire::VALUE_MAX, 10u32.pow(wire::VALUE_WIDTH as u32) - 1);
    }
}

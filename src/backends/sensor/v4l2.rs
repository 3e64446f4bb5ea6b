// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 capture for the reader head
//!
//! The reader head enumerates as a UVC device delivering RGB565, so we use
//! the v4l crate to pull raw buffers straight off the capture stream. Format
//! negotiation happens up front and fails construction when the device
//! cannot deliver RGB565 at sensor resolution; after that a capture thread
//! feeds frames to the scan loop over a bounded channel.

use crate::backends::sensor::{BYTES_PER_PIXEL, ImageSensor, SensorFrame, SensorRotation};
use crate::constants::{capture, geometry, timing};
use crate::errors::SensorError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, sync_channel};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// FourCC for 16-bit RGB565 (little-endian)
const RGB565_FOURCC: &[u8; 4] = b"RGBP";

/// How many frames the capture thread may buffer ahead of the scan loop
const CHANNEL_DEPTH: usize = 2;

/// V4L2 image sensor
pub struct V4lSensor {
    name: String,
    frames: Receiver<SensorFrame>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl V4lSensor {
    /// Open a capture device and start the capture thread
    ///
    /// Fails when the device cannot be opened or will not negotiate RGB565
    /// at sensor resolution. `rotation` corrects the mounting angle and is
    /// applied to every frame before it reaches the scan loop.
    pub fn open(device_path: &str, rotation: SensorRotation) -> Result<Self, SensorError> {
        let width = geometry::FRAME_WIDTH;
        let height = geometry::FRAME_HEIGHT;

        info!(device_path, width, height, %rotation, "Opening V4L2 capture device");

        let mut dev = Device::with_path(device_path).map_err(|e| {
            SensorError::InitializationFailed(format!(
                "failed to open V4L2 device {}: {}",
                device_path, e
            ))
        })?;

        let current = dev
            .format()
            .map_err(|e| SensorError::InitializationFailed(format!("failed to query format: {}", e)))?;
        info!(
            current_width = current.width,
            current_height = current.height,
            fourcc = ?current.fourcc,
            "Current device format"
        );

        let fourcc = v4l::FourCC::new(RGB565_FOURCC);
        let mut format = current;
        format.width = width;
        format.height = height;
        format.fourcc = fourcc;

        let accepted = dev
            .set_format(&format)
            .map_err(|e| SensorError::InitializationFailed(format!("failed to set format: {}", e)))?;
        if accepted.fourcc != fourcc {
            return Err(SensorError::UnsupportedFormat(format!(
                "device offered {} instead of RGB565",
                accepted.fourcc
            )));
        }
        if accepted.width != width || accepted.height != height {
            return Err(SensorError::UnsupportedFormat(format!(
                "device offered {}x{} instead of {}x{}",
                accepted.width, accepted.height, width, height
            )));
        }
        info!(
            width = accepted.width,
            height = accepted.height,
            fourcc = ?accepted.fourcc,
            "Set V4L2 format"
        );

        let (sender, receiver) = sync_channel(CHANNEL_DEPTH);
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let path_for_log = device_path.to_string();

        let thread_handle = std::thread::spawn(move || {
            if let Err(e) = capture_loop(dev, width, height, rotation, sender, running_clone) {
                error!(device_path = %path_for_log, error = %e, "Capture loop failed");
            }
        });

        Ok(Self {
            name: format!("v4l2:{}", device_path),
            frames: receiver,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Stop the capture thread and wait for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            match handle.join() {
                Ok(_) => info!("Capture thread stopped"),
                Err(_) => warn!("Capture thread panicked"),
            }
        }
    }
}

impl ImageSensor for V4lSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn capture_frame(&mut self) -> Result<SensorFrame, SensorError> {
        match self
            .frames
            .recv_timeout(Duration::from_millis(timing::CAPTURE_TIMEOUT_MS))
        {
            Ok(frame) => Ok(frame),
            Err(RecvTimeoutError::Timeout) => Err(SensorError::CaptureFailed(format!(
                "no frame within {}ms",
                timing::CAPTURE_TIMEOUT_MS
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(SensorError::Disconnected),
        }
    }
}

impl Drop for V4lSensor {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Don't wait for thread in drop - it may already be finished
    }
}

/// Main capture loop running in a separate thread
fn capture_loop(
    mut dev: Device,
    width: u32,
    height: u32,
    rotation: SensorRotation,
    frame_sender: SyncSender<SensorFrame>,
    running: Arc<AtomicBool>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    let expected_size = width as usize * height as usize * BYTES_PER_PIXEL;

    let mut stream = MmapStream::with_buffers(&mut dev, Type::VideoCapture, capture::BUFFER_COUNT)
        .map_err(|e| format!("failed to create buffer stream: {}", e))?;

    info!(expected_size, "V4L2 capture stream started");

    while running.load(Ordering::SeqCst) {
        match stream.next() {
            Ok((buf, meta)) => {
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);

                if buf.len() < expected_size {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        warn!(
                            frame = frame_num,
                            got = buf.len(),
                            expected = expected_size,
                            "Unexpected buffer size"
                        );
                    }
                    continue;
                }

                let bytes: Arc<[u8]> = Arc::from(&buf[..expected_size]);
                let Some(frame) = SensorFrame::from_bytes(bytes, width, height) else {
                    continue;
                };
                let frame = frame.rotated(rotation);

                // Non-blocking send; when the scan loop falls behind, the
                // newest frames win
                if frame_sender.try_send(frame).is_err() {
                    if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                        debug!(frame = frame_num, "Frame dropped (channel full)");
                    }
                } else if frame_num % (2 * timing::FRAME_LOG_INTERVAL) == 0 {
                    debug!(
                        frame = frame_num,
                        sequence = meta.sequence,
                        size = buf.len(),
                        "Frame captured"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to capture frame");
                // Brief sleep before retry
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    }

    info!("V4L2 capture loop ended");
    Ok(())
}

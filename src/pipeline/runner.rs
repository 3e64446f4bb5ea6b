// SPDX-License-Identifier: GPL-3.0-only

//! The scan loop: frames in, packets out
//!
//! One synchronous loop owns the whole data path. Each pass captures a
//! frame, measures the active region, and advances the slot clock; when a
//! cycle completes the report is packetized and written to the link.
//! Nothing on the data path is allowed to kill the loop: capture errors
//! skip the frame and link errors drop the packet, both with a warning.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::backends::link::ReportLink;
use crate::backends::sensor::ImageSensor;
use crate::constants::timing;
use crate::errors::AppResult;
use crate::pipeline::collector::FrameCollector;
use crate::pipeline::regions::RegionTable;
use crate::pipeline::report::Packetizer;
use crate::pipeline::scheduler::{ScanScheduler, TickOutcome};

/// Owns the scan loop and every collaborator it drives
pub struct ScanRunner {
    sensor: Box<dyn ImageSensor>,
    link: Box<dyn ReportLink>,
    collector: FrameCollector,
    table: RegionTable,
    scheduler: ScanScheduler,
    packetizer: Packetizer,
    stop_signal: Arc<AtomicBool>,
    frames_seen: u64,
}

impl ScanRunner {
    pub fn new(
        sensor: Box<dyn ImageSensor>,
        link: Box<dyn ReportLink>,
        collector: FrameCollector,
        table: RegionTable,
        frames_per_slot: u32,
    ) -> Self {
        let scheduler = ScanScheduler::new(table.len() as u32, frames_per_slot);
        Self {
            sensor,
            link,
            collector,
            table,
            scheduler,
            packetizer: Packetizer::new(),
            stop_signal: Arc::new(AtomicBool::new(false)),
            frames_seen: 0,
        }
    }

    /// Flag a caller can set from a signal handler to stop the loop
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Run the scan until stopped, or until `max_cycles` reports went out
    pub fn run(&mut self, max_cycles: Option<u64>) -> AppResult<()> {
        info!(
            sensor = self.sensor.name(),
            link = self.link.name(),
            source = self.collector.source_name(),
            regions = self.table.len(),
            "Scan started"
        );

        let mut completed: u64 = 0;
        while !self.stop_signal.load(Ordering::Relaxed) {
            if let Some(limit) = max_cycles
                && completed >= limit
            {
                break;
            }

            let frame = match self.sensor.capture_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, "Frame skipped");
                    continue;
                }
            };
            self.frames_seen += 1;
            if self.frames_seen % timing::FRAME_LOG_INTERVAL == 0 {
                debug!(
                    frames = self.frames_seen,
                    region = self.scheduler.active_region(),
                    "Scan progress"
                );
            }

            let sample = match self.table.get(self.scheduler.active_region()) {
                Some(region) => self.collector.collect(&frame, region),
                None => None,
            };
            if sample.is_none() {
                debug!(
                    region = self.scheduler.active_region(),
                    "No sample from frame"
                );
            }

            match self.scheduler.tick(sample) {
                TickOutcome::InSlot => {}
                TickOutcome::SlotFinalized { region, value } => {
                    debug!(region, value, "Slot finalized");
                }
                TickOutcome::CycleComplete { report, cycle } => {
                    let packet = self.packetizer.packetize(&report);
                    info!(
                        cycle,
                        report = %report,
                        packet = %packet,
                        indicator = self.packetizer.indicator(),
                        "Cycle complete"
                    );
                    if let Err(e) = self.link.send(packet.as_bytes()) {
                        warn!(error = %e, "Packet dropped");
                    }
                    completed += 1;
                }
            }
        }

        info!(
            cycles = completed,
            frames = self.frames_seen,
            "Scan stopped"
        );
        Ok(())
    }
}

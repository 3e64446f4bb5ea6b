// SPDX-License-Identifier: GPL-3.0-only

//! The scan scheduler: region cycling and the slot clock
//!
//! Time is counted in delivered frames, never wall-clock. Each region owns
//! the scan for exactly one slot of F frames; when the slot closes, its
//! value is finalized and the scan moves to the next region in the same
//! step. After the last region the cycle's values come back as a report.

use crate::pipeline::aggregator::SlotAggregator;
use crate::pipeline::report::Report;

/// What one delivered frame did to the scan state
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Mid-slot; the frame was folded in and nothing was finalized
    InSlot,
    /// A slot closed without completing the cycle
    SlotFinalized {
        /// Region whose slot closed
        region: u32,
        /// Its finalized value
        value: u32,
    },
    /// The last slot closed and a full report is ready
    CycleComplete {
        /// The cycle's values, framed in region order
        report: Report,
        /// 0-based index of the completed cycle
        cycle: u64,
    },
}

/// Drives the cyclic scan over the region table
///
/// The scheduler never touches a frame itself; the caller measures the
/// active region and feeds the sample (or its absence) into [`tick`].
///
/// [`tick`]: ScanScheduler::tick
#[derive(Debug)]
pub struct ScanScheduler {
    region_count: u32,
    frames_per_slot: u32,
    active_region: u32,
    frame_in_slot: u32,
    cycle_index: u64,
    aggregator: SlotAggregator,
    pending: Vec<u32>,
}

impl ScanScheduler {
    /// Scheduler over `region_count` regions with `frames_per_slot` frame
    /// slots; both must be nonzero
    pub fn new(region_count: u32, frames_per_slot: u32) -> Self {
        assert!(region_count > 0, "region count must be nonzero");
        assert!(frames_per_slot > 0, "slot length must be nonzero");
        Self {
            region_count,
            frames_per_slot,
            active_region: 1,
            frame_in_slot: 0,
            cycle_index: 0,
            aggregator: SlotAggregator::new(region_count as usize),
            pending: Vec::with_capacity(region_count as usize),
        }
    }

    /// Region currently owning the scan, 1-based
    pub fn active_region(&self) -> u32 {
        self.active_region
    }

    /// Position within the active slot, 0-based
    pub fn frame_in_slot(&self) -> u32 {
        self.frame_in_slot
    }

    /// 0-based index of the cycle currently being scanned
    pub fn cycle_index(&self) -> u64 {
        self.cycle_index
    }

    /// Samples folded into the active slot so far
    pub fn samples_in_slot(&self) -> u32 {
        self.aggregator.sample_count(self.active_region)
    }

    /// Advance the slot clock by one delivered frame
    ///
    /// `sample` is the active region's measurement for this frame, or
    /// `None` when the frame produced nothing usable. Either way the frame
    /// counts against the slot; only frames the sensor never delivered
    /// leave the clock untouched, and those never reach this method.
    pub fn tick(&mut self, sample: Option<f64>) -> TickOutcome {
        if let Some(sample) = sample {
            self.aggregator.add_sample(self.active_region, sample);
        }

        if self.frame_in_slot + 1 < self.frames_per_slot {
            self.frame_in_slot += 1;
            return TickOutcome::InSlot;
        }

        // Slot boundary: finalize and hand over in one step
        let region = self.active_region;
        let value = self.aggregator.finalize(region);
        self.pending.push(value);
        self.frame_in_slot = 0;
        self.active_region = self.active_region % self.region_count + 1;

        if self.active_region == 1 {
            let report = Report::new(std::mem::take(&mut self.pending));
            let cycle = self.cycle_index;
            self.cycle_index += 1;
            TickOutcome::CycleComplete { report, cycle }
        } else {
            TickOutcome::SlotFinalized { region, value }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_holds_for_exactly_f_frames() {
        let mut scheduler = ScanScheduler::new(4, 3);
        assert_eq!(scheduler.tick(Some(10.0)), TickOutcome::InSlot);
        assert_eq!(scheduler.tick(Some(20.0)), TickOutcome::InSlot);
        assert_eq!(
            scheduler.tick(Some(30.0)),
            TickOutcome::SlotFinalized {
                region: 1,
                value: 20
            },
            "third frame closes the slot with the truncated mean"
        );
        assert_eq!(scheduler.active_region(), 2);
        assert_eq!(scheduler.frame_in_slot(), 0);
    }

    #[test]
    fn test_single_frame_slots() {
        let mut scheduler = ScanScheduler::new(2, 1);
        assert_eq!(
            scheduler.tick(Some(7.0)),
            TickOutcome::SlotFinalized {
                region: 1,
                value: 7
            }
        );
        match scheduler.tick(Some(9.0)) {
            TickOutcome::CycleComplete { report, cycle } => {
                assert_eq!(report.values(), &[7, 9]);
                assert_eq!(cycle, 0);
            }
            other => panic!("expected a completed cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_single_region_completes_every_slot() {
        let mut scheduler = ScanScheduler::new(1, 2);
        assert_eq!(scheduler.tick(Some(4.0)), TickOutcome::InSlot);
        match scheduler.tick(Some(6.0)) {
            TickOutcome::CycleComplete { report, cycle } => {
                assert_eq!(report.values(), &[5]);
                assert_eq!(cycle, 0);
            }
            other => panic!("expected a completed cycle, got {:?}", other),
        }
        assert_eq!(scheduler.active_region(), 1);
        assert_eq!(scheduler.cycle_index(), 1);
    }

    #[test]
    fn test_missing_samples_still_advance_the_clock() {
        let mut scheduler = ScanScheduler::new(2, 3);
        scheduler.tick(Some(10.0));
        scheduler.tick(None);
        assert_eq!(scheduler.samples_in_slot(), 1);
        assert_eq!(
            scheduler.tick(Some(30.0)),
            TickOutcome::SlotFinalized {
                region: 1,
                value: 20
            },
            "the empty frame counts against the slot but not the mean"
        );
    }

    #[test]
    fn test_all_empty_slot_reads_zero() {
        let mut scheduler = ScanScheduler::new(2, 2);
        scheduler.tick(None);
        assert_eq!(
            scheduler.tick(None),
            TickOutcome::SlotFinalized {
                region: 1,
                value: 0
            }
        );
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Slot aggregation: accumulate samples, finalize to a value
//!
//! Each region owns one accumulator. Samples land in it for the duration
//! of the region's slot and `finalize` collapses them to a truncated mean,
//! resetting the accumulator in the same step so nothing leaks into the
//! region's next slot.

/// Running sum for one region's slot
#[derive(Debug, Clone, Copy, Default)]
pub struct Accumulator {
    sum: f64,
    count: u32,
}

impl Accumulator {
    /// Fold one sample in
    pub fn add(&mut self, sample: f64) {
        self.sum += sample;
        self.count += 1;
    }

    /// Samples accumulated so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean truncated toward zero, resetting the accumulator
    ///
    /// An empty accumulator finalizes to 0. Samples are non-negative by
    /// construction, so the cast cannot wrap.
    pub fn finalize(&mut self) -> u32 {
        let value = if self.count == 0 {
            0
        } else {
            (self.sum / self.count as f64).trunc() as u32
        };
        *self = Self::default();
        value
    }
}

/// Per-region accumulators for one scan cycle
#[derive(Debug, Clone)]
pub struct SlotAggregator {
    accumulators: Vec<Accumulator>,
}

impl SlotAggregator {
    /// Aggregator for `region_count` regions
    pub fn new(region_count: usize) -> Self {
        Self {
            accumulators: vec![Accumulator::default(); region_count],
        }
    }

    /// Fold a sample into the region's accumulator
    ///
    /// Identities are 1-based; an unknown region is ignored.
    pub fn add_sample(&mut self, region: u32, sample: f64) {
        if let Some(acc) = self.accumulator_mut(region) {
            acc.add(sample);
        }
    }

    /// Finalize the region's slot, yielding its value and resetting it
    pub fn finalize(&mut self, region: u32) -> u32 {
        match self.accumulator_mut(region) {
            Some(acc) => acc.finalize(),
            None => 0,
        }
    }

    /// Samples accumulated for the region's current slot
    pub fn sample_count(&self, region: u32) -> u32 {
        region
            .checked_sub(1)
            .and_then(|idx| self.accumulators.get(idx as usize))
            .map(|acc| acc.count())
            .unwrap_or(0)
    }

    fn accumulator_mut(&mut self, region: u32) -> Option<&mut Accumulator> {
        self.accumulators.get_mut(region.checked_sub(1)? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_mean() {
        let mut acc = Accumulator::default();
        acc.add(10.0);
        acc.add(20.0);
        acc.add(25.0);
        // 55 / 3 = 18.33, truncated toward zero
        assert_eq!(acc.finalize(), 18);
    }

    #[test]
    fn test_empty_slot_finalizes_to_zero() {
        let mut acc = Accumulator::default();
        assert_eq!(acc.finalize(), 0);
    }

    #[test]
    fn test_finalize_resets_exactly_once() {
        let mut acc = Accumulator::default();
        acc.add(100.0);
        assert_eq!(acc.count(), 1);
        assert_eq!(acc.finalize(), 100);
        assert_eq!(acc.count(), 0, "finalize must reset the sample count");
        assert_eq!(acc.finalize(), 0, "second finalize sees an empty slot");
    }

    #[test]
    fn test_regions_accumulate_independently() {
        let mut agg = SlotAggregator::new(4);
        agg.add_sample(1, 10.0);
        agg.add_sample(1, 30.0);
        agg.add_sample(3, 7.0);
        assert_eq!(agg.sample_count(1), 2);
        assert_eq!(agg.sample_count(3), 1);
        assert_eq!(agg.finalize(1), 20);
        assert_eq!(agg.finalize(3), 7);
        assert_eq!(agg.finalize(2), 0);
    }

    #[test]
    fn test_unknown_region_is_ignored() {
        let mut agg = SlotAggregator::new(2);
        agg.add_sample(0, 5.0);
        agg.add_sample(9, 5.0);
        assert_eq!(agg.sample_count(0), 0);
        assert_eq!(agg.finalize(9), 0);
    }
}

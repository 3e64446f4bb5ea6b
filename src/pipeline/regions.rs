// SPDX-License-Identifier: GPL-3.0-only

//! The region table: strip window geometry
//!
//! Regions are numbered 1..=N and scanned in that order. The table is
//! immutable for the life of the process; geometry changes mean a rebuild,
//! not a config reload.

use crate::backends::sensor::CropRect;
use crate::constants::geometry;

/// One strip window on the carrier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// 1-based identity, which is also the scan position
    pub id: u32,
    /// Window in corrected sensor coordinates
    pub window: CropRect,
}

/// Ordered table of all strip windows
#[derive(Debug, Clone)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// The quad carrier layout from the build-time geometry
    pub fn quad_carrier() -> Self {
        let windows: Vec<CropRect> = geometry::WINDOW_X
            .iter()
            .map(|&x| {
                CropRect::new(
                    x,
                    geometry::WINDOW_Y,
                    geometry::WINDOW_WIDTH,
                    geometry::WINDOW_HEIGHT,
                )
            })
            .collect();
        Self::from_windows(&windows)
    }

    /// Build a table from explicit windows, numbering them in order
    pub fn from_windows(windows: &[CropRect]) -> Self {
        let regions = windows
            .iter()
            .enumerate()
            .map(|(index, &window)| Region {
                id: index as u32 + 1,
                window,
            })
            .collect();
        Self { regions }
    }

    /// Number of regions in one scan cycle
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True when the table has no regions
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Region by 1-based identity
    pub fn get(&self, id: u32) -> Option<&Region> {
        self.regions.get(id.checked_sub(1)? as usize)
    }

    /// Regions in scan order
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Check that every window sits inside a frame of the given size
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.regions.iter().all(|r| {
            r.window
                .x
                .checked_add(r.window.w)
                .is_some_and(|right| right <= width)
                && r.window
                    .y
                    .checked_add(r.window.h)
                    .is_some_and(|bottom| bottom <= height)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_carrier_layout() {
        let table = RegionTable::quad_carrier();
        assert_eq!(table.len(), geometry::REGION_COUNT);
        let ids: Vec<u32> = table.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        let xs: Vec<u32> = table.iter().map(|r| r.window.x).collect();
        assert_eq!(xs, geometry::WINDOW_X.to_vec());
    }

    #[test]
    fn test_lookup_by_identity() {
        let table = RegionTable::quad_carrier();
        assert_eq!(table.get(1).map(|r| r.window.x), Some(geometry::WINDOW_X[0]));
        assert_eq!(table.get(4).map(|r| r.window.x), Some(geometry::WINDOW_X[3]));
        assert!(table.get(0).is_none(), "identities are 1-based");
        assert!(table.get(5).is_none());
    }

    #[test]
    fn test_fits_within_frame() {
        let table = RegionTable::quad_carrier();
        assert!(table.fits_within(geometry::FRAME_WIDTH, geometry::FRAME_HEIGHT));
        // A portrait frame cuts off the rightmost window
        assert!(!table.fits_within(geometry::FRAME_HEIGHT, geometry::FRAME_WIDTH));
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Scan pipeline: framing, measurement and the region-cycling scan loop
//!
//! One synchronous loop turns captured frames into serial packets. Each
//! frame is measured against the active region, folded into that region's
//! slot, and at cycle boundaries the finalized values are framed and
//! packetized.
//!
//! # Data Flow
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Sensor Frame │ ──▶ │  Collector        │ ──▶ │  Scheduler   │
//! │   (RGB565)   │     │  - crop window    │     │  - slot clock│
//! │              │     │  - luma or blob   │     │  - aggregate │
//! └──────────────┘     └───────────────────┘     └──────┬───────┘
//!                                                       │ cycle done
//!                                               ┌───────┴───────┐
//!                                               │  Packetizer   │ ──▶ link
//!                                               │  - 18B report │
//!                                               │  - 11B packet │
//!                                               └───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`regions`]: the fixed table of measurement windows
//! - [`collector`]: per-frame measurement of the active region
//! - [`aggregator`]: per-region slot accumulators
//! - [`scheduler`]: the slot clock and region hand-over
//! - [`report`]: wire framing and ping-pong packetization
//! - [`runner`]: the synchronous loop that drives all of the above

pub mod aggregator;
pub mod collector;
pub mod regions;
pub mod report;
pub mod runner;
pub mod scheduler;

pub use aggregator::SlotAggregator;
pub use collector::{FrameCollector, SampleSource};
pub use regions::{Region, RegionTable};
pub use report::{Packet, PacketIndex, Packetizer, Report};
pub use runner::ScanRunner;
pub use scheduler::{ScanScheduler, TickOutcome};

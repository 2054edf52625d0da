//! Incremental trackers fed during the ingestion pass.
//!
//! - [`cc`]: crowd-control intervals keyed by (target, modifier)
//! - [`wards`]: observer/sentry placements and their removal
//! - [`positions`]: throttled per-hero position samples

pub mod cc;
pub mod positions;
pub mod wards;

pub use cc::{CcCategory, CcInterval, CcTotals, CcTracker};
pub use positions::{Position, PositionSample, PositionSampler};
pub use wards::{WardEntity, WardRecord, WardTracker, WardType};

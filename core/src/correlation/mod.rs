//! Cross-correlation passes run after ingestion.
//!
//! These read the materialised collections of an analysis run (fights,
//! wards, objectives, economy grants) and join them over time and space.

pub mod economy;
pub mod objectives;
pub mod roshan;
pub mod vision;

use serde::Serialize;

use crate::fights::Fight;
use crate::tracking::CcInterval;

pub use economy::{EconomyPoint, LeadPoint, LeadSwitches, TeamSwing, lead_series, lead_switches};
pub use objectives::{
    BuildingClass, ObjectiveEvent, ObjectiveKind, ObjectiveSequences, PickoffLink,
    attach_swings, chain_objectives, link_pickoffs,
};
pub use roshan::{RoshanContext, RoshanControl, RoshanSummary, roshan_context, roshan_control};
pub use vision::{VisionContext, VisionImpactRecord, VisionRollup, score_wards};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CcEfficiency {
    pub cc_total: u32,
    pub cc_near_death: u32,
}

/// Count CC intervals on a named target, and those that ended at most
/// `near_secs` before a death of the same target. Deaths are taken from fights.
pub fn cc_efficiency(intervals: &[CcInterval], fights: &[Fight], near_secs: i64) -> CcEfficiency {
    let intervals: Vec<&CcInterval> = intervals.iter().filter(|cc| !cc.target.is_empty()).collect();
    let deaths: Vec<(&str, i64)> = fights
        .iter()
        .flat_map(Fight::deaths)
        .filter(|d| !d.target.is_empty())
        .map(|d| (d.target.as_str(), d.time))
        .collect();

    let cc_near_death = intervals
        .iter()
        .filter(|&&cc| {
            deaths
                .iter()
                .any(|&(target, t)| target == cc.target && cc.end <= t && cc.end >= t - near_secs)
        })
        .count();

    CcEfficiency {
        cc_total: intervals.len() as u32,
        cc_near_death: cc_near_death as u32,
    }
}

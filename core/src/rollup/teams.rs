//! Team objective counts and the fights overview.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::correlation::{BuildingClass, ObjectiveEvent, ObjectiveKind};
use crate::fights::Fight;
use crate::identity::Team;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeamObjectives {
    /// Buildings of each class this team lost.
    pub barracks: u32,
    pub outposts: u32,
    pub towers: u32,
    pub ancients: u32,
    pub buildings_other: u32,
    pub glyphs_used: u32,
    pub scans_used: u32,
}

/// Objective counts for both teams. Building losses are counted against
/// the target's team; events without a known team are skipped.
pub fn objectives_by_team(objectives: &[ObjectiveEvent]) -> BTreeMap<Team, TeamObjectives> {
    let mut out = BTreeMap::from([
        (Team::Radiant, TeamObjectives::default()),
        (Team::Dire, TeamObjectives::default()),
    ]);

    for o in objectives {
        let team = match o.kind {
            ObjectiveKind::BuildingKill => o.team_target,
            ObjectiveKind::Glyph | ObjectiveKind::Scan => o.team,
            ObjectiveKind::HeroDeath => continue,
        };
        let Some(counts) = out.get_mut(&team) else {
            continue;
        };
        match o.kind {
            ObjectiveKind::Glyph => counts.glyphs_used += 1,
            ObjectiveKind::Scan => counts.scans_used += 1,
            _ => match BuildingClass::classify(&o.target) {
                BuildingClass::Barracks => counts.barracks += 1,
                BuildingClass::Outpost => counts.outposts += 1,
                BuildingClass::Tower => counts.towers += 1,
                BuildingClass::Ancient => counts.ancients += 1,
                BuildingClass::Other => counts.buildings_other += 1,
            },
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FightsOverview {
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_duration: Option<f64>,
    pub total_ults: u32,
    pub total_buybacks: u32,
}

pub fn fights_overview(fights: &[Fight]) -> FightsOverview {
    let count = fights.len() as u32;
    let total_duration: i64 = fights.iter().map(|f| f.duration).sum();
    FightsOverview {
        count,
        avg_duration: (count > 0).then(|| total_duration as f64 / count as f64),
        total_ults: fights.iter().map(|f| f.enrichment.ults_count).sum(),
        total_buybacks: fights.iter().map(|f| f.enrichment.buybacks_count).sum(),
    }
}

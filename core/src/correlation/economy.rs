//! Gold/XP grants, windowed swings and the team lead series.
//!
//! Every grant is signed by team (Radiant positive, Dire negative), so a
//! swing or lead above zero favours Radiant. Grants with an unknown team
//! still count as "economy data present" for a window, but add nothing.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::{EventKind, MatchTime, NormalizedEvent};
use crate::identity::Team;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EconomyPoint {
    pub time: MatchTime,
    pub team: Team,
    pub gold: i64,
    pub xp: i64,
}

impl EconomyPoint {
    pub fn from_event(event: &NormalizedEvent) -> Option<Self> {
        let (grant, is_gold) = match &event.kind {
            EventKind::Gold(g) => (g, true),
            EventKind::Xp(g) => (g, false),
            _ => return None,
        };
        Some(Self {
            time: event.time,
            team: grant.team,
            gold: if is_gold { grant.amount } else { 0 },
            xp: if is_gold { 0 } else { grant.amount },
        })
    }
}

/// Net Radiant − Dire gold and XP over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeamSwing {
    pub gold: i64,
    pub xp: i64,
    /// Grants inside the window, regardless of team.
    pub samples: usize,
}

impl TeamSwing {
    /// Whether the swing favours `team` in either gold or XP.
    pub fn favours(&self, team: Team) -> bool {
        swing_favours(team, self.gold, self.xp)
    }
}

/// Radiant-signed `gold`/`xp` favour `team` when either points its way.
pub fn swing_favours(team: Team, gold: i64, xp: i64) -> bool {
    match team {
        Team::Radiant => gold > 0 || xp > 0,
        Team::Dire => gold < 0 || xp < 0,
        Team::Unknown => false,
    }
}

/// Swing over grants with `from <= time <= to`.
pub fn swing_between(points: &[EconomyPoint], from: MatchTime, to: MatchTime) -> TeamSwing {
    let mut swing = TeamSwing::default();
    for p in points.iter().filter(|p| p.time >= from && p.time <= to) {
        let sign = p.team.sign();
        swing.gold += sign * p.gold;
        swing.xp += sign * p.xp;
        swing.samples += 1;
    }
    swing
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeadPoint {
    /// Bucket start.
    pub time: MatchTime,
    pub lead_gold: i64,
    pub lead_xp: i64,
}

/// Cumulative signed lead per time bucket. Only buckets with grants appear.
pub fn lead_series(points: &[EconomyPoint], bucket_secs: i64) -> Vec<LeadPoint> {
    let bucket_secs = bucket_secs.max(1);
    let mut buckets: BTreeMap<MatchTime, (i64, i64)> = BTreeMap::new();
    for p in points.iter().filter(|p| p.time >= 0) {
        let bucket = buckets.entry(p.time / bucket_secs * bucket_secs).or_default();
        let sign = p.team.sign();
        bucket.0 += sign * p.gold;
        bucket.1 += sign * p.xp;
    }

    let (mut gold, mut xp) = (0, 0);
    buckets
        .into_iter()
        .map(|(time, (g, x))| {
            gold += g;
            xp += x;
            LeadPoint {
                time,
                lead_gold: gold,
                lead_xp: xp,
            }
        })
        .collect()
}

/// Count sign changes in a lead series. Zero values neither count as a
/// change nor reset the sign seen before them.
pub fn count_lead_switches(values: impl IntoIterator<Item = i64>) -> u32 {
    let mut switches = 0;
    let mut prev = 0i64;
    for sign in values.into_iter().map(i64::signum) {
        if sign == 0 {
            continue;
        }
        if prev != 0 && sign != prev {
            switches += 1;
        }
        prev = sign;
    }
    switches
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadSwitches {
    pub gold: u32,
    pub xp: u32,
}

pub fn lead_switches(series: &[LeadPoint]) -> LeadSwitches {
    LeadSwitches {
        gold: count_lead_switches(series.iter().map(|p| p.lead_gold)),
        xp: count_lead_switches(series.iter().map(|p| p.lead_xp)),
    }
}

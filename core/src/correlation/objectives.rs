//! Objective sequencing: swing after objectives, chaining, and
//! pickoff → objective linkage.

use serde::Serialize;

use super::economy::{EconomyPoint, swing_between};
use crate::events::normalized::ObjectiveKill;
use crate::events::{EventKind, MatchTime, NormalizedEvent};
use crate::fights::Fight;
use crate::identity::Team;
use aegis_types::ObjectiveConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    BuildingKill,
    HeroDeath,
    Glyph,
    Scan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectiveSwing {
    pub gold: i64,
    pub xp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveEvent {
    pub time: MatchTime,
    pub kind: ObjectiveKind,
    pub target: String,
    pub by: String,
    /// Acting team for glyphs and scans.
    pub team: Team,
    pub team_target: Team,
    pub team_by: Team,
    pub seq: u32,
    pub chain_id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing: Option<ObjectiveSwing>,
}

impl ObjectiveEvent {
    pub fn from_event(event: &NormalizedEvent) -> Option<Self> {
        let blank = |kind: ObjectiveKind, team: Team| ObjectiveEvent {
            time: event.time,
            kind,
            target: String::new(),
            by: String::new(),
            team,
            team_target: Team::Unknown,
            team_by: Team::Unknown,
            seq: 0,
            chain_id: 0,
            swing: None,
        };
        let from_kill = |kind, kill: &ObjectiveKill| ObjectiveEvent {
            target: kill.target.clone(),
            by: kill.killer.clone(),
            team_target: kill.team_target,
            team_by: kill.team_by,
            ..blank(kind, Team::Unknown)
        };

        match &event.kind {
            EventKind::BuildingKill(kill) => Some(from_kill(ObjectiveKind::BuildingKill, kill)),
            EventKind::HeroDeath(kill) => Some(from_kill(ObjectiveKind::HeroDeath, kill)),
            EventKind::Glyph { team } => Some(blank(ObjectiveKind::Glyph, *team)),
            EventKind::Scan { team } => Some(blank(ObjectiveKind::Scan, *team)),
            _ => None,
        }
    }
}

/// Radiant − Dire economy over `[t, t + window]` for every objective with a known time.
pub fn attach_swings(objectives: &mut [ObjectiveEvent], economy: &[EconomyPoint], window: i64) {
    for objective in objectives.iter_mut().filter(|o| o.time >= 0) {
        let swing = swing_between(economy, objective.time, objective.time + window);
        objective.swing = Some(ObjectiveSwing {
            gold: swing.gold,
            xp: swing.xp,
        });
    }
}

/// Stable-sort by time, then number every objective and group them into
/// chains. A gap strictly longer than `gap_secs` starts a new chain.
pub fn chain_objectives(objectives: &mut [ObjectiveEvent], gap_secs: i64) {
    objectives.sort_by_key(|o| o.time);

    let mut chain = 0;
    let mut last: Option<MatchTime> = None;
    for (idx, objective) in objectives.iter_mut().enumerate() {
        if last.is_none_or(|prev| objective.time - prev > gap_secs) {
            chain += 1;
        }
        last = Some(objective.time);
        objective.seq = idx as u32 + 1;
        objective.chain_id = chain;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingClass {
    Barracks,
    Outpost,
    Tower,
    Ancient,
    Other,
}

impl BuildingClass {
    pub fn classify(target: &str) -> Self {
        let t = target.to_ascii_lowercase();
        if t.contains("barracks") || t.contains("rax") {
            BuildingClass::Barracks
        } else if t.contains("outpost") {
            BuildingClass::Outpost
        } else if t.contains("tower") {
            BuildingClass::Tower
        } else if t.contains("fort") || t.contains("ancient") {
            BuildingClass::Ancient
        } else {
            BuildingClass::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickoffLink {
    pub pickoff_time: MatchTime,
    pub objective_time: MatchTime,
    pub delta: i64,
    pub objective_kind: BuildingClass,
    pub team_target: Team,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing_gold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing_xp: Option<i64>,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ObjectiveSequences {
    pub pickoff_to_tower: u32,
    pub pickoff_to_outpost: u32,
    pub pickoff_to_barracks: u32,
    pub pickoff_to_ancient: u32,
}

/// Link each building kill to the nearest preceding hero death within the
/// pickoff window. `objectives` must already be time-sorted.
pub fn link_pickoffs(
    objectives: &[ObjectiveEvent],
    fights: &[Fight],
    config: &ObjectiveConfig,
) -> (ObjectiveSequences, Vec<PickoffLink>) {
    let mut counts = ObjectiveSequences::default();
    let mut links = Vec::new();

    for (i, objective) in objectives.iter().enumerate() {
        if objective.kind != ObjectiveKind::BuildingKill || objective.time < 0 {
            continue;
        }
        let t = objective.time;
        let from = t - config.pickoff_window_secs;

        let pickoff = objectives[..i]
            .iter()
            .rev()
            .find(|o| o.kind == ObjectiveKind::HeroDeath)
            .map(|o| o.time)
            .filter(|&pt| pt >= 0 && pt >= from);
        let Some(pickoff_time) = pickoff else {
            continue;
        };

        let class = BuildingClass::classify(&objective.target);
        match class {
            BuildingClass::Tower => counts.pickoff_to_tower += 1,
            BuildingClass::Outpost => counts.pickoff_to_outpost += 1,
            BuildingClass::Barracks => counts.pickoff_to_barracks += 1,
            BuildingClass::Ancient => counts.pickoff_to_ancient += 1,
            BuildingClass::Other => {}
        }

        links.push(PickoffLink {
            pickoff_time,
            objective_time: t,
            delta: t - pickoff_time,
            objective_kind: class,
            team_target: objective.team_target,
            swing_gold: objective.swing.map(|s| s.gold),
            swing_xp: objective.swing.map(|s| s.xp),
            participants: fight_near(fights, t, config)
                .map(|f| f.participants.clone())
                .unwrap_or_default(),
        });
    }

    (counts, links)
}

/// The first fight whose padded window contains `t`, else the closest fight in time.
fn fight_near<'a>(fights: &'a [Fight], t: MatchTime, config: &ObjectiveConfig) -> Option<&'a Fight> {
    fights
        .iter()
        .find(|f| t >= f.start - config.fight_lead_secs && t <= f.end + config.fight_trail_secs)
        .or_else(|| {
            fights
                .iter()
                .min_by_key(|f| (f.start - t).max(t - f.end).max(0))
        })
}

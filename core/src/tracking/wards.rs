//! Ward placement lifecycle.
//!
//! Every observer or sentry use appends a [`WardRecord`]. A later death of a
//! ward-type unit resolves the most recently placed observer that is still
//! unresolved and was placed at or before the death. This is a LIFO
//! heuristic: with several same-team observers alive, the newest one is
//! charged with the death even if an older one actually died.
//!
//! Team and world position are attached after ingestion, once the hero
//! identity table and the ward entity list are complete.

use hashbrown::HashMap;
use serde::Serialize;

use super::positions::Position;
use crate::events::normalized::{ITEM_OBSERVER, ITEM_SENTRY};
use crate::events::{EventHandler, EventKind, MatchTime, NormalizedEvent};
use crate::identity::{HeroIdentity, Team};
use aegis_types::WardConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WardType {
    Observer,
    Sentry,
}

impl WardType {
    pub fn from_item(item: &str) -> Option<Self> {
        match item {
            ITEM_OBSERVER => Some(WardType::Observer),
            ITEM_SENTRY => Some(WardType::Sentry),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WardType::Observer => "observer",
            WardType::Sentry => "sentry",
        }
    }
}

/// A ward unit as seen by the entity stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardEntity {
    #[serde(rename = "type")]
    pub ward_type: WardType,
    pub team: Team,
    pub position: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardRecord {
    pub time: MatchTime,
    pub player: String,
    pub owner: String,
    pub team: Team,
    #[serde(rename = "type")]
    pub ward_type: WardType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifetime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_lifetime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_ratio: Option<f64>,
    pub dewarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deward_source_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deward_source_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl WardRecord {
    pub fn new(time: MatchTime, player: &str, owner: &str, ward_type: WardType) -> Self {
        Self {
            time,
            player: player.to_string(),
            owner: owner.to_string(),
            team: Team::Unknown,
            ward_type,
            removed_at: None,
            removed_by: None,
            lifetime: None,
            expected_lifetime: None,
            effective_ratio: None,
            dewarded: false,
            deward_source_time: None,
            deward_source_player: None,
            position: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.removed_at.is_some()
    }
}

#[derive(Debug)]
pub struct WardTracker {
    config: WardConfig,
    /// Observer and sentry placements in arrival order.
    records: Vec<WardRecord>,
}

impl WardTracker {
    pub fn new(config: WardConfig) -> Self {
        Self {
            config,
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[WardRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<WardRecord> {
        self.records
    }

    fn expected_lifetime(&self, ward_type: WardType) -> i64 {
        match ward_type {
            WardType::Observer => self.config.observer_expected_lifetime_secs,
            WardType::Sentry => self.config.sentry_expected_lifetime_secs,
        }
    }

    fn place(&mut self, time: MatchTime, player: &str, owner: &str, ward_type: WardType) {
        self.records.push(WardRecord::new(time, player, owner, ward_type));
    }

    /// Resolve a ward-type death at `time` killed by `killer`.
    fn resolve_death(&mut self, time: MatchTime, killer: &str) {
        let Some(idx) = self.records.iter().rposition(|w| {
            w.ward_type == WardType::Observer && !w.is_resolved() && w.time >= 0 && w.time <= time
        }) else {
            return;
        };

        let source = self.nearest_sentry(time).map(|s| (s.time, s.player.clone()));
        let expected = self.expected_lifetime(self.records[idx].ward_type);

        let ward = &mut self.records[idx];
        let lifetime = time - ward.time;
        ward.removed_at = Some(time);
        ward.removed_by = Some(killer.to_string());
        ward.lifetime = Some(lifetime);
        ward.expected_lifetime = Some(expected);
        ward.effective_ratio = Some(if expected > 0 {
            (lifetime as f64 / expected as f64).min(1.0)
        } else {
            0.0
        });
        ward.dewarded = true;
        if let Some((source_time, source_player)) = source {
            ward.deward_source_time = Some(source_time);
            ward.deward_source_player = Some(source_player);
        }

        tracing::trace!(placed = ward.time, removed = time, "Ward removal resolved");
    }

    /// Sentry placed at or before `death` and within the lookback, nearest first.
    /// Ties go to the earliest-placed record.
    fn nearest_sentry(&self, death: MatchTime) -> Option<&WardRecord> {
        let mut best: Option<(&WardRecord, i64)> = None;
        for sentry in self.records.iter().filter(|w| w.ward_type == WardType::Sentry) {
            if sentry.time < 0 || sentry.time > death {
                continue;
            }
            let dt = death - sentry.time;
            if dt > self.config.deward_lookback_secs {
                continue;
            }
            if best.is_none_or(|(_, best_dt)| dt < best_dt) {
                best = Some((sentry, dt));
            }
        }
        best.map(|(w, _)| w)
    }

    /// Attach each placement's team from the hero identity table.
    pub fn attach_teams(&mut self, identity: &HeroIdentity) {
        for ward in &mut self.records {
            ward.team = identity.team_of(&ward.player);
        }
    }

    /// Hand out ward entity positions to placements in time order, per team and type.
    ///
    /// The n-th placement of a (team, type) pair gets the n-th entity of the
    /// same pair. Placements with an unknown team are skipped.
    pub fn attach_positions(&mut self, entities: &[WardEntity]) {
        let mut queues: HashMap<(Team, WardType), Vec<&WardEntity>> = HashMap::new();
        for entity in entities {
            queues
                .entry((entity.team, entity.ward_type))
                .or_default()
                .push(entity);
        }

        let mut order: Vec<usize> = (0..self.records.len()).collect();
        order.sort_by_key(|&i| sort_time(self.records[i].time));

        let mut next: HashMap<(Team, WardType), usize> = HashMap::new();
        for i in order {
            let ward = &mut self.records[i];
            if !ward.team.is_known() {
                continue;
            }
            let key = (ward.team, ward.ward_type);
            let Some(queue) = queues.get(&key) else {
                continue;
            };
            let cursor = next.entry(key).or_insert(0);
            if let Some(entity) = queue.get(*cursor) {
                *cursor += 1;
                ward.position = entity.position;
            }
        }
    }
}

/// Unknown times sort last.
fn sort_time(time: MatchTime) -> MatchTime {
    if time < 0 { MatchTime::MAX } else { time }
}

impl EventHandler for WardTracker {
    fn handle_event(&mut self, event: &NormalizedEvent) {
        match &event.kind {
            EventKind::ItemUse(use_) => {
                if let Some(ward_type) = WardType::from_item(&use_.item) {
                    self.place(event.time, &use_.unit, &use_.owner, ward_type);
                }
            }
            EventKind::Death(death) if death.target.to_ascii_lowercase().contains("ward") => {
                self.resolve_death(event.time, &death.actor);
            }
            _ => {}
        }
    }
}

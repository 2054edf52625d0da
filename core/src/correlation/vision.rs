//! Vision impact: what happened around each observer ward in the minute
//! after it was placed.
//!
//! ```text
//!   placed                     placed + window
//!     │◄──────── fights starting here ───────►│
//!     │   events near the ward (radius)       │
//!     ▼                                        ▼
//!   score = 0.5·enemies + 0.25·enemies(≥2 events)
//!         + 1.0·favorable fights + 0.75·(kills for − kills against)
//! ```
//!
//! Wards are scored independently on rayon's pool.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use rayon::prelude::*;
use serde::Serialize;

use crate::events::MatchTime;
use crate::fights::{Fight, FightEventKind};
use crate::identity::{HeroIdentity, Team};
use crate::tracking::{Position, PositionSampler, WardEntity, WardRecord, WardType};
use aegis_types::VisionConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionImpactRecord {
    pub time: MatchTime,
    pub player: String,
    pub team: Team,
    #[serde(rename = "type")]
    pub ward_type: WardType,
    pub window: i64,
    pub kills_for_team_window: u32,
    pub kills_against_team_window: u32,
    pub fights_in_window: u32,
    pub favorable_fights_window: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ward_y: Option<f64>,
    pub tracked_enemy_heroes_estimate: u32,
    pub movement_events_estimate: u32,
    pub efficiency_score: f64,
}

/// Summed vision components for a player or team.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisionRollup {
    pub kills_for_team_window: u32,
    pub kills_against_team_window: u32,
    pub fights_in_window: u32,
    pub favorable_fights_window: u32,
    pub tracked_enemy_heroes_estimate: u32,
    pub movement_events_estimate: u32,
    pub efficiency_score_sum: f64,
    #[serde(rename = "_count")]
    pub count: u32,
    pub efficiency_score_avg: f64,
}

impl VisionRollup {
    fn add(&mut self, record: &VisionImpactRecord) {
        self.kills_for_team_window += record.kills_for_team_window;
        self.kills_against_team_window += record.kills_against_team_window;
        self.fights_in_window += record.fights_in_window;
        self.favorable_fights_window += record.favorable_fights_window;
        self.tracked_enemy_heroes_estimate += record.tracked_enemy_heroes_estimate;
        self.movement_events_estimate += record.movement_events_estimate;
        self.efficiency_score_sum += record.efficiency_score;
        self.count += 1;
        self.efficiency_score_avg = self.efficiency_score_sum / self.count as f64;
    }
}

pub struct VisionContext<'a> {
    pub config: &'a VisionConfig,
    pub fights: &'a [Fight],
    pub positions: &'a PositionSampler,
    pub identity: &'a HeroIdentity,
    pub entities: &'a [WardEntity],
}

impl VisionContext<'_> {
    fn ward_position(&self, ward: &WardRecord) -> Option<Position> {
        ward.position.or_else(|| {
            self.entities
                .iter()
                .filter(|e| e.ward_type == WardType::Observer && e.team == ward.team)
                .find_map(|e| e.position)
        })
    }

    fn near(&self, unit: &str, time: MatchTime, origin: &Position) -> bool {
        !unit.is_empty()
            && self
                .positions
                .latest_at(unit, time)
                .is_some_and(|p| p.distance(origin) <= self.config.radius)
    }

    fn fight_near(&self, fight: &Fight, origin: &Position) -> bool {
        let samples: Vec<Position> = fight
            .participants
            .iter()
            .filter_map(|p| self.positions.latest_at(p, fight.start))
            .collect();
        Position::centroid(&samples).is_some_and(|c| c.distance(origin) <= self.config.radius)
    }
}

/// Score every observer placement with a known time, in placement order.
pub fn score_wards(wards: &[WardRecord], ctx: &VisionContext<'_>) -> Vec<VisionImpactRecord> {
    let observers: Vec<&WardRecord> = wards
        .iter()
        .filter(|w| w.ward_type == WardType::Observer && w.time >= 0)
        .collect();
    observers.par_iter().map(|w| score_ward(w, ctx)).collect()
}

pub fn score_ward(ward: &WardRecord, ctx: &VisionContext<'_>) -> VisionImpactRecord {
    let window = ctx.config.window_secs;
    let (from, to) = (ward.time, ward.time + window);
    let team = ward.team;
    let origin = ctx.ward_position(ward);

    let mut fights_in_window = 0;
    let mut favorable = 0;
    let mut kills_for = 0;
    let mut kills_against = 0;
    let mut enemy_events: HashMap<&str, u32> = HashMap::new();

    for fight in ctx.fights {
        let starts_inside = fight.start >= from && fight.start <= to;
        if starts_inside && origin.is_none_or(|o| ctx.fight_near(fight, &o)) {
            fights_in_window += 1;
            if fight.enrichment.swing.favours(team) {
                favorable += 1;
            }
        }

        for e in fight.events.iter().filter(|e| e.time >= from && e.time <= to) {
            if let Some(o) = &origin {
                if !ctx.near(&e.actor, e.time, o) && !ctx.near(&e.target, e.time, o) {
                    continue;
                }
            }
            for unit in [&e.actor, &e.target] {
                if !unit.is_empty() && ctx.identity.team_of(unit).opposes(team) {
                    *enemy_events.entry(unit.as_str()).or_default() += 1;
                }
            }
            if e.kind == FightEventKind::Death && team.is_known() {
                if ctx.identity.team_of(&e.actor) == team {
                    kills_for += 1;
                }
                if ctx.identity.team_of(&e.target) == team {
                    kills_against += 1;
                }
            }
        }
    }

    let tracked = enemy_events.len() as u32;
    let movement = enemy_events.values().filter(|&&n| n >= 2).count() as u32;
    let efficiency_score = 0.5 * tracked as f64
        + 0.25 * movement as f64
        + 1.0 * favorable as f64
        + 0.75 * (kills_for as f64 - kills_against as f64);

    VisionImpactRecord {
        time: ward.time,
        player: ward.player.clone(),
        team,
        ward_type: ward.ward_type,
        window,
        kills_for_team_window: kills_for,
        kills_against_team_window: kills_against,
        fights_in_window,
        favorable_fights_window: favorable,
        ward_x: origin.map(|o| o.x),
        ward_y: origin.map(|o| o.y),
        tracked_enemy_heroes_estimate: tracked,
        movement_events_estimate: movement,
        efficiency_score,
    }
}

/// Per-player rollup; placements without a player are skipped.
pub fn vision_by_player(records: &[VisionImpactRecord]) -> BTreeMap<String, VisionRollup> {
    let mut out: BTreeMap<String, VisionRollup> = BTreeMap::new();
    for r in records.iter().filter(|r| !r.player.is_empty()) {
        out.entry(r.player.clone()).or_default().add(r);
    }
    out
}

/// Per-team rollup; placements of unknown team are skipped.
pub fn vision_by_team(records: &[VisionImpactRecord]) -> BTreeMap<Team, VisionRollup> {
    let mut out: BTreeMap<Team, VisionRollup> = BTreeMap::new();
    for r in records.iter().filter(|r| r.team.is_known()) {
        out.entry(r.team).or_default().add(r);
    }
    out
}

//! Roshan timeline and the activity around the Roshan kill.

use std::collections::BTreeMap;

use hashbrown::HashSet;
use serde::Serialize;

use crate::events::MatchTime;
use crate::events::normalized::RoshanEvent;
use crate::fights::Fight;
use crate::identity::{HeroIdentity, Team};
use crate::tracking::{WardRecord, WardType};

/// Latest known Roshan, Aegis, Shard and Cheese state. Later events overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoshanSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub killer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aegis_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aegis_pickup_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aegis_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aegis_status_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aegis_lost_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_pickup_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheese_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheese_pickup_time: Option<MatchTime>,
}

impl RoshanSummary {
    pub fn apply(&mut self, time: MatchTime, event: &RoshanEvent) {
        match event {
            RoshanEvent::Kill { killer } => {
                self.kill_time = Some(time);
                self.killer = Some(killer.clone());
            }
            RoshanEvent::AegisPickup { holder } => {
                self.aegis_holder = Some(holder.clone());
                self.aegis_pickup_time = Some(time);
            }
            RoshanEvent::AegisStatus { status } => {
                self.aegis_status = Some(status.clone());
                self.aegis_status_time = Some(time);
            }
            RoshanEvent::AegisLost => self.aegis_lost_time = Some(time),
            RoshanEvent::ShardPickup { holder } => {
                self.shard_holder = Some(holder.clone());
                self.shard_pickup_time = Some(time);
            }
            RoshanEvent::CheesePickup { holder } => {
                self.cheese_holder = Some(holder.clone());
                self.cheese_pickup_time = Some(time);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The kill time, when one is known.
    pub fn known_kill_time(&self) -> Option<MatchTime> {
        self.kill_time.filter(|&t| t >= 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoshanContext {
    pub wards: u32,
    pub smokes: u32,
    pub runes: u32,
    pub window: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoshanControl {
    pub wards_by_team: BTreeMap<Team, u32>,
    pub sentries_by_team: BTreeMap<Team, u32>,
    pub heroes_presence_by_team: BTreeMap<Team, u32>,
    pub window: i64,
}

fn within(t: MatchTime, kill: MatchTime, window: i64) -> bool {
    t >= kill - window && t <= kill + window
}

fn count_within(times: impl IntoIterator<Item = MatchTime>, kill: MatchTime, window: i64) -> u32 {
    times.into_iter().filter(|&t| within(t, kill, window)).count() as u32
}

/// Ward, smoke and rune events within `window` seconds either side of the kill.
pub fn roshan_context(
    kill: MatchTime,
    window: i64,
    wards: &[WardRecord],
    smoke_times: impl IntoIterator<Item = MatchTime>,
    rune_times: impl IntoIterator<Item = MatchTime>,
) -> RoshanContext {
    RoshanContext {
        wards: count_within(wards.iter().map(|w| w.time), kill, window),
        smokes: count_within(smoke_times, kill, window),
        runes: count_within(rune_times, kill, window),
        window,
    }
}

/// Per-team ward placements and hero presence around the kill.
pub fn roshan_control(
    kill: MatchTime,
    window: i64,
    wards: &[WardRecord],
    fights: &[Fight],
    identity: &HeroIdentity,
) -> RoshanControl {
    let mut wards_by_team = BTreeMap::new();
    let mut sentries_by_team = BTreeMap::new();
    for w in wards.iter().filter(|w| w.team.is_known() && within(w.time, kill, window)) {
        let table = match w.ward_type {
            WardType::Observer => &mut wards_by_team,
            WardType::Sentry => &mut sentries_by_team,
        };
        *table.entry(w.team).or_insert(0) += 1;
    }

    let present: HashSet<&str> = fights
        .iter()
        .filter(|f| f.end >= kill - window && f.start <= kill + window)
        .flat_map(|f| f.participants.iter().map(String::as_str))
        .collect();
    let mut heroes_presence_by_team = BTreeMap::new();
    for unit in present {
        let team = identity.hero_team(unit);
        if team.is_known() {
            *heroes_presence_by_team.entry(team).or_insert(0) += 1;
        }
    }

    RoshanControl {
        wards_by_team,
        sentries_by_team,
        heroes_presence_by_team,
        window,
    }
}

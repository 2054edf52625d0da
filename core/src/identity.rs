//! Unit → owning hero and team resolution.
//!
//! Combat-log names are raw unit names. Illusions, summoned companions and
//! clones all act on behalf of a hero; this module folds them back onto
//! that hero so per-player tables line up. Team labels come from the team
//! number on hero entities, falling back to the `goodguys`/`badguys`
//! fragments that buildings and creeps carry in their names.

use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Prefix shared by every canonical hero unit name.
pub const HERO_PREFIX: &str = "npc_dota_hero_";

/// Entity class prefix for hero units.
const HERO_CLASS_PREFIX: &str = "cdota_unit_hero_";

/// Controlled-unit name fragments and the hero that owns them, checked in order.
const COMPANIONS: &[(&str, &str)] = &[
    ("spirit_bear", "npc_dota_hero_lone_druid"),
    ("tempest_double", "npc_dota_hero_arc_warden"),
    ("arc_warden_tempest", "npc_dota_hero_arc_warden"),
    ("meepo", "npc_dota_hero_meepo"),
    ("visage_familiar", "npc_dota_hero_visage"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    Radiant,
    Dire,
    #[default]
    #[serde(rename = "")]
    Unknown,
}

impl Team {
    /// Map an entity team number. 2 is Radiant, 3 is Dire.
    pub fn from_number(n: i64) -> Self {
        match n {
            2 => Team::Radiant,
            3 => Team::Dire,
            _ => Team::Unknown,
        }
    }

    /// Team from the faction fragment embedded in building and creep names.
    pub fn from_unit_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("goodguys") {
            Team::Radiant
        } else if lower.contains("badguys") {
            Team::Dire
        } else {
            Team::Unknown
        }
    }

    pub fn is_known(self) -> bool {
        self != Team::Unknown
    }

    /// +1 for Radiant, -1 for Dire, 0 otherwise. Used to fold grants into a signed lead.
    pub fn sign(self) -> i64 {
        match self {
            Team::Radiant => 1,
            Team::Dire => -1,
            Team::Unknown => 0,
        }
    }

    /// True when both teams are known and differ.
    pub fn opposes(self, other: Team) -> bool {
        self.is_known() && other.is_known() && self != other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Team::Radiant => "Radiant",
            Team::Dire => "Dire",
            Team::Unknown => "",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the hero that owns `unit`. First match wins:
///
/// 1. a canonical hero unit is its own owner
/// 2. a name embedding a hero unit (illusions) resolves to that hero
/// 3. known companion fragments map to their fixed owner
/// 4. anything else passes through unchanged
pub fn resolve_owner(unit: &str) -> String {
    let lower = unit.to_ascii_lowercase();
    if lower.starts_with(HERO_PREFIX) {
        return lower;
    }
    if let Some(idx) = lower.find(HERO_PREFIX) {
        return lower[idx..].to_string();
    }
    for (fragment, owner) in COMPANIONS {
        if lower.contains(fragment) {
            return (*owner).to_string();
        }
    }
    unit.to_string()
}

pub fn is_hero(name: &str) -> bool {
    name.to_ascii_lowercase().starts_with(HERO_PREFIX)
}

/// Convert a hero entity class (`CDOTA_Unit_Hero_Axe`) to its unit name (`npc_dota_hero_axe`).
pub fn hero_unit_from_class(class_name: &str) -> Option<String> {
    let lower = class_name.to_ascii_lowercase();
    lower
        .strip_prefix(HERO_CLASS_PREFIX)
        .filter(|rest| !rest.is_empty())
        .map(|rest| format!("{HERO_PREFIX}{rest}"))
}

/// Hero unit → team, built from entity-created observations during ingestion.
#[derive(Debug, Default, Clone)]
pub struct HeroIdentity {
    teams: HashMap<String, Team>,
}

impl HeroIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a hero's team. A known team is never downgraded to unknown.
    pub fn register(&mut self, hero: &str, team: Team) {
        match self.teams.get_mut(hero) {
            Some(existing) => {
                if team.is_known() {
                    *existing = team;
                }
            }
            None => {
                self.teams.insert(hero.to_string(), team);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Team of a registered hero only, without any fallback.
    pub fn hero_team(&self, hero: &str) -> Team {
        self.teams.get(hero).copied().unwrap_or_default()
    }

    /// Team of any unit: the unit itself if registered, then its owner,
    /// then faction fragments in the name.
    pub fn team_of(&self, unit: &str) -> Team {
        if unit.is_empty() {
            return Team::Unknown;
        }
        if let Some(team) = self.teams.get(unit).filter(|t| t.is_known()) {
            return *team;
        }
        let owner = resolve_owner(unit);
        if let Some(team) = self.teams.get(owner.as_str()).filter(|t| t.is_known()) {
            return *team;
        }
        Team::from_unit_name(unit)
    }
}

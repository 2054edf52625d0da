//! Canonical events produced by the normalizer.
//!
//! One variant per event kind, each carrying only the fields that kind
//! needs. Names are raw unit names (possibly empty); owner and team
//! resolution has already been applied where a variant carries them.

use crate::identity::Team;

/// Match clock in whole seconds. Negative means unknown.
pub type MatchTime = i64;

pub const UNKNOWN_TIME: MatchTime = -1;

/// Round a decoder timestamp to whole seconds, half away from zero.
pub fn round_time(secs: f64) -> MatchTime {
    secs.round() as MatchTime
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    pub time: MatchTime,
    pub kind: EventKind,
}

impl NormalizedEvent {
    pub fn new(time: MatchTime, kind: EventKind) -> Self {
        Self { time, kind }
    }

    pub fn has_time(&self) -> bool {
        self.time >= 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Damage(Interaction),
    Heal(Interaction),
    Death(Interaction),
    AbilityCast(AbilityCast),
    ItemUse(ItemUse),
    ItemPickup(ItemPickup),
    Purchase(Purchase),
    ModifierAdd(ModifierChange),
    ModifierRemove(ModifierChange),
    Gold(EconomyGrant),
    Xp(EconomyGrant),
    Buyback { player: String },
    Rune(RuneActivity),
    Glyph { team: Team },
    Scan { team: Team },
    BuildingKill(ObjectiveKill),
    HeroDeath(ObjectiveKill),
    Roshan(RoshanEvent),
}

/// Damage, heal or death between two units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Interaction {
    pub actor: String,
    pub target: String,
    pub inflictor: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbilityCast {
    pub caster: String,
    pub owner: String,
    pub ability: String,
    pub is_ult: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemUse {
    pub unit: String,
    pub owner: String,
    pub item: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemPickup {
    pub player: String,
    pub item: String,
    pub neutral: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub player: String,
    pub item: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierChange {
    pub target: String,
    pub source: String,
    /// Lowercased modifier name.
    pub modifier: String,
}

/// A gold or XP grant attributed to a team.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyGrant {
    pub recipient: String,
    pub team: Team,
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuneSource {
    /// `dota_rune_activated` game event.
    Activated,
    /// Rune buff applied to the picker, seen in the combat log.
    Modifier,
    BottleRefillUsed,
    BottleRefillObtained,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuneActivity {
    pub player: String,
    /// Rune name, empty for bottle refills.
    pub rune: String,
    pub source: RuneSource,
}

/// A building or hero killed, with both sides' team attribution.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveKill {
    pub target: String,
    pub killer: String,
    pub team_target: Team,
    pub team_by: Team,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoshanEvent {
    Kill { killer: String },
    AegisPickup { holder: String },
    /// Denied or snatched; carries the game event name.
    AegisStatus { status: String },
    AegisLost,
    ShardPickup { holder: String },
    CheesePickup { holder: String },
}

// ─── Well-known item names ───────────────────────────────────────────────────

pub const ITEM_SMOKE: &str = "item_smoke_of_deceit";
pub const ITEM_OBSERVER: &str = "item_ward_observer";
pub const ITEM_SENTRY: &str = "item_ward_sentry";
pub const ITEM_AEGIS: &str = "item_aegis";
pub const ITEM_BKB: &str = "item_black_king_bar";
pub const ITEM_SCEPTER: &str = "item_ultimate_scepter";
pub const ITEM_SHARD: &str = "item_aghanims_shard";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_time() {
        assert_eq!(round_time(10.4), 10);
        assert_eq!(round_time(10.5), 11);
        assert_eq!(round_time(0.0), 0);
    }
}

//! Aggregated per-player and per-team tables.
//!
//! Every table is a single fold over one materialised collection. Keys are
//! sorted (`BTreeMap`) so the document is stable across runs.

pub mod combat;
pub mod players;
pub mod teams;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::MatchTime;
use crate::fights::Fight;
use crate::identity::{HeroIdentity, Team};
use crate::ledger::EventLedger;
use crate::tracking::{CcInterval, CcTotals, CcTracker, WardRecord};

pub use combat::{AbilityUsage, CountTable, DamageTables, SumTable, flow_summary};
pub use players::{BuybackTables, LaneRole, PlayerWards, PowerSpikes, RoleGuess};
pub use teams::{FightsOverview, TeamObjectives};

pub struct RollupInput<'a> {
    pub ledger: &'a EventLedger,
    pub wards: &'a [WardRecord],
    pub cc: &'a CcTracker,
    pub fights: &'a [Fight],
    pub identity: &'a HeroIdentity,
    pub early_game_end: MatchTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rollups {
    #[serde(flatten)]
    pub abilities: AbilityUsage,
    #[serde(flatten)]
    pub damage: DamageTables,
    pub cc_by_attacker: BTreeMap<String, CcTotals>,
    pub cc_instances: Vec<CcInterval>,
    pub wards_by_player: BTreeMap<String, PlayerWards>,
    pub dewards_by_player: CountTable,
    pub rune_pickups_by_player: BTreeMap<String, CountTable>,
    pub smokes_by_player: CountTable,
    pub item_pickups_by_player: BTreeMap<String, CountTable>,
    #[serde(flatten)]
    pub buybacks: BuybackTables,
    pub objectives_by_team: BTreeMap<Team, TeamObjectives>,
    pub fights_overview: FightsOverview,
    pub first_purchase_by_player_by_item: BTreeMap<String, BTreeMap<String, MatchTime>>,
    pub power_spikes_by_player: BTreeMap<String, PowerSpikes>,
    pub lane_roles_by_player: BTreeMap<String, LaneRole>,
}

pub fn build_rollups(input: &RollupInput<'_>) -> Rollups {
    let ledger = input.ledger;
    let (wards_by_player, dewards_by_player) = players::ward_tables(input.wards);
    let first_purchases = players::first_purchases(&ledger.items);

    let rollups = Rollups {
        abilities: combat::ability_usage(&ledger.ability_casts),
        damage: combat::damage_tables(&ledger.damage),
        cc_by_attacker: input.cc.by_source().clone(),
        cc_instances: input.cc.intervals().to_vec(),
        wards_by_player,
        dewards_by_player,
        rune_pickups_by_player: players::rune_pickups(&ledger.runes),
        smokes_by_player: players::smokes_by_player(&ledger.smokes),
        item_pickups_by_player: players::item_pickups(&ledger.items),
        buybacks: players::buyback_tables(&ledger.buybacks),
        objectives_by_team: teams::objectives_by_team(&ledger.objectives),
        fights_overview: teams::fights_overview(input.fights),
        power_spikes_by_player: players::power_spikes(&ledger.ability_casts, &first_purchases),
        first_purchase_by_player_by_item: first_purchases,
        lane_roles_by_player: players::lane_roles(
            &ledger.ability_casts,
            &ledger.damage,
            input.wards,
            &ledger.smokes,
            input.identity,
            input.early_game_end,
        ),
    };

    tracing::debug!(
        players = rollups.lane_roles_by_player.len(),
        fights = rollups.fights_overview.count,
        "Rollups built"
    );
    rollups
}

//! Per-player tables: wards, runes, smokes, items, buybacks and timings.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::combat::CountTable;
use crate::events::MatchTime;
use crate::events::normalized::{ITEM_BKB, ITEM_SCEPTER, ITEM_SHARD};
use crate::identity::{HeroIdentity, Team};
use crate::ledger::{
    AbilityCastEntry, BuybackEntry, FlowTable, ItemAction, ItemEntry, RuneEntry, SmokeEntry,
};
use crate::tracking::{WardRecord, WardType};

// ─── Wards ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerWards {
    pub observer_placed: u32,
    pub observer_dewarded: u32,
    pub sentry_placed: u32,
    pub sentry_dewarded: u32,
    pub dewards_made: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_observer_lifetime: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_sentry_lifetime: Option<f64>,
}

#[derive(Default)]
struct LifetimeSum {
    total: i64,
    count: u32,
}

impl LifetimeSum {
    fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total as f64 / self.count as f64)
    }
}

/// Placement counts, removal counts and average lifetimes per placing
/// player, plus dewards made per remover. Placements without a player are skipped.
pub fn ward_tables(
    wards: &[WardRecord],
) -> (BTreeMap<String, PlayerWards>, CountTable) {
    let mut by_player: BTreeMap<String, PlayerWards> = BTreeMap::new();
    let mut lifetimes: BTreeMap<(String, WardType), LifetimeSum> = BTreeMap::new();
    let mut dewards = CountTable::new();

    for ward in wards {
        if ward.player.is_empty() {
            continue;
        }
        let entry = by_player.entry(ward.player.clone()).or_default();
        match ward.ward_type {
            WardType::Observer => {
                entry.observer_placed += 1;
                entry.observer_dewarded += ward.dewarded as u32;
            }
            WardType::Sentry => {
                entry.sentry_placed += 1;
                entry.sentry_dewarded += ward.dewarded as u32;
            }
        }
        if let Some(lifetime) = ward.lifetime.filter(|&l| l >= 0) {
            let sum = lifetimes
                .entry((ward.player.clone(), ward.ward_type))
                .or_default();
            sum.total += lifetime;
            sum.count += 1;
        }
        if let Some(remover) = ward.removed_by.as_deref().filter(|r| !r.is_empty()) {
            *dewards.entry(remover.to_string()).or_insert(0) += 1;
            by_player.entry(remover.to_string()).or_default().dewards_made += 1;
        }
    }

    for ((player, ward_type), sum) in &lifetimes {
        if let Some(entry) = by_player.get_mut(player) {
            match ward_type {
                WardType::Observer => entry.avg_observer_lifetime = sum.average(),
                WardType::Sentry => entry.avg_sentry_lifetime = sum.average(),
            }
        }
    }

    (by_player, dewards)
}

// ─── Runes, smokes, items ────────────────────────────────────────────────────

/// Per-rune counts plus `_total`. Bottle refills only count towards the total.
pub fn rune_pickups(runes: &[RuneEntry]) -> BTreeMap<String, CountTable> {
    let mut out: BTreeMap<String, CountTable> = BTreeMap::new();
    for rune in runes.iter().filter(|r| !r.player.is_empty()) {
        let sub = out.entry(rune.player.clone()).or_default();
        if !rune.rune.is_empty() {
            *sub.entry(rune.rune.clone()).or_insert(0) += 1;
        }
        *sub.entry("_total".to_string()).or_insert(0) += 1;
    }
    out
}

pub fn smokes_by_player(smokes: &[SmokeEntry]) -> CountTable {
    let mut out = CountTable::new();
    for smoke in smokes.iter().filter(|s| !s.player.is_empty()) {
        *out.entry(smoke.player.clone()).or_insert(0) += 1;
    }
    out
}

/// Picked-up items per player: one count per item, `_total`, and `_neutral_total`.
pub fn item_pickups(items: &[ItemEntry]) -> BTreeMap<String, CountTable> {
    let mut out: BTreeMap<String, CountTable> = BTreeMap::new();
    let picked = items.iter().filter(|i| {
        i.action == ItemAction::PickedUp && !i.player.is_empty() && !i.item.is_empty()
    });
    for item in picked {
        let sub = out.entry(item.player.clone()).or_default();
        *sub.entry(item.item.clone()).or_insert(0) += 1;
        *sub.entry("_total".to_string()).or_insert(0) += 1;
        if item.neutral {
            *sub.entry("_neutral_total".to_string()).or_insert(0) += 1;
        }
    }
    out
}

/// Earliest known purchase time of each item, per player.
pub fn first_purchases(items: &[ItemEntry]) -> BTreeMap<String, BTreeMap<String, MatchTime>> {
    let mut out: BTreeMap<String, BTreeMap<String, MatchTime>> = BTreeMap::new();
    let bought = items.iter().filter(|i| {
        i.action == ItemAction::Purchased
            && i.time >= 0
            && !i.player.is_empty()
            && !i.item.is_empty()
    });
    for item in bought {
        let first = out
            .entry(item.player.clone())
            .or_default()
            .entry(item.item.clone())
            .or_insert(item.time);
        *first = (*first).min(item.time);
    }
    out
}

// ─── Buybacks ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuybackTables {
    pub buybacks_by_player: CountTable,
    pub buybacks_first_time: BTreeMap<String, MatchTime>,
    pub buybacks_last_time: BTreeMap<String, MatchTime>,
}

pub fn buyback_tables(buybacks: &[BuybackEntry]) -> BuybackTables {
    let mut tables = BuybackTables::default();
    for bb in buybacks.iter().filter(|b| !b.player.is_empty()) {
        *tables.buybacks_by_player.entry(bb.player.clone()).or_insert(0) += 1;
        if bb.time < 0 {
            continue;
        }
        let first = tables
            .buybacks_first_time
            .entry(bb.player.clone())
            .or_insert(bb.time);
        *first = (*first).min(bb.time);
        let last = tables
            .buybacks_last_time
            .entry(bb.player.clone())
            .or_insert(bb.time);
        *last = (*last).max(bb.time);
    }
    tables
}

// ─── Power spikes ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PowerSpikes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_ult_cast_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bkb_purchase_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aghs_purchase_time: Option<MatchTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_purchase_time: Option<MatchTime>,
}

pub fn power_spikes(
    casts: &[AbilityCastEntry],
    first_purchases: &BTreeMap<String, BTreeMap<String, MatchTime>>,
) -> BTreeMap<String, PowerSpikes> {
    let mut out: BTreeMap<String, PowerSpikes> = BTreeMap::new();
    for cast in casts
        .iter()
        .filter(|c| c.is_ult && c.time >= 0 && !c.caster.is_empty())
    {
        let spikes = out.entry(cast.caster.clone()).or_default();
        spikes.first_ult_cast_time = Some(
            spikes
                .first_ult_cast_time
                .map_or(cast.time, |t| t.min(cast.time)),
        );
    }
    for (player, items) in first_purchases {
        let spikes = out.entry(player.clone()).or_default();
        spikes.bkb_purchase_time = items.get(ITEM_BKB).copied();
        spikes.aghs_purchase_time = items.get(ITEM_SCEPTER).copied();
        spikes.shard_purchase_time = items.get(ITEM_SHARD).copied();
    }
    out
}

// ─── Lane roles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleGuess {
    Support,
    Core,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneRole {
    pub role_guess: RoleGuess,
    pub team: Team,
    pub early_wards: u32,
    pub early_smokes: u32,
    pub confidence: f64,
}

/// Support/core guess for every unit that cast an ability or dealt damage.
/// Two or more wards and smokes by `early_end` marks a support.
pub fn lane_roles(
    casts: &[AbilityCastEntry],
    damage: &FlowTable,
    wards: &[WardRecord],
    smokes: &[SmokeEntry],
    identity: &HeroIdentity,
    early_end: MatchTime,
) -> BTreeMap<String, LaneRole> {
    let early = |t: MatchTime| t >= 0 && t <= early_end;
    let mut early_wards = CountTable::new();
    for w in wards.iter().filter(|w| early(w.time)) {
        *early_wards.entry(w.player.clone()).or_insert(0) += 1;
    }
    let mut early_smokes = CountTable::new();
    for s in smokes.iter().filter(|s| early(s.time)) {
        *early_smokes.entry(s.player.clone()).or_insert(0) += 1;
    }

    let players: BTreeSet<&str> = casts
        .iter()
        .map(|c| c.caster.as_str())
        .chain(damage.keys().map(|k| k.attacker.as_str()))
        .filter(|p| !p.is_empty())
        .collect();

    players
        .into_iter()
        .map(|player| {
            let wards = early_wards.get(player).copied().unwrap_or(0);
            let smokes = early_smokes.get(player).copied().unwrap_or(0);
            let support = wards + smokes >= 2;
            let role = LaneRole {
                role_guess: if support { RoleGuess::Support } else { RoleGuess::Core },
                team: identity.hero_team(player),
                early_wards: wards,
                early_smokes: smokes,
                confidence: if support { 0.6 } else { 0.5 },
            };
            (player.to_string(), role)
        })
        .collect()
}

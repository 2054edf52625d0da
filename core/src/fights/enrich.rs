//! Post-ingestion fight enrichment.
//!
//! Each fight is enriched independently, so the pass runs on rayon's pool.
//! It adds:
//! - the economic swing over `[start, end + swing_tail]`, or a per-actor
//!   damage proxy when no gold/XP grants fall in that window
//! - spatial groups: connected components of the actor–target graph
//! - per-actor impact records
//! - ultimate and buyback activity over `[start, end + activity_tail]`

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use serde::Serialize;

use super::segmenter::{Fight, FightEventKind};
use crate::correlation::economy::{EconomyPoint, swing_between, swing_favours};
use crate::events::MatchTime;
use crate::identity::Team;
use aegis_types::FightConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingSource {
    CombatlogGoldXp,
    #[default]
    DamageProxy,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FightSwing {
    pub gold: i64,
    pub xp: i64,
    pub source: SwingSource,
}

impl FightSwing {
    pub fn favours(&self, team: Team) -> bool {
        swing_favours(team, self.gold, self.xp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpatialGroup {
    pub participants: Vec<String>,
    pub participants_count: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ActorImpact {
    pub damage: i64,
    pub healing: i64,
    pub kills: u32,
    pub assists: u32,
    pub damage_share: f64,
    pub healing_share: f64,
    pub kparticipation: f64,
    pub impact_score: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FightEnrichment {
    pub participants_count: usize,
    pub swing: FightSwing,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spatial_groups: Vec<SpatialGroup>,
    pub by_actor: BTreeMap<String, ActorImpact>,
    pub ults_count: u32,
    pub ults_by_caster: BTreeMap<String, u32>,
    pub buybacks_count: u32,
    pub buybacks_by_player: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_proxy_by_actor: Option<BTreeMap<String, i64>>,
}

/// A timestamped unit-level activity (ultimate cast or buyback).
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub time: MatchTime,
    pub unit: String,
}

/// Everything fight enrichment reads besides the fight itself.
pub struct EnrichContext<'a> {
    pub config: &'a FightConfig,
    pub economy: &'a [EconomyPoint],
    pub ult_casts: &'a [Activity],
    pub buybacks: &'a [Activity],
}

/// Enrich every fight in place.
pub fn enrich_fights(fights: &mut [Fight], ctx: &EnrichContext<'_>) {
    fights
        .par_iter_mut()
        .for_each(|fight| fight.enrichment = enrich_fight(fight, ctx));
}

pub fn enrich_fight(fight: &Fight, ctx: &EnrichContext<'_>) -> FightEnrichment {
    let start = fight.start;
    let end = fight.end.max(start);

    let economy = swing_between(ctx.economy, start, end + ctx.config.swing_tail_secs);
    let has_economy = economy.samples > 0;
    let swing = FightSwing {
        gold: economy.gold,
        xp: economy.xp,
        source: if has_economy {
            SwingSource::CombatlogGoldXp
        } else {
            SwingSource::DamageProxy
        },
    };

    let activity_end = end + ctx.config.activity_tail_secs;
    let (ults_count, ults_by_caster) = count_activity(ctx.ult_casts, start, activity_end);
    let (buybacks_count, buybacks_by_player) = count_activity(ctx.buybacks, start, activity_end);

    let by_actor = actor_impacts(fight, ctx.config.assist_window_secs, &ults_by_caster, &buybacks_by_player);

    FightEnrichment {
        participants_count: fight.participants.len(),
        swing,
        spatial_groups: spatial_groups(fight),
        by_actor,
        ults_count,
        ults_by_caster,
        buybacks_count,
        buybacks_by_player,
        damage_proxy_by_actor: (!has_economy).then(|| damage_proxy(fight)),
    }
}

fn count_activity(
    activity: &[Activity],
    from: MatchTime,
    to: MatchTime,
) -> (u32, BTreeMap<String, u32>) {
    let mut count = 0;
    let mut by_unit = BTreeMap::new();
    for a in activity.iter().filter(|a| a.time >= from && a.time <= to) {
        count += 1;
        if !a.unit.is_empty() {
            *by_unit.entry(a.unit.clone()).or_insert(0) += 1;
        }
    }
    (count, by_unit)
}

/// Positive damage per non-empty actor.
fn damage_proxy(fight: &Fight) -> BTreeMap<String, i64> {
    let mut out = BTreeMap::new();
    for e in &fight.events {
        if e.kind == FightEventKind::Damage && !e.actor.is_empty() && e.value > 0 {
            *out.entry(e.actor.clone()).or_insert(0) += e.value;
        }
    }
    out
}

/// Connected components of the interaction graph, seeded in participant order.
pub fn spatial_groups(fight: &Fight) -> Vec<SpatialGroup> {
    let mut adjacency: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for e in &fight.events {
        if e.actor.is_empty() || e.target.is_empty() {
            continue;
        }
        adjacency.entry(&e.actor).or_default().insert(&e.target);
        adjacency.entry(&e.target).or_default().insert(&e.actor);
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut groups = Vec::new();
    for seed in &fight.participants {
        if seed.is_empty() || !seen.insert(seed.as_str()) {
            continue;
        }
        let mut component = vec![seed.clone()];
        let mut queue = VecDeque::from([seed.as_str()]);
        while let Some(node) = queue.pop_front() {
            let Some(neighbours) = adjacency.get(node) else {
                continue;
            };
            for &next in neighbours {
                if seen.insert(next) {
                    component.push(next.to_string());
                    queue.push_back(next);
                }
            }
        }
        groups.push(SpatialGroup {
            participants_count: component.len(),
            participants: component,
        });
    }
    groups
}

fn actor_impacts(
    fight: &Fight,
    assist_window: i64,
    ults: &BTreeMap<String, u32>,
    buybacks: &BTreeMap<String, u32>,
) -> BTreeMap<String, ActorImpact> {
    let mut damage: HashMap<&str, i64> = HashMap::new();
    let mut healing: HashMap<&str, i64> = HashMap::new();
    let mut kills: HashMap<&str, u32> = HashMap::new();
    let mut assists: HashMap<&str, u32> = HashMap::new();
    let (mut total_damage, mut total_healing, mut total_kills) = (0i64, 0i64, 0u32);

    for e in &fight.events {
        match e.kind {
            FightEventKind::Damage => {
                *damage.entry(&e.actor).or_default() += e.value;
                total_damage += e.value;
            }
            FightEventKind::Heal => {
                *healing.entry(&e.actor).or_default() += e.value;
                total_healing += e.value;
            }
            FightEventKind::Death => {
                *kills.entry(&e.actor).or_default() += 1;
                total_kills += 1;
            }
        }
    }

    // One assist per damage dealer per death, killer included
    for death in fight.deaths() {
        if death.target.is_empty() {
            continue;
        }
        let contributors: HashSet<&str> = fight
            .events
            .iter()
            .filter(|e| {
                e.kind == FightEventKind::Damage
                    && !e.actor.is_empty()
                    && e.target == death.target
                    && e.time >= death.time - assist_window
                    && e.time <= death.time
            })
            .map(|e| e.actor.as_str())
            .collect();
        for actor in contributors {
            *assists.entry(actor).or_default() += 1;
        }
    }

    let share = |part: i64, total: i64| {
        if total > 0 {
            part as f64 / total as f64
        } else {
            0.0
        }
    };

    let mut out = BTreeMap::new();
    for actor in fight.participants.iter().filter(|p| !p.is_empty()) {
        let name = actor.as_str();
        let dmg = damage.get(name).copied().unwrap_or(0);
        let heal = healing.get(name).copied().unwrap_or(0);
        let k = kills.get(name).copied().unwrap_or(0);
        let a = assists.get(name).copied().unwrap_or(0);
        let damage_share = share(dmg, total_damage);
        let ult_count = ults.get(name).copied().unwrap_or(0);
        let buyback_count = buybacks.get(name).copied().unwrap_or(0);

        out.insert(
            actor.clone(),
            ActorImpact {
                damage: dmg,
                healing: heal,
                kills: k,
                assists: a,
                damage_share,
                healing_share: share(heal, total_healing),
                kparticipation: if total_kills > 0 {
                    (k + a) as f64 / total_kills as f64
                } else {
                    0.0
                },
                impact_score: damage_share + 0.5 * k as f64 + 0.25 * a as f64
                    + 0.3 * ult_count as f64
                    - 0.2 * buyback_count as f64,
            },
        );
    }
    out
}

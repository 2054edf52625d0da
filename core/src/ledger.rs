//! Per-kind event lists collected during ingestion.
//!
//! The ledger keeps what later passes and the output document need in raw
//! form: item and rune activity, smokes, ability casts, objectives, economy
//! grants and the damage/healing flow tables. Ward placements are kept by
//! the ward tracker, fights by the segmenter.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::correlation::{EconomyPoint, ObjectiveEvent, RoshanSummary};
use crate::events::normalized::{ITEM_SMOKE, RuneSource};
use crate::events::{EventHandler, EventKind, MatchTime, NormalizedEvent};
use crate::fights::Activity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmokeEntry {
    pub time: MatchTime,
    pub player: String,
    pub owner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemAction {
    Purchased,
    PickedUp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemEntry {
    pub time: MatchTime,
    pub player: String,
    pub item: String,
    pub action: ItemAction,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub neutral: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuneEntry {
    pub time: MatchTime,
    pub player: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub rune: String,
    pub source: RuneSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuybackEntry {
    pub time: MatchTime,
    pub player: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilityCastEntry {
    pub time: MatchTime,
    pub caster: String,
    pub ability: String,
    pub is_ult: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner_caster: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemUseEntry {
    pub time: MatchTime,
    pub unit: String,
    pub owner: String,
    pub item: String,
}

/// Attacker, target and inflictor of a damage or healing flow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowKey {
    pub attacker: String,
    pub target: String,
    pub inflictor: String,
}

impl FlowKey {
    /// `attacker|target|inflictor`, empty parts kept.
    pub fn joined(&self) -> String {
        format!("{}|{}|{}", self.attacker, self.target, self.inflictor)
    }
}

pub type FlowTable = BTreeMap<FlowKey, i64>;

#[derive(Debug, Clone, Default)]
pub struct EventLedger {
    pub smokes: Vec<SmokeEntry>,
    pub items: Vec<ItemEntry>,
    pub runes: Vec<RuneEntry>,
    pub roshan: RoshanSummary,
    pub buybacks: Vec<BuybackEntry>,
    pub ability_casts: Vec<AbilityCastEntry>,
    pub item_uses: Vec<ItemUseEntry>,
    pub objectives: Vec<ObjectiveEvent>,
    pub economy: Vec<EconomyPoint>,
    pub damage: FlowTable,
    pub healing: FlowTable,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ultimate casts with a known time, for fight activity windows.
    pub fn ult_activity(&self) -> Vec<Activity> {
        self.ability_casts
            .iter()
            .filter(|c| c.is_ult && c.time >= 0)
            .map(|c| Activity {
                time: c.time,
                unit: c.caster.clone(),
            })
            .collect()
    }

    pub fn buyback_activity(&self) -> Vec<Activity> {
        self.buybacks
            .iter()
            .filter(|b| b.time >= 0)
            .map(|b| Activity {
                time: b.time,
                unit: b.player.clone(),
            })
            .collect()
    }

    fn add_flow(table: &mut FlowTable, actor: &str, target: &str, inflictor: &str, value: i64) {
        let key = FlowKey {
            attacker: actor.to_string(),
            target: target.to_string(),
            inflictor: inflictor.to_string(),
        };
        *table.entry(key).or_insert(0) += value;
    }
}

impl EventHandler for EventLedger {
    fn handle_event(&mut self, event: &NormalizedEvent) {
        let time = event.time;
        match &event.kind {
            EventKind::Damage(i) => {
                Self::add_flow(&mut self.damage, &i.actor, &i.target, &i.inflictor, i.value)
            }
            EventKind::Heal(i) => {
                Self::add_flow(&mut self.healing, &i.actor, &i.target, &i.inflictor, i.value)
            }
            EventKind::AbilityCast(cast) => self.ability_casts.push(AbilityCastEntry {
                time,
                caster: cast.caster.clone(),
                ability: cast.ability.clone(),
                is_ult: cast.is_ult,
                owner_caster: cast.owner.clone(),
            }),
            EventKind::ItemUse(use_) => {
                if use_.item == ITEM_SMOKE {
                    self.smokes.push(SmokeEntry {
                        time,
                        player: use_.unit.clone(),
                        owner: use_.owner.clone(),
                    });
                }
                self.item_uses.push(ItemUseEntry {
                    time,
                    unit: use_.unit.clone(),
                    owner: use_.owner.clone(),
                    item: use_.item.clone(),
                });
            }
            EventKind::Purchase(p) => self.items.push(ItemEntry {
                time,
                player: p.player.clone(),
                item: p.item.clone(),
                action: ItemAction::Purchased,
                neutral: false,
            }),
            EventKind::ItemPickup(p) => self.items.push(ItemEntry {
                time,
                player: p.player.clone(),
                item: p.item.clone(),
                action: ItemAction::PickedUp,
                neutral: p.neutral,
            }),
            EventKind::Buyback { player } => self.buybacks.push(BuybackEntry {
                time,
                player: player.clone(),
            }),
            EventKind::Rune(rune) => self.runes.push(RuneEntry {
                time,
                player: rune.player.clone(),
                rune: rune.rune.clone(),
                source: rune.source,
            }),
            EventKind::Gold(_) | EventKind::Xp(_) => {
                self.economy.extend(EconomyPoint::from_event(event));
            }
            EventKind::Glyph { .. }
            | EventKind::Scan { .. }
            | EventKind::BuildingKill(_)
            | EventKind::HeroDeath(_) => {
                self.objectives.extend(ObjectiveEvent::from_event(event));
            }
            EventKind::Roshan(r) => self.roshan.apply(time, r),
            EventKind::Death(_) | EventKind::ModifierAdd(_) | EventKind::ModifierRemove(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::normalized::{
        AbilityCast, EconomyGrant, Interaction, ItemPickup, ItemUse, Purchase, RoshanEvent,
        RuneActivity,
    };
    use crate::identity::Team;

    fn at(time: MatchTime, kind: EventKind) -> NormalizedEvent {
        NormalizedEvent::new(time, kind)
    }

    fn hit(actor: &str, target: &str, inflictor: &str, value: i64) -> Interaction {
        Interaction {
            actor: actor.into(),
            target: target.into(),
            inflictor: inflictor.into(),
            value,
        }
    }

    #[test]
    fn test_flow_tables_sum_by_key() {
        let mut ledger = EventLedger::new();
        ledger.handle_events(&[
            at(1, EventKind::Damage(hit("a", "b", "fireball", 10))),
            at(2, EventKind::Damage(hit("a", "b", "fireball", 5))),
            at(3, EventKind::Damage(hit("a", "b", "", 1))),
            at(4, EventKind::Heal(hit("c", "a", "salve", 7))),
        ]);

        assert_eq!(ledger.damage.len(), 2);
        let key = FlowKey {
            attacker: "a".into(),
            target: "b".into(),
            inflictor: "fireball".into(),
        };
        assert_eq!(ledger.damage[&key], 15);
        assert_eq!(key.joined(), "a|b|fireball");
        assert_eq!(ledger.healing.values().sum::<i64>(), 7);
    }

    #[test]
    fn test_item_uses_and_smokes() {
        let mut ledger = EventLedger::new();
        let use_ = |item: &str| {
            EventKind::ItemUse(ItemUse {
                unit: "npc_dota_hero_lion".into(),
                owner: "npc_dota_hero_lion".into(),
                item: item.into(),
            })
        };
        ledger.handle_event(&at(30, use_(ITEM_SMOKE)));
        ledger.handle_event(&at(31, use_("item_blink")));

        assert_eq!(ledger.smokes.len(), 1);
        assert_eq!(ledger.smokes[0].time, 30);
        assert_eq!(ledger.item_uses.len(), 2);
    }

    #[test]
    fn test_items_runes_buybacks_and_casts() {
        let mut ledger = EventLedger::new();
        ledger.handle_events(&[
            at(
                10,
                EventKind::Purchase(Purchase {
                    player: "p".into(),
                    item: "item_tango".into(),
                }),
            ),
            at(
                420,
                EventKind::ItemPickup(ItemPickup {
                    player: "p".into(),
                    item: "item_trusty_shovel".into(),
                    neutral: true,
                }),
            ),
            at(
                240,
                EventKind::Rune(RuneActivity {
                    player: "p".into(),
                    rune: "haste".into(),
                    source: RuneSource::Activated,
                }),
            ),
            at(1800, EventKind::Buyback { player: "p".into() }),
            at(
                900,
                EventKind::AbilityCast(AbilityCast {
                    caster: "npc_dota_hero_lina".into(),
                    owner: "npc_dota_hero_lina".into(),
                    ability: "lina_laguna_blade".into(),
                    is_ult: true,
                }),
            ),
            at(-1, EventKind::Buyback { player: "q".into() }),
        ]);

        assert_eq!(ledger.items[0].action, ItemAction::Purchased);
        assert!(ledger.items[1].neutral);
        assert_eq!(ledger.runes[0].rune, "haste");
        assert_eq!(ledger.buybacks.len(), 2);
        assert_eq!(ledger.buyback_activity().len(), 1);
        let ults = ledger.ult_activity();
        assert_eq!(ults.len(), 1);
        assert_eq!(ults[0].unit, "npc_dota_hero_lina");
    }

    #[test]
    fn test_economy_objectives_and_roshan() {
        let mut ledger = EventLedger::new();
        ledger.handle_events(&[
            at(
                5,
                EventKind::Gold(EconomyGrant {
                    recipient: "r".into(),
                    team: Team::Radiant,
                    amount: 100,
                }),
            ),
            at(6, EventKind::Glyph { team: Team::Dire }),
            at(
                900,
                EventKind::Roshan(RoshanEvent::Kill {
                    killer: "npc_dota_hero_lina".into(),
                }),
            ),
            at(7, EventKind::Death(Interaction::default())),
        ]);

        assert_eq!(ledger.economy.len(), 1);
        assert_eq!(ledger.economy[0].gold, 100);
        assert_eq!(ledger.objectives.len(), 1);
        assert_eq!(ledger.roshan.kill_time, Some(900));
    }
}

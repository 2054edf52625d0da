//! Raw record → canonical event conversion.
//!
//! The normalizer is stateless apart from the ultimate-ability list. It reads
//! the hero identity table (for team attribution) but never writes it; the
//! processor applies the returned [`EntityObservation`]s itself.
//!
//! A single combat-log record may expand into several events:
//!
//! ```text
//! death(target=npc_dota_goodguys_tower1_top)  → Death + BuildingKill
//! death(target=npc_dota_hero_lina)            → Death + HeroDeath
//! death(target=npc_dota_roshan)               → Death + Roshan::Kill
//! item(inflictor=item_aegis)                  → ItemUse + Roshan::AegisPickup
//! modifier_add(inflictor=modifier_rune_haste) → ModifierAdd + Rune
//! ```

use hashbrown::HashSet;
use phf::phf_map;

use super::normalized::*;
use super::record::{
    CombatLogRecord, CombatLogType, EntityRecord, GameEventRecord, PropertyBag, PropertyValue,
    RawRecord,
};
use crate::error::NormalizeError;
use crate::identity::{HeroIdentity, Team, hero_unit_from_class, is_hero, resolve_owner};
use crate::tracking::positions::Position;
use crate::tracking::wards::{WardEntity, WardType};

const WARD_CLASS_PREFIX: &str = "cdota_npc_observerward";

/// Alternate property names the decoder has used for the picked-up item.
const ITEM_PROPERTY_KEYS: &[&str] = &["item", "itemname", "item_name", "item_def"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameEventKind {
    ItemPurchase,
    ItemPickedUp,
    NeutralItemPickedUp,
    ItemUsed,
    RuneActivated,
    BottleRefillUsed,
    BottleRefillObtained,
    RoshanKill,
    AegisPickup,
    AegisStatus,
    AegisLost,
    ShardPickup,
    CheesePickup,
    Glyph,
    Scan,
}

static GAME_EVENTS: phf::Map<&'static str, GameEventKind> = phf_map! {
    "dota_item_purchase" => GameEventKind::ItemPurchase,
    "dota_item_picked_up" => GameEventKind::ItemPickedUp,
    "dota_neutral_item_picked_up" => GameEventKind::NeutralItemPickedUp,
    "dota_item_used" => GameEventKind::ItemUsed,
    "dota_rune_activated" => GameEventKind::RuneActivated,
    "bottle_refill_used" => GameEventKind::BottleRefillUsed,
    "bottle_refill_obtained" => GameEventKind::BottleRefillObtained,
    "dota_roshan_kill" => GameEventKind::RoshanKill,
    "aegis_picked_up" => GameEventKind::AegisPickup,
    "dota_aegis_event" => GameEventKind::AegisPickup,
    "aegis_denied" => GameEventKind::AegisStatus,
    "aegis_snatched" => GameEventKind::AegisStatus,
    "aegis_expired" => GameEventKind::AegisLost,
    "aegis_lost" => GameEventKind::AegisLost,
    "shard_picked_up" => GameEventKind::ShardPickup,
    "cheese_picked_up" => GameEventKind::CheesePickup,
    "dota_glyph_used" => GameEventKind::Glyph,
    "dota_scan_used" => GameEventKind::Scan,
};

/// Entity-level facts the processor folds into identity and trackers.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityObservation {
    HeroSpawned { hero: String, team: Team },
    HeroMoved { hero: String, position: Position },
    WardSpawned(WardEntity),
}

/// Outcome of normalizing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Entity(EntityObservation),
    Events(Vec<NormalizedEvent>),
    Nothing,
}

impl Normalized {
    fn from_events(events: Vec<NormalizedEvent>) -> Self {
        if events.is_empty() {
            Normalized::Nothing
        } else {
            Normalized::Events(events)
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct EventNormalizer {
    ultimates: HashSet<String>,
}

impl EventNormalizer {
    pub fn new(ultimates: impl IntoIterator<Item = String>) -> Self {
        Self {
            ultimates: ultimates.into_iter().collect(),
        }
    }

    pub fn is_ultimate(&self, ability: &str) -> bool {
        self.ultimates.contains(ability)
    }

    pub fn ultimate_count(&self) -> usize {
        self.ultimates.len()
    }

    pub fn normalize(
        &self,
        record: &RawRecord,
        identity: &HeroIdentity,
    ) -> Result<Normalized, NormalizeError> {
        match record {
            RawRecord::EntityCreated(entity) => normalize_entity(entity, true),
            RawRecord::EntityUpdated(entity) => normalize_entity(entity, false),
            RawRecord::GameEvent(event) => normalize_game_event(event).map(Normalized::from_events),
            RawRecord::CombatLog(entry) => Ok(Normalized::from_events(
                self.normalize_combat_log(entry, identity),
            )),
        }
    }

    fn normalize_combat_log(
        &self,
        entry: &CombatLogRecord,
        identity: &HeroIdentity,
    ) -> Vec<NormalizedEvent> {
        let time = combat_log_time(entry.timestamp);
        let attacker = entry.attacker.as_str();
        let target = entry.target.as_str();
        let inflictor = entry.inflictor.as_str();

        let interaction = || Interaction {
            actor: attacker.to_string(),
            target: target.to_string(),
            inflictor: inflictor.to_string(),
            value: entry.value,
        };

        let mut out = Vec::with_capacity(2);
        let mut push = |kind: EventKind| out.push(NormalizedEvent::new(time, kind));

        match entry.kind {
            CombatLogType::Damage => push(EventKind::Damage(interaction())),
            CombatLogType::Heal => push(EventKind::Heal(interaction())),
            CombatLogType::Death => {
                push(EventKind::Death(interaction()));

                let kill = || ObjectiveKill {
                    target: target.to_string(),
                    killer: attacker.to_string(),
                    team_target: identity.team_of(target),
                    team_by: identity.team_of(attacker),
                };
                if is_building(target) {
                    push(EventKind::BuildingKill(kill()));
                } else if is_hero(target) {
                    push(EventKind::HeroDeath(kill()));
                }
                if target.to_ascii_lowercase().contains("roshan") {
                    push(EventKind::Roshan(RoshanEvent::Kill {
                        killer: attacker.to_string(),
                    }));
                }
            }
            CombatLogType::ModifierAdd | CombatLogType::ModifierRemove => {
                let change = ModifierChange {
                    target: target.to_string(),
                    source: attacker.to_string(),
                    modifier: inflictor.to_ascii_lowercase(),
                };
                if entry.kind == CombatLogType::ModifierRemove {
                    push(EventKind::ModifierRemove(change));
                } else {
                    let rune = change
                        .modifier
                        .contains("rune_")
                        .then(|| change.modifier.clone());
                    push(EventKind::ModifierAdd(change));
                    if let Some(rune) = rune {
                        push(EventKind::Rune(RuneActivity {
                            player: target.to_string(),
                            rune,
                            source: RuneSource::Modifier,
                        }));
                    }
                }
            }
            CombatLogType::Gold | CombatLogType::Xp => {
                let team = match identity.team_of(target) {
                    Team::Unknown => identity.team_of(attacker),
                    team => team,
                };
                let grant = EconomyGrant {
                    recipient: target.to_string(),
                    team,
                    amount: entry.value,
                };
                if entry.kind == CombatLogType::Gold {
                    push(EventKind::Gold(grant));
                } else {
                    push(EventKind::Xp(grant));
                }
            }
            CombatLogType::Ability | CombatLogType::AbilityTrigger => {
                push(EventKind::AbilityCast(AbilityCast {
                    caster: attacker.to_string(),
                    owner: resolve_owner(attacker),
                    ability: inflictor.to_string(),
                    is_ult: self.is_ultimate(inflictor),
                }));
            }
            CombatLogType::Item => {
                if !inflictor.is_empty() {
                    push(EventKind::ItemUse(ItemUse {
                        unit: attacker.to_string(),
                        owner: resolve_owner(attacker),
                        item: inflictor.to_string(),
                    }));
                }
                if inflictor == ITEM_AEGIS {
                    push(EventKind::Roshan(RoshanEvent::AegisPickup {
                        holder: attacker.to_string(),
                    }));
                }
            }
            CombatLogType::Purchase => {
                // The purchaser is usually the target
                let player = if target.is_empty() { attacker } else { target };
                push(EventKind::Purchase(Purchase {
                    player: player.to_string(),
                    item: inflictor.to_string(),
                }));
            }
            CombatLogType::Buyback => push(EventKind::Buyback {
                player: target.to_string(),
            }),
            CombatLogType::Other => {}
        }

        out
    }
}

/// Unreadable, negative and non-finite timestamps all become [`UNKNOWN_TIME`].
fn combat_log_time(timestamp: Option<f64>) -> MatchTime {
    match timestamp {
        Some(ts) if ts.is_finite() && ts >= 0.0 => round_time(ts),
        Some(ts) => {
            tracing::trace!(timestamp = ts, "Unusable combat log timestamp");
            UNKNOWN_TIME
        }
        None => UNKNOWN_TIME,
    }
}

fn normalize_entity(entity: &EntityRecord, created: bool) -> Result<Normalized, NormalizeError> {
    if entity.class_name.is_empty() {
        return Err(NormalizeError::EmptyClassName);
    }
    let props = &entity.properties;

    if let Some(hero) = hero_unit_from_class(&entity.class_name) {
        if created {
            return Ok(Normalized::Entity(EntityObservation::HeroSpawned {
                hero,
                team: team_number(props),
            }));
        }
        return Ok(match entity_position(props) {
            Some(position) => Normalized::Entity(EntityObservation::HeroMoved { hero, position }),
            None => Normalized::Nothing,
        });
    }

    let lower = entity.class_name.to_ascii_lowercase();
    if created && lower.starts_with(WARD_CLASS_PREFIX) {
        let team = team_number(props);
        if !team.is_known() {
            return Ok(Normalized::Nothing);
        }
        let ward_type = if lower.contains("truesight") {
            WardType::Sentry
        } else {
            WardType::Observer
        };
        return Ok(Normalized::Entity(EntityObservation::WardSpawned(WardEntity {
            ward_type,
            team,
            position: entity_position(props),
        })));
    }

    Ok(Normalized::Nothing)
}

fn normalize_game_event(event: &GameEventRecord) -> Result<Vec<NormalizedEvent>, NormalizeError> {
    if event.name.is_empty() {
        return Err(NormalizeError::EmptyEventName);
    }
    let Some(&kind) = GAME_EVENTS.get(event.name.as_str()) else {
        return Ok(Vec::new());
    };

    let props = &event.properties;
    let time = game_time(props);
    let player = text(props, "player");

    let kind = match kind {
        GameEventKind::ItemPurchase => EventKind::Purchase(Purchase {
            player,
            item: text(props, "item"),
        }),
        GameEventKind::ItemPickedUp | GameEventKind::NeutralItemPickedUp => {
            EventKind::ItemPickup(ItemPickup {
                player,
                item: item_name(props),
                neutral: kind == GameEventKind::NeutralItemPickedUp,
            })
        }
        GameEventKind::ItemUsed => {
            let item = text(props, "item");
            if item.is_empty() {
                return Ok(Vec::new());
            }
            EventKind::ItemUse(ItemUse {
                owner: resolve_owner(&player),
                unit: player,
                item,
            })
        }
        GameEventKind::RuneActivated => EventKind::Rune(RuneActivity {
            player,
            rune: text(props, "rune"),
            source: RuneSource::Activated,
        }),
        GameEventKind::BottleRefillUsed | GameEventKind::BottleRefillObtained => {
            let source = if kind == GameEventKind::BottleRefillUsed {
                RuneSource::BottleRefillUsed
            } else {
                RuneSource::BottleRefillObtained
            };
            EventKind::Rune(RuneActivity {
                player,
                rune: String::new(),
                source,
            })
        }
        GameEventKind::RoshanKill => EventKind::Roshan(RoshanEvent::Kill {
            killer: text(props, "killer"),
        }),
        GameEventKind::AegisPickup => EventKind::Roshan(RoshanEvent::AegisPickup { holder: player }),
        GameEventKind::AegisStatus => EventKind::Roshan(RoshanEvent::AegisStatus {
            status: event.name.clone(),
        }),
        GameEventKind::AegisLost => EventKind::Roshan(RoshanEvent::AegisLost),
        GameEventKind::ShardPickup => EventKind::Roshan(RoshanEvent::ShardPickup { holder: player }),
        GameEventKind::CheesePickup => {
            EventKind::Roshan(RoshanEvent::CheesePickup { holder: player })
        }
        GameEventKind::Glyph => EventKind::Glyph {
            team: team_property(props),
        },
        GameEventKind::Scan => EventKind::Scan {
            team: team_property(props),
        },
    };

    Ok(vec![NormalizedEvent::new(time, kind)])
}

// ─── Property access ─────────────────────────────────────────────────────────

fn game_time(props: &PropertyBag) -> MatchTime {
    props
        .get("game_time")
        .and_then(PropertyValue::as_f64)
        .filter(|t| t.is_finite())
        .map(round_time)
        .unwrap_or(UNKNOWN_TIME)
}

fn text(props: &PropertyBag, key: &str) -> String {
    props
        .get(key)
        .and_then(PropertyValue::to_text)
        .unwrap_or_default()
}

fn item_name(props: &PropertyBag) -> String {
    ITEM_PROPERTY_KEYS
        .iter()
        .find_map(|key| props.get(*key).and_then(PropertyValue::to_text))
        .unwrap_or_default()
}

fn team_number(props: &PropertyBag) -> Team {
    props
        .get("m_iTeamNum")
        .and_then(PropertyValue::as_i64)
        .map(Team::from_number)
        .unwrap_or_default()
}

/// Glyph and scan events carry the team either as a number or a label.
fn team_property(props: &PropertyBag) -> Team {
    let Some(value) = props.get("team") else {
        return Team::Unknown;
    };
    if let Some(n) = value.as_i64() {
        return Team::from_number(n);
    }
    match value.to_text().as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("radiant") => Team::Radiant,
        Some("dire") => Team::Dire,
        _ => Team::Unknown,
    }
}

/// World position from the origin vector, falling back to the cell
/// coordinates when the origin is absent or zero.
fn entity_position(props: &PropertyBag) -> Option<Position> {
    let origin = props
        .get("m_vecOrigin")
        .and_then(PropertyValue::as_xy)
        .filter(|&(x, y)| x != 0.0 || y != 0.0);
    if let Some((x, y)) = origin {
        return Some(Position::new(x, y));
    }
    let cx = props.get("m_cellX").and_then(PropertyValue::as_f64)?;
    let cy = props.get("m_cellY").and_then(PropertyValue::as_f64)?;
    Some(Position::new(cx, cy))
}

fn is_building(name: &str) -> bool {
    let n = name.to_ascii_lowercase();
    ["tower", "rax", "fort", "barracks", "outpost"]
        .iter()
        .any(|frag| n.contains(frag))
}

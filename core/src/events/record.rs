//! Decoded replay records, one per input line.
//!
//! The replay decoder emits three shapes: entity snapshots (created or
//! updated), named game events with a property bag, and combat-log entries.
//! Each line of the input is a JSON object tagged by `record`:
//!
//! ```text
//! {"record":"entity_created","class_name":"CDOTA_Unit_Hero_Axe","properties":{"m_iTeamNum":2}}
//! {"record":"game_event","name":"dota_rune_activated","properties":{"game_time":312.4,"player":"..","rune":"haste"}}
//! {"record":"combat_log","timestamp":431.7,"type":"damage","attacker":"..","target":"..","inflictor":"..","value":120}
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum RawRecord {
    EntityCreated(EntityRecord),
    EntityUpdated(EntityRecord),
    GameEvent(GameEventRecord),
    CombatLog(CombatLogRecord),
}

pub type PropertyBag = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub class_name: String,
    #[serde(default)]
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEventRecord {
    pub name: String,
    #[serde(default)]
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLogRecord {
    /// Match clock in seconds. Absent when the decoder could not read it.
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(rename = "type")]
    pub kind: CombatLogType,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub attacker: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub target: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub inflictor: String,
    /// Integral amount. Fractional values are rounded, null or non-finite is 0.
    #[serde(default, deserialize_with = "rounded_value")]
    pub value: i64,
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn rounded_value<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map_or(0, |v| v.round() as i64))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatLogType {
    Damage,
    Heal,
    Death,
    ModifierAdd,
    ModifierRemove,
    Gold,
    Xp,
    Ability,
    AbilityTrigger,
    Item,
    Purchase,
    Buyback,
    #[serde(other)]
    Other,
}

/// A single entity or game-event property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Vector(Vec<f64>),
}

impl PropertyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Text(s) => s.trim().parse().ok(),
            PropertyValue::Bool(_) | PropertyValue::Vector(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Float(v) if v.is_finite() => Some(*v as i64),
            PropertyValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Textual form, as the decoder would print it.
    pub fn to_text(&self) -> Option<String> {
        match self {
            PropertyValue::Text(s) => Some(s.clone()),
            PropertyValue::Int(v) => Some(v.to_string()),
            PropertyValue::Float(v) => Some(v.to_string()),
            PropertyValue::Bool(v) => Some(v.to_string()),
            PropertyValue::Vector(_) => None,
        }
    }

    /// First two components of a vector property.
    pub fn as_xy(&self) -> Option<(f64, f64)> {
        match self {
            PropertyValue::Vector(v) if v.len() >= 2 => Some((v[0], v[1])),
            _ => None,
        }
    }
}

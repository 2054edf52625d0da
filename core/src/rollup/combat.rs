//! Ability, damage and crowd-control tables.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::ledger::{AbilityCastEntry, FlowTable};

pub type CountTable = BTreeMap<String, u32>;
pub type SumTable = BTreeMap<String, i64>;

fn bump(table: &mut CountTable, key: &str) {
    if !key.is_empty() {
        *table.entry(key.to_string()).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AbilityUsage {
    pub ability_usage_by_caster: CountTable,
    pub ability_usage_by_owner: CountTable,
    pub ability_usage_by_ability: CountTable,
    pub ult_usage_by_caster: CountTable,
}

pub fn ability_usage(casts: &[AbilityCastEntry]) -> AbilityUsage {
    let mut usage = AbilityUsage::default();
    for cast in casts {
        bump(&mut usage.ability_usage_by_caster, &cast.caster);
        bump(&mut usage.ability_usage_by_owner, &cast.owner_caster);
        bump(&mut usage.ability_usage_by_ability, &cast.ability);
        if cast.is_ult {
            bump(&mut usage.ult_usage_by_caster, &cast.caster);
        }
    }
    usage
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DamageTables {
    pub damage_by_attacker: SumTable,
    pub damage_by_target: SumTable,
    /// Keyed `attacker|target|`.
    pub damage_by_pair: SumTable,
    /// Keyed `attacker||inflictor`.
    pub damage_by_attacker_ability: SumTable,
}

/// Fold the damage flow table. Flows without an attacker only count towards
/// the target table.
pub fn damage_tables(flows: &FlowTable) -> DamageTables {
    let mut tables = DamageTables::default();
    for (key, &value) in flows {
        if !key.target.is_empty() {
            *tables.damage_by_target.entry(key.target.clone()).or_insert(0) += value;
        }
        if key.attacker.is_empty() {
            continue;
        }
        *tables.damage_by_attacker.entry(key.attacker.clone()).or_insert(0) += value;
        *tables
            .damage_by_pair
            .entry(format!("{}|{}|", key.attacker, key.target))
            .or_insert(0) += value;
        *tables
            .damage_by_attacker_ability
            .entry(format!("{}||{}", key.attacker, key.inflictor))
            .or_insert(0) += value;
    }
    tables
}

/// A flow table keyed by `attacker|target|inflictor`.
pub fn flow_summary(flows: &FlowTable) -> SumTable {
    flows.iter().map(|(key, &value)| (key.joined(), value)).collect()
}

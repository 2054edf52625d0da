//! The analytics document written at the end of a run.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::correlation::{
    CcEfficiency, LeadPoint, LeadSwitches, ObjectiveEvent, ObjectiveSequences, PickoffLink,
    RoshanContext, RoshanControl, RoshanSummary, VisionImpactRecord, VisionRollup,
};
use crate::fights::Fight;
use crate::hotspots::WardHotspot;
use crate::identity::Team;
use crate::ledger::{
    AbilityCastEntry, BuybackEntry, ItemEntry, ItemUseEntry, RuneEntry, SmokeEntry,
};
use crate::rollup::{Rollups, SumTable};
use crate::tracking::{CcTotals, WardRecord};

pub const GENERATOR: &str = "aegis";
pub const SCHEMA_VERSION: &str = "1.2.0";

#[derive(Debug, Clone, Serialize)]
pub struct MatchDocument {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<u64>,
    pub enriched: Enriched,
    pub meta: DocumentMeta,
}

impl MatchDocument {
    pub fn new(enriched: Enriched, match_id: Option<u64>) -> Self {
        Self {
            source: GENERATOR.to_string(),
            generated_at: Utc::now(),
            match_id,
            enriched,
            meta: DocumentMeta::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub generator: String,
    pub version: String,
    pub schema_version: String,
    pub notes: String,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            generator: GENERATOR.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            notes: "timestamps in whole seconds; -1 and empty strings mark unknowns".to_string(),
        }
    }
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct Enriched {
    pub wards: Vec<WardRecord>,
    pub smokes: Vec<SmokeEntry>,
    pub items: Vec<ItemEntry>,
    pub runes: Vec<RuneEntry>,
    pub roshan: RoshanSummary,
    pub objectives: Vec<ObjectiveEvent>,
    pub buybacks: Vec<BuybackEntry>,
    pub fights: Vec<Fight>,
    pub ability_casts: Vec<AbilityCastEntry>,
    pub item_uses: Vec<ItemUseEntry>,
    /// Damage flows keyed `attacker|target|inflictor`.
    pub damage_summary: SumTable,
    pub healing_summary: SumTable,
    /// CC seconds per target and category.
    pub cc_summary: BTreeMap<String, CcTotals>,
    pub aggregated: Aggregated,
}

#[derive(Debug, Clone, Serialize)]
pub struct Aggregated {
    #[serde(flatten)]
    pub rollups: Rollups,
    pub cc_efficiency: CcEfficiency,
    pub economy_lead_series: Vec<LeadPoint>,
    pub lead_switch_events: LeadSwitches,
    pub objective_sequences: ObjectiveSequences,
    pub objective_chain_details: Vec<PickoffLink>,
    pub ward_hotspots: Vec<WardHotspot>,
    pub vision_impact_by_ward: Vec<VisionImpactRecord>,
    pub vision_impact_by_player: BTreeMap<String, VisionRollup>,
    pub vision_impact_by_team: BTreeMap<Team, VisionRollup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roshan_context: Option<RoshanContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roshan_control: Option<RoshanControl>,
}

/// Leading digits of the input file name, e.g. `7712345678_replay.jsonl` → `7712345678`.
pub fn match_id_from_path(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    name[..end].parse().ok()
}

//! End-to-end tests: raw records in, enriched document out.
//!
//! Each scenario builds a small record stream, runs both phases, and checks
//! the parts of the document it is about.

use crate::analysis::analyze_records;
use crate::correlation::BuildingClass;
use crate::document::{Enriched, MatchDocument};
use crate::events::record::{
    CombatLogRecord, CombatLogType, EntityRecord, GameEventRecord, PropertyValue, RawRecord,
};
use crate::events::EventNormalizer;
use crate::identity::Team;
use crate::processor::EventProcessor;
use crate::tracking::{CcCategory, WardType};
use aegis_types::AnalysisConfig;

const LINA: &str = "npc_dota_hero_lina";
const CM: &str = "npc_dota_hero_crystal_maiden";
const AXE: &str = "npc_dota_hero_axe";
const PUDGE: &str = "npc_dota_hero_pudge";
const ENIGMA: &str = "npc_dota_hero_enigma";

// ─── Record builders ─────────────────────────────────────────────────────────

fn spawn(class_name: &str, team: i64) -> RawRecord {
    RawRecord::EntityCreated(EntityRecord {
        class_name: class_name.to_string(),
        properties: [("m_iTeamNum".to_string(), PropertyValue::Int(team))]
            .into_iter()
            .collect(),
    })
}

fn ward_entity(class_name: &str, team: i64, x: f64, y: f64) -> RawRecord {
    RawRecord::EntityCreated(EntityRecord {
        class_name: class_name.to_string(),
        properties: [
            ("m_iTeamNum".to_string(), PropertyValue::Int(team)),
            ("m_vecOrigin".to_string(), PropertyValue::Vector(vec![x, y, 128.0])),
        ]
        .into_iter()
        .collect(),
    })
}

fn log(
    t: f64,
    kind: CombatLogType,
    attacker: &str,
    target: &str,
    inflictor: &str,
    value: i64,
) -> RawRecord {
    RawRecord::CombatLog(CombatLogRecord {
        timestamp: Some(t),
        kind,
        attacker: attacker.to_string(),
        target: target.to_string(),
        inflictor: inflictor.to_string(),
        value,
    })
}

fn game_event(name: &str, props: &[(&str, PropertyValue)]) -> RawRecord {
    RawRecord::GameEvent(GameEventRecord {
        name: name.to_string(),
        properties: props
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    })
}

/// Radiant: Lina, Crystal Maiden. Dire: Axe, Pudge, Enigma.
fn lineup() -> Vec<RawRecord> {
    vec![
        spawn("CDOTA_Unit_Hero_Lina", 2),
        spawn("CDOTA_Unit_Hero_Crystal_Maiden", 2),
        spawn("CDOTA_Unit_Hero_Axe", 3),
        spawn("CDOTA_Unit_Hero_Pudge", 3),
        spawn("CDOTA_Unit_Hero_Enigma", 3),
    ]
}

fn run(records: &[RawRecord]) -> Enriched {
    analyze_records(records, &EventProcessor::default(), AnalysisConfig::default())
}

// ─── Fights ──────────────────────────────────────────────────────────────────

#[test]
fn test_three_event_stream_yields_two_fights() {
    let records = vec![
        log(10.0, CombatLogType::Damage, "A", "B", "", 50),
        log(12.0, CombatLogType::Death, "A", "B", "", 0),
        log(40.0, CombatLogType::Damage, "C", "D", "", 30),
    ];
    let enriched = run(&records);

    assert_eq!(enriched.fights.len(), 2);
    let first = &enriched.fights[0];
    assert_eq!((first.start, first.end), (10, 12));
    assert_eq!(first.participants, vec!["A", "B"]);
    let second = &enriched.fights[1];
    assert_eq!((second.start, second.end), (40, 40));
    assert_eq!(second.participants, vec!["C", "D"]);

    assert_eq!(enriched.aggregated.rollups.fights_overview.count, 2);
}

#[test]
fn test_fight_counts_ults_and_buybacks() {
    let processor = EventProcessor::new(EventNormalizer::new(vec![
        "enigma_black_hole".to_string(),
    ]));
    let mut records = lineup();
    records.extend([
        log(100.0, CombatLogType::Damage, ENIGMA, LINA, "", 200),
        log(101.0, CombatLogType::Ability, ENIGMA, "", "enigma_black_hole", 0),
        log(104.0, CombatLogType::Death, ENIGMA, LINA, "", 0),
        log(107.0, CombatLogType::Buyback, "", LINA, "", 0),
        log(108.0, CombatLogType::Damage, LINA, ENIGMA, "", 90),
    ]);
    let enriched = analyze_records(&records, &processor, AnalysisConfig::default());

    assert_eq!(enriched.fights.len(), 1);
    let fight = &enriched.fights[0];
    assert_eq!(fight.enrichment.ults_count, 1);
    assert_eq!(fight.enrichment.ults_by_caster.get(ENIGMA), Some(&1));
    assert_eq!(fight.enrichment.buybacks_count, 1);
    // No gold/xp grants: the damage proxy stands in for the swing
    assert!(fight.enrichment.damage_proxy_by_actor.is_some());

    let rollups = &enriched.aggregated.rollups;
    assert_eq!(rollups.fights_overview.total_ults, 1);
    assert_eq!(rollups.fights_overview.total_buybacks, 1);
    assert_eq!(rollups.abilities.ult_usage_by_caster.get(ENIGMA), Some(&1));
    assert_eq!(rollups.buybacks.buybacks_by_player.get(LINA), Some(&1));
}

// ─── Wards ───────────────────────────────────────────────────────────────────

#[test]
fn test_deward_resolves_with_sentry_source() {
    let mut records = lineup();
    records.extend([
        ward_entity("CDOTA_NPC_ObserverWard", 2, -1200.0, 800.0),
        log(100.0, CombatLogType::Item, LINA, "", "item_ward_observer", 0),
        log(280.0, CombatLogType::Item, PUDGE, "", "item_ward_sentry", 0),
        log(300.0, CombatLogType::Death, AXE, "npc_dota_observer_wards", "", 0),
    ]);
    let enriched = run(&records);

    assert_eq!(enriched.wards.len(), 2);
    let obs = &enriched.wards[0];
    assert_eq!(obs.ward_type, WardType::Observer);
    assert_eq!(obs.team, Team::Radiant);
    assert_eq!(obs.lifetime, Some(200));
    assert!(obs.dewarded);
    assert_eq!(obs.removed_by.as_deref(), Some(AXE));
    assert_eq!(obs.deward_source_player.as_deref(), Some(PUDGE));
    assert_eq!(obs.deward_source_time, Some(280));
    let position = obs.position.expect("observer gets the entity position");
    assert_eq!((position.x, position.y), (-1200.0, 800.0));

    let sentry = &enriched.wards[1];
    assert_eq!(sentry.team, Team::Dire);
    assert!(!sentry.dewarded);

    let rollups = &enriched.aggregated.rollups;
    assert_eq!(rollups.wards_by_player[LINA].observer_placed, 1);
    assert_eq!(rollups.wards_by_player[LINA].observer_dewarded, 1);
    assert_eq!(rollups.dewards_by_player.get(AXE), Some(&1));

    // One scored entry per observer with a known time
    assert_eq!(enriched.aggregated.vision_impact_by_ward.len(), 1);
    assert!(enriched.aggregated.vision_impact_by_team.contains_key(&Team::Radiant));
}

#[test]
fn test_ward_hotspot_from_clustered_entities() {
    let mut records = lineup();
    for (x, y) in [(100.0, 100.0), (300.0, 200.0), (-250.0, 100.0), (9000.0, 9000.0)] {
        records.push(ward_entity("CDOTA_NPC_ObserverWard", 3, x, y));
    }
    let enriched = run(&records);

    let hotspots = &enriched.aggregated.ward_hotspots;
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0].count, 3);
}

// ─── Crowd control ───────────────────────────────────────────────────────────

#[test]
fn test_cc_interval_and_near_death_efficiency() {
    let mut records = lineup();
    records.extend([
        log(20.0, CombatLogType::ModifierAdd, AXE, LINA, "modifier_axe_berserkers_call_stun", 0),
        log(21.0, CombatLogType::Damage, AXE, LINA, "axe_culling_blade", 300),
        log(23.0, CombatLogType::ModifierRemove, AXE, LINA, "modifier_axe_berserkers_call_stun", 0),
        log(24.0, CombatLogType::Death, AXE, LINA, "", 0),
        // Remove without an add is ignored
        log(30.0, CombatLogType::ModifierRemove, AXE, CM, "modifier_rooted", 0),
    ]);
    let enriched = run(&records);

    let intervals = &enriched.aggregated.rollups.cc_instances;
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].category, CcCategory::Stun);
    assert_eq!((intervals[0].start, intervals[0].end, intervals[0].duration), (20, 23, 3));

    assert_eq!(enriched.cc_summary[LINA][&CcCategory::Stun], 3);
    assert_eq!(enriched.aggregated.rollups.cc_by_attacker[AXE][&CcCategory::Stun], 3);
    assert_eq!(enriched.aggregated.cc_efficiency.cc_total, 1);
    assert_eq!(enriched.aggregated.cc_efficiency.cc_near_death, 1);
}

// ─── Objectives and economy ──────────────────────────────────────────────────

#[test]
fn test_pickoff_links_to_tower_kill() {
    let mut records = lineup();
    records.extend([
        log(460.0, CombatLogType::Damage, AXE, LINA, "", 400),
        log(470.0, CombatLogType::Death, AXE, LINA, "", 0),
        log(495.0, CombatLogType::Damage, PUDGE, "npc_dota_goodguys_tower1_top", "", 150),
        log(500.0, CombatLogType::Death, PUDGE, "npc_dota_goodguys_tower1_top", "", 0),
        log(520.0, CombatLogType::Gold, "", AXE, "", 300),
        game_event(
            "dota_glyph_used",
            &[("game_time", PropertyValue::Float(485.0)), ("team", PropertyValue::Int(2))],
        ),
    ]);
    let enriched = run(&records);

    let objectives = &enriched.objectives;
    assert_eq!(objectives.len(), 3);
    // Sorted by time; consecutive gaps of 15s stay in one chain
    let times: Vec<_> = objectives.iter().map(|o| o.time).collect();
    assert_eq!(times, vec![470, 485, 500]);
    assert!(objectives.iter().all(|o| o.chain_id == objectives[0].chain_id));

    let tower = &objectives[2];
    assert_eq!(tower.team_target, Team::Radiant);
    assert_eq!(tower.swing.map(|s| s.gold), Some(-300));

    let aggregated = &enriched.aggregated;
    assert_eq!(aggregated.objective_sequences.pickoff_to_tower, 1);
    let link = &aggregated.objective_chain_details[0];
    assert_eq!((link.pickoff_time, link.objective_time, link.delta), (470, 500, 30));
    assert_eq!(link.objective_kind, BuildingClass::Tower);
    assert!(link.participants.iter().any(|p| p == PUDGE));

    let radiant = &aggregated.rollups.objectives_by_team[&Team::Radiant];
    assert_eq!(radiant.towers, 1);
    assert_eq!(radiant.glyphs_used, 1);
    assert_eq!(aggregated.rollups.objectives_by_team[&Team::Dire].towers, 0);
}

#[test]
fn test_lead_series_and_switches() {
    let mut records = lineup();
    records.extend([
        log(10.0, CombatLogType::Gold, "", LINA, "", 200),
        log(70.0, CombatLogType::Gold, "", AXE, "", 500),
        log(130.0, CombatLogType::Gold, "", CM, "", 600),
    ]);
    let enriched = run(&records);

    let leads: Vec<i64> = enriched
        .aggregated
        .economy_lead_series
        .iter()
        .map(|p| p.lead_gold)
        .collect();
    assert_eq!(leads, vec![200, -300, 300]);
    assert_eq!(enriched.aggregated.lead_switch_events.gold, 2);
}

// ─── Roshan ──────────────────────────────────────────────────────────────────

#[test]
fn test_roshan_kill_context_and_control() {
    let mut records = lineup();
    records.extend([
        log(1180.0, CombatLogType::Item, LINA, "", "item_ward_observer", 0),
        log(1185.0, CombatLogType::Item, AXE, "", "item_smoke_of_deceit", 0),
        log(1195.0, CombatLogType::Damage, LINA, "npc_dota_roshan", "", 500),
        log(1198.0, CombatLogType::Damage, CM, "npc_dota_roshan", "", 300),
        log(1200.0, CombatLogType::Death, LINA, "npc_dota_roshan", "", 0),
        log(1203.0, CombatLogType::Item, LINA, "", "item_aegis", 0),
    ]);
    let enriched = run(&records);

    let roshan = &enriched.roshan;
    assert_eq!(roshan.kill_time, Some(1200));
    assert_eq!(roshan.killer.as_deref(), Some(LINA));
    assert_eq!(roshan.aegis_holder.as_deref(), Some(LINA));

    let context = enriched.aggregated.roshan_context.as_ref().expect("kill is known");
    assert_eq!(context.wards, 1);
    assert_eq!(context.smokes, 1);

    let control = enriched.aggregated.roshan_control.as_ref().expect("kill is known");
    assert_eq!(control.wards_by_team.get(&Team::Radiant), Some(&1));
    assert_eq!(control.heroes_presence_by_team.get(&Team::Radiant), Some(&2));
    assert_eq!(control.heroes_presence_by_team.get(&Team::Dire), None);
}

#[test]
fn test_no_roshan_blocks_without_kill() {
    let enriched = run(&lineup());
    assert!(enriched.aggregated.roshan_context.is_none());
    assert!(enriched.aggregated.roshan_control.is_none());
}

// ─── Ledger and rollups ──────────────────────────────────────────────────────

#[test]
fn test_items_runes_and_power_spikes() {
    let mut records = lineup();
    records.extend([
        game_event(
            "dota_item_purchase",
            &[
                ("game_time", PropertyValue::Float(900.4)),
                ("player", PropertyValue::Text(AXE.into())),
                ("item", PropertyValue::Text("item_black_king_bar".into())),
            ],
        ),
        log(1500.0, CombatLogType::Purchase, "", AXE, "item_black_king_bar", 0),
        game_event(
            "dota_rune_activated",
            &[
                ("game_time", PropertyValue::Float(360.0)),
                ("player", PropertyValue::Text(LINA.into())),
                ("rune", PropertyValue::Text("haste".into())),
            ],
        ),
        game_event(
            "dota_neutral_item_picked_up",
            &[
                ("game_time", PropertyValue::Float(720.0)),
                ("player", PropertyValue::Text(CM.into())),
                ("itemname", PropertyValue::Text("item_arcane_ring".into())),
            ],
        ),
    ]);
    let enriched = run(&records);

    assert_eq!(enriched.items.len(), 3);
    assert!(enriched.items.iter().any(|i| i.neutral && i.player == CM));
    assert_eq!(enriched.runes.len(), 1);

    let rollups = &enriched.aggregated.rollups;
    assert_eq!(
        rollups.first_purchase_by_player_by_item[AXE].get("item_black_king_bar"),
        Some(&900)
    );
    assert_eq!(rollups.power_spikes_by_player[AXE].bkb_purchase_time, Some(900));
    assert_eq!(rollups.rune_pickups_by_player[LINA].get("haste"), Some(&1));
    assert_eq!(rollups.item_pickups_by_player[CM].get("item_arcane_ring"), Some(&1));
}

#[test]
fn test_damage_and_healing_summaries() {
    let mut records = lineup();
    records.extend([
        log(50.0, CombatLogType::Damage, LINA, AXE, "lina_dragon_slave", 120),
        log(52.0, CombatLogType::Damage, LINA, AXE, "lina_dragon_slave", 80),
        log(53.0, CombatLogType::Heal, CM, LINA, "", 60),
    ]);
    let enriched = run(&records);

    let key = format!("{LINA}|{AXE}|lina_dragon_slave");
    assert_eq!(enriched.damage_summary.get(&key), Some(&200));
    assert_eq!(enriched.healing_summary.get(&format!("{CM}|{LINA}|")), Some(&60));

    let damage = &enriched.aggregated.rollups.damage;
    assert_eq!(damage.damage_by_attacker.get(LINA), Some(&200));
    assert_eq!(damage.damage_by_target.get(AXE), Some(&200));
    assert_eq!(damage.damage_by_pair.get(&format!("{LINA}|{AXE}|")), Some(&200));
}

#[test]
fn test_bad_records_are_skipped_whole() {
    let mut records = lineup();
    records.extend([
        game_event("", &[]),
        RawRecord::EntityCreated(EntityRecord {
            class_name: String::new(),
            properties: Default::default(),
        }),
        log(10.0, CombatLogType::Damage, LINA, AXE, "", 10),
    ]);
    let enriched = run(&records);

    assert_eq!(enriched.aggregated.rollups.damage.damage_by_attacker.get(LINA), Some(&10));
    assert_eq!(enriched.fights.len(), 1);
}

#[test]
fn test_malformed_fields_fall_back_to_defaults() {
    let input = concat!(
        r#"{"record":"combat_log","timestamp":-30.0,"type":"purchase","target":"npc_dota_hero_axe","inflictor":"item_tango"}"#,
        "\n",
        r#"{"record":"combat_log","timestamp":40.0,"type":"purchase","attacker":null,"target":"npc_dota_hero_lina","inflictor":"item_branches"}"#,
        "\n",
        r#"{"record":"combat_log","timestamp":60.0,"type":"damage","attacker":"npc_dota_hero_lina","target":"npc_dota_hero_axe","inflictor":null,"value":12.5}"#,
        "\n",
    );
    let (records, stats) = crate::reader::parse_lines(input.as_bytes());
    assert_eq!(stats.malformed, 0);
    assert_eq!(records.len(), 3);

    let enriched = run(&records);

    assert_eq!(enriched.items.len(), 2);
    assert!(enriched.items.iter().any(|i| i.time == -1 && i.player == AXE));
    assert!(enriched.items.iter().any(|i| i.time == 40 && i.player == LINA));

    assert_eq!(enriched.fights.len(), 1);
    assert_eq!(enriched.fights[0].events[0].value, 13);
    assert_eq!(
        enriched.aggregated.rollups.damage.damage_by_attacker.get(LINA),
        Some(&13)
    );
}

// ─── Document ────────────────────────────────────────────────────────────────

#[test]
fn test_document_serializes_expected_keys() {
    let mut records = lineup();
    records.push(log(10.0, CombatLogType::Damage, LINA, AXE, "", 10));
    let doc = MatchDocument::new(run(&records), Some(7712345678));
    let value = serde_json::to_value(&doc).unwrap();

    assert_eq!(value["source"], "aegis");
    assert_eq!(value["match_id"], 7712345678u64);
    assert_eq!(value["meta"]["schema_version"], "1.2.0");

    let enriched = &value["enriched"];
    for key in [
        "wards",
        "smokes",
        "items",
        "runes",
        "roshan",
        "objectives",
        "buybacks",
        "fights",
        "ability_casts",
        "item_uses",
        "aggregated",
    ] {
        assert!(enriched.get(key).is_some(), "missing enriched.{key}");
    }

    let aggregated = &enriched["aggregated"];
    for key in [
        "damage_by_attacker",
        "ability_usage_by_caster",
        "buybacks_by_player",
        "cc_efficiency",
        "economy_lead_series",
        "objective_sequences",
        "ward_hotspots",
        "vision_impact_by_team",
        "lane_roles_by_player",
    ] {
        assert!(aggregated.get(key).is_some(), "missing aggregated.{key}");
    }
    // No Roshan kill: conditional blocks are omitted, not null
    assert!(aggregated.get("roshan_context").is_none());
    assert!(aggregated.get("roshan_control").is_none());
}

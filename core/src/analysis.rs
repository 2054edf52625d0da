//! Phase 2: ordered post-passes over the state collected in phase 1.
//!
//! ```text
//!   fights flush ─► ward teams/positions ─► objective swing + chains
//!        ─► fight enrichment ─► hotspots ─► vision ─► pickoffs
//!        ─► Roshan windows ─► economy series ─► rollups
//! ```
//!
//! Fight enrichment must complete before vision scoring and pickoff
//! linkage, which both read fight swings and participants.

use crate::correlation::{
    self, VisionContext, attach_swings, chain_objectives, lead_series, lead_switches,
    link_pickoffs, roshan_context, roshan_control, score_wards,
};
use crate::document::{Aggregated, Enriched};
use crate::events::RawRecord;
use crate::fights::{EnrichContext, enrich_fights};
use crate::hotspots::ward_hotspots;
use crate::processor::EventProcessor;
use crate::rollup::{self, RollupInput, flow_summary};
use crate::state::AnalysisState;
use aegis_types::AnalysisConfig;

/// Run phase 1 over `records`, then phase 2.
pub fn analyze_records<'a>(
    records: impl IntoIterator<Item = &'a RawRecord>,
    processor: &EventProcessor,
    config: AnalysisConfig,
) -> Enriched {
    let mut state = AnalysisState::new(config);
    processor.process_records(records, &mut state);
    analyze(state)
}

/// Run every post-pass and assemble the enriched document body.
pub fn analyze(state: AnalysisState) -> Enriched {
    let AnalysisState {
        config,
        identity,
        positions,
        ward_entities,
        cc,
        wards: mut ward_tracker,
        fights: segmenter,
        mut ledger,
        stats,
        ..
    } = state;

    tracing::info!(
        records = stats.records,
        events = stats.events,
        entities = stats.entities,
        skipped = stats.skipped,
        heroes = identity.len(),
        position_samples = positions.sample_count(),
        "Ingestion complete"
    );

    let mut fights = segmenter.finish();

    ward_tracker.attach_teams(&identity);
    ward_tracker.attach_positions(&ward_entities);
    let wards = ward_tracker.into_records();

    attach_swings(
        &mut ledger.objectives,
        &ledger.economy,
        config.objectives.swing_window_secs,
    );
    chain_objectives(&mut ledger.objectives, config.objectives.chain_gap_secs);

    let ult_casts = ledger.ult_activity();
    let buyback_activity = ledger.buyback_activity();
    enrich_fights(
        &mut fights,
        &EnrichContext {
            config: &config.fights,
            economy: &ledger.economy,
            ult_casts: &ult_casts,
            buybacks: &buyback_activity,
        },
    );

    let hotspots = ward_hotspots(
        &ward_entities,
        config.wards.hotspot_radius,
        config.wards.hotspot_min_points,
    );

    let vision = score_wards(
        &wards,
        &VisionContext {
            config: &config.vision,
            fights: &fights,
            positions: &positions,
            identity: &identity,
            entities: &ward_entities,
        },
    );

    let (objective_sequences, objective_chain_details) =
        link_pickoffs(&ledger.objectives, &fights, &config.objectives);

    let roshan_window = config.roshan_window_secs;
    let kill = ledger.roshan.known_kill_time();
    let roshan_context = kill.map(|k| {
        roshan_context(
            k,
            roshan_window,
            &wards,
            ledger.smokes.iter().map(|s| s.time),
            ledger.runes.iter().map(|r| r.time),
        )
    });
    let roshan_control = kill.map(|k| roshan_control(k, roshan_window, &wards, &fights, &identity));

    let economy_lead_series = lead_series(&ledger.economy, config.economy.bucket_secs);
    let lead_switch_events = lead_switches(&economy_lead_series);

    let cc_efficiency =
        correlation::cc_efficiency(cc.intervals(), &fights, config.cc_near_death_secs);

    let rollups = rollup::build_rollups(&RollupInput {
        ledger: &ledger,
        wards: &wards,
        cc: &cc,
        fights: &fights,
        identity: &identity,
        early_game_end: config.early_game_end_secs,
    });

    tracing::info!(
        fights = fights.len(),
        wards = wards.len(),
        objectives = ledger.objectives.len(),
        hotspots = hotspots.len(),
        cc_intervals = cc.intervals().len(),
        "Analysis complete"
    );

    let aggregated = Aggregated {
        rollups,
        cc_efficiency,
        economy_lead_series,
        lead_switch_events,
        objective_sequences,
        objective_chain_details,
        ward_hotspots: hotspots,
        vision_impact_by_player: correlation::vision::vision_by_player(&vision),
        vision_impact_by_team: correlation::vision::vision_by_team(&vision),
        vision_impact_by_ward: vision,
        roshan_context,
        roshan_control,
    };

    Enriched {
        damage_summary: flow_summary(&ledger.damage),
        healing_summary: flow_summary(&ledger.healing),
        cc_summary: cc.by_target().clone(),
        wards,
        smokes: ledger.smokes,
        items: ledger.items,
        runes: ledger.runes,
        roshan: ledger.roshan,
        objectives: ledger.objectives,
        buybacks: ledger.buybacks,
        fights,
        ability_casts: ledger.ability_casts,
        item_uses: ledger.item_uses,
        aggregated,
    }
}

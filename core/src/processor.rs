//! Phase 1: a single forward pass over decoded records.
//!
//! Each record is normalized, then routed:
//!
//! ```text
//!   RawRecord ──normalize──┬─ Entity ──► identity / position sampler / ward entities
//!                          └─ Events ──► CC tracker, ward tracker, fight segmenter, ledger
//! ```
//!
//! A record the normalizer rejects is skipped whole; nothing in the state
//! is touched for it.

use crate::events::{
    EntityObservation, EventHandler, EventNormalizer, Normalized, NormalizedEvent, RawRecord,
};
use crate::state::AnalysisState;

#[derive(Debug, Default)]
pub struct EventProcessor {
    normalizer: EventNormalizer,
}

impl EventProcessor {
    pub fn new(normalizer: EventNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &EventNormalizer {
        &self.normalizer
    }

    /// Process one record against the run state.
    pub fn process_record(&self, record: &RawRecord, state: &mut AnalysisState) {
        state.stats.records += 1;

        let normalized = match self.normalizer.normalize(record, &state.identity) {
            Ok(normalized) => normalized,
            Err(err) => {
                state.stats.skipped += 1;
                tracing::debug!(error = %err, "Skipping record");
                return;
            }
        };

        match normalized {
            Normalized::Entity(observation) => {
                state.stats.entities += 1;
                apply_observation(observation, state);
            }
            Normalized::Events(events) => {
                if matches!(record, RawRecord::CombatLog(_)) {
                    advance_clock(&events, state);
                }
                state.stats.events += events.len();
                dispatch(&events, state);
            }
            Normalized::Nothing => {}
        }
    }

    pub fn process_records<'a>(
        &self,
        records: impl IntoIterator<Item = &'a RawRecord>,
        state: &mut AnalysisState,
    ) {
        for record in records {
            self.process_record(record, state);
        }
    }
}

fn advance_clock(events: &[NormalizedEvent], state: &mut AnalysisState) {
    if let Some(latest) = events.iter().map(|e| e.time).max() {
        state.clock = state.clock.max(latest);
    }
}

fn apply_observation(observation: EntityObservation, state: &mut AnalysisState) {
    match observation {
        EntityObservation::HeroSpawned { hero, team } => state.identity.register(&hero, team),
        EntityObservation::HeroMoved { hero, position } => {
            state.positions.observe(&hero, state.clock, position);
        }
        EntityObservation::WardSpawned(entity) => state.ward_entities.push(entity),
    }
}

fn dispatch(events: &[NormalizedEvent], state: &mut AnalysisState) {
    let handlers: [&mut dyn EventHandler; 4] = [
        &mut state.cc,
        &mut state.wards,
        &mut state.fights,
        &mut state.ledger,
    ];
    for handler in handlers {
        handler.handle_events(events);
    }
}

use crate::events::MatchTime;
use crate::fights::FightSegmenter;
use crate::identity::HeroIdentity;
use crate::ledger::EventLedger;
use crate::tracking::{CcTracker, PositionSampler, WardEntity, WardTracker};
use aegis_types::AnalysisConfig;

/// Counters for one ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub records: usize,
    pub events: usize,
    pub entities: usize,
    /// Records the normalizer rejected.
    pub skipped: usize,
}

/// Pure storage for one analysis run.
/// Routing logic lives in [`EventProcessor`](crate::processor::EventProcessor).
#[derive(Debug)]
pub struct AnalysisState {
    pub config: AnalysisConfig,
    /// Latest combat-log time seen.
    pub clock: MatchTime,
    pub identity: HeroIdentity,
    pub positions: PositionSampler,
    pub ward_entities: Vec<WardEntity>,
    pub cc: CcTracker,
    pub wards: WardTracker,
    pub fights: FightSegmenter,
    pub ledger: EventLedger,
    pub stats: IngestStats,
}

impl AnalysisState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            clock: 0,
            identity: HeroIdentity::new(),
            positions: PositionSampler::new(config.position_sample_secs),
            ward_entities: Vec::new(),
            cc: CcTracker::new(),
            wards: WardTracker::new(config.wards.clone()),
            fights: FightSegmenter::new(config.fights.gap_secs),
            ledger: EventLedger::new(),
            stats: IngestStats::default(),
            config,
        }
    }
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

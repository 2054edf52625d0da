pub mod analysis;
pub mod config;
pub mod correlation;
pub mod document;
pub mod error;
pub mod events;
pub mod fights;
pub mod hotspots;
pub mod identity;
pub mod ledger;
pub mod processor;
pub mod reader;
pub mod rollup;
pub mod state;
pub mod tracking;

#[cfg(test)]
mod analysis_tests;

// Re-exports for convenience
pub use analysis::{analyze, analyze_records};
pub use config::{load_config, load_ultimates};
pub use document::{MatchDocument, match_id_from_path};
pub use error::{AegisError, ConfigError, NormalizeError};
pub use events::{EventNormalizer, RawRecord};
pub use processor::EventProcessor;
pub use reader::{read_records, write_document};
pub use state::AnalysisState;

pub mod handler;
pub mod normalized;
pub mod normalizer;
pub mod record;

pub use handler::EventHandler;
pub use normalized::{EventKind, MatchTime, NormalizedEvent, UNKNOWN_TIME};
pub use normalizer::{EntityObservation, EventNormalizer, Normalized};
pub use record::{CombatLogRecord, CombatLogType, EntityRecord, GameEventRecord, PropertyValue, RawRecord};

//! Fight detection and enrichment.
//!
//! Segmentation runs during ingestion ([`segmenter`]); enrichment runs once
//! the event stream is exhausted and every economy grant, ultimate cast and
//! buyback is known ([`enrich`]).

pub mod enrich;
pub mod segmenter;

pub use enrich::{
    Activity, ActorImpact, EnrichContext, FightEnrichment, FightSwing, SpatialGroup, SwingSource,
    enrich_fights,
};
pub use segmenter::{Fight, FightEvent, FightEventKind, FightSegmenter, segment_fights};

//! Types shared between the aegis engine and its command-line front end.

pub mod config;
pub mod formatting;

pub use config::{
    AnalysisConfig, EconomyConfig, FightConfig, ObjectiveConfig, VisionConfig, WardConfig,
};

use std::path::PathBuf;

use thiserror::Error;

/// A single input record could not be turned into events.
///
/// These never abort a run: the processor logs them at debug level, counts
/// them, and moves on to the next record.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("entity record has an empty class name")]
    EmptyClassName,

    #[error("game event has an empty name")]
    EmptyEventName,
}

/// Run-level failures. Anything that reaches this type ends the run.
#[derive(Debug, Error)]
pub enum AegisError {
    #[error("cannot read input {path}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output {path}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize analytics document")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from loading analysis configuration or the ultimate list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to parse ultimate list {path}")]
    UltimateListError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load user config")]
    UserConfig(#[from] confy::ConfyError),
}

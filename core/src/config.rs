//! Loading of analysis thresholds and the ultimate-ability list.
//!
//! Thresholds come from, in order: an explicit TOML file, the per-user
//! confy store (`aegis`), then built-in defaults. The ultimate list is a
//! JSON array of ability names:
//!
//! ```text
//! ["enigma_black_hole", "faceless_void_chronosphere", ...]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use aegis_types::AnalysisConfig;

use crate::error::ConfigError;

pub const APP_NAME: &str = "aegis";
pub const ULTS_ENV: &str = "AEGIS_ULTS_PATH";
const ULTS_FILE: &str = "ult_abilities.json";

/// Resolve the analysis config for a run.
///
/// An explicit path must exist and parse. Without one, the user store is
/// consulted and any failure there falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig, ConfigError> {
    if let Some(path) = path {
        return load_config_file(path);
    }

    match confy::load::<AnalysisConfig>(APP_NAME, None) {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(error = %err, "User config unreadable, using defaults");
            Ok(AnalysisConfig::default())
        }
    }
}

/// Load a single TOML config file. Missing keys take their defaults.
pub fn load_config_file(path: &Path) -> Result<AnalysisConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&contents)?)
}

/// Resolve the ultimate-ability list.
///
/// Lookup order: `explicit`, then `$AEGIS_ULTS_PATH`, then
/// `<config dir>/aegis/ult_abilities.json`. A named file that cannot be
/// read is an error; a missing default file yields an empty list.
pub fn load_ultimates(explicit: Option<&Path>) -> Result<Vec<String>, ConfigError> {
    if let Some(path) = explicit {
        return load_ultimates_file(path);
    }
    if let Some(path) = std::env::var_os(ULTS_ENV).filter(|p| !p.is_empty()) {
        return load_ultimates_file(Path::new(&path));
    }

    match default_ultimates_path() {
        Some(path) if path.exists() => load_ultimates_file(&path),
        _ => {
            tracing::debug!("No ultimate list found, ult counts will be zero");
            Ok(Vec::new())
        }
    }
}

pub fn load_ultimates_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let names: Vec<String> =
        serde_json::from_str(&contents).map_err(|e| ConfigError::UltimateListError {
            path: path.to_path_buf(),
            source: e,
        })?;

    tracing::debug!(path = %path.display(), count = names.len(), "Loaded ultimate list");
    Ok(names)
}

pub fn default_ultimates_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME).join(ULTS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let file = temp_with("roshan_window_secs = 30\n\n[fights]\ngap_secs = 12\n");
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.roshan_window_secs, 30);
        assert_eq!(config.fights.gap_secs, 12);
        let defaults = AnalysisConfig::default();
        assert_eq!(config.wards, defaults.wards);
        assert_eq!(config.vision, defaults.vision);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let file = temp_with("fights = 3");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_ultimates_from_explicit_path() {
        let file = temp_with(r#"["enigma_black_hole", "faceless_void_chronosphere"]"#);
        let names = load_ultimates(Some(file.path())).unwrap();
        assert_eq!(names, vec!["enigma_black_hole", "faceless_void_chronosphere"]);
    }

    #[test]
    fn test_ultimate_list_must_be_array() {
        let file = temp_with(r#"{"ults": []}"#);
        let err = load_ultimates(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::UltimateListError { .. }));
    }
}

//! # atlas-cli: Command-Line Front End for Atlas
//!
//! Provides the `atlas` binary. Every command works against a snapshot file
//! (`country_profiles`, `region_groups`, `places`) loaded into a
//! [`MemoryStore`].
//!
//! ## Subcommands
//!
//! - `atlas profile`: Resolve, list, and normalize country profiles.
//! - `atlas place`: Validate place creates and updates.
//! - `atlas audit`: Run the store-wide consistency checks.
//!
//! ```bash
//! atlas profile resolve TR --store atlas.yaml --format json
//! atlas place create kemer.yaml --store atlas.yaml --write
//! atlas audit --store atlas.yaml
//! ```
//!
//! Handlers return the process exit code: `0` on success, `1` when a write
//! is rejected or an audit reports errors. I/O and decoding failures
//! surface as `anyhow` errors.

pub mod audit;
pub mod place;
pub mod profile;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Serialize;

use atlas_hierarchy::{EngineConfig, MemoryStore, Snapshot};

/// Output encoding for documents printed to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// Serialize `value` in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    })
}

/// Read a YAML or JSON document. `.json` files are parsed as JSON; anything
/// else as YAML.
pub fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    if is_json(path) {
        serde_json::from_str(&content).with_context(|| format!("failed to parse JSON: {}", path.display()))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("failed to parse YAML: {}", path.display()))
    }
}

/// Write a document back in the encoding its extension implies.
pub fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let format = if is_json(path) {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    let content = render(value, format)?;
    std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Load a snapshot file into a fresh store.
pub fn load_store(path: &Path) -> Result<MemoryStore> {
    let snapshot: Snapshot = read_document(path)?;
    let store = MemoryStore::from_snapshot(snapshot)
        .with_context(|| format!("invalid snapshot: {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded snapshot");
    Ok(store)
}

/// Persist the store's contents to a snapshot file.
pub fn save_store(path: &Path, store: &MemoryStore) -> Result<()> {
    write_document(path, &store.snapshot())
}

/// Load the engine configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Parse a two-letter country code argument.
pub(crate) fn country_arg(raw: &str) -> Result<atlas_core::CountryCode> {
    match atlas_core::CountryCode::new(raw) {
        Ok(code) => Ok(code),
        Err(e) => bail!("{e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = "places:\n  - {id: 1, place_id: country-tr, place_type: country, country_code: TR}\n";

    #[test]
    fn yaml_and_json_snapshots_load() {
        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        yaml.write_all(SNAPSHOT.as_bytes()).unwrap();
        assert_eq!(load_store(yaml.path()).unwrap().places().count(), 1);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"places": [{"id": 1, "place_id": "country-tr", "place_type": "country", "country_code": "TR"}]}"#)
            .unwrap();
        assert_eq!(load_store(json.path()).unwrap().places().count(), 1);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_store(Path::new("/nonexistent/atlas.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/atlas.yaml"));
    }

    #[test]
    fn save_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.json");
        std::fs::write(&path, r#"{"places": []}"#).unwrap();
        let mut store = load_store(&path).unwrap();
        store.insert_place(serde_yaml::from_str("id: 4\nplace_id: country-de\nplace_type: country\ncountry_code: DE\n").unwrap());
        save_store(&path, &store).unwrap();

        let reloaded = load_store(&path).unwrap();
        assert_eq!(reloaded.places().count(), 1);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.trim_start().starts_with('{'));
    }

    #[test]
    fn default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), EngineConfig::default());
    }

    #[test]
    fn country_arg_validates() {
        assert_eq!(country_arg("tr").unwrap().as_str(), "TR");
        assert!(country_arg("Turkey").is_err());
    }
}

//! # Engine Configuration
//!
//! Tunables for the write pipeline, loaded from YAML. Every field has a
//! default, so an empty document is a valid configuration.
//!
//! ```yaml
//! max_ancestor_depth: 32
//! parent_required: [admin1, admin2, city]
//! unruled_parent: allow_any   # or: deny
//! default_language: en
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use atlas_core::{PlaceType, DEFAULT_LANGUAGE};
use atlas_profile::UnruledParentPolicy;

/// Errors loading an [`EngineConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The config path.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The document is not valid YAML for this shape.
    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Write-pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on ancestor walks (cycle detection, admin1 lookup).
    pub max_ancestor_depth: usize,
    /// Types that must have a resolved parent.
    pub parent_required: BTreeSet<PlaceType>,
    /// Treatment of child types with no parent rule.
    pub unruled_parent: UnruledParentPolicy,
    /// Canonical language when neither candidate nor stored record names one.
    pub default_language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_ancestor_depth: 32,
            parent_required: PlaceType::non_root().collect(),
            unruled_parent: UnruledParentPolicy::default(),
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ancestor_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_ancestor_depth must be at least 1".to_string(),
            ));
        }
        if self.parent_required.contains(&PlaceType::Country) {
            return Err(ConfigError::Invalid(
                "parent_required cannot contain country".to_string(),
            ));
        }
        if self.default_language.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_language must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether `place_type` must have a resolved parent.
    pub fn requires_parent(&self, place_type: PlaceType) -> bool {
        self.parent_required.contains(&place_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        let config = EngineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_ancestor_depth, 32);
        assert!(config.requires_parent(PlaceType::Poi));
        assert!(!config.requires_parent(PlaceType::Country));
        assert_eq!(config.unruled_parent, UnruledParentPolicy::AllowAny);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config =
            EngineConfig::from_yaml_str("unruled_parent: deny\nparent_required: [admin1]\n").unwrap();
        assert_eq!(config.unruled_parent, UnruledParentPolicy::Deny);
        assert!(config.requires_parent(PlaceType::Admin1));
        assert!(!config.requires_parent(PlaceType::Poi));
        assert_eq!(config.default_language, "en");
    }

    #[test]
    fn out_of_range_values_rejected() {
        assert!(matches!(
            EngineConfig::from_yaml_str("max_ancestor_depth: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_yaml_str("parent_required: [country]"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_yaml_str("unruled_parent: sometimes"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_ancestor_depth: 4").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.max_ancestor_depth, 4);

        let missing = EngineConfig::load(Path::new("/nonexistent/atlas.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}

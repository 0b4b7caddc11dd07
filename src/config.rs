//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (validating, lenient untyped references)
//! 2. Global config: `$XDG_CONFIG_HOME/clinical-model/model.toml`
//! 3. Explicit config file passed by the caller
//! 4. Environment variables: `CLINMODEL_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::ValidationPolicy;

pub const ENV_PREFIX: &str = "CLINMODEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment: {0}")]
    Environment(#[from] config::ConfigError),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Model-wide defaults applied to builders created through [`ModelSettings::policy`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelSettings {
    /// Run validators at build time
    pub validating: bool,
    /// Accept references without a declared type on allow-listed elements
    pub lenient_untyped_references: bool,
}

impl Default for ModelSettings {
    fn default() -> Self {
        let policy = ValidationPolicy::default();
        Self {
            validating: policy.validating,
            lenient_untyped_references: policy.lenient_untyped_references,
        }
    }
}

/// Partially specified settings, as read from one layer.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawSettings {
    validating: Option<bool>,
    lenient_untyped_references: Option<bool>,
}

/// Get the XDG config directory for clinical-model.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clinical-model").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("model.toml"))
}

fn load_raw_settings(path: &Path) -> ConfigResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

impl ModelSettings {
    /// Builder policy carrying these settings.
    pub fn policy(&self) -> ValidationPolicy {
        ValidationPolicy {
            validating: self.validating,
            lenient_untyped_references: self.lenient_untyped_references,
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            validating: overlay.validating.unwrap_or(self.validating),
            lenient_untyped_references: overlay
                .lenient_untyped_references
                .unwrap_or(self.lenient_untyped_references),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// A missing global file is skipped; a missing `explicit` file is an error.
    #[instrument(level = "debug")]
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "applying global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            debug!(path = %path.display(), "applying explicit config");
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = current.apply_env_overrides()?;
        debug!(?current, "effective model settings");
        Ok(current)
    }

    /// Defaults overlaid with one file only; no global config, no environment.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        Ok(Self::default().merge_with(&load_raw_settings(path)?))
    }

    /// Apply `CLINMODEL_*` environment variables as explicit overrides.
    fn apply_env_overrides(self) -> ConfigResult<Self> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let raw = RawSettings {
            validating: env_bool(&config, "validating")?,
            lenient_untyped_references: env_bool(&config, "lenient_untyped_references")?,
        };
        Ok(self.merge_with(&raw))
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# clinical-model configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/clinical-model/model.toml
#   Explicit file passed to ModelSettings::load
#   Env:    CLINMODEL_* environment variables

# Run validators when builders build (false = trusted construction)
# validating = true

# Accept references without a declared type on elements with a target allow-list
# lenient_untyped_references = true
"#
        .to_string()
    }
}

/// An unset variable is `None`; a value that is not a boolean is an error.
fn env_bool(config: &Config, key: &str) -> ConfigResult<Option<bool>> {
    match config.get_bool(key) {
        Ok(value) => Ok(Some(value)),
        Err(config::ConfigError::NotFound(_)) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_policy_then_matches_default_policy() {
        assert_eq!(ModelSettings::default().policy(), ValidationPolicy::default());
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_values_change() {
        let base = ModelSettings::default();
        let overlay = RawSettings {
            validating: None,
            lenient_untyped_references: Some(false),
        };

        let merged = base.merge_with(&overlay);

        assert!(merged.validating);
        assert!(!merged.lenient_untyped_references);
        assert_eq!(merged.policy(), ValidationPolicy::strict());
    }

    #[test]
    fn given_template_when_parsed_then_yields_defaults() {
        let raw: RawSettings = toml::from_str(&ModelSettings::template()).expect("parse template");
        assert_eq!(ModelSettings::default().merge_with(&raw), ModelSettings::default());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = ModelSettings {
            validating: false,
            lenient_untyped_references: true,
        };
        let text = settings.to_toml().expect("serialize");
        let parsed: ModelSettings = toml::from_str(&text).expect("parse");
        assert_eq!(parsed, settings);
    }
}

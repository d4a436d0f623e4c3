//! # Pipeline Configuration
//!
//! [`PipelineConfig`] is assembled once at process start: defaults, then an
//! optional YAML file, then environment overrides. It is immutable afterwards
//! and passed explicitly into the update cycle. Nothing else in the pipeline
//! reads ambient configuration.
//!
//! ## Environment overrides
//!
//! | Variable              | Field                  |
//! |-----------------------|------------------------|
//! | `VALTAB_BASE_URL`     | `base_url`             |
//! | `VALTAB_INDEX_PATH`   | `index_path`           |
//! | `VALTAB_TIMEOUT_SECS` | `request_timeout_secs` |
//! | `VALTAB_MAX_RETRIES`  | `max_retries`          |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use valtab_core::{SourceCategory, UpdateFrequency};

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Yaml {
        /// File path.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// An environment override has an unusable value.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Supplied value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// How much stored data a batch replaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceScope {
    /// Delete only rows of the batch's periods before inserting.
    #[default]
    Period,
    /// Delete every row of the data type before inserting.
    Table,
}

/// What to persist when validation reports errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Drop invalid records and persist the rest.
    #[default]
    PersistValidSubset,
    /// Persist nothing when any error exists.
    BlockOnErrors,
    /// Persist every extracted record regardless of errors.
    PersistAll,
}

/// Days after which stored data of each frequency is considered stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalenessThresholds {
    /// Yearly releases.
    pub yearly_days: i64,
    /// Bimonthly releases.
    pub bimonthly_days: i64,
    /// Irregular releases.
    pub irregular_days: i64,
}

impl Default for StalenessThresholds {
    fn default() -> Self {
        Self {
            yearly_days: 365,
            bimonthly_days: 60,
            irregular_days: 30,
        }
    }
}

impl StalenessThresholds {
    /// Threshold for a frequency.
    pub fn for_frequency(&self, frequency: UpdateFrequency) -> i64 {
        match frequency {
            UpdateFrequency::Yearly => self.yearly_days,
            UpdateFrequency::Bimonthly => self.bimonthly_days,
            UpdateFrequency::Irregular => self.irregular_days,
        }
    }
}

/// Immutable configuration for one deployment of the update pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Site root that relative links resolve against.
    pub base_url: String,
    /// Path of the index page listing the documents.
    pub index_path: String,
    /// Categories whose absence from the index aborts the run.
    pub required_categories: Vec<SourceCategory>,
    /// Staleness thresholds.
    pub thresholds: StalenessThresholds,
    /// Base year added to the two-digit era token of annual URLs.
    ///
    /// The default of 2000 maps `r07` to 2007. Every annual snapshot is then
    /// more than 365 days old, so the annual document is retrieved again on
    /// each cycle, and the cycle emits [`CycleEvent::StalePeriod`]. Use 2018
    /// to map Reiwa tokens to Gregorian years.
    ///
    /// [`CycleEvent::StalePeriod`]: crate::report::CycleEvent::StalePeriod
    pub era_base_year: i32,
    /// Replacement scope handed to the persistence collaborator.
    pub replace_scope: ReplaceScope,
    /// Handling of validation errors.
    pub validation_policy: ValidationPolicy,
    /// Per-request timeout for retrieval.
    pub request_timeout_secs: u64,
    /// Retries after the first attempt on transport errors.
    pub max_retries: u32,
    /// `User-Agent` header sent with every retrieval.
    pub user_agent: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.nta.go.jp".to_string(),
            index_path: "/law/tsutatsu/kobetsu/hyoka/index.htm".to_string(),
            required_categories: vec![SourceCategory::Annual],
            thresholds: StalenessThresholds::default(),
            era_base_year: valtab_extract::DEFAULT_ERA_BASE_YEAR,
            replace_scope: ReplaceScope::default(),
            validation_policy: ValidationPolicy::default(),
            request_timeout_secs: 30,
            max_retries: 3,
            user_agent: concat!("valtab/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a YAML document; absent fields take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from an optional YAML file, then apply process environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&text).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        base.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn with_env_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup("VALTAB_BASE_URL") {
            url::Url::parse(&url).map_err(|e| ConfigError::InvalidEnv {
                name: "VALTAB_BASE_URL",
                value: url.clone(),
                reason: e.to_string(),
            })?;
            self.base_url = url;
        }
        if let Some(path) = lookup("VALTAB_INDEX_PATH") {
            self.index_path = path;
        }
        if let Some(raw) = lookup("VALTAB_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("VALTAB_TIMEOUT_SECS", raw)?;
        }
        if let Some(raw) = lookup("VALTAB_MAX_RETRIES") {
            self.max_retries = parse_env("VALTAB_MAX_RETRIES", raw)?;
        }
        Ok(self)
    }
}

fn parse_env<T>(name: &'static str, raw: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        name,
        reason: e.to_string(),
        value: raw,
    })
}

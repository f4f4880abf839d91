//! Configuration structures and utilities
//!
//! Every tunable of the pipeline lives here and is passed explicitly to the
//! component that needs it. All structs deserialize from JSON with missing
//! fields falling back to their `Default`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Query variable names of the history query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleNames {
    pub predicate: String,
    pub value: String,
    pub secondary_predicate: String,
    pub secondary_value: String,
}

impl Default for RoleNames {
    fn default() -> Self {
        Self {
            predicate: "p".to_string(),
            value: "v".to_string(),
            secondary_predicate: "p2".to_string(),
            secondary_value: "v2".to_string(),
        }
    }
}

/// Regular expressions identifying facts inside URI values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactPatterns {
    pub rev_per_month: String,
    pub average_size_per_month: String,
    pub birth_date: String,
    pub death_date: String,
    pub office_tenure: String,
    pub unique_contributors: String,
    /// Node ids must match this; anchored at the start.
    pub node_id: String,
}

impl Default for FactPatterns {
    fn default() -> Self {
        Self {
            rev_per_month: "revPerMonth".to_string(),
            average_size_per_month: "averageSizePerMonth".to_string(),
            birth_date: "birthDate".to_string(),
            death_date: "deathDate".to_string(),
            office_tenure: "Fonction".to_string(),
            unique_contributors: "uniqueContributorNb".to_string(),
            node_id: "^nodeID".to_string(),
        }
    }
}

/// chrono format strings, tried in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormats {
    pub month: String,
    pub year: String,
    /// Applied to the part of a full date before the first `+`.
    pub full: Vec<String>,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            month: "%m/%Y".to_string(),
            year: "%Y".to_string(),
            full: vec!["%Y-%m-%d".to_string(), "%Y-%m-%dT%H:%M:%S".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub roles: RoleNames,
    pub patterns: FactPatterns,
    pub date_formats: DateFormats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationarityConfig {
    /// A stage passes only when the ADF p-value is below this.
    pub adf_p_threshold: f64,
    /// Window of the rolling mean/std diagnostics.
    pub rolling_window: usize,
    /// Upper bound on ADF lags; `None` uses `ceil(12 * (n/100)^(1/4))`.
    pub max_lag: Option<usize>,
    /// Lags for the ACF/PACF diagnostic; `None` uses `min(10 * log10(n), n - 1)`.
    pub acf_lags: Option<usize>,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self { adf_p_threshold: 0.5, rolling_window: 7, max_lag: None, acf_lags: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// Tables with fewer rows are not stored.
    pub min_table_rows: usize,
    pub start_offset: usize,
    pub limit: Option<usize>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://dbpedia-historique.inria.fr/sparql".to_string(),
            timeout_secs: 60,
            min_table_rows: 10,
            start_offset: 0,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub extraction: ExtractionConfig,
    pub stationarity: StationarityConfig,
    pub acquisition: AcquisitionConfig,
    pub storage_path: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            stationarity: StationarityConfig::default(),
            acquisition: AcquisitionConfig::default(),
            storage_path: "data/webts".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: display.clone(), source })?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: display, source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.stationarity.adf_p_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "adf_p_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        if self.stationarity.rolling_window < 2 {
            return Err(ConfigError::Invalid("rolling_window must be at least 2".to_string()));
        }
        if self.extraction.date_formats.full.is_empty() {
            return Err(ConfigError::Invalid("date_formats.full must not be empty".to_string()));
        }
        Ok(())
    }
}

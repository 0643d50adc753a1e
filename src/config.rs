//! Configuration file for the table tools
//!
//! A JSON object; every key is optional:
//!
//! ```json
//! {
//!   "working_root": "/data",
//!   "sample_rows": 100,
//!   "confidence": 1.0,
//!   "fail_fast": false,
//!   "header_policy": "strict",
//!   "missing_values": [""],
//!   "dialect": { "delimiter": ",", "lineTerminator": "crlf" },
//!   "log_level": "WARN"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datasource::Dialect;
use crate::inference::{InferOptions, DEFAULT_SAMPLE_ROWS};
use crate::observability::{log_event_with_fields, Event, Severity};
use crate::schema::{HeaderPolicy, ValidateOptions};

/// Configuration load failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Directory every table, archive and schema path must stay inside
    #[serde(default = "default_working_root")]
    pub working_root: PathBuf,

    /// Rows read for type inference (default 100)
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Share of cells a type must accept during inference (default 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Stop validation at the first violation
    #[serde(default)]
    pub fail_fast: bool,

    #[serde(default)]
    pub header_policy: HeaderPolicy,

    /// Raw cells read as missing (default: the empty string)
    #[serde(default = "default_missing_values")]
    pub missing_values: Vec<String>,

    #[serde(default)]
    pub dialect: Dialect,

    /// Minimum log severity: TRACE, INFO, WARN or ERROR (default WARN)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_working_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_sample_rows() -> usize {
    DEFAULT_SAMPLE_ROWS
}
fn default_confidence() -> f64 {
    1.0
}
fn default_missing_values() -> Vec<String> {
    vec![String::new()]
}
fn default_log_level() -> String {
    "WARN".to_string()
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            working_root: default_working_root(),
            sample_rows: default_sample_rows(),
            confidence: default_confidence(),
            fail_fast: false,
            header_policy: HeaderPolicy::default(),
            missing_values: default_missing_values(),
            dialect: Dialect::default(),
            log_level: default_log_level(),
        }
    }
}

impl TableConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let config: TableConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: display.clone(),
                source,
            })?;

        config.validate()?;

        log_event_with_fields(Event::ConfigLoaded, &[("path", display.as_str())]);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rows == 0 {
            return Err(ConfigError::Invalid("sample_rows must be > 0".into()));
        }

        if !(self.confidence > 0.0 && self.confidence <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "confidence must be in (0, 1], got {}",
                self.confidence
            )));
        }

        self.dialect.validate().map_err(ConfigError::Invalid)?;
        self.severity()?;

        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> Result<Severity, ConfigError> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "Invalid log_level: '{}'. Must be TRACE, INFO, WARN or ERROR.",
                self.log_level
            ))
        })
    }

    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn infer_options(&self) -> InferOptions {
        InferOptions {
            sample_rows: self.sample_rows,
            confidence: self.confidence,
            missing_values: self.missing_values.clone(),
        }
    }

    pub fn validate_options(&self) -> ValidateOptions {
        ValidateOptions {
            fail_fast: self.fail_fast,
            header_policy: self.header_policy,
        }
    }
}

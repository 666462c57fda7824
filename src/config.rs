//! Configuration management for the scoring pipeline

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default location of the optional configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Log output format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub ingest: IngestConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

/// Scoring service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Prediction endpoint receiving the multipart upload
    pub endpoint: String,
    /// Health check endpoint
    pub health_endpoint: String,
    /// Request timeout in seconds (0 disables the timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Multipart field name carrying the file
    #[serde(default = "default_file_field")]
    pub file_field: String,
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_file_field() -> String {
    "file".to_string()
}

/// Upload validation and preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Accepted file extension, including the dot
    pub extension: String,
    /// Rows shown in the pre-analysis preview
    pub preview_rows: usize,
    /// Columns shown in the pre-analysis preview
    pub preview_columns: usize,
    /// Columns the scoring service needs; absence only produces a warning
    #[serde(default = "default_required_columns")]
    pub required_columns: Vec<String>,
}

/// `Time, V1..V28, Amount`
pub fn default_required_columns() -> Vec<String> {
    let mut columns = Vec::with_capacity(30);
    columns.push("Time".to_string());
    columns.extend((1..=28).map(|i| format!("V{}", i)));
    columns.push("Amount".to_string());
    columns
}

/// Result export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// File name used when saving results
    pub file_name: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (pretty, json)
    #[serde(default)]
    pub format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration layered as defaults, then file (if present), then
    /// `FRAUDSHIELD__SECTION__KEY` environment variables
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults =
            Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix("FRAUDSHIELD").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig {
                endpoint: "http://127.0.0.1:8000/predict".to_string(),
                health_endpoint: "http://127.0.0.1:8000/".to_string(),
                timeout_secs: default_timeout_secs(),
                file_field: default_file_field(),
            },
            ingest: IngestConfig {
                extension: ".csv".to_string(),
                preview_rows: crate::ingest::PREVIEW_ROWS,
                preview_columns: crate::ingest::PREVIEW_COLUMNS,
                required_columns: default_required_columns(),
            },
            export: ExportConfig {
                file_name: "fraudshield_results.csv".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }
}

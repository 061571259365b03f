//! Configuration loading from maap.toml
//!
//! The configuration is discovered by walking up from the current directory.
//! Every field has a default, so an empty file (or no file) is valid.

use anyhow::Context;
use maap_core::{MaapConfig, Strategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file
pub const CONFIG_FILE: &str = "maap.toml";

/// MAAP configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MaapToml {
    /// Resampling settings
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Data source settings
    #[serde(default)]
    pub data: DataConfig,
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Resampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Percentile thresholds, in percent
    #[serde(default = "default_percentiles")]
    pub percentiles: Vec<f64>,
    /// Sample sizes, in run order
    #[serde(default = "default_sample_sizes")]
    pub sample_sizes: Vec<usize>,
    /// Trials per sample size
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Decimal places kept in result tables
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Seed for reproducible runs; entropy when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Sampling strategy: "all" or "every-N"
    #[serde(default = "default_strategy")]
    pub strategy: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            percentiles: default_percentiles(),
            sample_sizes: default_sample_sizes(),
            iterations: default_iterations(),
            decimals: default_decimals(),
            seed: None,
            strategy: default_strategy(),
        }
    }
}

fn default_percentiles() -> Vec<f64> {
    maap_stats::DEFAULT_PERCENTILES.to_vec()
}
fn default_sample_sizes() -> Vec<usize> {
    maap_core::DEFAULT_SAMPLE_SIZES.to_vec()
}
fn default_iterations() -> usize {
    maap_core::DEFAULT_ITERATIONS
}
fn default_decimals() -> u32 {
    maap_stats::DEFAULT_DECIMALS
}
fn default_strategy() -> String {
    "all".to_string()
}

/// Data source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding one CSV file per site
    #[serde(default = "default_data_dir")]
    pub directory: String,
    /// Provenance label written into the site summary
    #[serde(default = "default_source_label")]
    pub source_label: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            directory: default_data_dir(),
            source_label: default_source_label(),
        }
    }
}

fn default_data_dir() -> String {
    "site_data".to_string()
}
fn default_source_label() -> String {
    "USGS".to_string()
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "csv", "json" or "human"
    #[serde(default = "default_format")]
    pub format: String,
    /// Directory for report files
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Model summary file name
    #[serde(default = "default_model_summary")]
    pub model_summary: String,
    /// Site summary file name
    #[serde(default = "default_site_summary")]
    pub site_summary: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            model_summary: default_model_summary(),
            site_summary: default_site_summary(),
        }
    }
}

fn default_format() -> String {
    "csv".to_string()
}
fn default_output_dir() -> String {
    ".".to_string()
}
fn default_model_summary() -> String {
    "model_summaries.csv".to_string()
}
fn default_site_summary() -> String {
    "site_summaries.csv".to_string()
}

impl MaapToml {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {:#}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Engine configuration, with an optional iteration override
    pub fn engine_config(&self, iterations: Option<usize>) -> anyhow::Result<MaapConfig> {
        let analysis = &self.analysis;
        MaapConfig::new(
            analysis.percentiles.clone(),
            analysis.sample_sizes.clone(),
            iterations.unwrap_or(analysis.iterations),
            analysis.decimals,
        )
        .context("Invalid [analysis] configuration")
    }

    /// Parsed sampling strategy
    pub fn strategy(&self) -> anyhow::Result<Strategy> {
        self.analysis
            .strategy
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# MAAP Configuration

[analysis]
# Percentile thresholds, in percent
percentiles = [10.0, 25.0, 50.0, 75.0, 90.0]
# Subsample sizes to evaluate, in order
sample_sizes = [5, 10, 20, 50, 100]
# Trials per sample size
iterations = 1000
# Decimal places kept in result tables
decimals = 4
# Fixed seed for reproducible runs (uncomment to enable)
# seed = 42
# Sampling strategy: "all" keeps every row, "every-N" keeps every N-th row
strategy = "all"

[data]
# Directory with one CSV file per site (first column: ISO-8601 timestamp)
directory = "site_data"
# Provenance label written into the site summary
source_label = "USGS"

[output]
# Output format: csv, json, human
format = "csv"
# Directory for report files
directory = "."
# CSV file names (rows are appended)
model_summary = "model_summaries.csv"
site_summary = "site_summaries.csv"
"#
        .to_string()
    }
}

//! Report Data Structures

use chrono::{DateTime, NaiveDateTime, Utc};
use maap_core::{MaapResult, SampleSizeRow};
use maap_stats::{DescriptiveStats, StatFlags};
use serde::Serialize;

/// Complete report for one site and time window
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// One entry per parameter that completed
    pub parameters: Vec<ParameterReport>,
    /// Parameters whose run failed
    pub failures: Vec<FailureInfo>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    /// Tool version
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Site (data source file stem)
    pub site: String,
    /// Analysed time window
    pub time_range: TimeWindow,
    /// Trials per sample size
    pub iterations: usize,
    /// Sampling strategy name
    pub strategy: String,
    /// Seed, when the run was reproducible
    pub seed: Option<u64>,
    /// Percentile thresholds, in percent
    pub percentiles: Vec<f64>,
    /// Sample sizes, in run order
    pub sample_sizes: Vec<usize>,
    /// Provenance label written into the site summary
    pub source_label: String,
}

/// Closed time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    /// First instant of the window
    pub start: NaiveDateTime,
    /// Last instant of the window
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// `[start date, start time, end date, end time]` as report fields
    pub fn fields(&self) -> [String; 4] {
        [
            self.start.date().to_string(),
            self.start.time().to_string(),
            self.end.date().to_string(),
            self.end.time().to_string(),
        ]
    }
}

/// Result of one parameter column
#[derive(Debug, Clone, Serialize)]
pub struct ParameterReport {
    /// Column index in the source table
    pub index: usize,
    /// Column header
    pub name: String,
    /// Engine output
    pub result: MaapResult,
}

/// A parameter whose run did not complete
#[derive(Debug, Clone, Serialize)]
pub struct FailureInfo {
    /// Column index in the source table
    pub index: usize,
    /// Column header
    pub name: String,
    /// Error message with sample size and iteration context
    pub message: String,
}

/// Mean and spread of one grand-mean series across sample sizes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrandSummary {
    /// Mean across sample sizes
    pub mean: f64,
    /// Population standard deviation across sample sizes
    pub std_dev: f64,
}

impl GrandSummary {
    fn of(values: &[f64]) -> Self {
        DescriptiveStats::compute(values, &[], StatFlags::MOMENTS)
            .map(|s| Self {
                mean: s.mean(),
                std_dev: s.std_dev(),
            })
            .unwrap_or(Self {
                mean: 0.0,
                std_dev: 0.0,
            })
    }
}

/// One model-summary row: a parameter at one sample size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRow {
    /// Column index
    pub parameter: usize,
    /// Column header
    pub name: String,
    /// Sample size of this row
    pub sample_size: usize,
    /// Rows removed by the sampling strategy
    pub num_culled: usize,
    /// Rows removed, in percent of all rows
    pub percent_culled: f64,
    /// Grand mean of subsample values across sample sizes
    pub value_grand: GrandSummary,
    /// Grand mean of absolute errors across sample sizes
    pub absolute_grand: GrandSummary,
    /// Grand mean of relative errors across sample sizes
    pub relative_grand: GrandSummary,
    /// Per-threshold tables at this sample size
    pub tables: SampleSizeRow,
}

/// One site-summary row: population statistics of a parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRow {
    /// Column index
    pub parameter: usize,
    /// Column header
    pub name: String,
    /// Rows considered
    pub potential_observations: usize,
    /// Rows with a usable value
    pub actual_observations: usize,
    /// Rows without a usable value
    pub missing_observations: usize,
    /// Population mean
    pub mean: f64,
    /// Population percentiles in threshold order
    pub percentiles: Vec<f64>,
    /// Population standard deviation
    pub std_dev: f64,
}

impl ParameterReport {
    /// One row per configured sample size, in run order
    pub fn model_rows(&self) -> Vec<ModelRow> {
        let grand = self.result.grand_means();
        let series = |pick: fn(&maap_core::GrandMeans) -> f64| -> GrandSummary {
            GrandSummary::of(&grand.iter().map(pick).collect::<Vec<_>>())
        };
        let value_grand = series(|g| g.value);
        let absolute_grand = series(|g| g.absolute_error);
        let relative_grand = series(|g| g.relative_error);

        self.result
            .config()
            .sample_sizes()
            .iter()
            .enumerate()
            .map(|(position, &sample_size)| ModelRow {
                parameter: self.index,
                name: self.name.clone(),
                sample_size,
                num_culled: self.result.num_culled(),
                percent_culled: self.result.percent_culled(),
                value_grand,
                absolute_grand,
                relative_grand,
                tables: self.result.tables().at_sample_size(position),
            })
            .collect()
    }

    /// Population summary row
    pub fn site_row(&self) -> SiteRow {
        let actual = self.result.actual();
        SiteRow {
            parameter: self.index,
            name: self.name.clone(),
            potential_observations: self.result.potential_observations(),
            actual_observations: self.result.actual_observations(),
            missing_observations: self.result.missing_observations(),
            mean: actual.mean(),
            percentiles: actual.percentiles().to_vec(),
            std_dev: actual.std_dev(),
        }
    }
}

impl Report {
    /// Whether any parameter failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

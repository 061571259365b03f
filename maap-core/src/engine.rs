//! Resampling Engine
//!
//! Estimates, for one parameter column, how far percentiles of a random
//! subsample of size `n` land from the percentiles of the full population.
//!
//! ## Pipeline
//!
//! ```text
//! raw rows
//!    │
//!    ├── clean ──────────────► population stats (baseline)
//!    │
//!    └── cull ─► clean ─► working space
//!                              │
//!                for n in sample sizes, `iterations` trials:
//!                              │  draw n with replacement
//!                              │  absolute / relative error per threshold
//!                              ▼
//!                   Vert (per-threshold mean + sd across trials)
//!                              │
//!                              ▼
//!                   MaapTables [threshold][sample size]
//! ```
//!
//! The two cleaning passes stay separate: the baseline describes every row,
//! the working space only what the sampling strategy leaves.

use crate::config::MaapConfig;
use crate::cull::{CullPolicy, KeepAll};
use crate::error::MaapError;
use crate::sample_space::{IndexSource, Row, SampleSpace};
use maap_stats::{DescriptiveStats, StatFlags, describe_columns, mean_of_means, round_to};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Where an engine is in its single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Holding raw rows
    Created,
    /// Population baseline computed
    Cleaned,
    /// Working space culled and cleaned
    Culled,
    /// Running trials at the given sample size
    Iterating(usize),
    /// Trials for the last sample size summarised
    Aggregated,
    /// Result tables built
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Created => write!(f, "created"),
            Stage::Cleaned => write!(f, "cleaned"),
            Stage::Culled => write!(f, "culled"),
            Stage::Iterating(n) => write!(f, "iterating(n={})", n),
            Stage::Aggregated => write!(f, "aggregated"),
            Stage::Done => write!(f, "done"),
        }
    }
}

/// Scalar means over a whole trial matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrandMeans {
    /// Mean of the subsample means
    pub value: f64,
    /// Mean absolute error across trials and thresholds
    pub absolute_error: f64,
    /// Mean relative error (signed percent) across trials and thresholds
    pub relative_error: f64,
}

/// Per-threshold behaviour at one sample size
///
/// Each vector has one entry per percentile threshold, holding the mean and
/// standard deviation of that threshold's statistic across all trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vert {
    /// Sample size the trials used
    pub sample_size: usize,
    /// Subsample percentile values
    pub vals: Vec<DescriptiveStats>,
    /// `population - subsample`
    pub absolute_err: Vec<DescriptiveStats>,
    /// `100 / population * (population - subsample)`
    pub relative_err: Vec<DescriptiveStats>,
    /// Grand means over the trial matrices
    pub grand: GrandMeans,
}

/// Result tables indexed `[threshold][sample size position]`, rounded
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaapTables {
    /// Mean subsample percentile value
    pub value: Vec<Vec<f64>>,
    /// Mean absolute error
    pub absolute_error: Vec<Vec<f64>>,
    /// Mean relative error, signed percent
    pub relative_error: Vec<Vec<f64>>,
    /// Standard deviation of the absolute error
    pub absolute_error_sd: Vec<Vec<f64>>,
    /// Standard deviation of the relative error
    pub relative_error_sd: Vec<Vec<f64>>,
}

impl MaapTables {
    fn from_verts(verts: &[Vert], width: usize, decimals: u32) -> Self {
        let column = |pick: &dyn Fn(&Vert) -> f64| -> Vec<f64> {
            verts.iter().map(|v| round_to(pick(v), decimals)).collect()
        };

        let mut tables = Self::default();
        for p in 0..width {
            tables.value.push(column(&|v| v.vals[p].mean()));
            tables.absolute_error.push(column(&|v| v.absolute_err[p].mean()));
            tables.relative_error.push(column(&|v| v.relative_err[p].mean()));
            tables.absolute_error_sd.push(column(&|v| v.absolute_err[p].std_dev()));
            tables.relative_error_sd.push(column(&|v| v.relative_err[p].std_dev()));
        }
        tables
    }

    /// Every table's entries for one sample-size position, in threshold order
    pub fn at_sample_size(&self, position: usize) -> SampleSizeRow {
        let pick = |table: &[Vec<f64>]| -> Vec<f64> { table.iter().map(|row| row[position]).collect() };
        SampleSizeRow {
            value: pick(&self.value),
            absolute_error: pick(&self.absolute_error),
            relative_error: pick(&self.relative_error),
            absolute_error_sd: pick(&self.absolute_error_sd),
            relative_error_sd: pick(&self.relative_error_sd),
        }
    }
}

/// One column of [`MaapTables`], flattened across thresholds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSizeRow {
    /// Mean subsample percentile value per threshold
    pub value: Vec<f64>,
    /// Mean absolute error per threshold
    pub absolute_error: Vec<f64>,
    /// Mean relative error per threshold
    pub relative_error: Vec<f64>,
    /// Absolute error standard deviation per threshold
    pub absolute_error_sd: Vec<f64>,
    /// Relative error standard deviation per threshold
    pub relative_error_sd: Vec<f64>,
}

/// Everything a finished run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaapResult {
    parameter: usize,
    strategy: String,
    config: MaapConfig,
    actual: DescriptiveStats,
    potential_observations: usize,
    actual_observations: usize,
    malformed_rows: usize,
    sampled_observations: usize,
    num_culled: usize,
    baseline_diverged: bool,
    verts: Vec<Vert>,
    tables: MaapTables,
}

impl MaapResult {
    /// Parameter column that was modelled
    pub fn parameter(&self) -> usize {
        self.parameter
    }

    /// Name of the sampling strategy that culled the working space
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Configuration the run used
    pub fn config(&self) -> &MaapConfig {
        &self.config
    }

    /// Full-population statistics: mean, standard deviation and percentiles
    pub fn actual(&self) -> &DescriptiveStats {
        &self.actual
    }

    /// Rows considered by the population pass
    pub fn potential_observations(&self) -> usize {
        self.potential_observations
    }

    /// Rows with a usable value in the population pass
    pub fn actual_observations(&self) -> usize {
        self.actual_observations
    }

    /// Rows without a usable value in the population pass
    pub fn missing_observations(&self) -> usize {
        self.potential_observations - self.actual_observations
    }

    /// Rows with a non-empty but unparseable field in the population pass
    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// Values left in the working space after culling and cleaning
    pub fn sampled_observations(&self) -> usize {
        self.sampled_observations
    }

    /// Rows removed by the sampling strategy
    pub fn num_culled(&self) -> usize {
        self.num_culled
    }

    /// Percentage of rows removed by the sampling strategy
    pub fn percent_culled(&self) -> f64 {
        if self.potential_observations == 0 {
            0.0
        } else {
            self.num_culled as f64 / self.potential_observations as f64 * 100.0
        }
    }

    /// Whether the working space's row accounting disagrees with the baseline
    pub fn baseline_diverged(&self) -> bool {
        self.baseline_diverged
    }

    /// One vert per sample size, in configured order
    pub fn verts(&self) -> &[Vert] {
        &self.verts
    }

    /// Grand means per sample size, in configured order
    pub fn grand_means(&self) -> Vec<GrandMeans> {
        self.verts.iter().map(|v| v.grand).collect()
    }

    /// Rounded result tables
    pub fn tables(&self) -> &MaapTables {
        &self.tables
    }

    /// Mean value table, `[threshold][sample size position]`
    pub fn value_means(&self) -> &[Vec<f64>] {
        &self.tables.value
    }

    /// Mean absolute error table
    pub fn absolute_error_means(&self) -> &[Vec<f64>] {
        &self.tables.absolute_error
    }

    /// Mean relative error table
    pub fn relative_error_means(&self) -> &[Vec<f64>] {
        &self.tables.relative_error
    }

    /// Absolute error standard deviation table
    pub fn absolute_error_sds(&self) -> &[Vec<f64>] {
        &self.tables.absolute_error_sd
    }

    /// Relative error standard deviation table
    pub fn relative_error_sds(&self) -> &[Vec<f64>] {
        &self.tables.relative_error_sd
    }
}

/// Runs the resampling procedure for one parameter column
///
/// An engine is consumed by [`ResamplingEngine::generate`]: a run either
/// completes for every sample size or fails as a whole.
pub struct ResamplingEngine {
    config: MaapConfig,
    rows: Vec<Row>,
    parameter: usize,
    policy: Box<dyn CullPolicy>,
    stage: Stage,
}

impl ResamplingEngine {
    /// Engine over data rows (header excluded) for column `parameter`, keeping every row
    pub fn new(config: MaapConfig, rows: Vec<Row>, parameter: usize) -> Self {
        Self {
            config,
            rows,
            parameter,
            policy: Box::new(KeepAll),
            stage: Stage::Created,
        }
    }

    /// Replace the sampling strategy
    pub fn with_policy(mut self, policy: Box<dyn CullPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run every sample size and build the result tables
    ///
    /// # Errors
    /// - [`MaapError::Population`] if the column has no usable values
    /// - [`MaapError::Sampling`] if the working space is empty after culling
    /// - [`MaapError::DivisionByZero`] if a population percentile is zero, since
    ///   the relative error against it is undefined
    /// - [`MaapError::NonFinite`] if an error overflows, e.g. against a
    ///   subnormal population percentile
    pub fn generate<S: IndexSource + ?Sized>(mut self, source: &mut S) -> Result<MaapResult, MaapError> {
        let parameter = self.parameter;
        let thresholds = self.config.percentiles().to_vec();

        // Baseline from every row
        let mut population = SampleSpace::new(self.rows.clone(), parameter);
        population.clean();
        let actual = DescriptiveStats::compute(population.values(), &thresholds, StatFlags::ALL)
            .map_err(|source| MaapError::Population { parameter, source })?;
        self.advance(Stage::Cleaned);

        // Working space: cull the raw rows, then clean again
        let mut working = SampleSpace::new(std::mem::take(&mut self.rows), parameter);
        let num_culled = working.cull(self.policy.as_ref());
        working.clean();
        let baseline_diverged =
            working.potential_observations() + num_culled != population.potential_observations();
        if baseline_diverged {
            warn!(
                parameter,
                population = population.potential_observations(),
                working = working.potential_observations(),
                num_culled,
                "working space row count does not match the population baseline"
            );
        }
        self.advance(Stage::Culled);

        let sample_sizes = self.config.sample_sizes().to_vec();
        let mut verts = Vec::with_capacity(sample_sizes.len());
        for &sample_size in &sample_sizes {
            self.advance(Stage::Iterating(sample_size));
            let vert = self.iterate(&working, &actual, sample_size, source)?;
            verts.push(vert);
            self.advance(Stage::Aggregated);
        }

        let tables = MaapTables::from_verts(&verts, thresholds.len(), self.config.decimals());
        self.advance(Stage::Done);

        Ok(MaapResult {
            parameter,
            strategy: self.policy.name(),
            config: self.config,
            actual,
            potential_observations: population.potential_observations(),
            actual_observations: population.actual_observations(),
            malformed_rows: population.malformed_rows(),
            sampled_observations: working.actual_observations(),
            num_culled,
            baseline_diverged,
            verts,
            tables,
        })
    }

    /// Run every trial at one sample size and summarise them
    fn iterate<S: IndexSource + ?Sized>(
        &self,
        working: &SampleSpace,
        actual: &DescriptiveStats,
        sample_size: usize,
        source: &mut S,
    ) -> Result<Vert, MaapError> {
        let parameter = self.parameter;
        let thresholds = self.config.percentiles();
        let iterations = self.config.iterations();

        let mut model_vals = Vec::with_capacity(iterations);
        let mut absolute_diffs = Vec::with_capacity(iterations);
        let mut relative_diffs = Vec::with_capacity(iterations);

        let stats_error = |iteration: usize, source| MaapError::Sampling {
            parameter,
            sample_size,
            iteration,
            source,
        };

        for iteration in 0..iterations {
            let sub = working
                .subset(
                    sample_size,
                    source,
                    thresholds,
                    Some(StatFlags::MEAN_AND_PERCENTILES),
                )
                .map_err(|e| stats_error(iteration, e))?;

            let mut absolute = Vec::with_capacity(thresholds.len());
            let mut relative = Vec::with_capacity(thresholds.len());
            for ((&a, &m), &threshold) in actual
                .percentiles()
                .iter()
                .zip(sub.percentiles())
                .zip(thresholds)
            {
                if a == 0.0 {
                    return Err(MaapError::DivisionByZero {
                        parameter,
                        sample_size,
                        iteration,
                        threshold,
                    });
                }
                let abs_err = a - m;
                let rel_err = 100.0 * abs_err / a;
                if !abs_err.is_finite() || !rel_err.is_finite() {
                    return Err(MaapError::NonFinite {
                        parameter,
                        sample_size,
                        iteration,
                        threshold,
                    });
                }
                absolute.push(abs_err);
                relative.push(rel_err);
            }

            absolute_diffs.push(
                DescriptiveStats::from_indexed(absolute).map_err(|e| stats_error(iteration, e.into()))?,
            );
            relative_diffs.push(
                DescriptiveStats::from_indexed(relative).map_err(|e| stats_error(iteration, e.into()))?,
            );
            model_vals.push(sub);
        }

        let last = iterations - 1;
        let aggregate_error = |e: maap_stats::StatsError| stats_error(last, e.into());
        let width = thresholds.len();

        let grand = GrandMeans {
            value: mean_of_means(&model_vals).map_err(aggregate_error)?,
            absolute_error: mean_of_means(&absolute_diffs).map_err(aggregate_error)?,
            relative_error: mean_of_means(&relative_diffs).map_err(aggregate_error)?,
        };

        Ok(Vert {
            sample_size,
            vals: describe_columns(&model_vals, width).map_err(aggregate_error)?,
            absolute_err: describe_columns(&absolute_diffs, width).map_err(aggregate_error)?,
            relative_err: describe_columns(&relative_diffs, width).map_err(aggregate_error)?,
            grand,
        })
    }

    fn advance(&mut self, next: Stage) {
        debug!(parameter = self.parameter, from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }
}

//! Descriptive Statistics
//!
//! A [`DescriptiveStats`] associates a collection of numbers with its mean,
//! population standard deviation, and percentile values. Each statistic is
//! optional so that hot resampling loops only pay for what they read.
//!
//! Statistics that were not requested are left at `0.0` (or an empty
//! percentile list). Check the [`StatFlags`] that built a value before
//! treating one of those zeros as a measurement.

use crate::percentiles::compute_percentiles;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while describing a collection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// A statistic was requested on an empty collection
    #[error("cannot compute {statistic} of an empty collection")]
    EmptyInput {
        /// First statistic that could not be computed
        statistic: &'static str,
    },
}

/// Which statistics to compute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatFlags {
    /// Arithmetic mean
    pub mean: bool,
    /// Population standard deviation
    pub std_dev: bool,
    /// Percentile values at the configured thresholds
    pub percentiles: bool,
}

impl StatFlags {
    /// Mean, standard deviation and percentiles
    pub const ALL: Self = Self {
        mean: true,
        std_dev: true,
        percentiles: true,
    };

    /// Mean and percentiles, no standard deviation
    pub const MEAN_AND_PERCENTILES: Self = Self {
        mean: true,
        std_dev: false,
        percentiles: true,
    };

    /// Percentiles only
    pub const PERCENTILES: Self = Self {
        mean: false,
        std_dev: false,
        percentiles: true,
    };

    /// Mean and standard deviation, percentiles suppressed
    pub const MOMENTS: Self = Self {
        mean: true,
        std_dev: true,
        percentiles: false,
    };

    fn any(self) -> bool {
        self.mean || self.std_dev || self.percentiles
    }
}

impl Default for StatFlags {
    fn default() -> Self {
        Self::MEAN_AND_PERCENTILES
    }
}

/// Mean, standard deviation and percentiles of one collection
///
/// Immutable once built; `percentiles[i]` always belongs to threshold `i` of
/// the list it was computed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    mean: f64,
    std_dev: f64,
    percentiles: Vec<f64>,
}

impl DescriptiveStats {
    /// Describe `values` at the given percentile `thresholds`
    ///
    /// # Errors
    /// [`StatsError::EmptyInput`] if `values` is empty and any statistic is requested.
    ///
    /// # Examples
    ///
    /// ```
    /// # use maap_stats::{DescriptiveStats, StatFlags};
    /// let stats = DescriptiveStats::compute(&[1.0, 2.0, 3.0, 4.0], &[50.0], StatFlags::ALL).unwrap();
    /// assert_eq!(stats.mean(), 2.5);
    /// assert_eq!(stats.percentiles(), &[2.5]);
    /// ```
    pub fn compute(values: &[f64], thresholds: &[f64], flags: StatFlags) -> Result<Self, StatsError> {
        if values.is_empty() && flags.any() {
            return Err(StatsError::EmptyInput {
                statistic: first_requested(flags),
            });
        }

        let mean = if flags.mean || flags.std_dev {
            mean(values)
        } else {
            0.0
        };

        let std_dev = if flags.std_dev {
            population_std_dev(values, mean)
        } else {
            0.0
        };

        let percentiles = if flags.percentiles {
            compute_percentiles(values, thresholds)
        } else {
            Vec::new()
        };

        Ok(Self {
            mean: if flags.mean { mean } else { 0.0 },
            std_dev,
            percentiles,
        })
    }

    /// Describe a threshold-indexed vector without re-estimating percentiles
    ///
    /// Used for per-trial error vectors: `indexed[i]` is the error at
    /// threshold `i`, and it is stored as-is so that index `i` keeps pointing
    /// at the same threshold. The mean is taken across all entries.
    ///
    /// # Errors
    /// [`StatsError::EmptyInput`] if `indexed` is empty.
    pub fn from_indexed(indexed: Vec<f64>) -> Result<Self, StatsError> {
        if indexed.is_empty() {
            return Err(StatsError::EmptyInput { statistic: "mean" });
        }
        Ok(Self {
            mean: mean(&indexed),
            std_dev: 0.0,
            percentiles: indexed,
        })
    }

    /// Arithmetic mean (0.0 when not requested)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Population standard deviation (0.0 when not requested)
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Percentile values in threshold order (empty when not requested)
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }
}

fn first_requested(flags: StatFlags) -> &'static str {
    if flags.mean {
        "mean"
    } else if flags.std_dev {
        "standard deviation"
    } else {
        "percentiles"
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Divides by `n`, not `n - 1`: the collections described here are complete
/// populations or complete sets of trials.
fn population_std_dev(values: &[f64], mean: f64) -> f64 {
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

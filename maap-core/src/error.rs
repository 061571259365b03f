//! Error types for the resampling engine

use maap_stats::StatsError;
use thiserror::Error;

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Empty threshold list
    #[error("at least one percentile threshold is required")]
    NoPercentiles,

    /// Threshold outside `[0, 100]` or not finite
    #[error("percentile threshold {0} is outside [0, 100]")]
    PercentileOutOfRange(f64),

    /// Empty sample-size list
    #[error("at least one sample size is required")]
    NoSampleSizes,

    /// A sample size of zero
    #[error("sample sizes must be at least 1")]
    ZeroSampleSize,

    /// Zero trials per sample size
    #[error("iterations must be at least 1")]
    ZeroIterations,

    /// More decimal places than an `f64` can round to
    #[error("decimals {0} is above the maximum of {max}", max = crate::config::MAX_DECIMALS)]
    DecimalsOutOfRange(u32),
}

/// Errors raised while drawing a subsample
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// Nothing to draw from
    #[error("cannot draw {requested} samples from an empty collection")]
    InsufficientData {
        /// Requested subsample size
        requested: usize,
    },

    /// Statistics over the drawn values failed
    #[error(transparent)]
    Stats(#[from] StatsError),
}

/// A failed `generate` call
///
/// Every variant names the parameter column; stage-level variants also name
/// the sample size and the zero-based trial index so the failure can be
/// reproduced with the same seed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaapError {
    /// The full population yielded no statistics
    #[error("parameter {parameter}: population statistics failed: {source}")]
    Population {
        /// Parameter column
        parameter: usize,
        /// Underlying failure
        #[source]
        source: StatsError,
    },

    /// A trial could not draw or describe its subsample
    #[error("parameter {parameter}, sample size {sample_size}, iteration {iteration}: {source}")]
    Sampling {
        /// Parameter column
        parameter: usize,
        /// Sample size being run
        sample_size: usize,
        /// Zero-based trial index
        iteration: usize,
        /// Underlying failure
        #[source]
        source: SampleError,
    },

    /// Relative error against a zero population percentile
    #[error(
        "parameter {parameter}, sample size {sample_size}, iteration {iteration}: \
         relative error undefined, population P{threshold} is zero"
    )]
    DivisionByZero {
        /// Parameter column
        parameter: usize,
        /// Sample size being run
        sample_size: usize,
        /// Zero-based trial index
        iteration: usize,
        /// Percentile threshold whose population value is zero
        threshold: f64,
    },

    /// An absolute or relative error overflowed to infinity or NaN
    #[error(
        "parameter {parameter}, sample size {sample_size}, iteration {iteration}: \
         error at P{threshold} is not finite"
    )]
    NonFinite {
        /// Parameter column
        parameter: usize,
        /// Sample size being run
        sample_size: usize,
        /// Zero-based trial index
        iteration: usize,
        /// Percentile threshold whose error overflowed
        threshold: f64,
    },
}

impl MaapError {
    /// Parameter column the failed run was modelling
    pub fn parameter(&self) -> usize {
        match self {
            MaapError::Population { parameter, .. }
            | MaapError::Sampling { parameter, .. }
            | MaapError::DivisionByZero { parameter, .. }
            | MaapError::NonFinite { parameter, .. } => *parameter,
        }
    }
}

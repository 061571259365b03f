//! Engine configuration
//!
//! A [`MaapConfig`] is validated once and then only read. Every engine gets
//! its own copy, so runs with different thresholds or sample sizes can
//! coexist in one process.

use crate::error::ConfigError;
use maap_stats::{DEFAULT_DECIMALS, DEFAULT_PERCENTILES};
use serde::Serialize;

/// Default sample sizes, in observations per simulated sampling effort
pub const DEFAULT_SAMPLE_SIZES: [usize; 5] = [5, 10, 20, 50, 100];

/// Default number of trials per sample size
pub const DEFAULT_ITERATIONS: usize = 1_000;

/// Most decimal places a table can be rounded to; `f64` carries about 15
/// significant digits
pub const MAX_DECIMALS: u32 = 15;

/// Immutable resampling configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaapConfig {
    percentiles: Vec<f64>,
    sample_sizes: Vec<usize>,
    iterations: usize,
    decimals: u32,
}

impl MaapConfig {
    /// Build and validate a configuration
    ///
    /// # Errors
    /// See [`ConfigError`] for the rejected combinations.
    pub fn new(
        percentiles: Vec<f64>,
        sample_sizes: Vec<usize>,
        iterations: usize,
        decimals: u32,
    ) -> Result<Self, ConfigError> {
        if percentiles.is_empty() {
            return Err(ConfigError::NoPercentiles);
        }
        if let Some(&bad) = percentiles
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 100.0)
        {
            return Err(ConfigError::PercentileOutOfRange(bad));
        }
        if sample_sizes.is_empty() {
            return Err(ConfigError::NoSampleSizes);
        }
        if sample_sizes.contains(&0) {
            return Err(ConfigError::ZeroSampleSize);
        }
        if iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if decimals > MAX_DECIMALS {
            return Err(ConfigError::DecimalsOutOfRange(decimals));
        }

        Ok(Self {
            percentiles,
            sample_sizes,
            iterations,
            decimals,
        })
    }

    /// Start from the defaults and override selected fields
    pub fn builder() -> MaapConfigBuilder {
        MaapConfigBuilder::default()
    }

    /// Percentile thresholds, in percent
    pub fn percentiles(&self) -> &[f64] {
        &self.percentiles
    }

    /// Sample sizes, in run order
    pub fn sample_sizes(&self) -> &[usize] {
        &self.sample_sizes
    }

    /// Trials per sample size
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Decimal places kept in result tables
    pub fn decimals(&self) -> u32 {
        self.decimals
    }
}

impl Default for MaapConfig {
    fn default() -> Self {
        Self {
            percentiles: DEFAULT_PERCENTILES.to_vec(),
            sample_sizes: DEFAULT_SAMPLE_SIZES.to_vec(),
            iterations: DEFAULT_ITERATIONS,
            decimals: DEFAULT_DECIMALS,
        }
    }
}

/// Builder for [`MaapConfig`]; validation happens in [`MaapConfigBuilder::build`]
#[derive(Debug, Clone)]
pub struct MaapConfigBuilder {
    percentiles: Vec<f64>,
    sample_sizes: Vec<usize>,
    iterations: usize,
    decimals: u32,
}

impl Default for MaapConfigBuilder {
    fn default() -> Self {
        let defaults = MaapConfig::default();
        Self {
            percentiles: defaults.percentiles,
            sample_sizes: defaults.sample_sizes,
            iterations: defaults.iterations,
            decimals: defaults.decimals,
        }
    }
}

impl MaapConfigBuilder {
    /// Percentile thresholds, in percent
    pub fn percentiles(mut self, percentiles: impl Into<Vec<f64>>) -> Self {
        self.percentiles = percentiles.into();
        self
    }

    /// Sample sizes, in run order
    pub fn sample_sizes(mut self, sample_sizes: impl Into<Vec<usize>>) -> Self {
        self.sample_sizes = sample_sizes.into();
        self
    }

    /// Trials per sample size
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Decimal places kept in result tables
    pub fn decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Validate and build
    pub fn build(self) -> Result<MaapConfig, ConfigError> {
        MaapConfig::new(
            self.percentiles,
            self.sample_sizes,
            self.iterations,
            self.decimals,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MaapConfig::default();
        assert_eq!(config.percentiles(), &DEFAULT_PERCENTILES);
        assert_eq!(config.sample_sizes(), &DEFAULT_SAMPLE_SIZES);
        assert_eq!(config.iterations(), DEFAULT_ITERATIONS);
        assert_eq!(config.decimals(), 4);
    }

    #[test]
    fn test_builder_overrides() {
        let config = MaapConfig::builder()
            .percentiles([50.0])
            .sample_sizes([3, 6])
            .iterations(7)
            .decimals(2)
            .build()
            .unwrap();
        assert_eq!(config.percentiles(), &[50.0]);
        assert_eq!(config.sample_sizes(), &[3, 6]);
        assert_eq!(config.iterations(), 7);
        assert_eq!(config.decimals(), 2);
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!(
            MaapConfig::new(vec![], vec![5], 1, 4),
            Err(ConfigError::NoPercentiles)
        );
        assert_eq!(
            MaapConfig::new(vec![50.0, 101.0], vec![5], 1, 4),
            Err(ConfigError::PercentileOutOfRange(101.0))
        );
        assert!(matches!(
            MaapConfig::new(vec![f64::NAN], vec![5], 1, 4),
            Err(ConfigError::PercentileOutOfRange(_))
        ));
        assert_eq!(
            MaapConfig::new(vec![50.0], vec![], 1, 4),
            Err(ConfigError::NoSampleSizes)
        );
        assert_eq!(
            MaapConfig::new(vec![50.0], vec![5, 0], 1, 4),
            Err(ConfigError::ZeroSampleSize)
        );
        assert_eq!(
            MaapConfig::new(vec![50.0], vec![5], 0, 4),
            Err(ConfigError::ZeroIterations)
        );
        assert_eq!(
            MaapConfig::new(vec![50.0], vec![5], 1, 400),
            Err(ConfigError::DecimalsOutOfRange(400))
        );
        assert_eq!(
            MaapConfig::builder().decimals(u32::MAX).build(),
            Err(ConfigError::DecimalsOutOfRange(u32::MAX))
        );
        assert!(MaapConfig::new(vec![50.0], vec![5], 1, MAX_DECIMALS).is_ok());
    }
}

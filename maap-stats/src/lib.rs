#![warn(missing_docs)]
//! MAAP Statistical Primitives
//!
//! Building blocks for the resampling engine:
//! - [`DescriptiveStats`]: mean, standard deviation and percentiles with per-statistic toggles
//! - Linear-interpolation percentile estimation over a fixed threshold list
//! - Columnar aggregation of per-trial statistics ("error of the error")

mod aggregate;
mod descriptive;
mod percentiles;

pub use aggregate::{describe_column, describe_columns, mean_of_means, round_to};
pub use descriptive::{DescriptiveStats, StatFlags, StatsError};
pub use percentiles::{compute_percentile, compute_percentiles};

/// Default percentile thresholds, in percent
pub const DEFAULT_PERCENTILES: [f64; 5] = [10.0, 25.0, 50.0, 75.0, 90.0];

/// Default number of decimal places kept in result tables
pub const DEFAULT_DECIMALS: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(DEFAULT_PERCENTILES.len(), 5);
        assert!(DEFAULT_PERCENTILES.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(DEFAULT_DECIMALS, 4);
    }
}

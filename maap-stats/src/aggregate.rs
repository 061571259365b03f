//! Error Aggregation
//!
//! Collapses a matrix of per-trial [`DescriptiveStats`] (rows = trials,
//! columns = percentile thresholds) into one summary per column, and into a
//! single grand mean across the whole matrix.

use crate::descriptive::{DescriptiveStats, StatFlags, StatsError};

/// Describe column `index` of a trial matrix
///
/// Collects `stats.percentiles()[index]` from every row and returns their
/// mean and standard deviation. Percentiles are suppressed: this is the
/// spread of an estimate across trials, not a further quantile.
///
/// # Errors
/// [`StatsError::EmptyInput`] if `matrix` is empty.
///
/// # Panics
/// If a row has fewer than `index + 1` percentile entries.
pub fn describe_column(matrix: &[DescriptiveStats], index: usize) -> Result<DescriptiveStats, StatsError> {
    let column: Vec<f64> = matrix.iter().map(|row| row.percentiles()[index]).collect();
    DescriptiveStats::compute(&column, &[], StatFlags::MOMENTS)
}

/// Describe every column of a trial matrix, in threshold order
///
/// `width` is the number of thresholds; the result always has that length.
pub fn describe_columns(matrix: &[DescriptiveStats], width: usize) -> Result<Vec<DescriptiveStats>, StatsError> {
    (0..width).map(|index| describe_column(matrix, index)).collect()
}

/// Mean of the `mean()` of every row
///
/// # Errors
/// [`StatsError::EmptyInput`] if `matrix` is empty.
pub fn mean_of_means(matrix: &[DescriptiveStats]) -> Result<f64, StatsError> {
    if matrix.is_empty() {
        return Err(StatsError::EmptyInput { statistic: "mean" });
    }
    Ok(matrix.iter().map(DescriptiveStats::mean).sum::<f64>() / matrix.len() as f64)
}

/// Round to a fixed number of decimal places
///
/// Values that cannot be scaled without overflowing are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(i32::MAX as u32) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: Vec<f64>) -> DescriptiveStats {
        DescriptiveStats::from_indexed(values).unwrap()
    }

    #[test]
    fn test_describe_column_transposes() {
        let matrix = vec![row(vec![1.0, 10.0]), row(vec![3.0, 30.0])];

        let first = describe_column(&matrix, 0).unwrap();
        assert!((first.mean() - 2.0).abs() < f64::EPSILON);
        assert!((first.std_dev() - 1.0).abs() < f64::EPSILON);
        assert!(first.percentiles().is_empty());

        let second = describe_column(&matrix, 1).unwrap();
        assert!((second.mean() - 20.0).abs() < f64::EPSILON);
        assert!((second.std_dev() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_describe_columns_width() {
        let matrix = vec![row(vec![1.0, 2.0, 3.0])];
        let columns = describe_columns(&matrix, 3).unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[2].mean(), 3.0);
        assert_eq!(columns[2].std_dev(), 0.0);
    }

    #[test]
    fn test_describe_is_repeatable() {
        let matrix = vec![row(vec![1.5, -2.0]), row(vec![0.5, 4.0]), row(vec![2.0, 1.0])];
        assert_eq!(
            describe_columns(&matrix, 2).unwrap(),
            describe_columns(&matrix, 2).unwrap()
        );
    }

    #[test]
    fn test_empty_matrix() {
        assert!(describe_column(&[], 0).is_err());
        assert!(mean_of_means(&[]).is_err());
    }

    #[test]
    fn test_mean_of_means() {
        let matrix = vec![row(vec![1.0, 3.0]), row(vec![5.0, 7.0])];
        // row means are 2.0 and 6.0
        assert!((mean_of_means(&matrix).unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.234_56, 4), 1.2346);
        assert_eq!(round_to(-5.000_04, 4), -5.0);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn test_round_to_never_produces_nan() {
        assert_eq!(round_to(1.5, 400), 1.5);
        assert_eq!(round_to(1.5, u32::MAX), 1.5);
        assert_eq!(round_to(1e300, 15), 1e300);
    }
}

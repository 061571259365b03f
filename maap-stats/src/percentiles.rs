//! Percentile Computation
//!
//! Linear-interpolation quantile estimation over a fixed list of thresholds.
//! Thresholds are expressed in percent (`50.0` is the median) and the output
//! always has one entry per threshold, in threshold order.

use std::cmp::Ordering;

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks, the same estimator as
/// the `linear` method of most numerical libraries.
///
/// # Examples
///
/// ```
/// # use maap_stats::compute_percentile;
/// let samples = vec![10.0, 20.0, 30.0, 40.0, 50.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 30.0);
/// assert_eq!(compute_percentile(&samples, 25.0), 20.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    let mut sorted = samples.to_vec();
    sort_samples(&mut sorted);
    percentile_of_sorted(&sorted, percentile)
}

/// Compute one percentile per threshold, sorting the samples only once
///
/// The returned vector has exactly `thresholds.len()` entries and entry `i`
/// belongs to `thresholds[i]`. Thresholds are not reordered.
pub fn compute_percentiles(samples: &[f64], thresholds: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sort_samples(&mut sorted);
    thresholds
        .iter()
        .map(|&t| percentile_of_sorted(&sorted, t))
        .collect()
}

fn sort_samples(samples: &mut [f64]) {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}

fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let p = (percentile / 100.0).clamp(0.0, 1.0);

            // Linear interpolation between nearest ranks
            let rank = p * (n - 1) as f64;
            let lower_idx = rank.floor() as usize;
            let upper_idx = (lower_idx + 1).min(n - 1);
            let fraction = rank - lower_idx as f64;

            sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_median() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let p50 = compute_percentile(&samples, 50.0);
        assert!((p50 - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_median_interpolates_between_ranks() {
        let samples = vec![0.0, 10.0];
        assert!((compute_percentile(&samples, 50.0) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quartiles() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let p25 = compute_percentile(&samples, 25.0);
        let p75 = compute_percentile(&samples, 75.0);

        assert!((p25 - 25.75).abs() < 1e-9);
        assert!((p75 - 75.25).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_input() {
        let samples = vec![50.0, 10.0, 40.0, 20.0, 30.0];
        assert_eq!(compute_percentiles(&samples, &[0.0, 50.0, 100.0]), vec![10.0, 30.0, 50.0]);
    }

    #[test]
    fn test_threshold_order_is_preserved() {
        let samples: Vec<f64> = (0..=10).map(|x| x as f64).collect();
        let out = compute_percentiles(&samples, &[90.0, 10.0, 50.0]);
        assert_eq!(out, vec![9.0, 1.0, 5.0]);
    }

    #[test]
    fn test_single_sample() {
        let samples = vec![42.0];
        assert_eq!(compute_percentiles(&samples, &[10.0, 90.0]), vec![42.0, 42.0]);
    }

    #[test]
    fn test_empty_samples() {
        let samples: Vec<f64> = Vec::new();
        assert_eq!(compute_percentile(&samples, 50.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_length_matches_thresholds(
            samples in prop::collection::vec(-1e6f64..1e6, 1..50),
            thresholds in prop::collection::vec(0f64..=100.0, 0..12),
        ) {
            let out = compute_percentiles(&samples, &thresholds);
            prop_assert_eq!(out.len(), thresholds.len());
        }

        #[test]
        fn prop_monotone_for_increasing_thresholds(
            samples in prop::collection::vec(-1e6f64..1e6, 1..50),
            mut thresholds in prop::collection::vec(0f64..=100.0, 1..12),
        ) {
            thresholds.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let out = compute_percentiles(&samples, &thresholds);
            for pair in out.windows(2) {
                prop_assert!(pair[0] <= pair[1] + 1e-9);
            }
        }
    }
}

//! Sample Space
//!
//! Holds the observations of one parameter column. Raw rows go in, `clean`
//! turns the usable ones into numbers, `cull` applies a sampling strategy,
//! and `subset` draws with replacement for each simulated sampling effort.

use crate::cull::CullPolicy;
use crate::error::SampleError;
use maap_stats::{DescriptiveStats, StatFlags};
use rand::Rng;
use tracing::{trace, warn};

/// One row of the source table, one string per column
pub type Row = Vec<String>;

/// Source of uniformly distributed indices
///
/// Implemented for every [`rand::Rng`]; a seeded generator gives
/// reproducible runs.
pub trait IndexSource {
    /// Index in `0..len`; `len` is never zero
    fn next_index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> IndexSource for R {
    fn next_index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Observations of one parameter column
#[derive(Debug, Clone)]
pub struct SampleSpace {
    rows: Vec<Row>,
    parameter: usize,
    values: Vec<f64>,
    potential_observations: usize,
    actual_observations: usize,
    malformed_rows: usize,
    running_sum: f64,
}

impl SampleSpace {
    /// Wrap raw data rows (header excluded) for column `parameter`
    pub fn new(rows: Vec<Row>, parameter: usize) -> Self {
        Self {
            rows,
            parameter,
            values: Vec::new(),
            potential_observations: 0,
            actual_observations: 0,
            malformed_rows: 0,
            running_sum: 0.0,
        }
    }

    /// Convert usable rows into values
    ///
    /// Every row counts as a potential observation. Rows whose field is
    /// missing, blank, or not a finite number are dropped without error; they
    /// only show up as the gap between potential and actual observations.
    /// Cleaning again starts from the current rows and resets the counters.
    pub fn clean(&mut self) {
        self.values.clear();
        self.potential_observations = 0;
        self.actual_observations = 0;
        self.malformed_rows = 0;
        self.running_sum = 0.0;

        for (line, row) in self.rows.iter().enumerate() {
            self.potential_observations += 1;

            let field = match row.get(self.parameter).map(|f| f.trim()) {
                Some(field) if !field.is_empty() => field,
                _ => continue,
            };

            match field.parse::<f64>() {
                Ok(value) if value.is_finite() => {
                    self.values.push(value);
                    self.actual_observations += 1;
                    self.running_sum += value;
                }
                _ => {
                    self.malformed_rows += 1;
                    trace!(
                        parameter = self.parameter,
                        row = line,
                        field,
                        "dropping unparseable observation"
                    );
                }
            }
        }
    }

    /// Apply a sampling strategy to the raw rows
    ///
    /// Returns the number of rows removed. A policy that adds rows removes
    /// none, so growth counts as zero; it is logged and shows up as a
    /// baseline divergence in the engine. Call [`SampleSpace::clean`]
    /// afterwards to refresh the values.
    pub fn cull(&mut self, policy: &dyn CullPolicy) -> usize {
        let before = self.rows.len();
        let rows = std::mem::take(&mut self.rows);
        self.rows = policy.cull(rows);
        let after = self.rows.len();
        if after > before {
            warn!(
                parameter = self.parameter,
                policy = %policy.name(),
                before,
                after,
                "sampling strategy added rows"
            );
        }
        before.saturating_sub(after)
    }

    /// Draw `size` values uniformly with replacement
    ///
    /// # Errors
    /// [`SampleError::InsufficientData`] if there are no values to draw from.
    pub fn draw<S: IndexSource + ?Sized>(&self, size: usize, source: &mut S) -> Result<Vec<f64>, SampleError> {
        if self.values.is_empty() {
            return Err(SampleError::InsufficientData { requested: size });
        }
        let len = self.values.len();
        Ok((0..size).map(|_| self.values[source.next_index(len)]).collect())
    }

    /// Draw `size` values with replacement and describe them
    ///
    /// Only percentiles are computed unless `flags` asks for more.
    pub fn subset<S: IndexSource + ?Sized>(
        &self,
        size: usize,
        source: &mut S,
        thresholds: &[f64],
        flags: Option<StatFlags>,
    ) -> Result<DescriptiveStats, SampleError> {
        let drawn = self.draw(size, source)?;
        let stats = DescriptiveStats::compute(&drawn, thresholds, flags.unwrap_or(StatFlags::PERCENTILES))?;
        Ok(stats)
    }

    /// Cleaned values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Raw rows currently held
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Column being modelled
    pub fn parameter(&self) -> usize {
        self.parameter
    }

    /// Rows considered by the last `clean`
    pub fn potential_observations(&self) -> usize {
        self.potential_observations
    }

    /// Rows that yielded a value in the last `clean`
    pub fn actual_observations(&self) -> usize {
        self.actual_observations
    }

    /// Rows without a usable value
    pub fn missing_observations(&self) -> usize {
        self.potential_observations - self.actual_observations
    }

    /// Rows that had a non-empty but unparseable field
    pub fn malformed_rows(&self) -> usize {
        self.malformed_rows
    }

    /// Mean from the running sum kept while cleaning, `None` before any value
    pub fn simple_mean(&self) -> Option<f64> {
        (self.actual_observations > 0).then(|| self.running_sum / self.actual_observations as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cull::{EveryNth, KeepAll};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rows(fields: &[&str]) -> Vec<Row> {
        fields
            .iter()
            .enumerate()
            .map(|(i, f)| vec![format!("2024-01-01T00:{:02}", i), f.to_string()])
            .collect()
    }

    #[test]
    fn test_clean_drops_unusable_rows() {
        let mut space = SampleSpace::new(rows(&["1.5", "", "abc", " 2.5 ", "NaN"]), 1);
        space.clean();

        assert_eq!(space.values(), &[1.5, 2.5]);
        assert_eq!(space.potential_observations(), 5);
        assert_eq!(space.actual_observations(), 2);
        assert_eq!(space.missing_observations(), 3);
        assert_eq!(space.malformed_rows(), 2);
        assert_eq!(space.simple_mean(), Some(2.0));
    }

    #[test]
    fn test_clean_short_rows() {
        let mut space = SampleSpace::new(vec![vec!["t".to_string()], vec!["t".into(), "4".into()]], 1);
        space.clean();
        assert_eq!(space.values(), &[4.0]);
        assert_eq!(space.potential_observations(), 2);
    }

    #[test]
    fn test_clean_twice_is_stable() {
        let mut space = SampleSpace::new(rows(&["1", "2", ""]), 1);
        space.clean();
        space.clean();
        assert_eq!(space.potential_observations(), 3);
        assert_eq!(space.actual_observations(), 2);
    }

    #[test]
    fn test_cull_counts_removed_rows() {
        let mut space = SampleSpace::new(rows(&["1", "2", "3", "4", "5"]), 1);
        assert_eq!(space.cull(&KeepAll), 0);
        assert_eq!(space.cull(&EveryNth::new(2)), 2);
        space.clean();
        assert_eq!(space.values(), &[1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_cull_growth_counts_as_zero() {
        let mut space = SampleSpace::new(rows(&["1", "2"]), 1);
        let duplicate = |rows: Vec<Row>| -> Vec<Row> { rows.iter().chain(&rows).cloned().collect() };
        assert_eq!(space.cull(&duplicate), 0);
        assert_eq!(space.rows().len(), 4);
    }

    #[test]
    fn test_draw_from_empty() {
        let space = SampleSpace::new(Vec::new(), 1);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            space.draw(3, &mut rng),
            Err(SampleError::InsufficientData { requested: 3 })
        );
    }

    #[test]
    fn test_draw_from_single_value() {
        let mut space = SampleSpace::new(rows(&["7"]), 1);
        space.clean();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(space.draw(4, &mut rng).unwrap(), vec![7.0; 4]);
    }

    #[test]
    fn test_subset_defaults_to_percentiles_only() {
        let mut space = SampleSpace::new(rows(&["1", "2", "3"]), 1);
        space.clean();
        let mut rng = StdRng::seed_from_u64(3);
        let stats = space.subset(10, &mut rng, &[50.0], None).unwrap();
        assert_eq!(stats.percentiles().len(), 1);
        assert_eq!(stats.mean(), 0.0);
    }

    proptest! {
        #[test]
        fn prop_draw_size_and_membership(
            values in prop::collection::vec(-1e3f64..1e3, 1..20),
            size in 0usize..64,
            seed in any::<u64>(),
        ) {
            let fields: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let raw: Vec<Row> = fields.iter().map(|f| vec!["t".to_string(), f.clone()]).collect();
            let mut space = SampleSpace::new(raw, 1);
            space.clean();

            let mut rng = StdRng::seed_from_u64(seed);
            let drawn = space.draw(size, &mut rng).unwrap();
            prop_assert_eq!(drawn.len(), size);
            for v in drawn {
                prop_assert!(space.values().contains(&v));
            }
        }

        #[test]
        fn prop_observation_counts_balance(fields in prop::collection::vec("[0-9]{0,3}|x", 0..40)) {
            let raw: Vec<Row> = fields.into_iter().map(|f| vec!["t".to_string(), f]).collect();
            let mut space = SampleSpace::new(raw, 1);
            space.clean();
            prop_assert_eq!(
                space.actual_observations() + space.missing_observations(),
                space.potential_observations()
            );
            prop_assert_eq!(space.values().len(), space.actual_observations());
        }
    }
}

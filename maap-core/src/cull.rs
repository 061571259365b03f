//! Sampling strategies
//!
//! A [`CullPolicy`] removes rows from the population before resampling to
//! model a real-world sampling constraint. Policies see raw rows, so they can
//! select on any column (the timestamp, a flag column) and not only on the
//! parameter being modelled.

use crate::sample_space::Row;
use std::fmt;
use std::str::FromStr;

/// Removes rows from a population before resampling
pub trait CullPolicy: Send + Sync {
    /// Short name written into reports
    fn name(&self) -> String;

    /// Return the rows that survive the policy, in their original order
    fn cull(&self, rows: Vec<Row>) -> Vec<Row>;
}

/// Identity policy: every row is kept
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepAll;

impl CullPolicy for KeepAll {
    fn name(&self) -> String {
        "all".to_string()
    }

    fn cull(&self, rows: Vec<Row>) -> Vec<Row> {
        rows
    }
}

/// Keep every `step`-th row, starting with the first
///
/// Models a sampler that visits at a fraction of the logging frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EveryNth {
    step: usize,
}

impl EveryNth {
    /// A step of 0 is treated as 1.
    pub fn new(step: usize) -> Self {
        Self { step: step.max(1) }
    }

    /// Distance between kept rows
    pub fn step(&self) -> usize {
        self.step
    }
}

impl CullPolicy for EveryNth {
    fn name(&self) -> String {
        format!("every-{}", self.step)
    }

    fn cull(&self, rows: Vec<Row>) -> Vec<Row> {
        rows.into_iter().step_by(self.step).collect()
    }
}

impl<F> CullPolicy for F
where
    F: Fn(Vec<Row>) -> Vec<Row> + Send + Sync,
{
    fn name(&self) -> String {
        "custom".to_string()
    }

    fn cull(&self, rows: Vec<Row>) -> Vec<Row> {
        self(rows)
    }
}

/// Built-in strategies selectable by name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// [`KeepAll`]
    #[default]
    All,
    /// [`EveryNth`]
    EveryNth(usize),
}

impl Strategy {
    /// Instantiate the policy
    pub fn policy(self) -> Box<dyn CullPolicy> {
        match self {
            Strategy::All => Box::new(KeepAll),
            Strategy::EveryNth(step) => Box::new(EveryNth::new(step)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::All => write!(f, "all"),
            Strategy::EveryNth(step) => write!(f, "every-{}", step),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" || s == "none" {
            return Ok(Strategy::All);
        }
        match s.strip_prefix("every-") {
            Some(step) => match step.parse::<usize>() {
                Ok(step) if step > 0 => Ok(Strategy::EveryNth(step)),
                _ => Err(format!("Invalid step in strategy: {}", s)),
            },
            None => Err(format!("Unknown sampling strategy: {}", s)),
        }
    }
}

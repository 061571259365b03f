#![warn(missing_docs)]
//! MAAP Resampling Engine
//!
//! Monte Carlo estimate of how accurately a percentile computed from a random
//! subsample of size `n` approximates the same percentile of the full
//! population, as a function of `n`.
//!
//! - [`MaapConfig`]: immutable thresholds, sample sizes and iteration count
//! - [`SampleSpace`]: cleaning, culling and drawing with replacement
//! - [`CullPolicy`]: pluggable sampling strategies
//! - [`ResamplingEngine`]: the run itself, producing a [`MaapResult`]
//!
//! # Example
//!
//! ```
//! use maap_core::{MaapConfig, ResamplingEngine};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let rows: Vec<Vec<String>> = (1..=50)
//!     .map(|v| vec![format!("2024-01-01T{:02}:00:00", v % 24), v.to_string()])
//!     .collect();
//! let config = MaapConfig::builder()
//!     .percentiles([10.0, 50.0, 90.0])
//!     .sample_sizes([5, 20])
//!     .iterations(100)
//!     .build()
//!     .unwrap();
//!
//! let result = ResamplingEngine::new(config, rows, 1)
//!     .generate(&mut StdRng::seed_from_u64(42))
//!     .unwrap();
//! assert_eq!(result.absolute_error_means().len(), 3);
//! assert_eq!(result.absolute_error_means()[0].len(), 2);
//! ```

mod config;
mod cull;
mod engine;
mod error;
mod sample_space;

pub use config::{
    DEFAULT_ITERATIONS, DEFAULT_SAMPLE_SIZES, MAX_DECIMALS, MaapConfig, MaapConfigBuilder,
};
pub use cull::{CullPolicy, EveryNth, KeepAll, Strategy};
pub use engine::{
    GrandMeans, MaapResult, MaapTables, ResamplingEngine, SampleSizeRow, Stage, Vert,
};
pub use error::{ConfigError, MaapError, SampleError};
pub use sample_space::{IndexSource, Row, SampleSpace};

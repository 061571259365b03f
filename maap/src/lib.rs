#![warn(missing_docs)]
//! # MAAP
//!
//! Monte Carlo estimate of how well a percentile computed from a random
//! subsample of size `n` approximates the same percentile of the full
//! population, as a function of `n`.
//!
//! - **Statistics**: mean, population standard deviation and interpolated percentiles
//! - **Resampling**: repeated draws with replacement at every configured sample size
//! - **Error of the error**: mean and spread of absolute and relative errors per threshold
//! - **Sampling strategies**: keep every row, every N-th row, or any closure
//! - **Reports**: append-friendly model and site summary CSV files, JSON, terminal tables
//!
//! ## Quick Start
//!
//! ```
//! use maap::prelude::*;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let rows: Vec<Row> = [10, 20, 30, 40, 50]
//!     .iter()
//!     .map(|v| vec!["2024-01-01T00:00:00".to_string(), v.to_string()])
//!     .collect();
//! let config = MaapConfig::builder()
//!     .percentiles([50.0])
//!     .sample_sizes([3])
//!     .iterations(200)
//!     .build()
//!     .unwrap();
//!
//! let result = ResamplingEngine::new(config, rows, 1)
//!     .generate(&mut StdRng::seed_from_u64(7))
//!     .unwrap();
//! assert_eq!(result.actual().percentiles(), &[30.0]);
//! ```

// Re-export statistics
pub use maap_stats::{
    DEFAULT_DECIMALS, DEFAULT_PERCENTILES, DescriptiveStats, StatFlags, StatsError,
    compute_percentile, compute_percentiles, describe_column, describe_columns, mean_of_means,
    round_to,
};

// Re-export engine types
pub use maap_core::{
    ConfigError, CullPolicy, DEFAULT_ITERATIONS, DEFAULT_SAMPLE_SIZES, EveryNth, GrandMeans,
    IndexSource, KeepAll, MAX_DECIMALS, MaapConfig, MaapConfigBuilder, MaapError, MaapResult,
    MaapTables, ResamplingEngine, Row, SampleError, SampleSizeRow, SampleSpace, Stage, Strategy,
    Vert,
};

// Re-export reporting
pub use maap_report::{
    FailureInfo, OutputFormat, ParameterReport, Report, ReportMeta, TimeWindow,
    generate_json_report, generate_model_summary_csv, generate_site_summary_csv,
};

// Re-export the driver
pub use maap_cli::{
    Cli, Dataset, MaapToml, RunSettings, SourceError, analyze_parameters, format_human_output,
    list_sites, parse_timestamp, read_rows_until, run, run_site, write_outputs,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CullPolicy, DescriptiveStats, EveryNth, IndexSource, KeepAll, MaapConfig, MaapError,
        MaapResult, ResamplingEngine, Row, SampleSpace, StatFlags, Strategy,
    };
}

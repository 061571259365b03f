#![warn(missing_docs)]
//! MAAP CLI Library
//!
//! Drives the resampling engine over the parameter columns of one site file
//! and writes the model and site summaries. `maap_cli::run()` is the whole
//! binary.

mod config;
mod formatting;
mod source;

pub use config::*;
pub use formatting::format_human_output;
pub use source::{Dataset, SourceError, list_sites, parse_timestamp, read_rows_until, site_name};

use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use maap_core::{MaapConfig, ResamplingEngine, Strategy};
use maap_report::{
    FailureInfo, OutputFormat, ParameterReport, Report, ReportMeta, TimeWindow,
    generate_json_report, generate_model_summary_csv, generate_site_summary_csv,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// MAAP CLI arguments
#[derive(Parser, Debug)]
#[command(name = "maap")]
#[command(author, version, about = "MAAP - sample-size error analysis for monitoring data")]
pub struct Cli {
    /// Optional subcommand (List, Run, Config); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Site file name in the data directory (extension optional)
    #[arg(long)]
    pub site: Option<String>,

    /// Data directory (defaults to maap.toml, then "site_data")
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Start of the analysed window, recorded in the report
    /// Defaults to the first row of the site file
    #[arg(long)]
    pub start: Option<String>,

    /// End of the analysed window; rows after it are not read
    #[arg(long)]
    pub end: Option<String>,

    /// Trials per sample size
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sampling strategy: all, every-N
    #[arg(long)]
    pub strategy: Option<String>,

    /// Output format: csv, json, human
    #[arg(long)]
    pub format: Option<String>,

    /// Directory for report files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of threads for parallel parameter runs
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0")]
    pub threads: usize,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the site files in the data directory
    List,
    /// Run the analysis for one site (default)
    Run,
    /// Print a commented default maap.toml
    Config,
}

/// Everything a run needs, after merging maap.toml and CLI flags
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Site file path
    pub path: PathBuf,
    /// Site name written into the reports
    pub site: String,
    /// Explicit window start, if given
    pub start: Option<NaiveDateTime>,
    /// Window end
    pub end: NaiveDateTime,
    /// Engine configuration
    pub config: MaapConfig,
    /// Sampling strategy
    pub strategy: Strategy,
    /// Base seed; entropy when absent
    pub seed: Option<u64>,
    /// Output format
    pub format: OutputFormat,
    /// Directory for report files
    pub output_dir: PathBuf,
    /// Model summary file name
    pub model_summary: String,
    /// Site summary file name
    pub site_summary: String,
    /// Provenance label for the site summary
    pub source_label: String,
}

impl RunSettings {
    /// Layer CLI flags over maap.toml values
    pub fn resolve(cli: &Cli, config: &MaapToml) -> anyhow::Result<Self> {
        let site = cli
            .site
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--site is required for a run"))?;
        let end = cli
            .end
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--end is required for a run"))?;
        let end = parse_timestamp(end).ok_or_else(|| anyhow::anyhow!("Invalid --end: {}", end))?;
        let start = match cli.start.as_deref() {
            Some(text) => Some(
                parse_timestamp(text).ok_or_else(|| anyhow::anyhow!("Invalid --start: {}", text))?,
            ),
            None => None,
        };
        if start.is_some_and(|start| start > end) {
            anyhow::bail!("--start is after --end");
        }

        let data_dir = cli
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.data.directory));
        let file_name = if Path::new(site).extension().is_some() {
            site.to_string()
        } else {
            format!("{}.csv", site)
        };

        let strategy = match cli.strategy.as_deref() {
            Some(text) => text.parse().map_err(|e| anyhow::anyhow!("{}", e))?,
            None => config.strategy()?,
        };
        let format: OutputFormat = cli
            .format
            .as_deref()
            .unwrap_or(config.output.format.as_str())
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(Self {
            path: data_dir.join(&file_name),
            site: site_name(&file_name).to_string(),
            start,
            end,
            config: config.engine_config(cli.iterations)?,
            strategy,
            seed: cli.seed.or(config.analysis.seed),
            format,
            output_dir: cli
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.output.directory)),
            model_summary: config.output.model_summary.clone(),
            site_summary: config.output.site_summary.clone(),
            source_label: config.data.source_label.clone(),
        })
    }
}

/// Run the MAAP CLI with the process arguments.
/// This is the main entry point of the `maap` binary.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the MAAP CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    // Discover maap.toml configuration (CLI flags override)
    let config = MaapToml::discover().unwrap_or_default();

    match cli.command {
        Some(Commands::List) => list_site_files(&cli, &config),
        Some(Commands::Config) => {
            print!("{}", MaapToml::default_toml());
            Ok(())
        }
        Some(Commands::Run) | None => {
            let settings = RunSettings::resolve(&cli, &config)?;

            // Configure Rayon thread pool for the parameter runs
            if cli.threads > 0 {
                ThreadPoolBuilder::new()
                    .num_threads(cli.threads)
                    .build_global()
                    .ok();
            }

            let report = run_site(&settings)?;
            write_outputs(&report, &settings)?;

            if report.has_failures() {
                for failure in &report.failures {
                    eprintln!("✗ [{}] {}: {}", failure.index, failure.name, failure.message);
                }
                anyhow::bail!("{} parameter(s) failed", report.failures.len());
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "maap=debug" } else { "maap=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second initialisation (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn list_site_files(cli: &Cli, config: &MaapToml) -> anyhow::Result<()> {
    let dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.data.directory));
    let sites =
        list_sites(&dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    println!("MAAP sites in {}:", dir.display());
    for site in &sites {
        println!("├── {}", site_name(site));
    }
    println!("{} sites found.", sites.len());
    Ok(())
}

/// Read the site file and run every parameter column
pub fn run_site(settings: &RunSettings) -> anyhow::Result<Report> {
    let dataset = read_rows_until(&settings.path, settings.end)
        .with_context(|| format!("Failed to read {}", settings.path.display()))?;

    let start = settings
        .start
        .or_else(|| {
            dataset
                .rows
                .first()
                .and_then(|row| row.first())
                .and_then(|stamp| parse_timestamp(stamp))
        })
        .unwrap_or(settings.end);

    tracing::info!(
        "{}: {} rows, {} parameters, window {} to {}",
        settings.site,
        dataset.rows.len(),
        dataset.parameter_indices().len(),
        start,
        settings.end
    );

    let started = Instant::now();
    let (parameters, failures) =
        analyze_parameters(&dataset, &settings.config, settings.strategy, settings.seed);
    tracing::info!(
        "{}: {} parameters done, {} failed in {:.2}s",
        settings.site,
        parameters.len(),
        failures.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(Report {
        meta: ReportMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            site: settings.site.clone(),
            time_range: TimeWindow {
                start,
                end: settings.end,
            },
            iterations: settings.config.iterations(),
            strategy: settings.strategy.to_string(),
            seed: settings.seed,
            percentiles: settings.config.percentiles().to_vec(),
            sample_sizes: settings.config.sample_sizes().to_vec(),
            source_label: settings.source_label.clone(),
        },
        parameters,
        failures,
    })
}

/// Run one engine per parameter column, in parallel
///
/// Column `i` draws from `StdRng::seed_from_u64(seed + i)` when a seed is
/// given, from entropy otherwise. Both lists come back in column order.
pub fn analyze_parameters(
    dataset: &Dataset,
    config: &MaapConfig,
    strategy: Strategy,
    seed: Option<u64>,
) -> (Vec<ParameterReport>, Vec<FailureInfo>) {
    let indices = dataset.parameter_indices();
    let pb = ProgressBar::new(indices.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let outcomes: Vec<Result<ParameterReport, FailureInfo>> = indices
        .into_par_iter()
        .map(|index| {
            let name = dataset.column_name(index).to_string();
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => StdRng::from_entropy(),
            };

            let outcome = ResamplingEngine::new(config.clone(), dataset.rows.clone(), index)
                .with_policy(strategy.policy())
                .generate(&mut rng);

            pb.set_message(name.clone());
            pb.inc(1);

            match outcome {
                Ok(result) => Ok(ParameterReport {
                    index,
                    name,
                    result,
                }),
                Err(e) => {
                    tracing::error!("parameter {} ({}): {}", index, name, e);
                    Err(FailureInfo {
                        index,
                        name,
                        message: e.to_string(),
                    })
                }
            }
        })
        .collect();

    pb.finish_with_message("Complete");

    let mut parameters = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(parameter) => parameters.push(parameter),
            Err(failure) => failures.push(failure),
        }
    }
    (parameters, failures)
}

/// Write the report in the configured format
///
/// Returns the files written; human output goes to stdout and writes none.
pub fn write_outputs(report: &Report, settings: &RunSettings) -> anyhow::Result<Vec<PathBuf>> {
    match settings.format {
        OutputFormat::Human => {
            print!("{}", format_human_output(report));
            Ok(Vec::new())
        }
        OutputFormat::Json => {
            std::fs::create_dir_all(&settings.output_dir).with_context(|| {
                format!("Failed to create {}", settings.output_dir.display())
            })?;
            let path = settings.output_dir.join("report.json");
            let json = generate_json_report(report)?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Report written to: {}", path.display());
            Ok(vec![path])
        }
        OutputFormat::Csv => {
            std::fs::create_dir_all(&settings.output_dir).with_context(|| {
                format!("Failed to create {}", settings.output_dir.display())
            })?;
            let model = settings.output_dir.join(&settings.model_summary);
            let site = settings.output_dir.join(&settings.site_summary);
            append_csv(&model, |header| generate_model_summary_csv(report, header))?;
            append_csv(&site, |header| generate_site_summary_csv(report, header))?;
            println!(
                "Summaries appended to: {}, {}",
                model.display(),
                site.display()
            );
            Ok(vec![model, site])
        }
    }
}

/// Append rows to a CSV file, with a header only when the file is new or empty
fn append_csv(path: &Path, render: impl Fn(bool) -> String) -> anyhow::Result<()> {
    let include_header = std::fs::metadata(path)
        .map(|meta| meta.len() == 0)
        .unwrap_or(true);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(render(include_header).as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

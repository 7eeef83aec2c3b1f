//! CLI definition and dispatch.

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::{CsvLedgerWriter, CsvSeriesAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::html_report_adapter::HtmlReportAdapter;
use crate::adapters::json_snapshot_adapter::JsonSnapshotAdapter;
use crate::domain::cadence::Cadence;
use crate::domain::config_validation::{read_date, read_number, validate_config, DATA, REPORT, SIMULATION};
use crate::domain::cost_model::CostModel;
use crate::domain::error::FxdcaError;
use crate::domain::series::TimeSeries;
use crate::domain::simulator::{
    simulate, SimulationOutcome, SimulationParams, SimulationWarning, DEFAULT_MIN_PLAUSIBLE_RATE,
};
use crate::domain::snapshot::{resolve_fallback_rate, HoldingsSnapshot};
use crate::domain::summary::Summary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::report_port::{ReportData, ReportPort, ReportSettings};
use crate::ports::snapshot_port::SnapshotPort;

pub const DEFAULT_MONTHLY_CONTRIBUTION: f64 = 10_000.0;
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "docs";
pub const DEFAULT_SNAPSHOT_PATH: &str = "actual_snapshot.json";

#[derive(Parser, Debug)]
#[command(
    name = "fxdca",
    about = "Monthly dollar-cost-averaging simulator with currency conversion"
)]
pub struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the simulation and write data.csv and index.html
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Output directory, overrides [report] output_dir
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// First date of the simulation range (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date of the simulation range (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file (the holdings snapshot is not read)
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub output_dir: Option<PathBuf>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Everything resolved from config, overrides and snapshot before data is read.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    pub params: SimulationParams,
    pub settings: ReportSettings,
    pub snapshot: Option<HoldingsSnapshot>,
    pub snapshot_location: String,
    /// Snapshot override rejected for falling below the plausibility bound.
    pub ignored_override: Option<f64>,
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
}

/// Outcome of a full pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    pub outcome: SimulationOutcome,
    pub params: SimulationParams,
    pub summary: Summary,
    pub written: Vec<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            output,
            start,
            end,
            dry_run,
        } => {
            let overrides = RunOverrides {
                output_dir: output,
                start_date: start,
                end_date: end,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_simulation(&config, &overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = FxdcaError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: FxdcaError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

fn run_simulation(config_path: &Path, overrides: &RunOverrides) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    // Stage 2: Wire adapters
    let data_path = config
        .get_string(DATA, "path")
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    let data_port = CsvSeriesAdapter::new(PathBuf::from(data_path));
    let snapshot_port = JsonSnapshotAdapter::new(snapshot_path(&config));
    let csv_writer = CsvLedgerWriter::new();
    let html_writer = HtmlReportAdapter::new();
    let report_ports: [&dyn ReportPort; 2] = [&csv_writer, &html_writer];

    // Stages 3-7: Resolve, fetch, simulate, report
    let result = match run_pipeline(
        &config,
        &data_port,
        &snapshot_port,
        &report_ports,
        overrides,
        Local::now().naive_local(),
    ) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    print_summary(&result);
    ExitCode::SUCCESS
}

fn print_summary(result: &PipelineResult) {
    let s = &result.summary;
    eprintln!("\n=== DCA Summary ===");
    match (s.first_date, s.last_date) {
        (Some(first), Some(last)) => eprintln!("Period:           {} to {}", first, last),
        _ => eprintln!("Period:           no purchases"),
    }
    eprintln!("Months:           {}", s.months);
    eprintln!("Total Invested:   {:.0}", s.total_invested);
    eprintln!("Final Value:      {:.0}", s.final_value);
    eprintln!("Profit:           {:.0}", s.profit);
    eprintln!("ROI:              {:.2}%", s.roi * 100.0);
    eprintln!("Shares Held:      {:.6}", s.total_shares);

    if !result.outcome.warnings.is_empty() {
        eprintln!("\n=== Data Warnings ===");
        for message in result.outcome.warning_messages() {
            eprintln!("  {}", message);
        }
    }

    eprintln!();
    for path in &result.written {
        eprintln!("Report written to: {}", path.display());
    }
}

fn run_dry_run(config_path: &Path, overrides: &RunOverrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_config(&config) {
        return fail(e);
    }
    eprintln!("Config validated successfully");

    let snapshot_port = JsonSnapshotAdapter::new(snapshot_path(&config));
    let resolved = match resolve_run(&config, &snapshot_port, overrides, Local::now().date_naive()) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    let p = &resolved.params;
    eprintln!("\nSimulation:");
    eprintln!("  range:          {} to {}", p.start_date, p.end_date);
    eprintln!("  contribution:   {}", p.monthly_contribution);
    eprintln!("  cadence:        {} ({})", p.cadence, p.cadence.describe());
    eprintln!(
        "  commission:     {} ({})",
        p.cost_model.commission_tier,
        p.cost_model.commission()
    );
    eprintln!(
        "  spread:         {} ({})",
        p.cost_model.spread_tier,
        p.cost_model.spread()
    );
    eprintln!("  fallback rate:  {}", p.fallback_rate);
    if let Some(observed) = resolved.ignored_override {
        eprintln!("  ignored:        snapshot override {} (below {})", observed, p.min_plausible_rate);
    }
    eprintln!("  min plausible:  {}", p.min_plausible_rate);

    eprintln!("\nData:");
    eprintln!("  path:           {}", resolved.data_path.display());
    eprintln!("  price symbol:   {}", resolved.settings.price_symbol);
    eprintln!("  rate symbol:    {}", resolved.settings.rate_symbol);

    eprintln!("\nReport:");
    eprintln!("  output dir:     {}", resolved.output_dir.display());
    match &resolved.snapshot {
        Some(snap) => eprintln!("  snapshot:       {} (as of {})", resolved.snapshot_location, snap.as_of),
        None => eprintln!("  snapshot:       not found at {}", resolved.snapshot_location),
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let today = Local::now().date_naive();
    let result = validate_config(&config).and_then(|()| {
        let configured = read_number(&config, SIMULATION, "fallback_rate")?;
        build_simulation_params(
            &config,
            &RunOverrides::default(),
            resolve_fallback_rate(None, configured, min_plausible_rate(&config)?),
            today,
        )
    });
    if let Err(e) = result {
        return fail(e);
    }

    eprintln!("Configuration is valid.");
    ExitCode::SUCCESS
}

fn snapshot_path(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        config
            .get_string(REPORT, "snapshot_path")
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string()),
    )
}

/// Builds simulation parameters from the `[simulation]` section.
///
/// `end_date` defaults to `today`. Command-line dates replace the configured
/// ones. The result is validated before it is returned.
pub fn build_simulation_params(
    config: &dyn ConfigPort,
    overrides: &RunOverrides,
    fallback_rate: f64,
    today: NaiveDate,
) -> Result<SimulationParams, FxdcaError> {
    let start_date = match overrides.start_date {
        Some(d) => d,
        None => read_date(config, SIMULATION, "start_date")?.ok_or_else(|| {
            FxdcaError::ConfigMissing {
                section: SIMULATION.into(),
                key: "start_date".into(),
            }
        })?,
    };
    let end_date = match overrides.end_date {
        Some(d) => d,
        None => read_date(config, SIMULATION, "end_date")?.unwrap_or(today),
    };
    if start_date > end_date {
        return Err(FxdcaError::invalid_configuration(
            "start_date",
            start_date.to_string(),
            format!("must not be after end_date {}", end_date),
        ));
    }

    let cadence = match config.get_string(SIMULATION, "cadence") {
        Some(s) => s.parse::<Cadence>()?,
        None => Cadence::default(),
    };
    let cost_model = CostModel::from_names(
        &config
            .get_string(SIMULATION, "commission_tier")
            .unwrap_or_else(|| "standard-etf".to_string()),
        &config
            .get_string(SIMULATION, "spread_tier")
            .unwrap_or_else(|| "digital-channel".to_string()),
    )?;

    let params = SimulationParams {
        start_date,
        end_date,
        monthly_contribution: read_number(config, SIMULATION, "monthly_contribution")?
            .unwrap_or(DEFAULT_MONTHLY_CONTRIBUTION),
        cadence,
        cost_model,
        fallback_rate,
        min_plausible_rate: min_plausible_rate(config)?,
    };
    params.validate()?;
    Ok(params)
}

/// Builds presentation settings from the `[data]` and `[report]` sections.
pub fn build_report_settings(config: &dyn ConfigPort) -> ReportSettings {
    let defaults = ReportSettings::default();
    let get = |section: &str, key: &str, default: String| {
        config
            .get_string(section, key)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default)
    };
    ReportSettings {
        title: get(REPORT, "title", defaults.title),
        price_symbol: get(DATA, "price_symbol", defaults.price_symbol),
        rate_symbol: get(DATA, "rate_symbol", defaults.rate_symbol),
        local_currency: get(REPORT, "local_currency", defaults.local_currency),
        foreign_currency: get(REPORT, "foreign_currency", defaults.foreign_currency),
        recent_rows: config
            .get_int(REPORT, "recent_rows", defaults.recent_rows as i64)
            .max(1) as usize,
    }
}

/// `[simulation] min_plausible_rate`, or the built-in default.
fn min_plausible_rate(config: &dyn ConfigPort) -> Result<f64, FxdcaError> {
    Ok(read_number(config, SIMULATION, "min_plausible_rate")?.unwrap_or(DEFAULT_MIN_PLAUSIBLE_RATE))
}

/// Loads the snapshot, treating a load failure the same as a missing file.
fn load_snapshot(port: &dyn SnapshotPort) -> Option<HoldingsSnapshot> {
    match port.load() {
        Ok(Some(snapshot)) => {
            info!(location = %port.location(), as_of = %snapshot.as_of, "loaded holdings snapshot");
            Some(snapshot)
        }
        Ok(None) => {
            info!(location = %port.location(), "no holdings snapshot");
            None
        }
        Err(e) => {
            warn!("ignoring holdings snapshot: {e}");
            None
        }
    }
}

/// Resolves parameters and settings for one run. Config must already be validated.
pub fn resolve_run(
    config: &dyn ConfigPort,
    snapshot_port: &dyn SnapshotPort,
    overrides: &RunOverrides,
    today: NaiveDate,
) -> Result<ResolvedRun, FxdcaError> {
    let snapshot = load_snapshot(snapshot_port);
    let configured = read_number(config, SIMULATION, "fallback_rate")?;
    let bound = min_plausible_rate(config)?;
    let fallback_rate = resolve_fallback_rate(snapshot.as_ref(), configured, bound);
    let ignored_override = snapshot
        .as_ref()
        .and_then(|s| s.implausible_override_rate(bound));
    if let Some(observed) = ignored_override {
        warn!(observed, bound, fallback_rate, "ignoring implausible snapshot fx_rate_override");
    }

    let params = build_simulation_params(config, overrides, fallback_rate, today)?;
    let settings = build_report_settings(config);

    let output_dir = overrides.output_dir.clone().unwrap_or_else(|| {
        PathBuf::from(
            config
                .get_string(REPORT, "output_dir")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        )
    });
    let data_path = PathBuf::from(
        config
            .get_string(DATA, "path")
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string()),
    );

    Ok(ResolvedRun {
        params,
        settings,
        snapshot,
        snapshot_location: snapshot_port.location(),
        ignored_override,
        data_path,
        output_dir,
    })
}

/// Fetches a series. A failed fetch becomes an empty series so the simulator
/// reports it as a data degradation.
fn fetch_or_empty(
    port: &dyn MarketDataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> TimeSeries {
    match port.fetch_series(symbol, start_date, end_date) {
        Ok(series) => {
            info!(symbol, observations = series.len(), "fetched series");
            series
        }
        Err(e) => {
            warn!(symbol, "fetch failed, continuing with empty series: {e}");
            TimeSeries::new(symbol)
        }
    }
}

/// Runs the whole pipeline: validate, resolve, fetch, simulate, write reports.
pub fn run_pipeline(
    config: &dyn ConfigPort,
    data_port: &dyn MarketDataPort,
    snapshot_port: &dyn SnapshotPort,
    report_ports: &[&dyn ReportPort],
    overrides: &RunOverrides,
    now: NaiveDateTime,
) -> Result<PipelineResult, FxdcaError> {
    // Stage 3: Validate and resolve
    validate_config(config)?;
    let resolved = resolve_run(config, snapshot_port, overrides, now.date())?;
    let params = resolved.params;
    let settings = resolved.settings;

    // Stage 4: Fetch series
    info!(
        price = %settings.price_symbol,
        rate = %settings.rate_symbol,
        start = %params.start_date,
        end = %params.end_date,
        "fetching series"
    );
    let prices = fetch_or_empty(data_port, &settings.price_symbol, params.start_date, params.end_date);
    let rates = fetch_or_empty(data_port, &settings.rate_symbol, params.start_date, params.end_date);

    // Stage 5: Simulate
    let mut outcome = simulate(&prices, &rates, &params)?;
    if let Some(observed) = resolved.ignored_override {
        // Found before the simulation ran, so it leads the list.
        outcome.warnings.insert(
            0,
            SimulationWarning::ImplausibleOverride {
                observed,
                bound: params.min_plausible_rate,
                fallback_rate: params.fallback_rate,
            },
        );
    }
    let summary = Summary::compute(&outcome.ledger, params.monthly_contribution);
    info!(
        months = summary.months,
        warnings = outcome.warnings.len(),
        "simulation finished"
    );

    // Stage 6: Write reports
    let report = ReportData {
        outcome: &outcome,
        params: &params,
        summary: &summary,
        snapshot: resolved.snapshot.as_ref(),
        snapshot_location: resolved.snapshot_location.clone(),
        settings: &settings,
        generated_at: now,
    };
    let mut written = Vec::with_capacity(report_ports.len());
    for port in report_ports {
        let path = port.write(&report, &resolved.output_dir)?;
        info!(path = %path.display(), "report written");
        written.push(path);
    }

    Ok(PipelineResult {
        outcome,
        params,
        summary,
        written,
    })
}

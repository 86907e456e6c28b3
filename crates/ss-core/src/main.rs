//! sigscan - cut-efficiency and signal-significance scans
//!
//! The main entry point, handling:
//! - Efficiency curves over a family of threshold cuts
//! - Expected yields and S/sqrt(S+B) over the same family
//! - Significance versus assumed branching fraction for a fixed cut
//! - Configuration checks

use clap::{Args, Parser, Subcommand};
use ss_common::error::format_error_human;
use ss_common::{Error, OutputFormat, Role, RunId, StructuredError, SCHEMA_VERSION};
use ss_core::config::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
use ss_core::exit_codes::ExitCode;
use ss_core::logging::{init_logging, LogConfig, LogLevel};
use ss_core::output::{envelope, render_markdown, render_summary, ScanReport};
use ss_core::source::{SelectionFile, SelectionSource};
use ss_core::sweep::{bf_scan, efficiency_scan, significance_scan, SweepOptions, ThresholdSweep};
use ss_math::grid::logspace;
use ss_math::Denominator;
use std::io::IsTerminal;
use std::path::PathBuf;

/// sigscan - selection efficiency and significance scans
#[derive(Parser)]
#[command(name = "sigscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Analysis config file (JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-sample cut efficiency over a threshold sweep
    Efficiency(EfficiencyArgs),

    /// Expected S, B and significance over a threshold sweep
    Significance(SignificanceArgs),

    /// Significance versus assumed branching fraction for one cut
    BfScan(BfScanArgs),

    /// Validate configuration and, optionally, a selection input
    Check(CheckArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Selection input: summary table or event scores (JSON)
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Sample roles to include (default: all)
    #[arg(long, value_delimiter = ',')]
    components: Vec<Role>,

    /// Lower edge of the suggested x-axis range
    #[arg(long, requires = "x_max", allow_hyphen_values = true)]
    x_min: Option<f64>,

    /// Upper edge of the suggested x-axis range
    #[arg(long, requires = "x_min", allow_hyphen_values = true)]
    x_max: Option<f64>,

    /// Also write the JSON result to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Branch to cut on (default: sweep.branch from config)
    #[arg(long)]
    branch: Option<String>,

    /// Thresholds, comma-separated (default: sweep.cut_values from config)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    cut_values: Vec<f64>,

    /// Cut added to every threshold: an expression or a working point name
    #[arg(long)]
    other_cut: Option<String>,
}

#[derive(Args, Debug)]
struct EfficiencyArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    sweep: SweepArgs,

    /// Measure against processed instead of preselected events
    #[arg(long)]
    raw: bool,
}

#[derive(Args, Debug)]
struct SignificanceArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    sweep: SweepArgs,

    /// Assumed signal branching fraction (default: sweep.branching_fraction)
    #[arg(long)]
    bf: Option<f64>,

    /// Show expected yields per sample instead of the significance table
    #[arg(long)]
    yields: bool,
}

#[derive(Args, Debug)]
struct BfScanArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Cut expression or working point (default: sweep.working_point)
    #[arg(long)]
    cut: Option<String>,

    /// Explicit branching fractions, comma-separated
    #[arg(long, value_delimiter = ',', conflicts_with_all = ["bf_min_exp", "bf_max_exp", "bf_points"])]
    bf_values: Vec<f64>,

    /// Decimal exponent of the smallest branching fraction
    #[arg(long, allow_hyphen_values = true)]
    bf_min_exp: Option<f64>,

    /// Decimal exponent of the largest branching fraction
    #[arg(long, allow_hyphen_values = true)]
    bf_max_exp: Option<f64>,

    /// Number of log-spaced branching fractions
    #[arg(long)]
    bf_points: Option<usize>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Selection input to check against the config
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else if cli.global.verbose > 0 {
        Some(LogLevel::Info.louder(cli.global.verbose))
    } else {
        None
    };
    let mut log_config = LogConfig::from_env(cli_level, None);
    if cli.global.no_color {
        log_config = log_config.with_color(false);
    }
    init_logging(&log_config);

    let run_id = RunId::new();
    let exit_code = match &cli.command {
        Commands::Efficiency(args) => run_efficiency(&cli.global, &run_id, args),
        Commands::Significance(args) => run_significance(&cli.global, &run_id, args),
        Commands::BfScan(args) => run_bf_scan(&cli.global, &run_id, args),
        Commands::Check(args) => run_check(&cli.global, &run_id, args),
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Commands
// ============================================================================

fn run_efficiency(global: &GlobalOpts, run_id: &RunId, args: &EfficiencyArgs) -> ExitCode {
    let span = tracing::info_span!("run", run_id = %run_id, command = "efficiency");
    let _enter = span.enter();

    let config = match load(global) {
        Ok(config) => config,
        Err(e) => return output_config_error(global, run_id, &e),
    };

    let result = (|| -> ss_common::Result<ScanReport> {
        let input = SelectionFile::from_file(&args.input.input)?;
        let sweep = threshold_sweep(&config, &args.sweep)?;
        let options = sweep_options(SweepOptions::efficiency(), &args.input)?
            .with_denominator(Denominator::from_raw(args.raw));
        efficiency_scan(&config.analysis, input.as_source(), &sweep, &options)
            .map(ScanReport::Efficiency)
    })();

    finish(global, run_id, &config, &args.input, result, false)
}

fn run_significance(global: &GlobalOpts, run_id: &RunId, args: &SignificanceArgs) -> ExitCode {
    let span = tracing::info_span!("run", run_id = %run_id, command = "significance");
    let _enter = span.enter();

    let config = match load(global) {
        Ok(config) => config,
        Err(e) => return output_config_error(global, run_id, &e),
    };

    let result = (|| -> ss_common::Result<ScanReport> {
        let input = SelectionFile::from_file(&args.input.input)?;
        let sweep = threshold_sweep(&config, &args.sweep)?;
        let options = sweep_options(SweepOptions::yields(), &args.input)?;
        let bf = args.bf.unwrap_or(config.analysis.sweep.branching_fraction);
        significance_scan(&config.analysis, input.as_source(), &sweep, bf, &options)
            .map(ScanReport::Significance)
    })();

    finish(global, run_id, &config, &args.input, result, args.yields)
}

fn run_bf_scan(global: &GlobalOpts, run_id: &RunId, args: &BfScanArgs) -> ExitCode {
    let span = tracing::info_span!("run", run_id = %run_id, command = "bf-scan");
    let _enter = span.enter();

    let config = match load(global) {
        Ok(config) => config,
        Err(e) => return output_config_error(global, run_id, &e),
    };

    let result = (|| -> ss_common::Result<ScanReport> {
        let input = SelectionFile::from_file(&args.input.input)?;
        let cut = match &args.cut {
            Some(spec) => config.resolve_cut(spec)?,
            None => config.default_cut().cloned().ok_or_else(|| {
                Error::InvalidArgument(
                    "no --cut given and no sweep.working_point configured".to_string(),
                )
            })?,
        };
        let grid = bf_grid(&config, args)?;
        let options = sweep_options(SweepOptions::yields(), &args.input)?;
        bf_scan(&config.analysis, input.as_source(), &cut, &grid, &options)
            .map(ScanReport::BranchingFraction)
    })();

    finish(global, run_id, &config, &args.input, result, false)
}

fn run_check(global: &GlobalOpts, run_id: &RunId, args: &CheckArgs) -> ExitCode {
    let mut results: Vec<serde_json::Value> = Vec::new();
    let mut exit_code = ExitCode::Clean;

    let config = match load(global) {
        Ok(config) => {
            results.push(serde_json::json!({
                "check": "config",
                "status": "ok",
                "source": config.snapshot.source,
                "path": config.snapshot.path,
                "hash": config.snapshot.hash,
                "samples": config.analysis.samples.len(),
            }));
            results.push(serde_json::json!({
                "check": "working_points",
                "status": "ok",
                "cuts": config
                    .working_points
                    .iter()
                    .map(|(name, cut)| (name.clone(), cut.to_string()))
                    .collect::<std::collections::BTreeMap<_, _>>(),
            }));
            Some(config)
        }
        Err(e) => {
            exit_code = config_exit_code(&e);
            results.push(serde_json::json!({
                "check": "config",
                "status": "error",
                "error": e.to_string(),
            }));
            None
        }
    };

    if let (Some(path), Some(config)) = (&args.input, &config) {
        match check_input(config, path) {
            Ok(check) => results.push(check),
            Err(e) => {
                exit_code = ExitCode::from(&e);
                results.push(serde_json::json!({
                    "check": "input",
                    "status": "error",
                    "error": StructuredError::from(&e),
                }));
            }
        }
    }

    let all_ok = exit_code.is_success();
    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "run_id": run_id.0,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "status": if all_ok { "ok" } else { "error" },
        "checks": results,
    });

    match global.format {
        OutputFormat::Json => print_json(&response),
        OutputFormat::Summary => {
            let status = if all_ok { "OK" } else { "FAILED" };
            println!("[{}] check: {}", run_id, status);
        }
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            println!("# sigscan check");
            println!();
            for result in &results {
                let check = result.get("check").and_then(|v| v.as_str()).unwrap_or("?");
                let status = result.get("status").and_then(|v| v.as_str()).unwrap_or("?");
                let symbol = if status == "ok" { "✓" } else { "✗" };
                println!("{} {}: {}", symbol, check, status);
                if let Some(error) = result.get("error") {
                    let message = error
                        .get("message")
                        .and_then(|v| v.as_str())
                        .or_else(|| error.as_str())
                        .unwrap_or("?");
                    println!("  Error: {}", message);
                }
            }
        }
    }

    exit_code
}

/// Every configured sample must be present in the input, and the default
/// working point must be evaluable for each of them.
fn check_input(config: &ResolvedConfig, path: &std::path::Path) -> ss_common::Result<serde_json::Value> {
    let input = SelectionFile::from_file(path)?;
    let source: &dyn SelectionSource = input.as_source();
    let available = source.samples();

    let mut missing = Vec::new();
    for sample in &config.analysis.samples {
        if !available.contains(&sample.name) {
            missing.push(sample.name.clone());
        }
    }
    if let Some(name) = missing.first() {
        return Err(Error::UnknownSample { name: name.clone() });
    }

    if let Some(cut) = config.default_cut() {
        for sample in &config.analysis.samples {
            source.selected(&sample.name, cut)?;
        }
    }

    let unused: Vec<&String> = available
        .iter()
        .filter(|name| config.analysis.sample(name).is_none())
        .collect();

    Ok(serde_json::json!({
        "check": "input",
        "status": "ok",
        "path": path.display().to_string(),
        "kind": input.kind(),
        "samples": available.len(),
        "unused_samples": unused,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn load(global: &GlobalOpts) -> Result<ResolvedConfig, ConfigError> {
    load_config(&ConfigOptions {
        config_path: global.config.clone(),
    })
}

fn threshold_sweep(config: &ResolvedConfig, args: &SweepArgs) -> ss_common::Result<ThresholdSweep> {
    let branch = args
        .branch
        .clone()
        .or_else(|| config.analysis.sweep.branch.clone())
        .ok_or_else(|| {
            Error::InvalidArgument("no --branch given and no sweep.branch configured".to_string())
        })?;
    let thresholds = if args.cut_values.is_empty() {
        config.analysis.sweep.cut_values.clone()
    } else {
        args.cut_values.clone()
    };
    let extra = args
        .other_cut
        .as_deref()
        .map(|spec| config.resolve_cut(spec))
        .transpose()?;

    Ok(ThresholdSweep::new(branch, thresholds).with_extra(extra))
}

fn sweep_options(base: SweepOptions, args: &InputArgs) -> ss_common::Result<SweepOptions> {
    let x_range = match (args.x_min, args.x_max) {
        (Some(lo), Some(hi)) => {
            if !lo.is_finite() || !hi.is_finite() || lo > hi {
                return Err(Error::InvalidArgument(format!(
                    "x range must be finite and ascending, got [{}, {}]",
                    lo, hi
                )));
            }
            Some((lo, hi))
        }
        _ => None,
    };
    Ok(base
        .with_components(args.components.clone())
        .with_x_range(x_range))
}

fn bf_grid(config: &ResolvedConfig, args: &BfScanArgs) -> ss_common::Result<Vec<f64>> {
    if !args.bf_values.is_empty() {
        return Ok(args.bf_values.clone());
    }
    let sweep = &config.analysis.sweep;
    if args.bf_min_exp.is_none() && args.bf_max_exp.is_none() && args.bf_points.is_none() {
        return Ok(sweep.bf_grid());
    }
    let lo = args.bf_min_exp.unwrap_or(sweep.bf_exp_range[0]);
    let hi = args.bf_max_exp.unwrap_or(sweep.bf_exp_range[1]);
    let points = args.bf_points.unwrap_or(sweep.bf_points);
    if !lo.is_finite() || !hi.is_finite() || lo > hi {
        return Err(Error::InvalidArgument(format!(
            "branching-fraction exponents must be finite and ascending, got [{}, {}]",
            lo, hi
        )));
    }
    if points == 0 {
        return Err(Error::InvalidArgument(
            "--bf-points must be at least 1".to_string(),
        ));
    }
    Ok(logspace(lo, hi, points))
}

/// Print (and optionally save) a finished scan, or report its error.
fn finish(
    global: &GlobalOpts,
    run_id: &RunId,
    config: &ResolvedConfig,
    input: &InputArgs,
    result: ss_common::Result<ScanReport>,
    yields: bool,
) -> ExitCode {
    let report = match result {
        Ok(report) => report,
        Err(e) => return output_error(global, run_id, &e),
    };

    let doc = envelope(run_id, &report, &config.snapshot);
    if let Some(path) = &input.save {
        let saved = serde_json::to_string_pretty(&doc)
            .map_err(Error::from)
            .and_then(|text| std::fs::write(path, text).map_err(Error::from));
        if let Err(e) = saved {
            return output_error(global, run_id, &e);
        }
        tracing::info!(path = %path.display(), "saved result");
    }

    match global.format {
        OutputFormat::Json => print_json(&doc),
        OutputFormat::Md => print!("{}", render_markdown(&report, yields)),
        OutputFormat::Summary => println!("{}", render_summary(run_id, &report)),
        OutputFormat::Exitcode => {}
    }
    ExitCode::Clean
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!(error = %e, "failed to serialize output"),
    }
}

fn use_color(global: &GlobalOpts) -> bool {
    !global.no_color && std::io::stderr().is_terminal()
}

/// Output a command error in the appropriate format.
fn output_error(global: &GlobalOpts, run_id: &RunId, error: &Error) -> ExitCode {
    let exit_code = ExitCode::from(error);
    if exit_code.is_user_error() {
        tracing::warn!(code = error.code(), error = %error, "command rejected");
    } else {
        tracing::error!(code = error.code(), error = %error, "command failed");
    }

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id.0,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "error": StructuredError::from(error),
            });
            match serde_json::to_string_pretty(&response) {
                Ok(text) => eprintln!("{}", text),
                Err(_) => eprintln!("{}", StructuredError::from(error).to_json()),
            }
        }
        OutputFormat::Summary => eprintln!("[{}] error {}: {}", run_id, error.code(), error),
        OutputFormat::Exitcode => {}
        OutputFormat::Md => eprintln!("{}", format_error_human(error, use_color(global))),
    }

    exit_code
}

fn config_exit_code(error: &ConfigError) -> ExitCode {
    match error {
        ConfigError::NotFound { .. } => ExitCode::ArgsError,
        ConfigError::IoError { .. } => ExitCode::IoError,
        e if e.is_version_mismatch() => ExitCode::VersionError,
        ConfigError::ValidationError(_) | ConfigError::WorkingPoint { .. } => ExitCode::ConfigError,
    }
}

/// Output a config error in the appropriate format.
fn output_config_error(global: &GlobalOpts, run_id: &RunId, error: &ConfigError) -> ExitCode {
    let exit_code = config_exit_code(error);
    tracing::error!(error = %error, "configuration error");

    let response = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "run_id": run_id.0,
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "status": "error",
        "error": {
            "code": exit_code.code_name(),
            "message": error.to_string(),
        }
    });

    match global.format {
        OutputFormat::Json => match serde_json::to_string_pretty(&response) {
            Ok(text) => eprintln!("{}", text),
            Err(_) => eprintln!("config error: {}", error),
        },
        OutputFormat::Summary => eprintln!("[{}] config error: {}", run_id, error),
        OutputFormat::Exitcode => {}
        OutputFormat::Md => {
            eprintln!("# Configuration Error");
            eprintln!();
            eprintln!("Error: {}", error);
            eprintln!("Fix: run 'sigscan check' to validate the analysis configuration.");
        }
    }

    exit_code
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "sigscan_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => print_json(&version_info),
        OutputFormat::Exitcode => {}
        _ => {
            println!("sigscan {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

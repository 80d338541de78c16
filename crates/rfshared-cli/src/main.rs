use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rfshared_core::layout::{self, StructKind};
use rfshared_core::{AnalyzeOptions, Report, UnitSystem};

mod live;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("RFSHARED_BUILD_COMMIT"),
    " ",
    env!("RFSHARED_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "rfshared")]
#[command(version = VERSION)]
#[command(
    about = "Decoder for the rFactor 1 shared-memory telemetry export ($rFactorShared$).",
    long_about = None,
    after_help = "Examples:\n  rfshared dump decode session.bin -o report.json\n  rfshared dump standings session.bin\n  rfshared layout --struct wheel\n  rfshared live --pretty"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on snapshot dump files (raw snapshots stored back to back).
    Dump {
        #[command(subcommand)]
        command: DumpCommands,
    },
    /// Print the packed layout of a structure.
    Layout {
        /// Structure to describe
        #[arg(long = "struct", value_enum, default_value_t = StructArg::Shared)]
        kind: StructArg,

        /// Emit the table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read one snapshot from the running simulator (Windows only).
    Live {
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Unit system for derived values
        #[arg(long, value_enum, default_value_t = UnitsArg::Metric)]
        units: UnitsArg,
    },
}

#[derive(Subcommand, Debug)]
enum DumpCommands {
    /// Decode one frame of a dump and write a versioned JSON report.
    #[command(
        after_help = "Examples:\n  rfshared dump decode session.bin -o report.json\n  rfshared dump decode 'captures/*.bin' --stdout --frame 0 --units imperial"
    )]
    Decode {
        /// Path or glob pattern of a dump file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Frame index to decode (default: last complete frame)
        #[arg(long)]
        frame: Option<u64>,

        /// Unit system for derived values
        #[arg(long, value_enum, default_value_t = UnitsArg::Metric)]
        units: UnitsArg,
    },
    /// Print the vehicle count and driver, vehicle and class of each active car.
    Standings {
        /// Path or glob pattern of a dump file
        input: PathBuf,

        /// Frame index to decode (default: last complete frame)
        #[arg(long)]
        frame: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum StructArg {
    Shared,
    Wheel,
    VehicleInfo,
    Vec3,
}

impl From<StructArg> for StructKind {
    fn from(arg: StructArg) -> Self {
        match arg {
            StructArg::Shared => StructKind::Shared,
            StructArg::Wheel => StructKind::Wheel,
            StructArg::VehicleInfo => StructKind::VehicleInfo,
            StructArg::Vec3 => StructKind::Vec3,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum UnitsArg {
    Metric,
    Imperial,
}

impl From<UnitsArg> for UnitSystem {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Metric => UnitSystem::Metric,
            UnitsArg::Imperial => UnitSystem::Imperial,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Dump { command } => match command {
            DumpCommands::Decode {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                frame,
                units,
            } => cmd_dump_decode(
                input,
                report,
                stdout,
                OutputFormat { pretty, compact },
                quiet,
                AnalyzeOptions {
                    frame,
                    units: units.into(),
                },
            ),
            DumpCommands::Standings { input, frame } => cmd_dump_standings(input, frame),
        },
        Commands::Layout { kind, json } => cmd_layout(kind.into(), json),
        Commands::Live { pretty, units } => live::cmd_live(pretty, units.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rfshared_core={level},rfshared={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    pub(crate) fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line.
        CliError::new(format!("{err:#}"), None)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct OutputFormat {
    pub(crate) pretty: bool,
    pub(crate) compact: bool,
}

fn cmd_dump_decode(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    format: OutputFormat,
    quiet: bool,
    options: AnalyzeOptions,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report_path = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };
    if let Some(report_path) = report_path.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let rep = analyze(&resolved_input, &options)?;
    let json = serialize_report(&rep, format)?;

    let Some(report_path) = report_path else {
        println!("{}", json);
        return Ok(());
    };

    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(&report_path, json)
        .with_context(|| format!("Failed to write report: {}", report_path.display()))?;

    if !quiet {
        eprintln!(
            "OK: frame {} of {} -> {}",
            rep.frame_index,
            rep.frames_total,
            report_path.display()
        );
    }
    Ok(())
}

fn cmd_dump_standings(input: PathBuf, frame: Option<u64>) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let options = AnalyzeOptions {
        frame,
        ..AnalyzeOptions::default()
    };
    let rep = analyze(&resolved_input, &options)?;

    let snapshot = &rep.snapshot;
    println!("{}", snapshot.num_vehicles);
    for vehicle in snapshot.active_vehicles() {
        println!(
            "{} {} {}",
            vehicle.driver_name, vehicle.vehicle_name, vehicle.vehicle_class
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct LayoutRow {
    offset: usize,
    width: usize,
    #[serde(rename = "type")]
    ty: String,
    count: usize,
    name: &'static str,
}

#[derive(Debug, Serialize)]
struct LayoutTable {
    name: &'static str,
    size: usize,
    fields: Vec<LayoutRow>,
}

fn cmd_layout(kind: StructKind, json: bool) -> Result<(), CliError> {
    let table = LayoutTable {
        name: kind.name(),
        size: layout::total_size(kind),
        fields: layout::offsets(kind)
            .map(|(range, field)| LayoutRow {
                offset: range.start,
                width: range.len(),
                ty: field.ty.label(),
                count: field.count,
                name: field.name,
            })
            .collect(),
    };

    if json {
        let json = serde_json::to_string_pretty(&table).context("JSON serialization failed")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{:>6}  {:>6}  {:<16}  name", "offset", "width", "type");
    for row in &table.fields {
        let ty = if row.count > 1 {
            format!("{}[{}]", row.ty, row.count)
        } else {
            row.ty.clone()
        };
        println!("{:>6}  {:>6}  {:<16}  {}", row.offset, row.width, ty, row.name);
    }
    println!("total: {} bytes ({})", table.size, table.name);
    Ok(())
}

fn analyze(input: &Path, options: &AnalyzeOptions) -> Result<Report, CliError> {
    debug!(input = %input.display(), frame = ?options.frame, "decoding dump");
    rfshared_core::analyze_dump_file(input, options).map_err(|err| {
        let hint = match &err {
            rfshared_core::AnalysisError::FrameOutOfRange { total, .. } => Some(format!(
                "valid frames are 0..{}",
                total.saturating_sub(1)
            )),
            rfshared_core::AnalysisError::Decode { .. } | rfshared_core::AnalysisError::Empty => {
                Some(format!(
                    "a dump holds raw snapshots of exactly {} bytes each",
                    layout::SNAPSHOT_SIZE
                ))
            }
            _ => None,
        };
        CliError::new(format!("dump decoding failed: {err}"), hint)
    })
}

pub(crate) fn serialize_report(rep: &Report, format: OutputFormat) -> Result<String, CliError> {
    if format.pretty && format.compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if format.pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // A parent that does not exist yet cannot contain the input.
    let Ok(report_dir) = fs::canonicalize(parent) else {
        return Ok(());
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid report path: {}", report_path.display()))?;
    if report_dir.join(file_name) == input_abs {
        return Err(CliError::new(
            format!(
                "report path must differ from input: {}",
                report_path.display()
            ),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("pass a dump file of raw snapshots".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a dump file of raw snapshots".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let more = if matches.len() > 3 { ", ..." } else { "" };
        return Err(CliError::new(
            format!(
                "multiple files match pattern '{}' ({} matches); matches: {}{}",
                pattern,
                matches.len(),
                listed,
                more
            ),
            Some("pass a single dump file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use portwatch_core::{DataState, PortCounts};
use portwatch_parser::output::{
    OutputFormat, format_analysis, format_run, format_transceivers, summary_line,
};
use portwatch_parser::snapshot::{Snapshot, SnapshotStore};
use portwatch_parser::{AnalyzerConfig, ColumnPolicy, analyze_text_with, parse_transceivers};
use portwatch_source::{CaptureSource, DirectorySource, MonitorConfig};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "portwatch")]
#[command(about = "Switch port health analysis from CLI output captures")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze an interface summary (and optional detail dump).
    Analyze(AnalyzeArgs),
    /// Parse a transceiver dump.
    Transceivers(TransceiversArgs),
    /// Analyze one capture directory (summary, detail and transceiver files).
    Capture(CaptureArgs),
    /// Analyze several capture directories in parallel, one per device.
    Batch(BatchArgs),
    /// Periodically capture, analyze and publish snapshots.
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    /// File holding `display interface brief` output.
    #[arg(long)]
    summary: PathBuf,
    /// File holding `display interface` output.
    #[arg(long)]
    detail: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
    /// How to treat rows whose column count differs from the header.
    #[arg(long, default_value = "strict")]
    policy: ColumnPolicy,
    /// Include dropped records and other diagnostics.
    #[arg(long)]
    with_report: bool,
}

#[derive(Debug, Args)]
struct TransceiversArgs {
    /// File holding `display transceiver` output.
    #[arg(long)]
    input: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct CaptureArgs {
    /// Capture directory.
    #[arg(long)]
    dir: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
    /// How to treat rows whose column count differs from the header.
    #[arg(long, default_value = "strict")]
    policy: ColumnPolicy,
}

#[derive(Debug, Args)]
struct BatchArgs {
    /// Capture directories, one per device.
    #[arg(required = true)]
    dirs: Vec<PathBuf>,
    /// Number of parallel jobs (default: number of CPUs).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
    /// How to treat rows whose column count differs from the header.
    #[arg(long, default_value = "strict")]
    policy: ColumnPolicy,
}

#[derive(Debug, Args)]
struct WatchArgs {
    /// Path to the monitor YAML configuration.
    #[arg(long)]
    config: PathBuf,
    /// Stop after this many refresh cycles (0 runs forever).
    #[arg(long, default_value_t = 0)]
    cycles: u64,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Analyze(args) => run_analyze(args),
        Command::Transceivers(args) => run_transceivers(args),
        Command::Capture(args) => run_capture(args),
        Command::Batch(args) => run_batch(args),
        Command::Watch(args) => run_watch(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("Failed to read '{}': {err}", path.display()))
}

// ---------------------------------------------------------------------------
// analyze / transceivers
// ---------------------------------------------------------------------------

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let summary = read_input(&args.summary)?;
    let detail = match &args.detail {
        Some(path) => read_input(path)?,
        None => String::new(),
    };
    let config = AnalyzerConfig {
        column_policy: args.policy,
        ..Default::default()
    };

    let run = analyze_text_with(&summary, &detail, &config);
    let output = if args.with_report {
        format_run(&run, args.format)?
    } else {
        format_analysis(&run.result, args.format)?
    };
    print!("{}", with_newline(output));
    Ok(())
}

fn run_transceivers(args: TransceiversArgs) -> Result<(), String> {
    let dump = read_input(&args.input)?;
    let records = parse_transceivers(&dump);
    print!("{}", with_newline(format_transceivers(&records, args.format)?));
    Ok(())
}

// ---------------------------------------------------------------------------
// capture / batch
// ---------------------------------------------------------------------------

fn snapshot_from_dir(dir: &Path, config: &AnalyzerConfig) -> Result<Snapshot, String> {
    let capture = DirectorySource::new(dir)
        .capture()
        .map_err(|e| format!("Failed to read capture '{}': {e}", dir.display()))?;
    Ok(capture.to_snapshot(config))
}

fn run_capture(args: CaptureArgs) -> Result<(), String> {
    let config = AnalyzerConfig {
        column_policy: args.policy,
        ..Default::default()
    };
    let snapshot = snapshot_from_dir(&args.dir, &config)?;
    print!("{}", with_newline(format_snapshot(&snapshot, args.format)?));
    Ok(())
}

fn format_snapshot(snapshot: &Snapshot, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(snapshot)
            .map_err(|e| format!("Failed to serialize output: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(snapshot).map_err(|e| format!("Failed to serialize output: {e}"))
        }
        OutputFormat::Markdown | OutputFormat::Table => {
            let run = portwatch_parser::AnalysisRun {
                result: snapshot.analysis.clone(),
                report: snapshot.report.clone(),
            };
            let mut out = format_run(&run, format)?;
            if !snapshot.transceivers.is_empty() {
                out.push('\n');
                out.push_str(&format_transceivers(&snapshot.transceivers, format)?);
            }
            Ok(out)
        }
    }
}

/// Per-device line of a batch run.
#[derive(Debug, Serialize)]
struct DeviceSummary {
    device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    counts: Option<PortCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<DataState>,
    dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn device_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

fn summarize_device(dir: &Path, config: &AnalyzerConfig) -> DeviceSummary {
    let device = device_name(dir);
    match snapshot_from_dir(dir, config) {
        Ok(snapshot) => DeviceSummary {
            device,
            counts: Some(snapshot.analysis.counts()),
            state: Some(snapshot.data_state()),
            dropped: snapshot.report.dropped.len(),
            error: None,
        },
        Err(err) => {
            warn!(device = %device, error = %err, "capture failed");
            DeviceSummary {
                device,
                counts: None,
                state: None,
                dropped: 0,
                error: Some(err),
            }
        }
    }
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    use rayon::prelude::*;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = args.jobs {
        builder = builder.num_threads(jobs);
    }
    let pool = builder
        .build()
        .map_err(|e| format!("Failed to create thread pool: {e}"))?;

    let config = AnalyzerConfig {
        column_policy: args.policy,
        ..Default::default()
    };
    let summaries: Vec<DeviceSummary> = pool.install(|| {
        args.dirs
            .par_iter()
            .map(|dir| summarize_device(dir, &config))
            .collect()
    });

    print!("{}", with_newline(format_batch(&summaries, args.format)?));

    let failed = summaries.iter().filter(|s| s.error.is_some()).count();
    if failed > 0 {
        return Err(format!("{failed} of {} captures failed", summaries.len()));
    }
    Ok(())
}

fn format_batch(summaries: &[DeviceSummary], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summaries)
            .map_err(|e| format!("Failed to serialize output: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(summaries).map_err(|e| format!("Failed to serialize output: {e}"))
        }
        OutputFormat::Markdown => {
            let mut out = String::from("# Devices\n\n");
            out.push_str("| Device | Good | Issue | Inactive | Total | State |\n");
            out.push_str("|--------|------|-------|----------|-------|-------|\n");
            for s in summaries {
                match (&s.counts, &s.state) {
                    (Some(c), Some(state)) => out.push_str(&format!(
                        "| {} | {} | {} | {} | {} | {state} |\n",
                        s.device, c.good, c.issue, c.inactive, c.total
                    )),
                    _ => out.push_str(&format!(
                        "| {} | | | | | error: {} |\n",
                        s.device,
                        s.error.as_deref().unwrap_or("unknown")
                    )),
                }
            }
            Ok(out)
        }
        OutputFormat::Table => {
            let width = summaries
                .iter()
                .map(|s| s.device.len())
                .max()
                .unwrap_or(6)
                .max(6);
            let mut out = String::new();
            for s in summaries {
                match (&s.counts, &s.state) {
                    (Some(c), Some(state)) => out.push_str(&format!(
                        "{:<width$}  good={} issue={} inactive={} total={} ({state})\n",
                        s.device, c.good, c.issue, c.inactive, c.total
                    )),
                    _ => out.push_str(&format!(
                        "{:<width$}  error: {}\n",
                        s.device,
                        s.error.as_deref().unwrap_or("unknown")
                    )),
                }
            }
            Ok(out)
        }
    }
}

// ---------------------------------------------------------------------------
// watch
// ---------------------------------------------------------------------------

fn run_watch(args: WatchArgs) -> Result<(), String> {
    let config = MonitorConfig::load(&args.config)
        .map_err(|e| format!("Failed to load config '{}': {e}", args.config.display()))?;
    let source = config.source();
    let analyzer = config.analyzer_config();
    let store = SnapshotStore::new();

    info!(
        device = %config.device,
        refresh_secs = config.refresh_secs,
        sources = ?source.names(),
        "watch started"
    );

    let mut cycle: u64 = 0;
    loop {
        cycle += 1;
        refresh_once(&config.device, &source, &analyzer, &store);

        if args.cycles != 0 && cycle >= args.cycles {
            break;
        }
        std::thread::sleep(config.refresh_interval());
    }

    if store.latest().is_none() {
        println!("{}: {}", config.device, DataState::NoData);
    }
    Ok(())
}

/// Runs one capture-analyze-publish cycle. A failed capture, an empty one,
/// or one whose summary yields no verdicts leaves the live snapshot untouched.
fn refresh_once(
    device: &str,
    source: &dyn CaptureSource,
    analyzer: &AnalyzerConfig,
    store: &SnapshotStore,
) {
    let capture = match source.capture() {
        Ok(capture) => capture,
        Err(err) => {
            warn!(device, error = %err, "capture failed, keeping previous snapshot");
            return;
        }
    };
    if capture.is_empty() {
        warn!(device, "capture has no summary output, keeping previous snapshot");
        return;
    }

    let fingerprint = capture.fingerprint();
    if store.latest_fingerprint().as_deref() == Some(fingerprint.as_str()) {
        debug!(device, "capture unchanged, skipping analysis");
        return;
    }

    let snapshot = capture.to_snapshot(analyzer);
    if snapshot.data_state() == DataState::NoData {
        warn!(
            device,
            dropped = snapshot.report.dropped.len(),
            "summary output yielded no ports, keeping previous snapshot"
        );
        return;
    }

    let generation = store.publish(snapshot);
    if let Some(snapshot) = store.latest() {
        println!(
            "{device} #{generation} {} {}",
            snapshot.generated_at,
            summary_line(&snapshot.analysis)
        );
    }
}

fn with_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

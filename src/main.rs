use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use coindedup::core::dedup::{DEFAULT_HISTORY_SIZE, DEFAULT_MIN_PAIR, DEFAULT_THRESHOLD};
use coindedup::services::{FilterError, append_report, read_reports};
use coindedup::{DedupConfig, FilterService, Fingerprint, RunRecord, compare, parse_line};
use dialoguer::Confirm;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "coindedup",
    version,
    about = "Drop near-duplicate events from detector coincidence logs"
)]
struct Cli {
    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter a coincidence log into a new file
    Filter {
        /// Input log, one `<timestamp>: [(<id>,<time>), ...]` record per line
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        /// Where to write the retained lines
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
        /// Size of the duplicate history window
        #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE)]
        history_size: usize,
        /// Only report what would be kept
        #[arg(long)]
        dry_run: bool,
        /// Overwrite OUTPUT without asking
        #[arg(short, long)]
        force: bool,
        /// Append a JSON summary of this run to FILE
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Compare two records and show whether they count as the same event
    Compare {
        /// First record line
        first: String,
        /// Second record line
        second: String,
        #[command(flatten)]
        tuning: Tuning,
    },

    /// List runs recorded with `filter --report`
    History {
        /// Report file to read
        #[arg(long, value_name = "FILE")]
        report: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Tuning {
    /// Pair differences closer than this count as similar
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: u64,
    /// Similar pairs needed to call two records the same event
    #[arg(long, default_value_t = DEFAULT_MIN_PAIR)]
    min_pair: usize,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<FilterError>() {
                Some(FilterError::InputNotFound { path }) => {
                    eprintln!("Error: input file not found: {}", path.display());
                }
                _ => eprintln!("error in processing: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Filter {
            input,
            output,
            tuning,
            history_size,
            dry_run,
            force,
            report,
        } => {
            let config = DedupConfig::new(tuning.threshold, history_size, tuning.min_pair)?;

            if !dry_run && !force && output.exists() && !confirm_overwrite(&output)? {
                println!("Aborted; {} left untouched.", output.display());
                return Ok(());
            }

            println!("▶ Filtering events in: {}", input.display());
            let service = FilterService::new(config)?.with_progress(true);
            let target = (!dry_run).then_some(output.as_path());
            let summary = benchmark("filtering", || service.run(&input, target))?;

            if dry_run {
                println!("⚠️  Dry-run only; {} was not written.", output.display());
            } else {
                println!("Done, results saved into {}", output.display());
            }
            println!(
                "lines of raw file: {}, left lines: {}",
                summary.total_lines, summary.retained
            );
            if summary.malformed > 0 {
                println!("   skipped {} malformed line(s)", summary.malformed);
            }

            if let Some(report_path) = report {
                let record = RunRecord::new(&input, target, config, summary);
                append_report(&report_path, &record).with_context(|| {
                    format!("Failed to record run in {}", report_path.display())
                })?;
                println!("✅ Recorded run in {}", report_path.display());
            }
        }

        Commands::Compare {
            first,
            second,
            tuning,
        } => {
            let a = parse_line(1, &first).context("Could not parse first record")?;
            let b = parse_line(2, &second).context("Could not parse second record")?;
            let fa = Fingerprint::from_readings(&a.readings);
            let fb = Fingerprint::from_readings(&b.readings);

            let mut shared: Vec<_> = fa
                .iter()
                .filter_map(|(key, va)| fb.get(&key).map(|vb| (key, va, vb)))
                .collect();
            shared.sort_by_key(|(key, _, _)| *key);

            for (key, va, vb) in &shared {
                let delta = va.abs_diff(*vb);
                let mark = if delta < tuning.threshold { "≈" } else { "≠" };
                println!(
                    "   ({}, {}): {} vs {}  |Δ|={} {}",
                    key.low(),
                    key.high(),
                    va,
                    vb,
                    delta,
                    mark
                );
            }

            let result = compare(&fa, &fb, tuning.threshold);
            println!(
                "Shared pairs: {}, similar pairs: {} (need {})",
                result.shared, result.similar, tuning.min_pair
            );
            if result.similar >= tuning.min_pair {
                println!("✅ Same event");
            } else {
                println!("❌ Different events");
            }
        }

        Commands::History { report } => {
            let records = read_reports(&report)?;
            if records.is_empty() {
                println!("No recorded runs.");
                return Ok(());
            }

            println!("🗂️  Run History:");
            for (i, rec) in records.iter().enumerate() {
                println!(
                    "[{}] {}\n     input: {}\n     output: {}\n     kept: {}/{} (malformed {})\n     threshold={} history_size={} min_pair={}\n",
                    i,
                    rec.timestamp,
                    rec.input,
                    rec.output.as_deref().unwrap_or("(dry-run)"),
                    rec.summary.retained,
                    rec.summary.total_lines,
                    rec.summary.malformed,
                    rec.config.threshold,
                    rec.config.history_size,
                    rec.config.min_pair
                );
            }
        }
    }

    Ok(())
}

fn confirm_overwrite(path: &Path) -> Result<bool> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    Confirm::new()
        .with_prompt(format!("{} already exists. Overwrite?", path.display()))
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Run `f()`, print how long it took (with `label`), and return its result.
fn benchmark<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    println!("⏱ {} took {:.2?}", label, start.elapsed());
    result
}

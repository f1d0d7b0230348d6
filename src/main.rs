//! keytiming - record typing rhythm and rank keys by timing consistency
//!
//! Reads key events until the device goes away or Ctrl-C is pressed, then
//! prints one row per key with press-to-press statistics.

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::tty::IsTty;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

use keytiming::{
    config::{Config, ReportFormat},
    keyboard::{KeyNames, ReplaySource, StopFlag},
    report::SessionReport,
    timing::{CollectSummary, TimingEngine},
    ui::{print_report_table, ThemeColors},
};

#[derive(Parser, Debug)]
#[command(name = "keytiming", version, about = "Per-key typing rhythm statistics")]
struct Args {
    /// Input device to read (e.g. /dev/input/event3); auto-detected if omitted
    #[arg(long, conflicts_with = "replay")]
    device: Option<PathBuf>,

    /// Replay a recorded event log instead of reading a device
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report output format
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,

    /// Don't log running statistics after every key event
    #[arg(long)]
    quiet_stats: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            log::warn!("Using default config: {}", e);
            Config::default()
        }),
    };

    if let Some(format) = args.format {
        config.report.format = format;
    }
    if args.quiet_stats {
        config.collector.log_running_stats = false;
    }
    Ok(config)
}

#[cfg(target_os = "linux")]
fn collect_live(
    args: &Args,
    config: &Config,
    engine: &mut TimingEngine,
    stop: &StopFlag,
) -> Result<CollectSummary> {
    use keytiming::keyboard::EvdevSource;
    use keytiming::ui::EchoGuard;

    let mut source = match &args.device {
        Some(path) => EvdevSource::open(path, config.poll_interval()),
        None => EvdevSource::autodetect(config.poll_interval()),
    }
    .context("failed to open keyboard device")?;

    eprintln!(
        "Recording from {} ({}). Press Ctrl-C to stop.",
        source.path().display(),
        source.device_name().unwrap_or("unnamed device")
    );

    // Echo comes back when the guard drops, before the report is drawn
    let _echo = EchoGuard::suppress().context("failed to disable terminal echo")?;
    let collected = engine
        .collect(&mut source, stop)
        .context("reading keyboard events failed")?;
    Ok(collected)
}

#[cfg(not(target_os = "linux"))]
fn collect_live(
    _args: &Args,
    _config: &Config,
    _engine: &mut TimingEngine,
    _stop: &StopFlag,
) -> Result<CollectSummary> {
    anyhow::bail!("live capture needs Linux evdev; use --replay <FILE>")
}

fn collect_replay(
    path: &Path,
    engine: &mut TimingEngine,
    stop: &StopFlag,
) -> Result<CollectSummary> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut source = ReplaySource::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(engine.collect(&mut source, stop)?)
}

fn key_names(config: &Config) -> KeyNames {
    let names = KeyNames::standard();
    #[cfg(target_os = "linux")]
    let names = names.with_kernel_names();
    names.with_overrides(config.key_name_overrides())
}

fn print_plain(report: &SessionReport) {
    print!("{}", report.render_plain());
    println!("{}", report.footer());
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let mut engine = TimingEngine::new(key_names(&config), config.engine_options());

    let stop = StopFlag::new();
    stop.install_ctrlc_handler().context("failed to install Ctrl-C handler")?;

    let start = Instant::now();
    let collected = match &args.replay {
        Some(path) => collect_replay(path, &mut engine, &stop)?,
        None => collect_live(&args, &config, &mut engine, &stop)?,
    };

    let report = SessionReport::new(start, &collected, &engine);
    match config.report.format.for_output(io::stdout().is_tty()) {
        ReportFormat::Table => {
            if let Err(e) =
                print_report_table(&report, ThemeColors::from_theme(config.report.theme))
            {
                log::warn!("Failed to draw report table, printing plain text: {}", e);
                print_plain(&report);
            }
        }
        ReportFormat::Plain => print_plain(&report),
        ReportFormat::Json => {
            println!("{}", report.to_json().context("failed to serialize report")?);
        }
    }

    Ok(())
}

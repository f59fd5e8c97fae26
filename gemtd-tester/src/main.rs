mod config;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use config::SettingsChoice;
use gemtd_game::{BalanceEngine, BalancePolicy, BalanceReport, SweepConfig};
use report::{RenderOptions, ReportFormat};

#[derive(Debug, Parser)]
#[command(name = "gemtd-tester", version = "0.3.0")]
#[command(about = "Monte Carlo balance sweep for the gem tower defense game across skill tiers")]
struct Args {
    /// Number of waves to sweep (1..=N)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    waves: u32,

    /// Trials per (skill tier, wave) cell
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    simulations: u32,

    /// Run seed; every trial stream is derived from it
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Include the per-wave breakdown in console and markdown reports
    #[arg(long)]
    detailed: bool,

    /// JSON settings file; missing fields keep their defaults
    #[arg(long, conflicts_with = "source_dir")]
    settings: Option<PathBuf>,

    /// Directory holding towers.js, enemies.js and game.js to scan for constants
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Print the resolved settings as JSON and exit
    #[arg(long)]
    print_settings: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn settings_choice(&self) -> SettingsChoice {
        SettingsChoice::from_paths(self.settings.as_deref(), self.source_dir.as_deref())
    }

    const fn sweep(&self) -> SweepConfig {
        SweepConfig {
            max_waves: self.waves,
            trials: self.simulations,
            seed: self.seed,
        }
    }

    /// Machine-readable output on stdout stays banner-free.
    fn shows_banner(&self) -> bool {
        matches!(self.report, ReportFormat::Console) || self.output.is_some()
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let choice = args.settings_choice();
    let engine = choice
        .engine(BalancePolicy::default_config())
        .with_context(|| format!("cannot use {}", choice.describe()))?;

    if maybe_print_settings(&args, &engine)? {
        return Ok(());
    }

    if args.shows_banner() {
        announce_banner(&args, &choice);
    }

    let start_time = Instant::now();
    let report = engine.run_sweep(args.sweep());
    write_report(&args, &report, start_time)?;

    if !report.analysis.verdict.is_passing() {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner(args: &Args, choice: &SettingsChoice) {
    println!("{}", "💎 Gem TD Balance Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
    if args.verbose {
        println!("Settings: {}", choice.describe());
        println!(
            "Sweep: {} waves x {} trials, seed {}",
            args.waves, args.simulations, args.seed
        );
    }
}

fn maybe_print_settings(args: &Args, engine: &BalanceEngine) -> Result<bool> {
    if !args.print_settings {
        return Ok(false);
    }
    let mut output_target = OutputTarget::open(args.output.as_deref())?;
    serde_json::to_writer_pretty(output_target.writer(), engine.settings())?;
    writeln!(output_target.writer())?;
    output_target.finish()?;
    Ok(true)
}

fn write_report(args: &Args, report: &BalanceReport, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::open(args.output.as_deref())?;
    let options = RenderOptions {
        detailed: args.detailed,
        elapsed: start_time.elapsed(),
    };
    report::render(output_target.writer(), args.report, report, options)?;
    output_target.finish()?;
    if let Some(path) = &args.output {
        log::info!("report written to {}", path.display());
    }
    Ok(())
}

/// Report destination: stdout unless `--output` names a file.
struct OutputTarget {
    inner: BufWriter<Box<dyn Write>>,
}

impl OutputTarget {
    fn open(path: Option<&Path>) -> Result<Self> {
        let sink: Box<dyn Write> = match path {
            Some(path) => Box::new(
                File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ),
            None => Box::new(stdout()),
        };
        Ok(Self {
            inner: BufWriter::new(sink),
        })
    }

    fn writer(&mut self) -> &mut dyn Write {
        &mut self.inner
    }

    fn finish(mut self) -> Result<()> {
        self.inner.flush().context("failed to flush report output")
    }
}

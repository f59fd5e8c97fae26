use anyhow::Result;
use chrono::Utc;
use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use gemtd_game::{BalanceReport, TierStatus, Verdict};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Coloured summary table
    Console,
    /// Machine-readable document with settings and analysis
    Json,
    /// Markdown tables
    Markdown,
    /// One row per (tier, wave) cell
    Csv,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub detailed: bool,
    pub elapsed: Duration,
}

pub fn render(
    out: &mut dyn Write,
    format: ReportFormat,
    report: &BalanceReport,
    options: RenderOptions,
) -> Result<()> {
    match format {
        ReportFormat::Console => generate_console_report(out, report, options),
        ReportFormat::Json => generate_json_report(out, report),
        ReportFormat::Markdown => generate_markdown_report(out, report, options.detailed),
        ReportFormat::Csv => generate_csv_report(out, report),
    }
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn status_colored(status: TierStatus) -> ColoredString {
    match status {
        TierStatus::TooEasy => status.label().yellow(),
        TierStatus::Balanced => status.label().green(),
        TierStatus::Hard => status.label().bright_yellow(),
        TierStatus::TooHard => status.label().red(),
    }
}

fn verdict_colored(verdict: Verdict) -> ColoredString {
    if verdict.is_passing() {
        verdict.key().green().bold()
    } else {
        verdict.key().red().bold()
    }
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &BalanceReport,
    options: RenderOptions,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Balance Sweep Results".bright_cyan().bold())?;
    writeln!(out, "{}", "========================".cyan())?;
    writeln!(
        out,
        "Waves: {}  Trials per cell: {}  Seed: {}",
        report.sweep.max_waves, report.sweep.trials, report.sweep.seed
    )?;
    writeln!(out)?;

    writeln!(out, "{:<22} {:>9}  Status", "Skill tier", "Success")?;
    writeln!(out, "{}", "-".repeat(44))?;
    for tier in &report.tiers {
        writeln!(
            out,
            "{:<22} {:>9}  {}",
            tier.label,
            percent(tier.overall_success),
            status_colored(tier.status)
        )?;
    }

    if options.detailed {
        writeln!(out)?;
        writeln!(out, "{}", "🌊 Per-wave breakdown".bright_yellow().bold())?;
        writeln!(out, "{}", "=====================".yellow())?;
        for tier in &report.tiers {
            writeln!(out, "{}", tier.label.bold())?;
            for cell in &tier.waves {
                writeln!(
                    out,
                    "   Wave {:>2}: {:>6} success, efficiency {:.3}, overkill {:.2}, health {}, money {}",
                    cell.wave,
                    percent(cell.success_rate),
                    cell.mean_efficiency,
                    cell.mean_overkill,
                    cell.enemy_health,
                    cell.available_money
                )?;
                if cell.trials_skipped > 0 {
                    writeln!(
                        out,
                        "            {}",
                        format!("{} trials skipped", cell.trials_skipped).red()
                    )?;
                }
            }
        }
    }

    let analysis = &report.analysis;
    let dist = &analysis.distribution;
    writeln!(out)?;
    writeln!(out, "{}", "⚖️  Balance Analysis".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;
    writeln!(out, "Verdict: {}", verdict_colored(analysis.verdict))?;
    writeln!(out, "Summary: {}", analysis.verdict.summary())?;
    writeln!(out, "Recommendation: {}", analysis.verdict.recommendation())?;
    writeln!(
        out,
        "Tiers: {} too easy, {} balanced, {} hard, {} too hard",
        dist.too_easy, dist.balanced, dist.hard, dist.too_hard
    )?;
    let skipped = report.trials_skipped();
    if skipped > 0 {
        writeln!(out, "{}", format!("⚠️  {skipped} trials skipped").yellow())?;
    }
    writeln!(out, "🏁 Total time: {:?}", options.elapsed)?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    report: &'a BalanceReport,
}

pub fn generate_json_report(out: &mut dyn Write, report: &BalanceReport) -> Result<()> {
    let document = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        report,
    };
    serde_json::to_writer_pretty(&mut *out, &document)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    report: &BalanceReport,
    detailed: bool,
) -> Result<()> {
    let analysis = &report.analysis;
    writeln!(out, "# Gem TD Balance Report\n")?;
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Verdict**: {}", analysis.verdict)?;
    writeln!(out, "- **Assessment**: {}", analysis.verdict.summary())?;
    writeln!(
        out,
        "- **Recommendation**: {}",
        analysis.verdict.recommendation()
    )?;
    writeln!(
        out,
        "- **Sweep**: {} waves, {} trials per cell, seed {}\n",
        report.sweep.max_waves, report.sweep.trials, report.sweep.seed
    )?;

    writeln!(out, "## Skill Tiers\n")?;
    writeln!(out, "| Tier | Success | Status |")?;
    writeln!(out, "| --- | ---: | --- |")?;
    for tier in &report.tiers {
        writeln!(
            out,
            "| {} | {} | {} |",
            tier.label,
            percent(tier.overall_success),
            tier.status
        )?;
    }

    if detailed {
        writeln!(out, "\n## Per-wave Results\n")?;
        for tier in &report.tiers {
            writeln!(out, "### {}\n", tier.label)?;
            writeln!(
                out,
                "| Wave | Success | Efficiency | Overkill | Enemy health | Money | Skipped |"
            )?;
            writeln!(out, "| ---: | ---: | ---: | ---: | ---: | ---: | ---: |")?;
            for cell in &tier.waves {
                writeln!(
                    out,
                    "| {} | {} | {:.3} | {:.2} | {} | {} | {} |",
                    cell.wave,
                    percent(cell.success_rate),
                    cell.mean_efficiency,
                    cell.mean_overkill,
                    cell.enemy_health,
                    cell.available_money,
                    cell.trials_skipped
                )?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn generate_csv_report(out: &mut dyn Write, report: &BalanceReport) -> Result<()> {
    writeln!(
        out,
        "skill,weight,wave,success_rate,mean_efficiency,mean_overkill,enemy_health,available_money,trials_run,trials_skipped"
    )?;
    for tier in &report.tiers {
        for cell in &tier.waves {
            writeln!(
                out,
                "{},{:.1},{},{:.4},{:.6},{:.4},{},{},{},{}",
                tier.skill.key(),
                tier.weight,
                cell.wave,
                cell.success_rate,
                cell.mean_efficiency,
                cell.mean_overkill,
                cell.enemy_health,
                cell.available_money,
                cell.trials_run,
                cell.trials_skipped
            )?;
        }
    }
    Ok(())
}

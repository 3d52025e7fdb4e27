use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};
use wcp_core::config::Config;
use wcp_core::export::{self, ExportFormat};
use wcp_core::{window, Aggregator, Job, ReportWindow, RunReport};
use wcp_feeds::snapshot::save_snapshot;
use wcp_feeds::{DetrackClient, JobSource, SnapshotSource};
use wcp_mail::{notification, Mailer};

#[derive(Parser)]
#[command(name = "wcp-report", about = "WCP Detrack run report: fetch jobs, roll up per run, mail the result")]
struct Cli {
    /// Config file (TOML). Defaults to ~/.config/wcp-report/config.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Build the report from a saved job snapshot instead of calling Detrack.
    #[arg(long)]
    jobs_file: Option<PathBuf>,

    /// First day of an explicit window (YYYY-MM-DD).
    #[arg(long, requires = "to", value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Day after the last day of an explicit window (YYYY-MM-DD).
    #[arg(long, requires = "from", value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Job status to report on. Overrides `report.status`.
    #[arg(long)]
    status: Option<String>,

    /// csv or xlsx. Overrides `report.format`.
    #[arg(long, value_parser = parse_format_arg)]
    format: Option<ExportFormat>,

    /// Directory the report is written to. Overrides `report.output_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write the report but do not email it.
    #[arg(long)]
    no_email: bool,

    /// Also append logs to this file (tail -f to inspect). Stdout logging
    /// stays on.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    tracing::info!("starting wcp-report");

    let config = Config::load(cli.config.as_deref())?;
    if !cli.no_email {
        config.validate_mail()?;
    }

    let window = match (cli.from, cli.to) {
        (Some(from), Some(to)) => ReportWindow::new(from, to)?,
        _ => ReportWindow::resolve_now(config.timezone()?)?,
    };

    let jobs = match &cli.jobs_file {
        Some(path) => fetch(&SnapshotSource::new(path)).await?,
        None => {
            config.validate_fetch()?;
            let jobs = fetch(&DetrackClient::new(&config.detrack)?).await?;
            save_snapshot(&config.report.snapshot, &jobs).await?;
            jobs
        }
    };

    let normalizer = config.normalizer()?;
    let status = cli.status.as_deref().unwrap_or(&config.report.status);
    tracing::info!(status, window = %window, "processing jobs");

    let report = Aggregator::new(&normalizer).aggregate(&jobs, status, &window);
    log_summary(&report);

    let format = cli.format.unwrap_or(config.report.format);
    let out_dir = cli.out_dir.as_deref().unwrap_or(&config.report.output_dir);
    let path = export::export(format, &jobs, &report.entries, out_dir, &window.report_file_stem())?;

    if cli.no_email {
        tracing::info!(path = %path.display(), "email disabled; report left on disk");
    } else {
        Mailer::new(&config.smtp)
            .send(&notification(&window), &[path])
            .await
            .context("failed to send report email")?;
    }

    tracing::info!("completed");
    Ok(())
}

async fn fetch(source: &impl JobSource) -> anyhow::Result<Vec<Job>> {
    let jobs = source
        .fetch_jobs()
        .await
        .with_context(|| format!("failed to fetch jobs from {}", source.describe()))?;
    tracing::info!(count = jobs.len(), "total jobs fetched");
    Ok(jobs)
}

fn log_summary(report: &RunReport) {
    let stats = report.stats;
    tracing::info!(
        seen = stats.seen,
        wrong_status = stats.wrong_status,
        out_of_window = stats.out_of_window,
        aggregated = stats.aggregated,
        runs = report.entries.len(),
        price_warnings = report.warnings.len(),
        "aggregation complete"
    );
    if stats.unidentified > 0 {
        tracing::warn!(jobs = stats.unidentified, "jobs without a run identifier grouped under an empty run");
    }
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::util::SubscriberInitExt;

    log_subscriber(log_file)?.init();
    Ok(())
}

/// Stdout subscriber, plus an ANSI-free layer appending to `log_file`.
fn log_subscriber(log_file: Option<&Path>) -> anyhow::Result<impl tracing::Subscriber + Send + Sync + 'static> {
    use tracing_subscriber::prelude::*;

    let filter = tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer))
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    window::parse_date(s).ok_or_else(|| format!("expected YYYY-MM-DD, got {s:?}"))
}

fn parse_format_arg(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>().map_err(|err| err.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use honeygain_core::{HttpSource, PollReport, Poller, ScraperConfig, SensorSnapshot};
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod viewer;
#[cfg(test)]
mod render_tests;

#[derive(Debug, Parser)]
#[command(name = "honeygaind")]
#[command(about = "Publishes HoneyGain scraper data as dashboard sensors")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the scraper API, e.g. http://192.168.1.20:8080
    #[arg(long)]
    base_url: String,

    #[arg(long, default_value_t = 600)]
    interval_secs: u64,

    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,

    #[arg(long, default_value_t = 30)]
    stats_window_days: u32,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Discover sensors without polling them
    Scan,
    Once {
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    Run {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    View,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
    Ndjson,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = scraper_config(&cli);

    let source = HttpSource::new(config.base_url.clone(), config.request_timeout)?;
    let mut poller = Poller::bootstrap(source, config).await;

    match cli.command {
        Command::Scan => {
            println!("{}", serde_json::to_string_pretty(&poller.snapshots())?);
        }
        Command::Once { format } => {
            let report = poller.tick().await;
            print_report(&report, format)?;
        }
        Command::Run { format } => {
            stream_loop(&mut poller, format).await?;
        }
        Command::View => {
            viewer::run_viewer(&mut poller).await?;
        }
    }

    Ok(())
}

/// The base URL is used verbatim: it prefixes every request and every sensor id.
fn scraper_config(cli: &Cli) -> ScraperConfig {
    ScraperConfig {
        base_url: cli.base_url.clone(),
        scan_interval: Duration::from_secs(cli.interval_secs),
        request_timeout: Duration::from_millis(cli.timeout_ms),
        stats_window_days: cli.stats_window_days,
    }
}

async fn stream_loop<S: honeygain_core::JsonSource>(
    poller: &mut Poller<S>,
    format: OutputFormat,
) -> Result<()> {
    // First poll right away so sensors are populated before the first interval.
    let mut ticker = interval_at(Instant::now(), poller.interval());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                warn!("received ctrl-c, stopping");
                break;
            }
            _ = ticker.tick() => {
                let report = poller.tick().await;
                print_report(&report, format)?;
                info!(
                    cycle = report.cycle,
                    available = report.available,
                    unavailable = report.unavailable,
                    next_in_secs = poller.interval().as_secs(),
                    "tick"
                );
            }
        }
    }

    Ok(())
}

fn print_report(report: &PollReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Ndjson => {
            println!("{}", serde_json::to_string(report)?);
        }
        OutputFormat::Human => {
            print!("{}", render_human(report));
        }
    }

    Ok(())
}

pub(crate) fn render_human(report: &PollReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== HoneyGain Poll #{} ===\n", report.cycle));
    out.push_str(&format!("Time:       {}\n", report.ts.to_rfc3339()));
    out.push_str(&format!(
        "Sensors:    {} available, {} unavailable ({} ms)\n",
        report.available, report.unavailable, report.poll_ms
    ));

    let width = report
        .sensors
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0);

    for sensor in &report.sensors {
        out.push_str(&format!(
            "  [{}] {:<width$}  {}\n",
            if sensor.available { "ok" } else { "--" },
            sensor.name,
            state_label(sensor),
        ));
    }

    out
}

pub(crate) fn state_label(sensor: &SensorSnapshot) -> String {
    sensor
        .state
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "n/a".to_string())
}

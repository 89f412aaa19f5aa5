use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod calendar;
mod config;
mod error;
mod forecast;
mod ingest;
mod metrics;
mod models;
mod report;

use crate::config::{ConfigArgs, RolloutConfig};
use crate::ingest::ColumnNames;
use crate::models::EventTable;

#[derive(Parser)]
#[command(name = "rollout-pace")]
#[command(about = "Rollout progress metrics and completion forecasts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print counts, elapsed time and pace
    Metrics {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        json: bool,
    },
    /// Print completion forecasts and simulations
    Forecast {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        json: bool,
    },
    /// Write the markdown dashboard
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// CSV export of the rollout sheet
    #[arg(long, env = "ROLLOUT_CSV")]
    csv: PathBuf,
    #[arg(long, default_value = ingest::DEFAULT_DATE_COLUMN)]
    date_column: String,
    #[arg(long, default_value = ingest::DEFAULT_STATUS_COLUMN)]
    status_column: String,
    #[command(flatten)]
    config: ConfigArgs,
}

impl InputArgs {
    fn load(&self) -> anyhow::Result<(RolloutConfig, EventTable)> {
        let today = chrono::Local::now().date_naive();
        let config = self
            .config
            .resolve(today)
            .context("invalid rollout configuration")?;

        let columns = ColumnNames {
            date: self.date_column.clone(),
            status: self.status_column.clone(),
        };
        let table = ingest::load_csv(&self.csv, &columns)
            .with_context(|| format!("failed to read events from {}", self.csv.display()))?;

        Ok((config, table))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Metrics { input, json } => {
            let (config, table) = input.load()?;
            let snapshot = metrics::compute_snapshot(&table.events, &config);

            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            println!("Rollout metrics as of {}:", config.reference_date);
            println!("- completed {}", snapshot.completed_count);
            println!("- scheduled {}", snapshot.scheduled_count);
            println!(
                "- pending {} of {}",
                snapshot.pending_count, config.target_total
            );
            println!(
                "- calendar days elapsed {}",
                snapshot.elapsed_calendar_days
            );
            println!(
                "- business days remaining {}",
                snapshot.remaining_business_days
            );
            println!("- current pace {:.2}/calendar day", snapshot.current_pace);
            println!(
                "- required pace {:.2}/business day ({:+.2} vs current)",
                snapshot.required_pace, snapshot.pace_delta
            );
            println!(
                "- expected total at current pace {:.0}",
                snapshot.projected_total_at_current_pace.floor()
            );
            for (window, pace) in snapshot.trailing_paces.iter() {
                println!("- last {window} days {pace:.2}/day");
            }
        }
        Commands::Forecast { input, json } => {
            let (config, table) = input.load()?;
            let snapshot = metrics::compute_snapshot(&table.events, &config);
            let summary = forecast::build_summary(&snapshot, &config);

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }

            println!(
                "Completion at current pace ({:.2}/day): {}",
                summary.at_current_pace.throughput,
                report::describe_completion(summary.at_current_pace.completion)
            );
            for (window, scenario) in summary.trailing.iter() {
                println!(
                    "- last {} days pace {:.2}/day: {}",
                    window,
                    scenario.throughput,
                    report::describe_completion(scenario.completion)
                );
            }
            let simulated = summary.presets.iter().chain([&summary.custom]);
            for scenario in simulated {
                println!(
                    "- {} upgrades/business day: {}",
                    scenario.throughput,
                    report::describe_completion(scenario.completion)
                );
            }
            println!(
                "{}",
                report::describe_extra_effort(&summary.extra_effort, summary.extra_increment)
            );
        }
        Commands::Report { input, out } => {
            let (config, table) = input.load()?;
            let snapshot = metrics::compute_snapshot(&table.events, &config);
            let summary = forecast::build_summary(&snapshot, &config);
            let dashboard = report::build_report(&config, &table, &snapshot, &summary);
            std::fs::write(&out, dashboard)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Dashboard written to {}.", out.display());
        }
    }

    Ok(())
}

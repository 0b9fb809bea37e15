//! Recurra CLI
//!
//! Command-line interface for delivery projection and financial reports.
//!
//! # Usage
//!
//! ```bash
//! recurra --data team.json report --period monthly --date 2024-02-15
//! recurra --data team.json deliveries --from 2024-03-01 --to 2024-03-07
//! recurra --team-id $TEAM production --from 2024-03-04 --to 2024-03-04 --shipping
//! recurra --data team.json export report --period quarterly --output q1.csv
//! recurra config set-api-url https://api.recurra.app/v1
//! ```

use clap::{Parser, Subcommand};
use recurra_core::{PeriodKind, ReportConfig, SegmentationMode};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod commands;
mod config;
mod output;

#[derive(Parser)]
#[command(name = "recurra")]
#[command(author = "Recurra")]
#[command(version)]
#[command(about = "Recurring-delivery projection and reconciliation", long_about = None)]
struct Cli {
    /// Team snapshot JSON file (takes precedence over the API)
    #[arg(long, env = "RECURRA_DATA", global = true)]
    data: Option<PathBuf>,

    /// API endpoint URL
    #[arg(long, env = "RECURRA_API_URL", global = true)]
    api_url: Option<String>,

    /// API key for authentication
    #[arg(long, env = "RECURRA_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    /// Team ID
    #[arg(long, env = "RECURRA_TEAM_ID", global = true)]
    team_id: Option<String>,

    /// Report configuration TOML
    #[arg(long, env = "RECURRA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    format: Option<output::OutputFormat>,

    /// Profile name from config file
    #[arg(long, short, global = true)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Financial report for a period
    Report {
        #[command(flatten)]
        period: PeriodArgs,
    },
    /// Projected deliveries in a date range
    Deliveries {
        #[command(flatten)]
        range: RangeArgs,
    },
    /// Production quantities per day and product
    Production {
        #[command(flatten)]
        range: RangeArgs,
        /// Show per-customer shipping stops instead
        #[arg(long)]
        shipping: bool,
    },
    /// Write CSV exports
    Export {
        #[command(subcommand)]
        action: ExportCommands,
    },
    /// Configure CLI
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(clap::Args)]
pub struct PeriodArgs {
    /// daily, weekly, monthly, quarterly, semestral or yearly
    #[arg(long, default_value = "monthly")]
    period: PeriodKind,
    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
    /// Override the configured segmentation (equal-split or projected)
    #[arg(long)]
    segmentation: Option<SegmentationMode>,
}

#[derive(clap::Args)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD)
    #[arg(long)]
    from: String,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: String,
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Financial report
    Report {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Delivery events
    Deliveries {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Production lines
    Production {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the active profile
    Show,
    /// Set the API endpoint URL
    SetApiUrl { url: String },
    /// Set the default team
    SetTeam { id: String },
    /// Set the default output format
    SetFormat { value: output::OutputFormat },
}

/// Everything a data command needs
pub struct Context {
    pub source: commands::SnapshotSource,
    pub report_config: ReportConfig,
    pub format: output::OutputFormat,
}

fn build_context(cli: &Cli, profile: config::Config) -> Result<Context, String> {
    let format = cli
        .format
        .or_else(|| output::OutputFormat::from_profile(profile.default_format.as_deref()))
        .unwrap_or(output::OutputFormat::Table);

    let report_config = match cli.config.as_ref().or(profile.report_config.as_ref()) {
        Some(path) => ReportConfig::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => ReportConfig::default(),
    };

    let source = match &cli.data {
        Some(path) => commands::SnapshotSource::File(path.clone()),
        None => {
            let api_url = cli
                .api_url
                .clone()
                .or(profile.api_url)
                .ok_or("No data source: pass --data FILE or configure an API URL")?;
            let team = cli.team_id.clone().or(profile.team_id).ok_or("No team: pass --team-id")?;
            let team_id = Uuid::parse_str(&team).map_err(|e| format!("Invalid team id '{}': {}", team, e))?;
            let api_key = cli.api_key.clone().or(profile.api_key);
            commands::SnapshotSource::Api {
                client: commands::ApiClient::new(&api_url, api_key.as_deref()),
                team_id,
            }
        }
    };

    Ok(Context { source, report_config, format })
}

async fn run(cli: Cli) -> Result<(), String> {
    if let Commands::Config { action } = cli.command {
        return commands::config::handle(action, cli.profile.as_deref());
    }

    let profile = config::Config::load(cli.profile.as_deref()).unwrap_or_default();
    let ctx = build_context(&cli, profile)?;

    match cli.command {
        Commands::Report { period } => commands::report::handle(&period, &ctx).await,
        Commands::Deliveries { range } => commands::deliveries::handle(&range, &ctx).await,
        Commands::Production { range, shipping } => commands::production::handle(&range, shipping, &ctx).await,
        Commands::Export { action } => commands::export::handle(action, &ctx).await,
        Commands::Config { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

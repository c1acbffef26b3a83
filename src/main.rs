use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use route_panel::logging::{self, LogOptions};
use route_panel::panel_config::CyclePolicy;
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "route-panel")]
#[command(version, about = "Delivery route panel for Jira issues")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Path to route-panel.toml. Defaults to .route-panel/route-panel.toml in the project.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Jira base URL. Overrides route-panel.toml and JIRA_BASE_URL.
    #[arg(long, global = true)]
    pub jira_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load an issue once and render its route panel
    Show {
        /// Issue key, e.g. HAUL-42
        key: String,

        /// Open the directions link in the browser when a route is available
        #[arg(long)]
        open: bool,

        /// Print the panel state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep the route panel open and refresh it whenever the issue changes
    Watch {
        key: String,

        /// Seconds between change checks
        #[arg(long)]
        poll_interval: Option<u64>,

        /// What to do with a fetch that finishes after a newer one started: overlap, latest
        #[arg(long)]
        cycle_policy: Option<CyclePolicy>,
    },
    /// Print the route for an issue as JSON, or null if it has none
    Resolve { key: String },
    /// Build a Google Maps directions link between two addresses
    Link {
        start: String,
        end: String,

        /// Open the link in the browser
        #[arg(long)]
        open: bool,

        /// Decode the built link and verify it carries the addresses unchanged
        #[arg(long)]
        check: bool,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default route-panel.toml file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _log_guard = logging::init(&LogOptions {
        verbose: cli.verbose,
        json: cli.log_json,
        file: cli.log_file.clone(),
    })?;

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Show { key, open, json } => {
            cmd::cmd_show(&cli, &project_dir, key, *open, *json).await?
        }
        Commands::Watch {
            key,
            poll_interval,
            cycle_policy,
        } => cmd::cmd_watch(&cli, &project_dir, key, *poll_interval, *cycle_policy).await?,
        Commands::Resolve { key } => cmd::cmd_resolve(&cli, &project_dir, key).await?,
        Commands::Link {
            start,
            end,
            open,
            check,
        } => cmd::cmd_link(start, end, *open, *check)?,
        Commands::Config { command } => cmd::cmd_config(&cli, &project_dir, command.clone())?,
    }

    Ok(())
}

//! CLI command implementations.
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `show`    | `Show`           |
//! | `watch`   | `Watch`          |
//! | `resolve` | `Resolve`        |
//! | `link`    | `Link`           |
//! | `config`  | `Config`         |

pub mod config;
pub mod link;
pub mod resolve;
pub mod show;
pub mod watch;

pub use config::cmd_config;
pub use link::cmd_link;
pub use resolve::cmd_resolve;
pub use show::cmd_show;
pub use watch::cmd_watch;

use anyhow::{Context, Result};
use std::path::Path;

use super::Cli;

/// Build the runtime config from file, environment and the global CLI flags.
pub fn load_config(
    cli: &Cli,
    project_dir: &Path,
    mut overrides: route_panel::config::CliOverrides,
) -> Result<route_panel::config::Config> {
    use route_panel::config::Config;

    if overrides.jira_url.is_none() {
        overrides.jira_url = cli.jira_url.clone();
    }
    Config::new(project_dir, cli.config.clone(), overrides)
}

/// Build the Jira client for a loaded config.
pub fn jira_client(config: &route_panel::config::Config) -> Result<route_panel::jira::JiraClient> {
    use route_panel::jira::JiraClient;

    JiraClient::new(&config.jira, config.fields.clone()).context("Failed to create Jira client")
}

/// Reject keys the tracker could never accept before touching the network.
pub fn check_issue_key(key: &str) -> Result<()> {
    use route_panel::jira::is_valid_issue_key;

    if !is_valid_issue_key(key) {
        anyhow::bail!(
            "Invalid issue key '{}'. Expected a key like HAUL-42 or a numeric issue id.",
            key
        );
    }
    Ok(())
}

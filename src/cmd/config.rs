//! Configuration view and validation commands: `route-panel config`.

use anyhow::Result;
use std::path::Path;

use super::super::{Cli, ConfigCommands};

pub fn cmd_config(cli: &Cli, project_dir: &Path, command: Option<ConfigCommands>) -> Result<()> {
    use route_panel::config::{JiraAuth, default_config_path, resolve_config_path};
    use route_panel::panel_config::{ENV_API_TOKEN, PanelToml};

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => match command {
            Some(ConfigCommands::Init) => default_config_path(project_dir),
            _ => resolve_config_path(project_dir),
        },
    };

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Route Panel Configuration");
            println!("=========================");
            println!();

            let toml = if config_path.exists() {
                println!("Config file: {}", config_path.display());
                PanelToml::load(&config_path)?
            } else {
                println!("No route-panel.toml found at {}", config_path.display());
                println!("Using default configuration.");
                PanelToml::default()
            };
            println!();

            println!("[jira]");
            if let Some(url) = &toml.jira.base_url {
                println!("  base_url = \"{}\"", url);
            }
            if let Some(email) = &toml.jira.email {
                println!("  email = \"{}\"", email);
            }
            if let Some(filter) = &toml.jira.site_filter {
                println!("  site_filter = \"{}\"", filter);
            }
            println!("  timeout_secs = {}", toml.jira.timeout_secs);
            println!();

            println!("[fields]");
            println!("  pickup = \"{}\"", toml.fields.pickup);
            println!("  delivery = \"{}\"", toml.fields.delivery);
            println!();

            println!("[panel]");
            println!("  cycle_policy = \"{}\"", toml.panel.cycle_policy);
            println!("  poll_interval_secs = {}", toml.panel.poll_interval_secs);
            println!();

            // Effective values include the environment and --jira-url
            println!("Effective values (with env/CLI overrides):");
            let base_url = cli.jira_url.clone().or_else(|| toml.base_url());
            match base_url {
                Some(url) => println!("  base_url = \"{}\"", url),
                None => println!("  base_url = (not set)"),
            }
            let token = std::env::var(ENV_API_TOKEN).ok().filter(|t| !t.trim().is_empty());
            println!("  auth = {}", JiraAuth::from_parts(toml.email(), token).scheme());
            println!();

            if !config_path.exists() {
                println!("Run 'route-panel config init' to create a route-panel.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let toml = if config_path.exists() {
                PanelToml::load(&config_path)?
            } else {
                println!("No route-panel.toml found. Checking defaults and environment.");
                PanelToml::default()
            };
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("route-panel.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            PanelToml::default().save(&config_path)?;

            println!("Created route-panel.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [jira] base_url, email, site_filter, timeout_secs");
            println!("  - [fields] pickup, delivery");
            println!("  - [panel] cycle_policy, poll_interval_secs");
            println!();
            println!("The API token is read from {}.", ENV_API_TOKEN);
            println!();
        }
    }

    Ok(())
}

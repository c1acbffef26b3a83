//! Route lookup as JSON: `route-panel resolve <KEY>`.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use super::super::Cli;

pub async fn cmd_resolve(cli: &Cli, project_dir: &Path, key: &str) -> Result<()> {
    use route_panel::config::CliOverrides;
    use route_panel::resolver::Resolver;

    super::check_issue_key(key)?;
    let config = super::load_config(cli, project_dir, CliOverrides::default())?;
    let resolver = Resolver::new(Arc::new(super::jira_client(&config)?));

    let resolution = resolver
        .fetch_issue_details(key)
        .await
        .with_context(|| format!("Failed to resolve route for {}", key))?;
    println!("{}", resolution.to_json());
    Ok(())
}

//! One-shot panel render: `route-panel show <KEY>`.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use super::super::Cli;

pub async fn cmd_show(cli: &Cli, project_dir: &Path, key: &str, open: bool, json: bool) -> Result<()> {
    use route_panel::config::CliOverrides;
    use route_panel::link;
    use route_panel::panel::{IssueEvents, PanelController};
    use route_panel::ui::{render, render_json};

    super::check_issue_key(key)?;
    let config = super::load_config(cli, project_dir, CliOverrides::default())?;
    let client = Arc::new(super::jira_client(&config)?);

    let events = IssueEvents::default();
    let mut panel = PanelController::new(key, client, config.cycle_policy);
    panel.mount(&events).await;
    let state = panel.settle_current().await;
    panel.teardown();

    if json {
        println!("{}", serde_json::to_string_pretty(&render_json(&state, key))?);
    } else {
        println!("{}", render(&state, key));
    }

    if open {
        match state.candidate() {
            Some(candidate) => {
                let url = link::build(&candidate.start, &candidate.end);
                if !url.is_empty() {
                    super::link::open_in_browser(&url)?;
                }
            }
            None => eprintln!("No route available for {}; nothing to open.", key),
        }
    }

    Ok(())
}

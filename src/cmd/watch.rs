//! Live panel: `route-panel watch <KEY>`.
//!
//! Polls the issue for changes and re-renders on every state the controller
//! publishes, until Ctrl-C.

use anyhow::Result;
use console::style;
use std::path::Path;
use std::sync::Arc;

use super::super::Cli;

pub async fn cmd_watch(
    cli: &Cli,
    project_dir: &Path,
    key: &str,
    poll_interval: Option<u64>,
    cycle_policy: Option<route_panel::panel_config::CyclePolicy>,
) -> Result<()> {
    use route_panel::config::CliOverrides;
    use route_panel::panel::{ChangePoller, IssueEvents, PanelController};
    use route_panel::ui::render;

    super::check_issue_key(key)?;
    let overrides = CliOverrides {
        poll_interval_secs: poll_interval,
        cycle_policy,
        ..Default::default()
    };
    let config = super::load_config(cli, project_dir, overrides)?;
    let client = Arc::new(super::jira_client(&config)?);

    let events = IssueEvents::default();
    let _poller =
        ChangePoller::new(client.clone(), events.clone(), key, config.poll_interval).spawn();

    let mut panel = PanelController::new(key, client, config.cycle_policy);
    let mut view = panel.watch();
    let issue = key.to_string();
    let printer = tokio::spawn(async move {
        loop {
            let state = view.borrow_and_update().clone();
            println!("{}\n", render(&state, &issue));
            if view.changed().await.is_err() {
                break;
            }
        }
    });

    println!(
        "{}",
        style(format!(
            "Watching {} every {}s (cycle policy: {}). Press Ctrl-C to stop.",
            key,
            config.poll_interval.as_secs(),
            config.cycle_policy
        ))
        .dim()
    );

    panel.mount(&events).await;
    panel
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    // Dropping the controller closes the state channel and ends the printer.
    drop(panel);
    let _ = printer.await;
    Ok(())
}

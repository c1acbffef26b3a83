//! Terminal rendering of the panel view state.

use console::style;
use serde_json::{Value, json};

use crate::link;
use crate::panel::ViewState;
use crate::ui::icons::{CROSS, DELIVERY, HOURGLASS, INFO, MAP, PICKUP};

pub const NOT_APPLICABLE_HINT: &str =
    "Requires \"Planned\" or \"Ready for pick up\" status and valid addresses.";

const LOADING_TEXT: &str = "Loading route data...";
const ERROR_HEADING: &str = "Error loading route data";

/// Render the panel for `issue_key` as styled terminal text.
pub fn render(state: &ViewState, issue_key: &str) -> String {
    let header = format!("{} {}", style("Route").bold(), style(issue_key).dim());
    let body = match state {
        ViewState::Loading => format!("{}{}", HOURGLASS, style(LOADING_TEXT).dim()),
        ViewState::NotApplicable => format!("{}{}", INFO, style(NOT_APPLICABLE_HINT).dim()),
        ViewState::Error { message } => format!(
            "{}{}\n   {}",
            CROSS,
            style(ERROR_HEADING).red().bold(),
            message
        ),
        ViewState::Ready(candidate) => {
            let mut lines = Vec::new();
            let url = link::build(&candidate.start, &candidate.end);
            if !url.is_empty() {
                lines.push(format!(
                    "{}{} {}",
                    MAP,
                    style("Open in Google Maps:").green().bold(),
                    style(url).underlined()
                ));
            }
            lines.push(format!("{}Pickup:   {}", PICKUP, candidate.start));
            lines.push(format!("{}Delivery: {}", DELIVERY, candidate.end));
            lines.join("\n")
        }
    };
    format!("{}\n{}", header, body)
}

/// Machine-readable form of the panel: the tagged state plus the link when ready.
pub fn render_json(state: &ViewState, issue_key: &str) -> Value {
    let mut value = json!({ "issue": issue_key });
    if let (Value::Object(out), Ok(Value::Object(fields))) =
        (&mut value, serde_json::to_value(state))
    {
        out.extend(fields);
        if let Some(candidate) = state.candidate() {
            let url = link::build(&candidate.start, &candidate.end);
            if !url.is_empty() {
                out.insert("link".to_string(), Value::String(url));
            }
        }
    }
    value
}

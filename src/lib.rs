pub mod config;
pub mod errors;
pub mod gate;
pub mod jira;
pub mod link;
pub mod logging;
pub mod panel;
pub mod panel_config;
pub mod resolver;
pub mod source;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use route_panel_common::{AddressFields, GateResult, IssueSnapshot, RouteCandidate};

//! File-backed configuration for the route panel.
//!
//! Reads `.route-panel/route-panel.toml` from the project directory. Every
//! section is optional and falls back to defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [jira]
//! base_url = "https://example.atlassian.net"
//! email = "dispatcher@example.com"
//! site_filter = "example.atlassian.net"
//! timeout_secs = 15
//!
//! [fields]
//! pickup = "customfield_10062"
//! delivery = "customfield_10063"
//!
//! [panel]
//! cycle_policy = "overlap"
//! poll_interval_secs = 15
//! ```
//!
//! The API token is never read from this file; it comes from `JIRA_API_TOKEN`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding route panel state inside a project.
pub const PANEL_DIR: &str = ".route-panel";

/// Configuration file name inside [`PANEL_DIR`].
pub const CONFIG_FILE: &str = "route-panel.toml";

pub const ENV_BASE_URL: &str = "JIRA_BASE_URL";
pub const ENV_EMAIL: &str = "JIRA_EMAIL";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";

/// Path of the panel directory for a project.
pub fn get_panel_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(PANEL_DIR)
}

/// How the panel treats a fetch cycle that completes after a newer one started.
///
/// | Policy    | Behavior                                                     |
/// |-----------|--------------------------------------------------------------|
/// | `Overlap` | Every completion is applied; the last response to arrive wins |
/// | `Latest`  | Completions from cycles older than the newest are discarded   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CyclePolicy {
    #[default]
    Overlap,
    Latest,
}

impl std::fmt::Display for CyclePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CyclePolicy::Overlap => write!(f, "overlap"),
            CyclePolicy::Latest => write!(f, "latest"),
        }
    }
}

impl std::str::FromStr for CyclePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overlap" => Ok(CyclePolicy::Overlap),
            "latest" => Ok(CyclePolicy::Latest),
            _ => anyhow::bail!("Invalid cycle policy '{}'. Valid values: overlap, latest", s),
        }
    }
}

/// Jira connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSection {
    /// Site base URL, e.g. `https://example.atlassian.net`
    #[serde(default)]
    pub base_url: Option<String>,
    /// Account email for Basic authentication with an API token
    #[serde(default)]
    pub email: Option<String>,
    /// Only show the panel when the site host contains this string
    #[serde(default)]
    pub site_filter: Option<String>,
    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for JiraSection {
    fn default() -> Self {
        Self {
            base_url: None,
            email: None,
            site_filter: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Tracker field identifiers for the two address fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(default = "default_pickup_field")]
    pub pickup: String,
    #[serde(default = "default_delivery_field")]
    pub delivery: String,
}

fn default_pickup_field() -> String {
    "customfield_10062".to_string()
}

fn default_delivery_field() -> String {
    "customfield_10063".to_string()
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            pickup: default_pickup_field(),
            delivery: default_delivery_field(),
        }
    }
}

/// Panel behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSection {
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
    /// How often `watch` polls the issue for changes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    15
}

impl Default for PanelSection {
    fn default() -> Self {
        Self {
            cycle_policy: CyclePolicy::default(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// The complete route-panel.toml structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelToml {
    #[serde(default)]
    pub jira: JiraSection,
    #[serde(default)]
    pub fields: FieldMapping,
    #[serde(default)]
    pub panel: PanelSection,
}

impl PanelToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse route-panel.toml")
    }

    /// Load from `path`, or return defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content =
            toml::to_string_pretty(self).context("Failed to serialize route-panel.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Jira base URL; the environment overrides the file.
    pub fn base_url(&self) -> Option<String> {
        non_empty_env(ENV_BASE_URL).or_else(|| self.jira.base_url.clone())
    }

    /// Account email; the environment overrides the file.
    pub fn email(&self) -> Option<String> {
        non_empty_env(ENV_EMAIL).or_else(|| self.jira.email.clone())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match self.base_url() {
            None => warnings.push(format!(
                "No Jira base URL configured: set [jira].base_url or {}",
                ENV_BASE_URL
            )),
            Some(url) => {
                if let Err(e) = url::Url::parse(&url) {
                    warnings.push(format!("Invalid Jira base URL '{}': {}", url, e));
                }
            }
        }

        if self.jira.timeout_secs == 0 {
            warnings.push("[jira].timeout_secs must be greater than zero".to_string());
        }

        if self.fields.pickup.trim().is_empty() {
            warnings.push("[fields].pickup must name a tracker field".to_string());
        }
        if self.fields.delivery.trim().is_empty() {
            warnings.push("[fields].delivery must name a tracker field".to_string());
        }
        if self.fields.pickup == self.fields.delivery {
            warnings.push(format!(
                "[fields].pickup and [fields].delivery are both '{}'",
                self.fields.pickup
            ));
        }

        if self.panel.poll_interval_secs == 0 {
            warnings.push("[panel].poll_interval_secs must be greater than zero".to_string());
        }

        warnings
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

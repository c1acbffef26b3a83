use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::panel_config::{
    CONFIG_FILE, CyclePolicy, ENV_API_TOKEN, FieldMapping, PanelToml, get_panel_dir,
};

/// How requests to Jira are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum JiraAuth {
    /// Jira Cloud: account email plus API token.
    Basic { email: String, token: String },
    /// Data Center personal access token.
    Bearer { token: String },
    Anonymous,
}

impl JiraAuth {
    /// Pick an auth scheme from what is available.
    pub fn from_parts(email: Option<String>, token: Option<String>) -> Self {
        match (email, token) {
            (Some(email), Some(token)) => JiraAuth::Basic { email, token },
            (None, Some(token)) => JiraAuth::Bearer { token },
            _ => JiraAuth::Anonymous,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            JiraAuth::Basic { .. } => "basic",
            JiraAuth::Bearer { .. } => "bearer",
            JiraAuth::Anonymous => "anonymous",
        }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for JiraAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JiraAuth::Basic { email, .. } => f
                .debug_struct("Basic")
                .field("email", email)
                .field("token", &"<redacted>")
                .finish(),
            JiraAuth::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"<redacted>")
                .finish(),
            JiraAuth::Anonymous => write!(f, "Anonymous"),
        }
    }
}

/// Resolved connection settings for the Jira adapter.
#[derive(Debug, Clone)]
pub struct JiraConnection {
    pub base_url: Url,
    pub auth: JiraAuth,
    pub site_filter: Option<String>,
    pub timeout: Duration,
}

/// Values supplied on the command line; they win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub jira_url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub cycle_policy: Option<CyclePolicy>,
}

/// Runtime configuration for the route panel.
///
/// Bridges `PanelToml` with the environment and CLI flags, in that order of
/// precedence from lowest to highest.
#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub jira: JiraConnection,
    pub fields: FieldMapping,
    pub cycle_policy: CyclePolicy,
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(
        project_dir: &Path,
        config_path: Option<PathBuf>,
        overrides: CliOverrides,
    ) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(|| resolve_config_path(project_dir));
        let toml = PanelToml::load_or_default(&config_path)?;
        Self::from_toml(config_path, toml, overrides)
    }

    pub fn from_toml(
        config_path: PathBuf,
        toml: PanelToml,
        overrides: CliOverrides,
    ) -> Result<Self> {
        let raw_url = overrides.jira_url.or_else(|| toml.base_url()).ok_or_else(|| {
            anyhow!(
                "No Jira base URL configured. Set [jira].base_url in {}, JIRA_BASE_URL, or pass --jira-url",
                config_path.display()
            )
        })?;
        let base_url = Url::parse(&raw_url)
            .with_context(|| format!("Invalid Jira base URL '{}'", raw_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Jira base URL '{}' cannot be used as a base", raw_url);
        }

        let token = std::env::var(ENV_API_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty());
        let auth = JiraAuth::from_parts(toml.email(), token);

        let poll_secs = overrides
            .poll_interval_secs
            .unwrap_or(toml.panel.poll_interval_secs)
            .max(1);

        Ok(Self {
            config_path,
            jira: JiraConnection {
                base_url,
                auth,
                site_filter: toml.jira.site_filter.clone(),
                timeout: Duration::from_secs(toml.jira.timeout_secs.max(1)),
            },
            fields: toml.fields.clone(),
            cycle_policy: overrides.cycle_policy.unwrap_or(toml.panel.cycle_policy),
            poll_interval: Duration::from_secs(poll_secs),
        })
    }
}

/// Default location of the config file for a project.
pub fn default_config_path(project_dir: &Path) -> PathBuf {
    get_panel_dir(project_dir).join(CONFIG_FILE)
}

/// Per-user config file, shared by every project.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("route-panel").join(CONFIG_FILE))
}

/// The project config if it exists, else the per-user config if that exists,
/// else the project path (which then loads as defaults).
pub fn resolve_config_path(project_dir: &Path) -> PathBuf {
    let project = default_config_path(project_dir);
    if project.exists() {
        return project;
    }
    match user_config_path() {
        Some(user) if user.exists() => user,
        _ => project,
    }
}

//! Client configuration.

use anyhow::Result;
use jobwatch_core::{QueryFailurePolicy, StatusPoller};
use jobwatch_types::JobRef;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the job web application.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Websocket endpoint prefix; the job id is appended.
    #[serde(default = "default_ws_base")]
    pub ws_base: String,
    /// Subscription query sent with the websocket url.
    #[serde(default = "default_ws_type")]
    pub ws_type: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub query_failure_policy: QueryFailurePolicy,
    #[serde(default)]
    pub max_query_failures: Option<u32>,
    /// Raw `Cookie` header sent with every request (session authentication).
    #[serde(default)]
    pub cookie: Option<String>,
    /// Echo progress-token lines in the log as well as updating their bar.
    #[serde(default)]
    pub show_progress_lines: bool,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_ws_base() -> String {
    "ws://localhost:8000/ws/".to_string()
}

fn default_ws_type() -> String {
    "subscribe-user".to_string()
}

fn default_poll_interval_secs() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_base: default_ws_base(),
            ws_type: default_ws_type(),
            poll_interval_secs: default_poll_interval_secs(),
            query_failure_policy: QueryFailurePolicy::default(),
            max_query_failures: None,
            cookie: None,
            show_progress_lines: false,
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from config/default.toml, then the user config dir, or fall back to defaults.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("config/default.toml");
        if local.exists() {
            return Self::load_from(&local);
        }

        if let Some(user) = user_config_path() {
            if user.exists() {
                return Self::load_from(&user);
            }
        }

        Ok(Config::default())
    }

    /// Websocket url streaming the log of `job`.
    pub fn ws_url(&self, job: &JobRef) -> String {
        format!("{}{}?{}", self.ws_base, job.job_id, self.ws_type)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poller(&self) -> StatusPoller {
        StatusPoller::new(self.poll_interval())
            .with_failure_policy(self.query_failure_policy, self.max_query_failures)
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jobwatch").join("config.toml"))
}

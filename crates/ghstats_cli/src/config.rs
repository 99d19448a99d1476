//! Configuration file support for ghstats.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. `ACCESS_TOKEN` / `GITHUB_ACTOR` environment variables
//! 2. Environment variables prefixed with `GHSTATS_`, using `__` between
//!    section and key (e.g. `GHSTATS_TRANSPORT__MAX_CONNECTIONS`)
//! 3. A file passed with `--config`
//! 4. Local config file (./ghstats.toml)
//! 5. XDG config file (~/.config/ghstats/config.toml)
//! 6. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [github]
//! token = "ghp_..."   # or use ACCESS_TOKEN
//! actor = "octocat"   # or use GITHUB_ACTOR
//! api_url = "https://api.github.com"
//!
//! [transport]
//! max_connections = 10
//! rest_max_attempts = 60
//! rest_retry_delay_secs = 2
//! request_timeout_secs = 30
//!
//! [report]
//! template = "model.md"
//! output = "README.md"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use ghstats::{ConcurrencyGate, DEFAULT_API_URL, DEFAULT_MAX_CONNECTIONS, RetryConfig};
use ghstats::retry::{REST_MAX_ATTEMPTS, REST_RETRY_DELAY_SECS};
use serde::Deserialize;

/// Variable holding the API token.
pub const TOKEN_VAR: &str = "ACCESS_TOKEN";
/// Variable holding the GitHub login.
pub const ACTOR_VAR: &str = "GITHUB_ACTOR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{} must be set", .missing.join(" and "))]
    MissingCredentials { missing: Vec<&'static str> },
}

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub transport: TransportConfig,
    pub report: ReportConfig,
}

/// GitHub configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API token. Overridden by `ACCESS_TOKEN`.
    pub token: Option<String>,
    /// Login of the account to report on. Overridden by `GITHUB_ACTOR`.
    pub actor: Option<String>,
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            actor: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

/// Request layer tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Maximum requests in flight at once.
    pub max_connections: usize,
    /// Attempts per REST request while GitHub answers `202 Accepted`.
    pub rest_max_attempts: usize,
    pub rest_retry_delay_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            rest_max_attempts: REST_MAX_ATTEMPTS,
            rest_retry_delay_secs: REST_RETRY_DELAY_SECS,
            request_timeout_secs: 30,
        }
    }
}

impl TransportConfig {
    pub fn gate(&self) -> ConcurrencyGate {
        ConcurrencyGate::new(self.max_connections)
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::new(
            Duration::from_secs(self.rest_retry_delay_secs),
            self.rest_max_attempts,
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Report template and output paths.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub template: PathBuf,
    pub output: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("model.md"),
            output: PathBuf::from("README.md"),
        }
    }
}

/// Validated credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub actor: String,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// A configuration that fails to build or deserialize is logged and
    /// replaced by the defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("ghstats.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./ghstats.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        if let Some(path) = explicit {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        // e.g. GHSTATS_TRANSPORT__MAX_CONNECTIONS -> transport.max_connections
        builder = builder.add_source(
            Environment::with_prefix("GHSTATS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.apply_legacy_env(|name| std::env::var(name).ok());
        config
    }

    /// Override the token and actor from `ACCESS_TOKEN` and `GITHUB_ACTOR`.
    ///
    /// Empty values are ignored.
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v: &String| !v.trim().is_empty());

        if let Some(token) = non_empty(TOKEN_VAR) {
            self.github.token = Some(token);
        }
        if let Some(actor) = non_empty(ACTOR_VAR) {
            self.github.actor = Some(actor);
        }
    }

    /// The token and actor, or the names of the variables still missing.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        match (present(&self.github.token), present(&self.github.actor)) {
            (Some(token), Some(actor)) => Ok(Credentials {
                token: token.to_string(),
                actor: actor.to_string(),
            }),
            (token, actor) => {
                let mut missing = Vec::new();
                if token.is_none() {
                    missing.push(TOKEN_VAR);
                }
                if actor.is_none() {
                    missing.push(ACTOR_VAR);
                }
                Err(ConfigError::MissingCredentials { missing })
            }
        }
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ghstats").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

//! Bridge configuration.
//!
//! Settings are resolved once at startup, in priority order: command line
//! flag (or its environment variable), then the optional TOML config file,
//! then built-in defaults. The result is an immutable [`BridgeConfig`] that
//! the handler receives at construction.

use std::env;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

/// Default Todoist REST API base URL.
pub const DEFAULT_API_BASE_URL: &str = todoist_api_rs::client::BASE_URL;

/// Default listen address.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

/// Default per-request timeout for Todoist calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no shared secret configured (set TASK_PUSH_SECRET or `secret` in the config file)")]
    MissingSecret,

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid listen address '{0}'")]
    InvalidListenAddr(String),
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Contents of the TOML config file. Every key is optional.
///
/// ```toml
/// secret = "shared-secret"
/// token = "todoist-api-token"
/// default_project_id = "2203306141"
/// api_base_url = "https://api.todoist.com/rest/v2"
/// listen = "0.0.0.0:3000"
/// timeout_secs = 30
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub secret: Option<String>,
    pub token: Option<String>,
    pub default_project_id: Option<String>,
    pub api_base_url: Option<String>,
    pub listen: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Process-wide settings, fixed at startup.
#[derive(Clone)]
pub struct BridgeConfig {
    shared_secret: String,
    todoist_token: Option<String>,
    default_project_id: Option<String>,
    api_base_url: String,
    listen_addr: SocketAddr,
    request_timeout: Duration,
}

impl BridgeConfig {
    /// Creates a config with the given secret and defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecret`] if the secret is empty.
    pub fn new(shared_secret: impl Into<String>) -> Result<Self> {
        let shared_secret = shared_secret.into();
        if shared_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self {
            shared_secret,
            todoist_token: None,
            default_project_id: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            listen_addr: parse_listen_addr(DEFAULT_LISTEN_ADDR)?,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Sets the Todoist token. An empty token counts as none.
    pub fn with_todoist_token(mut self, token: impl Into<String>) -> Self {
        self.todoist_token = non_empty(Some(token.into()));
        self
    }

    /// Sets the fallback project id. An empty id counts as none.
    pub fn with_default_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.default_project_id = non_empty(Some(project_id.into()));
        self
    }

    pub fn with_api_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Resolves the config from CLI/env values and the config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_file(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::from_sources(cli, file)
    }

    /// Merges CLI/env values over file values over defaults.
    pub fn from_sources(cli: &Cli, file: FileConfig) -> Result<Self> {
        let secret = non_empty(cli.secret.clone().or(file.secret)).ok_or(ConfigError::MissingSecret)?;

        let mut config = Self::new(secret)?;
        config.todoist_token = non_empty(cli.token.clone().or(file.token));
        config.default_project_id =
            non_empty(cli.default_project_id.clone().or(file.default_project_id));

        if let Some(base_url) = non_empty(cli.api_base_url.clone().or(file.api_base_url)) {
            config.api_base_url = base_url;
        }
        if let Some(listen) = cli.listen.clone().or(file.listen) {
            config.listen_addr = parse_listen_addr(&listen)?;
        }
        if let Some(secs) = cli.timeout_secs.or(file.timeout_secs) {
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Returns the shared secret callers must present.
    pub fn shared_secret(&self) -> &str {
        &self.shared_secret
    }

    /// Returns the Todoist token, if configured.
    pub fn todoist_token(&self) -> Option<&str> {
        self.todoist_token.as_deref()
    }

    /// Returns the fallback project id, if configured.
    pub fn default_project_id(&self) -> Option<&str> {
        self.default_project_id.as_deref()
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("shared_secret", &"[REDACTED]")
            .field(
                "todoist_token",
                &self.todoist_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("default_project_id", &self.default_project_id)
            .field("api_base_url", &self.api_base_url)
            .field("listen_addr", &self.listen_addr)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Reads and parses a TOML config file.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Default config file location: `$XDG_CONFIG_HOME/task-bridge/config.toml`,
/// falling back to `~/.config/task-bridge/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("task-bridge").join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("task-bridge")
            .join("config.toml")
    })
}

fn parse_listen_addr(value: &str) -> Result<SocketAddr> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidListenAddr(value.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

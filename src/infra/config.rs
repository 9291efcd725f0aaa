use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::clients::quickitquote::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Which adapter answers at `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Ndjson,
    Json,
    Sse,
}

impl std::str::FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ndjson" => Ok(TransportKind::Ndjson),
            "json" => Ok(TransportKind::Json),
            "sse" => Ok(TransportKind::Sse),
            other => Err(ConfigError::Invalid(format!(
                "Invalid ROOT_TRANSPORT: {other}. Must be 'ndjson', 'json' or 'sse'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: String, // "server" or "stdio"
    pub port: u16,
    pub search_base_url: String,
    pub upstream_timeout_secs: u64,
    pub heartbeat_secs: u64,
    pub root_transport: TransportKind,
    pub reshape_results: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: "server".into(),
            port: 3000,
            search_base_url: DEFAULT_BASE_URL.into(),
            upstream_timeout_secs: 10,
            heartbeat_secs: 15,
            root_transport: TransportKind::Ndjson,
            reshape_results: false,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file named by `CONFIG_FILE`, then environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var("CONFIG_FILE") {
            Ok(path) if !path.trim().is_empty() => Self::from_toml_file(Path::new(&path))?,
            _ => Self::default(),
        };
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Toml { path: shown, source })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(mode) = std::env::var("MODE") {
            self.mode = mode;
        }
        if let Some(port) = env_parsed::<u16>("PORT") {
            self.port = port;
        }
        if let Ok(base) = std::env::var("SEARCH_BASE_URL") {
            if !base.trim().is_empty() {
                self.search_base_url = base;
            }
        }
        if let Some(secs) = env_parsed::<u64>("UPSTREAM_TIMEOUT_SECS") {
            self.upstream_timeout_secs = secs;
        }
        if let Some(secs) = env_parsed::<u64>("SSE_HEARTBEAT_SECS") {
            self.heartbeat_secs = secs;
        }
        if let Ok(kind) = std::env::var("ROOT_TRANSPORT") {
            self.root_transport = kind.parse()?;
        }
        if let Ok(v) = std::env::var("RESHAPE_RESULTS") {
            self.reshape_results = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.mode.as_str(), "server" | "stdio") {
            return Err(ConfigError::Invalid(format!(
                "Invalid MODE: {}. Must be 'server' or 'stdio'",
                self.mode
            )));
        }
        if self.mode == "server" && self.port == 0 {
            return Err(ConfigError::Invalid("PORT cannot be 0".into()));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ConfigError::Invalid("UPSTREAM_TIMEOUT_SECS cannot be 0".into()));
        }
        if self.heartbeat_secs == 0 {
            return Err(ConfigError::Invalid("SSE_HEARTBEAT_SECS cannot be 0".into()));
        }
        Ok(())
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

// Unparseable values fall back to the current setting.
fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse::<T>().ok())
}

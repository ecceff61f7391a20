//! Configuration loading.
//!
//! Settings come from a TOML file (by default `<config dir>/graytail/config.toml`)
//! with command-line values layered on top. Only `baseurl`, `username` and `password`
//! are required; everything else has a default.

use crate::error::{GraytailError, Result};
use crate::poll::{PollSettings, DEFAULT_LOOKBACK, DEFAULT_POLL_INTERVAL};
use crate::query::{Sort, DEFAULT_LIMIT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest accepted `initial_lookback_secs` (ten years).
pub const MAX_LOOKBACK_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Raw file contents; every key is optional so CLI flags can fill the gaps.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub baseurl: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub limit: Option<u32>,
    pub initial_lookback_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| GraytailError::config(e.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => GraytailError::ConfigNotFound {
                path: path.to_path_buf(),
            },
            _ => GraytailError::config(format!("cannot read {}: {e}", path.display())),
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub baseurl: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub baseurl: String,
    pub username: String,
    pub password: String,
    pub poll_interval: Duration,
    pub limit: u32,
    pub initial_lookback: Duration,
    pub request_timeout: Duration,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("graytail").join("config.toml"))
    }

    /// Load the config file and apply `overrides`.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => FileConfig::from_path(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => FileConfig::from_path(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::resolve(file, overrides)
    }

    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self> {
        let baseurl = required("baseurl", overrides.baseurl.clone().or(file.baseurl))?;
        let username = required("username", overrides.username.clone().or(file.username))?;
        let password = required("password", overrides.password.clone().or(file.password))?;

        let poll_interval = file
            .poll_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        if poll_interval.is_zero() {
            return Err(GraytailError::config("poll_interval_ms must be positive"));
        }

        let initial_lookback = match file.initial_lookback_secs {
            Some(secs) if secs > MAX_LOOKBACK_SECS => {
                return Err(GraytailError::config(format!(
                    "initial_lookback_secs must be at most {MAX_LOOKBACK_SECS}"
                )))
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_LOOKBACK,
        };

        Ok(Self {
            baseurl,
            username,
            password,
            poll_interval,
            limit: file.limit.unwrap_or(DEFAULT_LIMIT),
            initial_lookback,
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            log_file: file.log_file,
        })
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: self.poll_interval,
            lookback: self.initial_lookback,
            limit: self.limit,
            sort: Sort::default(),
        }
    }
}

fn required(key: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GraytailError::config(format!("missing required setting `{key}`"))),
    }
}

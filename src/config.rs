//! YAML configuration shared by the CLI and the webhook server.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::endpoint::DomainFilter;
use crate::opnsense::client::DEFAULT_TIMEOUT;
use crate::validation::{ValidationError, validate_base_url, validate_creds};

pub const ENV_BASE_URL: &str = "OPNSENSE_BASEURL";
pub const ENV_CREDS: &str = "OPNSENSE_CREDS";
pub const ENV_LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const ENV_DOMAIN_FILTER: &str = "DOMAIN_FILTER";
pub const ENV_DOMAIN_EXCLUDE: &str = "DOMAIN_EXCLUDE";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("invalid listen address {0:?}")]
    ListenAddr(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub opnsense: OpnsenseConfig,
    #[serde(default)]
    pub listen: ListenConfig,
    /// Domains to match and domains to leave alone.
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(rename = "loglevel", default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpnsenseConfig {
    /// Including the scheme, e.g. https://router.example.fqdn or http://10.0.0.1
    #[serde(rename = "baseurl", default)]
    pub base_url: String,
    /// "apiKey:apiSecret" as issued by OPNsense.
    #[serde(default)]
    pub creds: String,
    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl OpnsenseConfig {
    pub fn timeout(&self) -> Duration {
        self.timeout.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    #[serde(default = "default_listen_addr")]
    pub addr: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            addr: default_listen_addr(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filter: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_listen_addr() -> String {
    ":8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            opnsense: OpnsenseConfig::default(),
            listen: ListenConfig::default(),
            filter: FilterConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Read `path`, overlay the environment, validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut cfg = Self::from_yaml(&raw)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// An empty document yields the defaults.
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Overlay values found through `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.opnsense.base_url = v;
        }
        if let Some(v) = lookup(ENV_CREDS) {
            self.opnsense.creds = v;
        }
        if let Some(v) = lookup(ENV_LISTEN_ADDR) {
            self.listen.addr = v;
        }
        if let Some(v) = lookup(ENV_DOMAIN_FILTER) {
            self.filter.filter = split_list(&v);
        }
        if let Some(v) = lookup(ENV_DOMAIN_EXCLUDE) {
            self.filter.exclude = split_list(&v);
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
    }

    /// Trim trailing newlines off the credentials and check their format.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        self.opnsense.base_url = self.opnsense.base_url.trim_end_matches('\n').to_string();
        self.opnsense.creds = self.opnsense.creds.trim_end_matches('\n').to_string();

        validate_base_url(&self.opnsense.base_url)?;
        validate_creds(&self.opnsense.creds)?;
        Ok(())
    }

    pub fn domain_filter(&self) -> DomainFilter {
        DomainFilter::new(&self.filter.filter, &self.filter.exclude)
    }

    /// Socket address for the webhook server. `:8080` binds every interface.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = self.listen.addr.trim();
        let full = if addr.starts_with(':') {
            format!("0.0.0.0{addr}")
        } else {
            addr.to_string()
        };
        full.parse()
            .map_err(|_| ConfigError::ListenAddr(self.listen.addr.clone()))
    }

    /// Level directive for `tracing_subscriber::EnvFilter`.
    pub fn log_directive(&self) -> String {
        match self.log_level.trim().to_ascii_lowercase().as_str() {
            "" => default_log_level(),
            "warning" => "warn".to_string(),
            other => other.to_string(),
        }
    }

    /// Write as YAML, readable only by the owner.
    pub fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(write_err)?;
        }
        write_private_file(path, yaml.as_bytes()).map_err(write_err)
    }
}

/// `~/.unbound/unbound.yml`, or `/unbound.yml` without a home directory.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".unbound").join("unbound.yml"))
        .unwrap_or_else(|| PathBuf::from("/unbound.yml"))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    std::fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, contents)
}

//! TOML configuration file for the bridge.
//!
//! Every field has a default, so the bridge runs with no file at all.  A full
//! file looks like:
//!
//! ```toml
//! [server]
//! bind_address = "0.0.0.0"
//! port = 8080
//!
//! [discovery]
//! search_target = "roku:ecp"
//! interval_ms = 1000
//! multicast_addr = "239.255.255.250:1900"
//! # address = "http://192.168.1.20:8060/"   # skip the first search
//!
//! [ecp]
//! # request_timeout_ms = 10000             # default: no timeout
//!
//! [logging]
//! level = "info"
//!
//! [routines.netflixhome]
//! steps = ["keypress/home", 3000, "launch/12"]
//! ```
//!
//! Routine steps are either a command path relative to the device base URL
//! or a pause in milliseconds.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{RoutineError, RoutineTable};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "roku-bridge.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `bind_address:port` is not a socket address.
    #[error("invalid listen address {0:?}")]
    InvalidListenAddress(String),

    /// `[discovery] interval_ms` is zero.
    #[error("discovery interval_ms must be at least 1")]
    InvalidInterval,
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub ecp: EcpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// User-defined routines, by route name.
    #[serde(default)]
    pub routines: BTreeMap<String, RoutineConfig>,
}

/// Inbound HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// IP address to bind.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// SSDP discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscoveryConfig {
    /// `ST` header of the search query.
    #[serde(default = "default_search_target")]
    pub search_target: String,
    /// Period between discovery ticks.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Where search queries are sent.
    #[serde(default = "default_multicast_addr")]
    pub multicast_addr: String,
    /// Known device base URL.  When set, no search is sent until it is
    /// replaced by a discovery response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Outbound ECP requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EcpConfig {
    /// Upper bound on one ECP round trip.  Unset means no limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// A user-defined routine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoutineConfig {
    #[serde(default)]
    pub steps: Vec<toml::Value>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_search_target() -> String {
    roku_core::ssdp::ROKU_SEARCH_TARGET.to_string()
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_multicast_addr() -> String {
    roku_core::ssdp::SSDP_MULTICAST_ADDR.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_target: default_search_target(),
            interval_ms: default_interval_ms(),
            multicast_addr: default_multicast_addr(),
            address: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    /// The socket address the HTTP server binds.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let text = format!("{}:{}", self.bind_address, self.port);
        text.parse()
            .map_err(|_| ConfigError::InvalidListenAddress(text))
    }
}

impl DiscoveryConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl EcpConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl BridgeConfig {
    /// Rejects values that parse but cannot run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }

    /// Built-in routines plus every valid user-defined routine.
    ///
    /// A routine with a malformed step is left out; its error is returned
    /// alongside the table so the caller can report it.
    pub fn routine_table(&self) -> (RoutineTable, Vec<RoutineError>) {
        let mut table = RoutineTable::builtin();
        let mut errors = Vec::new();
        for (name, routine) in &self.routines {
            if let Err(e) = table.insert_custom(name, &routine.steps) {
                errors.push(e);
            }
        }
        (table, errors)
    }

    /// The config as a TOML document.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Loads `BridgeConfig` from `path`, returning `BridgeConfig::default()` if
/// the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::InvalidInterval`] for a zero discovery interval.
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: BridgeConfig = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BridgeConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

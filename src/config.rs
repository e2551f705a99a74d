//! Server configuration, loaded from TOML at startup.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid listen address {0}")]
    Address(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Default tracing directive; RUST_LOG still takes precedence.
    pub log_level: String,
    /// Largest inbound text frame accepted, in bytes.
    pub max_frame_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            log_level: "info".into(),
            max_frame_bytes: 64 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }
}

/// Load configuration from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Where the running configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Defaults,
}

/// Result of config discovery. Files that exist but fail to load are kept
/// in `rejected` so they can be reported once logging is up.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: ServerConfig,
    pub source: ConfigSource,
    pub rejected: Vec<ConfigError>,
}

impl LoadedConfig {
    /// Load an explicitly named file; any failure is fatal.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            config: load_config(path)?,
            source: ConfigSource::File(path.to_path_buf()),
            rejected: Vec::new(),
        })
    }

    pub fn log(&self) {
        for e in &self.rejected {
            tracing::warn!(error = %e, "skipped unusable server config");
        }
        match &self.source {
            ConfigSource::File(path) => {
                tracing::info!(path = %path.display(), "loaded server config")
            }
            ConfigSource::Defaults => {
                tracing::info!("no usable sixstones.toml found, using built-in defaults")
            }
        }
    }
}

const DEFAULT_CONFIG_PATHS: [&str; 3] = [
    "sixstones.toml",
    "../sixstones.toml",
    "/etc/sixstones/sixstones.toml",
];

/// Try well-known paths, falling back to the defaults if none is usable.
pub fn load_default_config() -> LoadedConfig {
    let candidates: Vec<&Path> = DEFAULT_CONFIG_PATHS.iter().map(Path::new).collect();
    discover_config(&candidates)
}

/// First candidate that exists and parses wins.
pub fn discover_config(candidates: &[&Path]) -> LoadedConfig {
    let mut rejected = Vec::new();
    for p in candidates {
        if !p.exists() {
            continue;
        }
        match load_config(p) {
            Ok(config) => {
                return LoadedConfig {
                    config,
                    source: ConfigSource::File(p.to_path_buf()),
                    rejected,
                }
            }
            Err(e) => rejected.push(e),
        }
    }
    LoadedConfig {
        config: ServerConfig::default(),
        source: ConfigSource::Defaults,
        rejected,
    }
}

//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration for the citation resolution service: server
//! settings, provider endpoints and credentials, resolution behavior and
//! logging, loaded from a TOML file with environment overrides.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration file (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use citation_resolver::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// External data provider configuration
    pub providers: ProvidersConfig,
    /// Resolution engine behavior
    pub resolution: ResolutionConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable CORS for browser front ends
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// External data provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// User agent sent with outbound requests
    pub user_agent: String,
    /// Request timeout in seconds for all providers
    pub timeout_seconds: u64,
    /// Legislative document archive (GovInfo)
    pub govinfo: GovInfoConfig,
    /// Bill tracking site (GovTrack)
    pub govtrack: GovTrackConfig,
    /// Case-law search engine (CourtListener)
    pub courtlistener: CourtListenerConfig,
    /// Code text service used for existence checks (House OLRC)
    pub uscode: UscodeConfig,
    /// Historical statute datasets (Legisworks)
    pub legisworks: LegisworksConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("citation-resolver/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
            govinfo: GovInfoConfig::default(),
            govtrack: GovTrackConfig::default(),
            courtlistener: CourtListenerConfig::default(),
            uscode: UscodeConfig::default(),
            legisworks: LegisworksConfig::default(),
        }
    }
}

/// GovInfo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovInfoConfig {
    /// API base URL
    pub base_url: String,
}

impl Default for GovInfoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.govinfo.gov".to_string(),
        }
    }
}

/// GovTrack configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovTrackConfig {
    /// Site base URL
    pub base_url: String,
}

impl Default for GovTrackConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.govtrack.us".to_string(),
        }
    }
}

/// CourtListener configuration. Username and password are optional; when
/// absent the case-law integration is disabled and all case-law enrichment
/// becomes a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CourtListenerConfig {
    /// API base URL
    pub base_url: String,
    /// API username
    pub username: Option<String>,
    /// API password
    pub password: Option<String>,
}

impl Default for CourtListenerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.courtlistener.com".to_string(),
            username: None,
            password: None,
        }
    }
}

/// Credentials for a provider requiring authenticated access
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl CourtListenerConfig {
    /// Credentials when both halves are configured
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

/// Code text service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UscodeConfig {
    /// Site base URL
    pub base_url: String,
}

impl Default for UscodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://uscode.house.gov".to_string(),
        }
    }
}

/// Historical statute dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegisworksConfig {
    /// Directory holding the per-volume YAML datasets (`001.yaml`, ...)
    pub data_dir: PathBuf,
}

impl Default for LegisworksConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("legisworks-historical-statutes/data"),
        }
    }
}

/// Resolution engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Upper bound on fixed-point rounds. Termination is guaranteed by the
    /// monotonic checked markers; the cap only guards against a misbehaving
    /// resolver and normal workloads finish in three rounds.
    pub max_rounds: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self { max_rounds: 8 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|e| ResolveError::Config {
                message: format!("failed to read config file {:?}: {}", path, e),
            })?;
            toml::from_str(&content).map_err(|e| ResolveError::Config {
                message: format!("failed to parse config file {:?}: {}", path, e),
            })?
        } else {
            tracing::warn!("configuration file not found: {:?}, using defaults", path);
            Config::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("CITATION_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("CITATION_SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| ResolveError::Config {
                message: "invalid port number in CITATION_SERVER_PORT".to_string(),
            })?;
        }
        if let Ok(username) = std::env::var("COURTLISTENER_USERNAME") {
            self.providers.courtlistener.username = Some(username);
        }
        if let Ok(password) = std::env::var("COURTLISTENER_PASSWORD") {
            self.providers.courtlistener.password = Some(password);
        }
        if let Ok(data_dir) = std::env::var("LEGISWORKS_DATA_DIR") {
            self.providers.legisworks.data_dir = PathBuf::from(data_dir);
        }
        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ResolveError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "port cannot be zero".to_string(),
            });
        }

        if self.providers.timeout_seconds == 0 {
            return Err(ResolveError::ValidationFailed {
                field: "providers.timeout_seconds".to_string(),
                reason: "timeout must be at least one second".to_string(),
            });
        }

        if self.resolution.max_rounds == 0 {
            return Err(ResolveError::ValidationFailed {
                field: "resolution.max_rounds".to_string(),
                reason: "at least one resolution round is required".to_string(),
            });
        }

        let cl = &self.providers.courtlistener;
        if cl.username.is_some() != cl.password.is_some() {
            return Err(ResolveError::ValidationFailed {
                field: "providers.courtlistener".to_string(),
                reason: "username and password must be configured together".to_string(),
            });
        }

        Ok(())
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use common::namespace::DeletePolicy;
use common::object_id::DEFAULT_ENTERPRISE_NUMBER;

pub const APP_NAME: &str = "cdmi";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_HTTP_PORT: u16 = 8542;
pub const DEFAULT_HTTPS_PORT: u16 = 8543;
/// Largest request body accepted (64 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the plain HTTP listener (Basic auth when users are set)
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Port for the HTTPS listener, only started when `tls` is set
    #[serde(default = "default_https_port")]
    pub https_port: u16,
    /// SNMP enterprise number embedded in object ids
    #[serde(default = "default_enterprise_number")]
    pub enterprise_number: u32,
    /// What DELETE does to a container that still has children
    #[serde(default)]
    pub delete_policy: DeletePolicy,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Serve CDMI routes on the HTTP listener without Basic auth.
    ///  Off by default: with no users configured every request gets 401.
    #[serde(default)]
    pub allow_anonymous: bool,
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for log files (stdout only if not set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    // tables last, so the file stays valid TOML
    /// Server certificate, key and client CA for mutual TLS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<TlsConfig>,
    #[serde(default)]
    pub compat: CompatConfig,
    /// Basic auth accounts for the HTTP listener
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM certificate chain presented by the server
    pub cert_path: PathBuf,
    /// PEM private key for `cert_path`
    pub key_path: PathBuf,
    /// PEM bundle of CAs that client certificates must chain to
    pub client_ca_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompatConfig {
    /// Answer 201 instead of 200 when a container PUT updates or
    ///  moves an existing container. Some older CDMI clients expect it.
    #[serde(default)]
    pub created_on_container_put: bool,
}

fn default_http_port() -> u16 {
    DEFAULT_HTTP_PORT
}

fn default_https_port() -> u16 {
    DEFAULT_HTTPS_PORT
}

fn default_enterprise_number() -> u32 {
    DEFAULT_ENTERPRISE_NUMBER
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            https_port: default_https_port(),
            tls: None,
            users: Vec::new(),
            enterprise_number: default_enterprise_number(),
            delete_policy: DeletePolicy::default(),
            compat: CompatConfig::default(),
            max_body_bytes: default_max_body_bytes(),
            allow_anonymous: false,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        self.log_level
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the cdmi directory (~/.cdmi)
    pub cdmi_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the cdmi directory path (custom or default ~/.cdmi)
    pub fn cdmi_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new cdmi state directory
    pub fn init(custom_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let cdmi_dir = Self::cdmi_dir(custom_path)?;
        let config_path = cdmi_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&cdmi_dir)?;

        let config = config.unwrap_or_default();
        config.log_level()?;
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            cdmi_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the cdmi directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let cdmi_dir = Self::cdmi_dir(custom_path)?;
        if !cdmi_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = cdmi_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            cdmi_dir,
            config_path,
            config,
        })
    }

    /// Resolve a path from the config file; relative paths are
    ///  taken relative to the cdmi directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cdmi_dir.join(path)
        }
    }

    /// TLS settings with every path resolved
    pub fn tls(&self) -> Option<TlsConfig> {
        self.config.tls.as_ref().map(|tls| TlsConfig {
            cert_path: self.resolve_path(&tls.cert_path),
            key_path: self.resolve_path(&tls.key_path),
            client_ca_path: self.resolve_path(&tls.client_ca_path),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("cdmi directory not initialized. Run 'cdmi init' first")]
    NotInitialized,

    #[error("cdmi directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

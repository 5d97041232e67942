use std::net::SocketAddr;
use std::path::PathBuf;

use common::prelude::NamespaceConfig;

use crate::state::{AppState, CompatConfig, StateError, TlsConfig, UserConfig};

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Address for the plain HTTP listener
    pub http_addr: SocketAddr,
    /// Address for the mutual-TLS listener; only bound when `tls` is set
    pub https_addr: SocketAddr,
    /// Certificate material for the HTTPS listener, paths already resolved
    pub tls: Option<TlsConfig>,
    /// Basic auth accounts for the HTTP listener
    pub users: Vec<UserConfig>,
    /// Skip Basic auth on the HTTP listener
    pub allow_anonymous: bool,
    /// Largest request body accepted before answering 413
    pub max_body_bytes: usize,

    // namespace configuration
    pub namespace: NamespaceConfig,
    pub compat: CompatConfig,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Build a service config from the on-disk app state
    pub fn from_app_state(state: &AppState) -> Result<Self, StateError> {
        let config = &state.config;
        Ok(Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], config.http_port)),
            https_addr: SocketAddr::from(([0, 0, 0, 0], config.https_port)),
            tls: state.tls(),
            users: config.users.clone(),
            allow_anonymous: config.allow_anonymous,
            max_body_bytes: config.max_body_bytes,
            namespace: NamespaceConfig {
                enterprise_number: config.enterprise_number,
                delete_policy: config.delete_policy,
            },
            compat: config.compat.clone(),
            log_level: config.log_level()?,
            log_dir: config.log_dir.as_deref().map(|dir| state.resolve_path(dir)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;

    #[test]
    fn test_from_app_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::init(
            Some(dir.path().to_path_buf()),
            Some(AppConfig {
                http_port: 9100,
                log_level: "debug".to_string(),
                log_dir: Some("logs".into()),
                ..Default::default()
            }),
        )
        .unwrap();

        let config = Config::from_app_state(&state).unwrap();
        assert_eq!(config.http_addr.port(), 9100);
        assert_eq!(config.https_addr.port(), 8543);
        assert!(config.tls.is_none());
        assert!(!config.allow_anonymous);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.log_dir, Some(dir.path().join("logs")));
    }
}

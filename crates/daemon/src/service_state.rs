use std::sync::Arc;

use common::prelude::{Namespace, NamespaceError};

use crate::http_server::auth::Credentials;
use crate::service_config::Config;
use crate::state::CompatConfig;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct State {
    namespace: Namespace,
    credentials: Arc<Credentials>,
    allow_anonymous: bool,
    compat: CompatConfig,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let namespace = Namespace::new(config.namespace)?;
        tracing::info!(
            root = %namespace.root_id(),
            enterprise_number = config.namespace.enterprise_number,
            delete_policy = ?config.namespace.delete_policy,
            "namespace ready"
        );

        let credentials = Credentials::new(&config.users);
        if config.allow_anonymous {
            tracing::warn!("allow_anonymous is set, the HTTP listener skips Basic auth");
        } else if credentials.is_empty() {
            tracing::warn!("no users configured, the HTTP listener rejects every CDMI request");
        }

        Ok(Self {
            namespace,
            credentials: Arc::new(credentials),
            allow_anonymous: config.allow_anonymous,
            compat: config.compat.clone(),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether the HTTP listener serves CDMI routes without Basic auth
    pub fn allow_anonymous(&self) -> bool {
        self.allow_anonymous
    }

    pub fn compat(&self) -> &CompatConfig {
        &self.compat
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("live_ids", &self.namespace.len())
            .field("users", &self.credentials.len())
            .field("allow_anonymous", &self.allow_anonymous)
            .field("compat", &self.compat)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("failed to set up namespace: {0}")]
    Namespace(#[from] NamespaceError),
}

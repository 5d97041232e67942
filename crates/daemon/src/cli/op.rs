use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;

use url::Url;

use cdmi_daemon::client::{CdmiClient, ClientError, ClientOptions};
use cdmi_daemon::state::{AppState, DEFAULT_HTTP_PORT};

/// Resolve the remote URL for the CDMI client.
///
/// Priority: explicit `--remote` flag > config file `http_port` > default port.
pub fn resolve_remote(explicit: Option<Url>, config_path: Option<PathBuf>) -> Url {
    if let Some(url) = explicit {
        return url;
    }
    if let Ok(state) = AppState::load(config_path) {
        if let Ok(url) = Url::parse(&format!("http://localhost:{}", state.config.http_port)) {
            return url;
        }
    }
    Url::parse(&format!("http://localhost:{}", DEFAULT_HTTP_PORT))
        .expect("hardcoded URL must parse")
}

/// Parse `key=value` into a metadata entry
pub fn parse_metadata(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

/// Collect `--meta` pairs; `None` when there are none so the server
///  leaves existing metadata alone
pub fn metadata(pairs: &[(String, String)]) -> Option<BTreeMap<String, String>> {
    (!pairs.is_empty()).then(|| pairs.iter().cloned().collect())
}


#[derive(Clone)]
pub struct OpContext {
    /// CDMI client (always initialized with default or custom URL)
    pub client: CdmiClient,
    /// Optional custom config path (defaults to ~/.cdmi)
    pub config_path: Option<PathBuf>,
}

impl OpContext {
    /// Create context with custom remote URL and optional config path
    pub fn new(
        remote: Url,
        options: &ClientOptions,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            client: CdmiClient::new(&remote, options)?,
            config_path,
        })
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}

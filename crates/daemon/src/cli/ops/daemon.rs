use std::path::PathBuf;

use clap::Args;

use cdmi_daemon::state::AppState;
use cdmi_daemon::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override HTTP listener port (default from config)
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Override HTTPS listener port (default from config)
    #[arg(long)]
    pub https_port: Option<u16>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<tracing::Level>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] cdmi_daemon::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Load state from config path (or default ~/.cdmi)
        let state = AppState::load(ctx.config_path.clone())?;
        let mut config = ServiceConfig::from_app_state(&state)?;

        if let Some(port) = self.http_port {
            config.http_addr.set_port(port);
        }
        if let Some(port) = self.https_port {
            config.https_addr.set_port(port);
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}

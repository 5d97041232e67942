pub use clap::Parser;

use std::path::PathBuf;
use url::Url;

use cdmi_daemon::client::ClientOptions;

#[derive(Parser, Debug)]
#[command(name = "cdmi")]
#[command(about = "CDMI object and container server")]
pub struct Args {
    /// Server URL (defaults to http://localhost:<http_port> from the config)
    #[arg(long, global = true)]
    pub remote: Option<Url>,

    /// Path to the cdmi config directory (defaults to ~/.cdmi)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Basic auth user for the HTTP listener
    #[arg(long, global = true, env = "CDMI_USER")]
    pub user: Option<String>,

    /// Basic auth password for the HTTP listener
    #[arg(long, global = true, env = "CDMI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// PEM bundle used to verify the server certificate
    #[arg(long, global = true)]
    pub ca_cert: Option<PathBuf>,

    /// PEM client certificate for mutual TLS
    #[arg(long, global = true, requires = "client_key")]
    pub client_cert: Option<PathBuf>,

    /// PEM private key for --client-cert
    #[arg(long, global = true, requires = "client_cert")]
    pub client_key: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}

impl Args {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            ca_cert: self.ca_cert.clone(),
            identity: self.client_cert.clone().zip(self.client_key.clone()),
            basic: self.user.clone().map(|user| {
                let password = self.password.clone().unwrap_or_default();
                (user, password)
            }),
        }
    }
}

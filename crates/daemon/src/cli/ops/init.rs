use std::path::PathBuf;

use clap::Args;

use cdmi_daemon::state::{AppConfig, AppState, CompatConfig, TlsConfig, UserConfig};
use common::prelude::DeletePolicy;

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Port for the plain HTTP listener
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Port for the mutual-TLS listener
    #[arg(long)]
    pub https_port: Option<u16>,

    /// PEM server certificate (enables the HTTPS listener)
    #[arg(long, requires_all = ["tls_key", "client_ca"])]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key for --tls-cert
    #[arg(long, requires = "tls_cert")]
    pub tls_key: Option<PathBuf>,

    /// PEM bundle of CAs trusted for client certificates
    #[arg(long, requires = "tls_cert")]
    pub client_ca: Option<PathBuf>,

    /// Basic auth account for the HTTP listener, as name:password (repeatable)
    #[arg(long = "add-user", value_parser = parse_user)]
    pub users: Vec<UserConfig>,

    /// Serve the HTTP listener without Basic auth
    #[arg(long)]
    pub allow_anonymous: bool,

    /// Remove whole subtrees on container DELETE instead of refusing
    #[arg(long)]
    pub recursive_delete: bool,

    /// Answer 201 on every container PUT
    #[arg(long)]
    pub compat_created: bool,

    /// Enterprise number embedded in object ids
    #[arg(long)]
    pub enterprise_number: Option<u32>,
}

fn parse_user(raw: &str) -> Result<UserConfig, String> {
    let (username, password) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected name:password, got '{}'", raw))?;
    if username.is_empty() {
        return Err("user name is empty".to_string());
    }
    Ok(UserConfig {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    StateError(#[from] cdmi_daemon::state::StateError),
}

impl Init {
    fn app_config(&self) -> AppConfig {
        let defaults = AppConfig::default();
        let tls = match (&self.tls_cert, &self.tls_key, &self.client_ca) {
            (Some(cert), Some(key), Some(ca)) => Some(TlsConfig {
                cert_path: cert.clone(),
                key_path: key.clone(),
                client_ca_path: ca.clone(),
            }),
            _ => None,
        };

        AppConfig {
            http_port: self.http_port.unwrap_or(defaults.http_port),
            https_port: self.https_port.unwrap_or(defaults.https_port),
            tls,
            users: self.users.clone(),
            allow_anonymous: self.allow_anonymous,
            enterprise_number: self.enterprise_number.unwrap_or(defaults.enterprise_number),
            delete_policy: if self.recursive_delete {
                DeletePolicy::Recursive
            } else {
                DeletePolicy::Reject
            },
            compat: CompatConfig {
                created_on_container_put: self.compat_created,
            },
            ..defaults
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::init(ctx.config_path.clone(), Some(self.app_config()))?;
        let config = &state.config;

        let mut output = format!(
            "Initialized cdmi directory at: {}\n\
             config:       {}\n\
             http_port:    {}\n",
            state.cdmi_dir.display(),
            state.config_path.display(),
            config.http_port,
        );
        match &config.tls {
            Some(tls) => output.push_str(&format!(
                "https_port:   {}\ntls_cert:     {}\nclient_ca:    {}\n",
                config.https_port,
                tls.cert_path.display(),
                tls.client_ca_path.display()
            )),
            None => output.push_str("https:        disabled (no TLS material)\n"),
        }
        let auth = if config.allow_anonymous {
            "anonymous".to_string()
        } else if config.users.is_empty() {
            "no users, HTTP requests will get 401 (use --add-user)".to_string()
        } else {
            format!("{} user(s)", config.users.len())
        };
        output.push_str(&format!(
            "http auth:    {}\ndelete:       {:?}",
            auth, config.delete_policy
        ));

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user() {
        let user = parse_user("test:s3:cret").unwrap();
        assert_eq!(user.username, "test");
        assert_eq!(user.password, "s3:cret");
        assert!(parse_user("nopassword").is_err());
        assert!(parse_user(":pw").is_err());
    }
}

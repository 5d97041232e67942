use clap::Args;

use cdmi_daemon::client::requests::PutContainer;
use cdmi_daemon::client::ClientError;

use crate::cli::op::{metadata, parse_metadata};

#[derive(Args, Debug, Clone)]
pub struct Mkdir {
    /// Container path to create or update
    pub path: String,

    /// Metadata entry as key=value (repeatable)
    #[arg(long = "meta", value_parser = parse_metadata)]
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum MkdirError {
    #[error("CDMI error: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mkdir {
    type Error = MkdirError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let container = ctx
            .client
            .call(PutContainer {
                path: self.path.clone(),
                metadata: metadata(&self.metadata),
            })
            .await?;
        Ok(format!(
            "{} {}",
            container["objectID"].as_str().unwrap_or("-"),
            self.path
        ))
    }
}

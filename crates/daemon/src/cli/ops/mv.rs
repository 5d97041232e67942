use clap::Args;

use cdmi_daemon::client::requests::Move;
use cdmi_daemon::client::ClientError;
use common::prelude::NodeKind;

#[derive(Args, Debug, Clone)]
pub struct Mv {
    /// Source path or `/cdmi_objectid/<ID>` URI
    pub from: String,

    /// Destination path
    pub to: String,

    /// The source is a container
    #[arg(long, short = 'r')]
    pub container: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum MvError {
    #[error("CDMI error: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Mv {
    type Error = MvError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let kind = if self.container {
            NodeKind::Container
        } else {
            NodeKind::DataObject
        };
        let moved = ctx
            .client
            .call(Move {
                from: self.from.clone(),
                to: self.to.clone(),
                kind,
            })
            .await?;
        Ok(format!(
            "{} {} -> {}",
            moved["objectID"].as_str().unwrap_or("-"),
            self.from,
            self.to
        ))
    }
}

use clap::Args;

use cdmi_daemon::client::requests::Delete;
use cdmi_daemon::client::ClientError;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Resource path or `/cdmi_objectid/<ID>` URI
    pub target: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RmError {
    #[error("CDMI error: {0}")]
    Client(#[from] ClientError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = RmError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        ctx.client
            .call(Delete {
                target: self.target.clone(),
            })
            .await?;
        Ok(format!("removed {}", self.target))
    }
}

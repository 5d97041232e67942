use clap::Args;

use cdmi_daemon::client::requests::GetObject;
use cdmi_daemon::client::ClientError;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Resource path or `/cdmi_objectid/<ID>` URI
    pub target: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error("CDMI error: {0}")]
    Client(#[from] ClientError),
    #[error("failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = GetError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let object = ctx
            .client
            .call(GetObject {
                target: self.target.clone(),
            })
            .await?;
        Ok(serde_json::to_string_pretty(&object)?)
    }
}

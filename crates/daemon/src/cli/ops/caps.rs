use clap::Args;

use cdmi_daemon::client::requests::Capabilities;
use cdmi_daemon::client::ClientError;
use common::prelude::CapabilityClass;

#[derive(Args, Debug, Clone)]
pub struct Caps {
    /// Resource path or object id URI whose capabilities to show
    ///  (defaults to the system capabilities)
    pub target: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CapsError {
    #[error("CDMI error: {0}")]
    Client(#[from] ClientError),
    #[error("failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Caps {
    type Error = CapsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = match &self.target {
            Some(target) => Capabilities::Of(target.clone()),
            None => Capabilities::Class(CapabilityClass::System),
        };
        let document = ctx.client.call(request).await?;
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

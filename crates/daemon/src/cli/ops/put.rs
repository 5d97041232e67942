use std::path::PathBuf;

use clap::Args;

use cdmi_daemon::client::requests::PutObject;
use cdmi_daemon::client::ClientError;
use common::prelude::DataObjectRequest;

use crate::cli::op::{metadata, parse_metadata};

#[derive(Args, Debug, Clone)]
pub struct Put {
    /// Data object path to create or update
    pub path: String,

    /// Read the value from a file
    #[arg(long, group = "source")]
    pub file: Option<PathBuf>,

    /// Use this string as the value
    #[arg(long, group = "source")]
    pub value: Option<String>,

    /// Mimetype of the value
    #[arg(long, default_value = "text/plain")]
    pub mimetype: String,

    /// Metadata entry as key=value (repeatable)
    #[arg(long = "meta", value_parser = parse_metadata)]
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum PutError {
    #[error("CDMI error: {0}")]
    Client(#[from] ClientError),
    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Put {
    type Error = PutError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut body = match (&self.file, &self.value) {
            (Some(file), _) => {
                let bytes = tokio::fs::read(file)
                    .await
                    .map_err(|source| PutError::ReadFile {
                        path: file.clone(),
                        source,
                    })?;
                DataObjectRequest::with_value(self.mimetype.clone(), &bytes)
            }
            (None, Some(value)) => {
                DataObjectRequest::with_value(self.mimetype.clone(), value.as_bytes())
            }
            // metadata-only update
            (None, None) => DataObjectRequest::default(),
        };
        body.metadata = metadata(&self.metadata);

        let object = ctx
            .client
            .call(PutObject {
                path: self.path.clone(),
                body,
            })
            .await?;
        Ok(format!(
            "{} {}",
            object["objectID"].as_str().unwrap_or("-"),
            self.path
        ))
    }
}

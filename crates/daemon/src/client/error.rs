use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid header value: {0}")]
    Header(String),
}

impl ClientError {
    /// Status code of a non-success response, if that is what failed
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::HttpStatus(status, _) => Some(*status),
            _ => None,
        }
    }
}

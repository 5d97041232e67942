//! HTTP client for a running CDMI server, used by the CLI

mod error;
pub mod requests;

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Certificate, Client, Identity, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use common::cdmi::{SPECIFICATION_VERSION, SPECIFICATION_VERSION_HEADER};

pub use error::ClientError;

/// A request against the CDMI HTTP interface
pub trait CdmiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError>;
}

/// Transport options: trust roots, client identity and Basic credentials
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// PEM bundle used to verify the server, in addition to the system roots
    pub ca_cert: Option<PathBuf>,
    /// PEM client certificate and key for mutual TLS
    pub identity: Option<(PathBuf, PathBuf)>,
    /// Basic auth user and password
    pub basic: Option<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct CdmiClient {
    pub remote: Url,
    client: Client,
}

fn read(path: &Path) -> Result<Vec<u8>, ClientError> {
    std::fs::read(path).map_err(|source| ClientError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}

impl CdmiClient {
    pub fn new(remote: &Url, options: &ClientOptions) -> Result<Self, ClientError> {
        let mut default_headers = HeaderMap::new();
        let version_header = HeaderName::from_bytes(SPECIFICATION_VERSION_HEADER.as_bytes())
            .map_err(|e| ClientError::Header(e.to_string()))?;
        default_headers.insert(version_header, HeaderValue::from_static(SPECIFICATION_VERSION));
        if let Some((user, password)) = &options.basic {
            let token = BASE64.encode(format!("{}:{}", user, password));
            let mut value = HeaderValue::from_str(&format!("Basic {}", token))
                .map_err(|e| ClientError::Header(e.to_string()))?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder().default_headers(default_headers);
        if options.ca_cert.is_some() || options.identity.is_some() {
            // errors only when a provider is already installed
            let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
        }
        if let Some(ca) = &options.ca_cert {
            builder = builder.add_root_certificate(Certificate::from_pem(&read(ca)?)?);
        }
        if let Some((cert, key)) = &options.identity {
            let mut pem = read(cert)?;
            pem.push(b'\n');
            pem.extend(read(key)?);
            builder = builder.identity(Identity::from_pem(&pem)?);
        }

        Ok(Self {
            remote: remote.clone(),
            client: builder.build()?,
        })
    }

    pub async fn call<T: CdmiRequest>(&self, request: T) -> Result<T::Response, ClientError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus(status, response.text().await?));
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Get the base URL for requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

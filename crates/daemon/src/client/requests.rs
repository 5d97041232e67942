use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use url::Url;

use common::cdmi::{CDMI_CAPABILITY, CDMI_CONTAINER, CDMI_OBJECT};
use common::namespace::Metadata;
use common::prelude::{CapabilityClass, ContainerRequest, DataObjectRequest, NodeKind};

use super::{CdmiRequest, ClientError};

const ACCEPT_OBJECT: &str = "application/cdmi-object, application/cdmi-container";

fn content_type(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Container => CDMI_CONTAINER,
        NodeKind::DataObject => CDMI_OBJECT,
    }
}

/// Fetch a capability document, either by class or for a resource
#[derive(Debug, Clone)]
pub enum Capabilities {
    Class(CapabilityClass),
    Of(String),
}

impl CdmiRequest for Capabilities {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let url = match &self {
            Capabilities::Class(class) => base_url.join(class.uri())?,
            Capabilities::Of(target) => base_url.join(target)?,
        };
        Ok(client.get(url).header(ACCEPT, CDMI_CAPABILITY))
    }
}

/// Read a container or data object as CDMI JSON
#[derive(Debug, Clone)]
pub struct GetObject {
    /// A path or `/cdmi_objectid/<ID>` URI
    pub target: String,
}

impl CdmiRequest for GetObject {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let url = base_url.join(&self.target)?;
        Ok(client.get(url).header(ACCEPT, ACCEPT_OBJECT))
    }
}

/// Create or update a container
#[derive(Debug, Clone)]
pub struct PutContainer {
    pub path: String,
    pub metadata: Option<Metadata>,
}

impl CdmiRequest for PutContainer {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let url = base_url.join(&self.path)?;
        let body = ContainerRequest {
            metadata: self.metadata,
            move_from: None,
        };
        Ok(client
            .put(url)
            .header(CONTENT_TYPE, CDMI_CONTAINER)
            .header(ACCEPT, CDMI_CONTAINER)
            .json(&body))
    }
}

/// Create or update a data object
#[derive(Debug, Clone)]
pub struct PutObject {
    pub path: String,
    pub body: DataObjectRequest,
}

impl CdmiRequest for PutObject {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let url = base_url.join(&self.path)?;
        Ok(client
            .put(url)
            .header(CONTENT_TYPE, CDMI_OBJECT)
            .header(ACCEPT, CDMI_OBJECT)
            .json(&self.body))
    }
}

/// Move a resource from `from` (path or object id URI) to the path `to`
#[derive(Debug, Clone)]
pub struct Move {
    pub from: String,
    pub to: String,
    pub kind: NodeKind,
}

impl CdmiRequest for Move {
    type Response = serde_json::Value;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let url = base_url.join(&self.to)?;
        let body = serde_json::json!({ "move": self.from });
        let content_type = content_type(self.kind);
        Ok(client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, content_type)
            .json(&body))
    }
}

#[derive(Debug, Clone)]
pub struct Delete {
    pub target: String,
}

impl CdmiRequest for Delete {
    type Response = ();

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ClientError> {
        let url = base_url.join(&self.target)?;
        Ok(client.delete(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://localhost:8542").unwrap()
    }

    #[test]
    fn test_move_request_shape() {
        let request = Move {
            from: "/TestContainer02".to_string(),
            to: "/TestContainer2/".to_string(),
            kind: NodeKind::Container,
        }
        .build_request(&base(), &Client::new())
        .unwrap()
        .build()
        .unwrap();

        assert_eq!(request.method(), reqwest::Method::PUT);
        assert_eq!(request.url().path(), "/TestContainer2/");
        assert_eq!(request.headers().get(CONTENT_TYPE).unwrap(), CDMI_CONTAINER);
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(body).unwrap();
        assert_eq!(json["move"], "/TestContainer02");
    }

    #[test]
    fn test_capability_request_by_class() {
        let request = Capabilities::Class(CapabilityClass::Container)
            .build_request(&base(), &Client::new())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(request.url().path(), "/cdmi_capabilities/container/");
        assert_eq!(request.headers().get(ACCEPT).unwrap(), CDMI_CAPABILITY);
    }
}

//! CDMI wire schema
//!
//! Typed request bodies, response bodies, content types and the
//! specification version header. Everything the HTTP layer and the
//! client need to agree on lives here.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use mime::Mime;
use serde::{Deserialize, Serialize};

use crate::namespace::{
    Metadata, NamespaceError, NodeKind, NodeUpdate, NodeView, PutRequest, Target,
};
use crate::object_id::ObjectId;

pub const CDMI_CONTAINER: &str = "application/cdmi-container";
pub const CDMI_OBJECT: &str = "application/cdmi-object";
pub const CDMI_CAPABILITY: &str = "application/cdmi-capability";

pub const SPECIFICATION_VERSION_HEADER: &str = "X-CDMI-Specification-Version";
/// Version this server speaks and reports on every response
pub const SPECIFICATION_VERSION: &str = "1.0.2";
/// Versions a client may ask for
pub const SUPPORTED_SPECIFICATION_VERSIONS: &[&str] = &["1.0.1", "1.0.2", "1.1", "1.1.1"];

const DOMAIN_URI: &str = "/cdmi_domains/";
const COMPLETION_COMPLETE: &str = "Complete";

/// Pick a supported version out of a request header value.
///  The header may list several versions separated by commas.
pub fn negotiate_version(header: &str) -> Option<&'static str> {
    header
        .split(',')
        .map(str::trim)
        .find_map(|requested| {
            SUPPORTED_SPECIFICATION_VERSIONS
                .iter()
                .find(|supported| **supported == requested)
        })
        .copied()
}

/// The CDMI media types we understand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdmiContentType {
    Container,
    DataObject,
    Capability,
}

impl CdmiContentType {
    /// Parse one media type, ignoring parameters such as `charset`
    pub fn parse(value: &str) -> Option<Self> {
        let mime: Mime = value.trim().parse().ok()?;
        match mime.essence_str() {
            CDMI_CONTAINER => Some(CdmiContentType::Container),
            CDMI_OBJECT => Some(CdmiContentType::DataObject),
            CDMI_CAPABILITY => Some(CdmiContentType::Capability),
            _ => None,
        }
    }

    /// First CDMI type in an `Accept` header list
    pub fn from_accept(value: &str) -> Option<Self> {
        value.split(',').find_map(Self::parse)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CdmiContentType::Container => CDMI_CONTAINER,
            CdmiContentType::DataObject => CDMI_OBJECT,
            CdmiContentType::Capability => CDMI_CAPABILITY,
        }
    }

    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Container => CdmiContentType::Container,
            NodeKind::DataObject => CdmiContentType::DataObject,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueTransferEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("malformed body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid move source: {0}")]
    MoveSource(#[from] NamespaceError),
    #[error("value is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("invalid mimetype '{0}'")]
    Mimetype(String),
}

fn parse_body<T>(body: &[u8]) -> Result<T, SchemaError>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

fn move_source(raw: Option<&str>) -> Result<Option<Target>, SchemaError> {
    Ok(raw.map(Target::parse).transpose()?)
}

/// Body of a container PUT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub move_from: Option<String>,
}

impl ContainerRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, SchemaError> {
        parse_body(body)
    }

    pub fn into_put(self) -> Result<PutRequest, SchemaError> {
        Ok(PutRequest {
            kind: NodeKind::Container,
            source: move_source(self.move_from.as_deref())?,
            update: NodeUpdate {
                metadata: self.metadata,
                ..Default::default()
            },
        })
    }
}

/// Body of a data object PUT
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataObjectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valuetransferencoding: Option<ValueTransferEncoding>,
    #[serde(default, rename = "move", skip_serializing_if = "Option::is_none")]
    pub move_from: Option<String>,
}

impl DataObjectRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self, SchemaError> {
        parse_body(body)
    }

    /// Build a request carrying `value`, base64 encoding it unless it is utf-8
    pub fn with_value(mimetype: impl Into<String>, value: &[u8]) -> Self {
        let (value, encoding) = encode_value(value);
        Self {
            mimetype: Some(mimetype.into()),
            value: Some(value),
            valuetransferencoding: Some(encoding),
            ..Default::default()
        }
    }

    pub fn into_put(self) -> Result<PutRequest, SchemaError> {
        if let Some(mimetype) = &self.mimetype {
            mimetype
                .parse::<Mime>()
                .map_err(|_| SchemaError::Mimetype(mimetype.clone()))?;
        }

        let value = match (self.value, self.valuetransferencoding.unwrap_or_default()) {
            (Some(value), ValueTransferEncoding::Utf8) => Some(Bytes::from(value)),
            (Some(value), ValueTransferEncoding::Base64) => Some(Bytes::from(BASE64.decode(value)?)),
            (None, _) => None,
        };

        Ok(PutRequest {
            kind: NodeKind::DataObject,
            source: move_source(self.move_from.as_deref())?,
            update: NodeUpdate {
                metadata: self.metadata,
                mimetype: self.mimetype,
                value,
            },
        })
    }
}

/// Render bytes for a JSON body: as text when they are utf-8, else base64
pub fn encode_value(value: &[u8]) -> (String, ValueTransferEncoding) {
    match std::str::from_utf8(value) {
        Ok(text) => (text.to_string(), ValueTransferEncoding::Utf8),
        Err(_) => (BASE64.encode(value), ValueTransferEncoding::Base64),
    }
}

/// CDMI range notation: `0-N` inclusive, empty when there is nothing
pub fn index_range(len: usize) -> String {
    if len == 0 {
        String::new()
    } else {
        format!("0-{}", len - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerResponse {
    #[serde(rename = "objectType")]
    pub object_type: &'static str,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(rename = "objectName")]
    pub object_name: String,
    #[serde(rename = "parentURI", skip_serializing_if = "Option::is_none")]
    pub parent_uri: Option<String>,
    #[serde(rename = "parentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(rename = "domainURI")]
    pub domain_uri: &'static str,
    #[serde(rename = "capabilitiesURI")]
    pub capabilities_uri: &'static str,
    #[serde(rename = "completionStatus")]
    pub completion_status: &'static str,
    pub metadata: Metadata,
    pub childrenrange: String,
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObjectResponse {
    #[serde(rename = "objectType")]
    pub object_type: &'static str,
    #[serde(rename = "objectID")]
    pub object_id: ObjectId,
    #[serde(rename = "objectName")]
    pub object_name: String,
    #[serde(rename = "parentURI", skip_serializing_if = "Option::is_none")]
    pub parent_uri: Option<String>,
    #[serde(rename = "parentID", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(rename = "domainURI")]
    pub domain_uri: &'static str,
    #[serde(rename = "capabilitiesURI")]
    pub capabilities_uri: &'static str,
    #[serde(rename = "completionStatus")]
    pub completion_status: &'static str,
    pub mimetype: String,
    pub metadata: Metadata,
    pub valuerange: String,
    pub valuetransferencoding: ValueTransferEncoding,
    pub value: String,
}

/// A CDMI object body, as returned by GET and PUT
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CdmiObject {
    Container(ContainerResponse),
    DataObject(DataObjectResponse),
}

impl CdmiObject {
    pub fn content_type(&self) -> &'static str {
        match self {
            CdmiObject::Container(_) => CDMI_CONTAINER,
            CdmiObject::DataObject(_) => CDMI_OBJECT,
        }
    }
}

impl From<&NodeView> for CdmiObject {
    fn from(view: &NodeView) -> Self {
        let capabilities_uri =
            crate::capabilities::CapabilityClass::for_kind(view.kind).uri();
        match view.kind {
            NodeKind::Container => CdmiObject::Container(ContainerResponse {
                object_type: CDMI_CONTAINER,
                object_id: view.id,
                object_name: view.object_name(),
                parent_uri: view.parent_uri(),
                parent_id: view.parent_id,
                domain_uri: DOMAIN_URI,
                capabilities_uri,
                completion_status: COMPLETION_COMPLETE,
                metadata: view.metadata.clone(),
                childrenrange: index_range(view.children.len()),
                children: view.children.clone(),
            }),
            NodeKind::DataObject => {
                let bytes = view.value.clone().unwrap_or_default();
                let (value, encoding) = encode_value(&bytes);
                CdmiObject::DataObject(DataObjectResponse {
                    object_type: CDMI_OBJECT,
                    object_id: view.id,
                    object_name: view.object_name(),
                    parent_uri: view.parent_uri(),
                    parent_id: view.parent_id,
                    domain_uri: DOMAIN_URI,
                    capabilities_uri,
                    completion_status: COMPLETION_COMPLETE,
                    mimetype: view.mimetype.clone().unwrap_or_default(),
                    metadata: view.metadata.clone(),
                    valuerange: index_range(bytes.len()),
                    valuetransferencoding: encoding,
                    value,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiate_version() {
        assert_eq!(negotiate_version("1.0.2"), Some("1.0.2"));
        assert_eq!(negotiate_version("2.0, 1.1"), Some("1.1"));
        assert_eq!(negotiate_version("0.9"), None);
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(
            CdmiContentType::parse("application/cdmi-object; charset=utf-8"),
            Some(CdmiContentType::DataObject)
        );
        assert_eq!(CdmiContentType::parse("text/plain"), None);
        assert_eq!(
            CdmiContentType::from_accept("text/html, application/cdmi-capability"),
            Some(CdmiContentType::Capability)
        );
    }

    #[test]
    fn test_container_request_with_move() {
        let body = br#"{"move":"/TestContainer02","metadata":{"color":"red","test":"Test"}}"#;
        let put = ContainerRequest::from_slice(body).unwrap().into_put().unwrap();
        assert_eq!(put.kind, NodeKind::Container);
        assert_eq!(put.source.unwrap().to_string(), "/TestContainer02");
        assert_eq!(put.update.metadata.unwrap().get("color").unwrap(), "red");
    }

    #[test]
    fn test_empty_body_is_default() {
        let put = ContainerRequest::from_slice(b"").unwrap().into_put().unwrap();
        assert!(put.source.is_none());
        assert!(put.update.is_empty());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let body = br#"{"mimetype":"text/plain","value":"hi","domainURI":"/cdmi_domains/"}"#;
        let put = DataObjectRequest::from_slice(body).unwrap().into_put().unwrap();
        assert_eq!(put.update.value.unwrap(), Bytes::from_static(b"hi"));
    }

    #[test]
    fn test_base64_value() {
        let body = br#"{"value":"AAEC","valuetransferencoding":"base64"}"#;
        let put = DataObjectRequest::from_slice(body).unwrap().into_put().unwrap();
        assert_eq!(put.update.value.unwrap(), Bytes::from_static(&[0, 1, 2]));

        let bad = br#"{"value":"***","valuetransferencoding":"base64"}"#;
        assert!(matches!(
            DataObjectRequest::from_slice(bad).unwrap().into_put(),
            Err(SchemaError::Base64(_))
        ));
    }

    #[test]
    fn test_invalid_mimetype() {
        let body = br#"{"mimetype":"not a mimetype"}"#;
        assert!(matches!(
            DataObjectRequest::from_slice(body).unwrap().into_put(),
            Err(SchemaError::Mimetype(_))
        ));
    }

    #[test]
    fn test_with_value_picks_encoding() {
        let text = DataObjectRequest::with_value("text/plain", b"hello");
        assert_eq!(text.valuetransferencoding, Some(ValueTransferEncoding::Utf8));

        let binary = DataObjectRequest::with_value("application/octet-stream", &[0xff, 0xfe]);
        assert_eq!(
            binary.valuetransferencoding,
            Some(ValueTransferEncoding::Base64)
        );
        let put = binary.into_put().unwrap();
        assert_eq!(put.update.value.unwrap(), Bytes::from_static(&[0xff, 0xfe]));
    }

    #[test]
    fn test_index_range() {
        assert_eq!(index_range(0), "");
        assert_eq!(index_range(1), "0-0");
        assert_eq!(index_range(11), "0-10");
    }
}

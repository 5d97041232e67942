use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use bytes::Bytes;

use common::cdmi::{SchemaError, CDMI_CAPABILITY};
use common::namespace::{NodeUpdate, PutRequest};
use common::prelude::{CdmiContentType, CdmiObject, ContainerRequest, DataObjectRequest, NodeKind};

use super::headers::{cdmi_empty, cdmi_json, content_type, requested_version};
use super::{put_status, Addressed, CdmiError};
use crate::ServiceState;

const RAW_DEFAULT_MIMETYPE: &str = "application/octet-stream";

pub async fn handler(
    State(state): State<ServiceState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, CdmiError> {
    write(&state, Addressed::from_path(path)?, &headers, body)
}

pub async fn root(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, CdmiError> {
    write(&state, Addressed::root(), &headers, body)
}

/// Create, update or move a container or data object.
///  A CDMI content type selects the typed body; any other content
///  type stores the body as the raw value of a data object.
#[tracing::instrument(skip(state, headers, body), fields(body_len = body.len()))]
fn write(
    state: &ServiceState,
    addressed: Addressed,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, CdmiError> {
    let version = requested_version(headers)?;
    let target = addressed.writable()?;

    let raw_type = content_type(headers);
    let (request, cdmi_request) = match raw_type.and_then(CdmiContentType::parse) {
        Some(CdmiContentType::Container) => (ContainerRequest::from_slice(&body)?.into_put()?, true),
        Some(CdmiContentType::DataObject) => {
            (DataObjectRequest::from_slice(&body)?.into_put()?, true)
        }
        Some(CdmiContentType::Capability) => {
            return Err(CdmiError::UnsupportedMediaType(CDMI_CAPABILITY.to_string()))
        }
        None => (raw_put(raw_type, body)?, false),
    };

    let kind = request.kind;
    let result = state.namespace().put(&target, request)?;
    let status = put_status(result.outcome, kind, state.compat());
    tracing::info!(
        id = %result.node.id,
        path = %result.node.path,
        outcome = ?result.outcome,
        %status,
        "put"
    );

    if cdmi_request || version.is_some() {
        let object = CdmiObject::from(&result.node);
        Ok(cdmi_json(status, object.content_type(), &object))
    } else {
        Ok(cdmi_empty(status))
    }
}

fn raw_put(content_type: Option<&str>, body: Bytes) -> Result<PutRequest, SchemaError> {
    let mimetype = content_type.unwrap_or(RAW_DEFAULT_MIMETYPE);
    mimetype
        .parse::<mime::Mime>()
        .map_err(|_| SchemaError::Mimetype(mimetype.to_string()))?;

    Ok(PutRequest {
        kind: NodeKind::DataObject,
        update: NodeUpdate {
            mimetype: Some(mimetype.to_string()),
            value: Some(body),
            ..Default::default()
        },
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_put_defaults_mimetype() {
        let request = raw_put(None, Bytes::from_static(b"abc")).unwrap();
        assert_eq!(request.update.mimetype.as_deref(), Some(RAW_DEFAULT_MIMETYPE));
        assert_eq!(request.update.value.unwrap(), Bytes::from_static(b"abc"));
    }

    #[test]
    fn test_raw_put_rejects_garbage_type() {
        assert!(matches!(
            raw_put(Some("not a type"), Bytes::new()),
            Err(SchemaError::Mimetype(_))
        ));
    }
}

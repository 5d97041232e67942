use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use common::cdmi::CDMI_CAPABILITY;
use common::namespace::{Located, DEFAULT_MIMETYPE};
use common::prelude::{CdmiContentType, CdmiObject};

use super::headers::{accept, cdmi_json, requested_version};
use super::{Addressed, CdmiError};
use crate::ServiceState;

/// Read a capability document, a container or a data object.
///  Data objects requested without any CDMI header come back as
///  their raw value under their own mimetype.
pub async fn handler(
    State(state): State<ServiceState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, CdmiError> {
    read(&state, Addressed::from_path(path)?, &headers)
}

pub async fn root(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<Response, CdmiError> {
    read(&state, Addressed::root(), &headers)
}

#[tracing::instrument(skip(state, headers))]
fn read(
    state: &ServiceState,
    addressed: Addressed,
    headers: &HeaderMap,
) -> Result<Response, CdmiError> {
    let version = requested_version(headers)?;
    let accept = accept(headers);
    let namespace = state.namespace();

    let target = match addressed {
        Addressed::Capability(class) => {
            let document = namespace.capability(class);
            return Ok(cdmi_json(StatusCode::OK, CDMI_CAPABILITY, &document));
        }
        Addressed::Target(target) => target,
    };

    if accept == Some(CdmiContentType::Capability) {
        let document = namespace.capability_of(&target)?;
        return Ok(cdmi_json(StatusCode::OK, CDMI_CAPABILITY, &document));
    }

    let view = match namespace.locate(&target)? {
        Located::Capability(class) => {
            let document = namespace.capability(class);
            return Ok(cdmi_json(StatusCode::OK, CDMI_CAPABILITY, &document));
        }
        Located::Node(view) => view,
    };

    let cdmi_request = version.is_some() || accept.is_some();
    if cdmi_request || view.is_container() {
        let object = CdmiObject::from(&view);
        return Ok(cdmi_json(StatusCode::OK, object.content_type(), &object));
    }

    let mimetype = view
        .mimetype
        .clone()
        .unwrap_or_else(|| DEFAULT_MIMETYPE.to_string());
    let value = view.value.clone().unwrap_or_default();
    Ok((StatusCode::OK, [(CONTENT_TYPE, mimetype)], value).into_response())
}

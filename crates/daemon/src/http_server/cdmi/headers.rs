use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use common::cdmi::{negotiate_version, CdmiContentType, SPECIFICATION_VERSION};

use super::CdmiError;

pub const VERSION_HEADER: HeaderName = HeaderName::from_static("x-cdmi-specification-version");

/// The version a request asked for. `None` when the header is absent;
///  an error when it names nothing we support.
pub fn requested_version(headers: &HeaderMap) -> Result<Option<&'static str>, CdmiError> {
    let Some(value) = headers.get(VERSION_HEADER) else {
        return Ok(None);
    };
    let value = value.to_str().unwrap_or_default();
    negotiate_version(value)
        .map(Some)
        .ok_or_else(|| CdmiError::UnsupportedVersion(value.to_string()))
}

pub fn accept(headers: &HeaderMap) -> Option<CdmiContentType> {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .and_then(CdmiContentType::from_accept)
}

pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

/// A CDMI JSON body with its content type and the version header
pub fn cdmi_json<T: Serialize>(status: StatusCode, content_type: &'static str, body: &T) -> Response {
    (
        status,
        [
            (CONTENT_TYPE, content_type),
            (VERSION_HEADER, SPECIFICATION_VERSION),
        ],
        Json(body),
    )
        .into_response()
}

/// A bodiless answer that still reports the version we speak
pub fn cdmi_empty(status: StatusCode) -> Response {
    (status, [(VERSION_HEADER, SPECIFICATION_VERSION)]).into_response()
}

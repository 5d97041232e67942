use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use super::headers::{cdmi_empty, requested_version};
use super::{Addressed, CdmiError};
use crate::ServiceState;

pub async fn handler(
    State(state): State<ServiceState>,
    path: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
) -> Result<Response, CdmiError> {
    remove(&state, Addressed::from_path(path)?, &headers)
}

pub async fn root(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<Response, CdmiError> {
    remove(&state, Addressed::root(), &headers)
}

#[tracing::instrument(skip(state, headers))]
fn remove(
    state: &ServiceState,
    addressed: Addressed,
    headers: &HeaderMap,
) -> Result<Response, CdmiError> {
    requested_version(headers)?;
    let target = addressed.writable()?;

    let removed = state.namespace().delete(&target)?;
    tracing::info!(%target, removed, "delete");

    Ok(cdmi_empty(StatusCode::NO_CONTENT))
}

//! CDMI object, container and capability routes

pub mod delete;
mod error;
pub mod get;
mod headers;
pub mod put;

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::http::StatusCode;

use common::namespace::CAPABILITIES_SEGMENT;
use common::prelude::{CapabilityClass, CdmiPath, NamespaceError, NodeKind, Outcome, Target};

pub use error::CdmiError;

use crate::state::CompatConfig;

/// What a request path names
#[derive(Debug, Clone, PartialEq)]
pub enum Addressed {
    /// One of the documents under `/cdmi_capabilities/`
    Capability(CapabilityClass),
    /// A container or data object, by path or by object id
    Target(Target),
}

impl Addressed {
    pub fn parse(raw: &str) -> Result<Self, CdmiError> {
        let mut segments = raw.split('/').filter(|s| !s.is_empty()).peekable();
        if segments.peek() == Some(&CAPABILITIES_SEGMENT) {
            let rest: Vec<&str> = segments.skip(1).collect();
            return CapabilityClass::from_segments(&rest)
                .map(Addressed::Capability)
                .ok_or_else(|| {
                    NamespaceError::NotFound(format!("/{}", raw.trim_start_matches('/'))).into()
                });
        }
        Ok(Addressed::Target(Target::parse(raw)?))
    }

    /// The root container, for requests on `/`
    pub fn root() -> Self {
        Addressed::Target(Target::Path(CdmiPath::root()))
    }

    /// A `/*path` capture. A path that fails to decode never falls
    ///  back to some other node.
    pub fn from_path(path: Result<Path<String>, PathRejection>) -> Result<Self, CdmiError> {
        match path {
            Ok(Path(raw)) => Self::parse(&raw),
            Err(rejection) => Err(NamespaceError::InvalidPath(rejection.body_text()).into()),
        }
    }

    /// The target, for requests that may change something
    pub fn writable(self) -> Result<Target, CdmiError> {
        match self {
            Addressed::Target(target) => Ok(target),
            Addressed::Capability(class) => {
                Err(NamespaceError::ReadOnly(class.uri().to_string()).into())
            }
        }
    }
}

/// Status for a successful PUT. Containers answer 201 on every PUT
///  when the compat switch is on.
pub fn put_status(outcome: Outcome, kind: NodeKind, compat: &CompatConfig) -> StatusCode {
    match outcome {
        Outcome::Created => StatusCode::CREATED,
        Outcome::Updated | Outcome::Moved
            if kind == NodeKind::Container && compat.created_on_container_put =>
        {
            StatusCode::CREATED
        }
        Outcome::Updated | Outcome::Moved => StatusCode::OK,
    }
}

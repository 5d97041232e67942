use axum::http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use common::cdmi::{SchemaError, SPECIFICATION_VERSION};
use common::namespace::ErrorClass;
use common::prelude::NamespaceError;

use super::headers::VERSION_HEADER;
use crate::http_server::auth::REALM;

/// Every failure a CDMI request can end in
#[derive(Debug, thiserror::Error)]
pub enum CdmiError {
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("unsupported CDMI specification version: {0}")]
    UnsupportedVersion(String),
    #[error("unsupported content type: {0}")]
    UnsupportedMediaType(String),
    #[error("authentication required")]
    Unauthorized,
}

impl CdmiError {
    pub fn status(&self) -> StatusCode {
        match self {
            CdmiError::Namespace(e) => match e.class() {
                ErrorClass::NotFound => StatusCode::NOT_FOUND,
                ErrorClass::Conflict => StatusCode::CONFLICT,
                ErrorClass::InvalidRequest => StatusCode::BAD_REQUEST,
            },
            CdmiError::Schema(_) | CdmiError::UnsupportedVersion(_) => StatusCode::BAD_REQUEST,
            CdmiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CdmiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for CdmiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, error = %self, "cdmi request failed");

        let mut response = (
            status,
            [
                (CONTENT_TYPE, "text/plain"),
                (VERSION_HEADER, SPECIFICATION_VERSION),
            ],
            self.to_string(),
        )
            .into_response();

        if let CdmiError::Unauthorized = self {
            if let Ok(challenge) = format!("Basic realm=\"{}\"", REALM).parse() {
                response.headers_mut().insert(WWW_AUTHENTICATE, challenge);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::prelude::CdmiPath;

    #[test]
    fn test_status_mapping() {
        let not_found = CdmiError::from(NamespaceError::NotFound("/x".to_string()));
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let conflict = CdmiError::from(NamespaceError::ContainerNotEmpty(CdmiPath::root()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let bad = CdmiError::from(NamespaceError::RootImmutable);
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        assert_eq!(
            CdmiError::UnsupportedMediaType("x".to_string()).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let response = CdmiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"cdmi\""
        );
        assert_eq!(response.headers().get(VERSION_HEADER).unwrap(), "1.0.2");
    }
}

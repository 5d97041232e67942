//! Basic authentication for the plain HTTP listener

use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use subtle::ConstantTimeEq;

use super::cdmi::CdmiError;
use crate::state::UserConfig;
use crate::ServiceState;

pub const REALM: &str = "cdmi";

/// Configured accounts, checked in constant time
#[derive(Debug, Default)]
pub struct Credentials {
    users: HashMap<String, String>,
}

impl Credentials {
    pub fn new(users: &[UserConfig]) -> Self {
        Self {
            users: users
                .iter()
                .map(|u| (u.username.clone(), u.password.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        match self.users.get(username) {
            Some(expected) => expected.as_bytes().ct_eq(password.as_bytes()).into(),
            None => false,
        }
    }

    /// Check an `Authorization` header value. Returns the user name on success.
    pub fn authorize(&self, header: &str) -> Option<String> {
        let (username, password) = parse_basic(header)?;
        self.verify(&username, &password).then_some(username)
    }
}

/// Decode `Basic base64(user:password)`
fn parse_basic(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware rejecting requests without valid Basic credentials
pub async fn require_basic(
    State(state): State<ServiceState>,
    request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match header.and_then(|h| state.credentials().authorize(h)) {
        Some(user) => {
            tracing::trace!(%user, "authenticated");
            next.run(request).await
        }
        None => {
            tracing::debug!(
                has_header = header.is_some(),
                "rejecting unauthenticated request"
            );
            CdmiError::Unauthorized.into_response()
        }
    }
}

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use cdmi_daemon::http_server::{self, Listener};
use cdmi_daemon::state::{CompatConfig, UserConfig};
use cdmi_daemon::{ServiceConfig, ServiceState};
use ::common::prelude::{DeletePolicy, NamespaceConfig};

pub const VERSION: &str = "1.0.2";
pub const CONTAINER: &str = "application/cdmi-container";
pub const OBJECT: &str = "application/cdmi-object";
pub const CAPABILITY: &str = "application/cdmi-capability";

pub fn service_config() -> ServiceConfig {
    ServiceConfig {
        http_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        https_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        tls: None,
        users: Vec::new(),
        allow_anonymous: true,
        max_body_bytes: 1024 * 1024,
        namespace: NamespaceConfig::default(),
        compat: CompatConfig::default(),
        log_level: tracing::Level::INFO,
        log_dir: None,
    }
}

/// Adds an account and turns Basic auth on
pub fn with_user(mut config: ServiceConfig, username: &str, password: &str) -> ServiceConfig {
    config.allow_anonymous = false;
    config.users.push(UserConfig {
        username: username.to_string(),
        password: password.to_string(),
    });
    config
}

pub fn with_recursive_delete(mut config: ServiceConfig) -> ServiceConfig {
    config.namespace.delete_policy = DeletePolicy::Recursive;
    config
}

pub async fn setup_router(config: &ServiceConfig, listener: Listener) -> (Router, ServiceState) {
    let state = ServiceState::from_config(config).await.unwrap();
    let http_config = http_server::Config::new(
        config.http_addr,
        config.max_body_bytes,
        config.log_level,
    );
    let router = http_server::router(&http_config, state.clone(), listener);
    (router, state)
}

pub async fn setup() -> Router {
    setup_router(&service_config(), Listener::Http).await.0
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: bytes::Bytes,
}

impl Reply {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).unwrap().to_str().unwrap()
    }

    pub fn object_id(&self) -> String {
        self.json()["objectID"].as_str().unwrap().to_string()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    Reply {
        status,
        headers,
        body,
    }
}

/// CDMI GET with the version header and the given Accept type
pub async fn get(router: &Router, uri: &str, accept: &str) -> Reply {
    let request = Request::get(uri)
        .header("X-CDMI-Specification-Version", VERSION)
        .header("Accept", accept)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

/// CDMI PUT with a JSON body
pub async fn put(router: &Router, uri: &str, content_type: &str, body: serde_json::Value) -> Reply {
    let request = Request::put(uri)
        .header("X-CDMI-Specification-Version", VERSION)
        .header("Content-Type", content_type)
        .header("Accept", content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub async fn delete(router: &Router, uri: &str) -> Reply {
    let request = Request::delete(uri)
        .header("X-CDMI-Specification-Version", VERSION)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

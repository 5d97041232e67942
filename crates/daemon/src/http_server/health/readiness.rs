use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio::time::timeout;

use common::prelude::Namespace;

use crate::ServiceState;

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

#[tracing::instrument(skip(state))]
pub async fn handler(State(state): State<ServiceState>) -> Response {
    check(state.namespace().clone(), HEALTH_CHECK_TIMEOUT).await
}

/// Ready when the namespace lock can be taken for reading in time.
///  A writer stuck holding it shows up here.
async fn check(namespace: Namespace, limit: Duration) -> Response {
    let probe = tokio::task::spawn_blocking(move || namespace.len());
    match timeout(limit, probe).await {
        Ok(Ok(live_ids)) => {
            let msg = serde_json::json!({"status": "ok", "live_ids": live_ids});
            (StatusCode::OK, Json(msg)).into_response()
        }
        Ok(Err(_)) => {
            let msg = serde_json::json!({
                "status": "failure",
                "message": "namespace probe failed"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
        Err(_) => {
            let msg = serde_json::json!({
                "status": "failure",
                "message": "health check timed out"
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(msg)).into_response()
        }
    }
}

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use cdmi_daemon::http_server::Listener;

use crate::common::{
    delete, get, put, send, service_config, setup, setup_router, with_recursive_delete, CAPABILITY,
    CONTAINER, OBJECT, VERSION,
};

#[tokio::test]
async fn test_container_create_then_move() {
    let router = setup().await;

    let created = put(
        &router,
        "/TestContainer02",
        CONTAINER,
        json!({"metadata": {"color": "red", "test": "Test"}}),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.header("x-cdmi-specification-version"), VERSION);
    assert_eq!(created.header("content-type"), CONTAINER);
    let body = created.json();
    assert_eq!(body["objectType"], CONTAINER);
    assert_eq!(body["objectName"], "TestContainer02/");
    assert_eq!(body["metadata"]["color"], "red");
    let id = created.object_id();

    let moved = put(
        &router,
        "/TestContainer2",
        CONTAINER,
        json!({"move": "/TestContainer02", "metadata": {"color": "blue", "test": "Test"}}),
    )
    .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.object_id(), id);
    assert_eq!(moved.json()["metadata"]["color"], "blue");

    let found = get(&router, "/TestContainer2/", CONTAINER).await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.object_id(), id);

    let gone = get(&router, "/TestContainer02", CONTAINER).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let by_id = get(&router, &format!("/cdmi_objectid/{}", id), CONTAINER).await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.json()["parentURI"], "/");
    assert_eq!(by_id.json()["objectName"], "TestContainer2/");
}

#[tokio::test]
async fn test_compat_answers_created_on_container_put() {
    let mut config = service_config();
    config.compat.created_on_container_put = true;
    let (router, _) = setup_router(&config, Listener::Http).await;

    let created = put(&router, "/TestContainer02", CONTAINER, json!({})).await;
    assert_eq!(created.status, StatusCode::CREATED);

    let moved = put(
        &router,
        "/TestContainer2",
        CONTAINER,
        json!({"move": "/TestContainer02"}),
    )
    .await;
    assert_eq!(moved.status, StatusCode::CREATED);

    let updated = put(&router, "/TestContainer2", CONTAINER, json!({"metadata": {"a": "b"}})).await;
    assert_eq!(updated.status, StatusCode::CREATED);

    // data objects are unaffected
    put(&router, "/o.txt", OBJECT, json!({"value": "x"})).await;
    let object = put(&router, "/o.txt", OBJECT, json!({"value": "y"})).await;
    assert_eq!(object.status, StatusCode::OK);
}

#[tokio::test]
async fn test_object_lifecycle() {
    let router = setup().await;

    let created = put(
        &router,
        "/TestObject.txt",
        OBJECT,
        json!({"mimetype": "text/plain", "metadata": {"a": "1"}, "value": "Hello CDMI"}),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.object_id();

    let by_id = get(&router, &format!("/cdmi_objectid/{}", id), OBJECT).await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.header("content-type"), OBJECT);
    let body = by_id.json();
    assert_eq!(body["mimetype"], "text/plain");
    assert_eq!(body["value"], "Hello CDMI");
    assert_eq!(body["valuetransferencoding"], "utf-8");
    assert_eq!(body["valuerange"], "0-9");

    // without CDMI headers the raw value comes back
    let raw = send(
        &router,
        Request::get("/TestObject.txt").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(raw.status, StatusCode::OK);
    assert_eq!(raw.header("content-type"), "text/plain");
    assert_eq!(&raw.body[..], b"Hello CDMI");

    let updated = put(&router, "/TestObject.txt", OBJECT, json!({"value": "Bye"})).await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.object_id(), id);
    assert_eq!(updated.json()["metadata"]["a"], "1");

    assert_eq!(delete(&router, "/TestObject.txt").await.status, StatusCode::NO_CONTENT);
    assert_eq!(delete(&router, "/TestObject.txt").await.status, StatusCode::NOT_FOUND);
    let stale = get(&router, &format!("/cdmi_objectid/{}", id), OBJECT).await;
    assert_eq!(stale.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_raw_put_and_binary_value() {
    let router = setup().await;

    let request = Request::put("/blob.bin")
        .header("Content-Type", "application/octet-stream")
        .body(Body::from(vec![0u8, 159, 146, 150]))
        .unwrap();
    let created = send(&router, request).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert!(created.body.is_empty());

    let cdmi = get(&router, "/blob.bin", OBJECT).await;
    let body = cdmi.json();
    assert_eq!(body["mimetype"], "application/octet-stream");
    assert_eq!(body["valuetransferencoding"], "base64");
    assert_eq!(body["value"], "AJ+Slg==");

    let raw = send(&router, Request::get("/blob.bin").body(Body::empty()).unwrap()).await;
    assert_eq!(&raw.body[..], &[0u8, 159, 146, 150]);
}

#[tokio::test]
async fn test_nested_moves_across_levels() {
    let router = setup().await;

    for path in [
        "/TestContainer31",
        "/TestContainer31/TestContainer32",
        "/TestContainer31/TestContainer32/TestContainer33",
    ] {
        assert_eq!(
            put(&router, path, CONTAINER, json!({})).await.status,
            StatusCode::CREATED
        );
    }
    let object = put(
        &router,
        "/TestContainer31/TestContainer32/TestContainer33/TestObject31.txt",
        OBJECT,
        json!({"mimetype": "text/plain", "value": "deep"}),
    )
    .await;
    assert_eq!(object.status, StatusCode::CREATED);
    let object_id = object.object_id();

    // lift the innermost container to the top level
    let moved = put(
        &router,
        "/TestContainer34",
        CONTAINER,
        json!({"move": "/TestContainer31/TestContainer32/TestContainer33"}),
    )
    .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.json()["children"], json!(["TestObject31.txt"]));

    let relocated = get(&router, &format!("/cdmi_objectid/{}", object_id), OBJECT).await;
    assert_eq!(relocated.status, StatusCode::OK);
    assert_eq!(relocated.json()["parentURI"], "/TestContainer34/");

    // move the object by id, then update it through a trailing-slash parent path
    let by_id = put(
        &router,
        "/TestContainer31/TestObject32.txt",
        OBJECT,
        json!({"move": format!("/cdmi_objectid/{}", object_id)}),
    )
    .await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.object_id(), object_id);
    assert_eq!(by_id.json()["value"], "deep");

    let meta = put(
        &router,
        "/TestContainer31/",
        CONTAINER,
        json!({"metadata": {"level": "1"}}),
    )
    .await;
    assert_eq!(meta.status, StatusCode::OK);
    assert_eq!(
        meta.json()["children"],
        json!(["TestContainer32/", "TestObject32.txt"])
    );

    let empty = get(&router, "/TestContainer34", CONTAINER).await;
    assert_eq!(empty.json()["children"], json!([]));
    assert_eq!(empty.json()["childrenrange"], "");
}

#[tokio::test]
async fn test_move_errors() {
    let router = setup().await;
    put(&router, "/a", CONTAINER, json!({})).await;
    put(&router, "/a/b", CONTAINER, json!({})).await;
    put(&router, "/c", CONTAINER, json!({})).await;

    let into_self = put(&router, "/a/b/a", CONTAINER, json!({"move": "/a"})).await;
    assert_eq!(into_self.status, StatusCode::BAD_REQUEST);

    let occupied = put(&router, "/c", CONTAINER, json!({"move": "/a"})).await;
    assert_eq!(occupied.status, StatusCode::CONFLICT);

    let no_parent = put(&router, "/missing/a", CONTAINER, json!({"move": "/a"})).await;
    assert_eq!(no_parent.status, StatusCode::CONFLICT);

    let no_source = put(&router, "/d", CONTAINER, json!({"move": "/nothing"})).await;
    assert_eq!(no_source.status, StatusCode::NOT_FOUND);

    let wrong_kind = put(&router, "/d", OBJECT, json!({"move": "/a"})).await;
    assert_eq!(wrong_kind.status, StatusCode::CONFLICT);

    // nothing moved
    assert_eq!(get(&router, "/a/b", CONTAINER).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_policies() {
    let router = setup().await;
    put(&router, "/full", CONTAINER, json!({})).await;
    put(&router, "/full/o", OBJECT, json!({"value": "x"})).await;
    assert_eq!(delete(&router, "/full").await.status, StatusCode::CONFLICT);
    assert_eq!(delete(&router, "/").await.status, StatusCode::BAD_REQUEST);

    let (recursive, _) = setup_router(&with_recursive_delete(service_config()), Listener::Http).await;
    put(&recursive, "/full", CONTAINER, json!({})).await;
    let object = put(&recursive, "/full/o", OBJECT, json!({"value": "x"})).await;
    assert_eq!(delete(&recursive, "/full").await.status, StatusCode::NO_CONTENT);
    let stale = get(&recursive, &format!("/cdmi_objectid/{}", object.object_id()), OBJECT).await;
    assert_eq!(stale.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_capabilities() {
    let (router, state) = setup_router(&service_config(), Listener::Http).await;

    let root = get(&router, "/cdmi_capabilities/", CAPABILITY).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.header("content-type"), CAPABILITY);
    let body = root.json();
    assert_eq!(body["objectType"], CAPABILITY);
    assert_eq!(body["children"], json!(["container/", "dataobject/"]));
    assert_eq!(body["capabilities"]["cdmi_object_move_from_ID"], "true");

    let no_slash = get(&router, "/cdmi_capabilities", CAPABILITY).await;
    assert_eq!(no_slash.object_id(), root.object_id());

    let container = get(&router, "/cdmi_capabilities/container/", CAPABILITY).await;
    assert_eq!(container.json()["parentURI"], "/cdmi_capabilities/");

    let ids = state.namespace().capability_ids();
    let by_id = get(&router, &format!("/cdmi_objectid/{}", ids.data_object), OBJECT).await;
    assert_eq!(by_id.status, StatusCode::OK);
    assert_eq!(by_id.json()["objectName"], "dataobject/");

    put(&router, "/o.txt", OBJECT, json!({"value": "x"})).await;
    let of_object = get(&router, "/o.txt", CAPABILITY).await;
    assert_eq!(of_object.status, StatusCode::OK);
    assert_eq!(of_object.object_id(), ids.data_object.to_string());

    let missing = get(&router, "/cdmi_capabilities/queue/", CAPABILITY).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let read_only = put(&router, "/cdmi_capabilities/", CONTAINER, json!({})).await;
    assert_eq!(read_only.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_validation() {
    let router = setup().await;

    let request = Request::get("/")
        .header("X-CDMI-Specification-Version", "0.9")
        .body(Body::empty())
        .unwrap();
    let bad_version = send(&router, request).await;
    assert_eq!(bad_version.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_version.header("x-cdmi-specification-version"), VERSION);

    let capability_body = put(&router, "/x", CAPABILITY, json!({})).await;
    assert_eq!(capability_body.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let request = Request::put("/x")
        .header("Content-Type", CONTAINER)
        .body(Body::from("{not json"))
        .unwrap();
    assert_eq!(send(&router, request).await.status, StatusCode::BAD_REQUEST);

    let bad_id = get(&router, "/cdmi_objectid/XYZ", OBJECT).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);

    let dot_dot = get(&router, "/a/../b", CONTAINER).await;
    assert_ne!(dot_dot.status, StatusCode::OK);

    let kind_mismatch = put(&router, "/", OBJECT, json!({"value": "x"})).await;
    assert_eq!(kind_mismatch.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_undecodable_path_leaves_root_alone() {
    let router = setup().await;

    let hijack = put(
        &router,
        "/%FF",
        CONTAINER,
        json!({"metadata": {"hijacked": "yes"}}),
    )
    .await;
    assert_eq!(hijack.status, StatusCode::BAD_REQUEST);
    assert_eq!(hijack.header("x-cdmi-specification-version"), VERSION);

    let root = get(&router, "/", CONTAINER).await;
    assert_eq!(root.status, StatusCode::OK);
    assert!(root.json()["metadata"].get("hijacked").is_none());

    assert_eq!(delete(&router, "/%FF").await.status, StatusCode::BAD_REQUEST);
    assert_eq!(get(&router, "/%FF", CONTAINER).await.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_body_limit() {
    let mut config = service_config();
    config.max_body_bytes = 16;
    let (router, _) = setup_router(&config, Listener::Http).await;

    let request = Request::put("/big")
        .header("Content-Type", "text/plain")
        .body(Body::from(vec![b'a'; 64]))
        .unwrap();
    assert_eq!(send(&router, request).await.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_status_routes() {
    let router = setup().await;

    let live = send(&router, Request::get("/_status/livez").body(Body::empty()).unwrap()).await;
    assert_eq!(live.status, StatusCode::OK);

    let ready = send(&router, Request::get("/_status/readyz").body(Body::empty()).unwrap()).await;
    assert_eq!(ready.status, StatusCode::OK);

    let version = send(&router, Request::get("/_status/version").body(Body::empty()).unwrap()).await;
    assert_eq!(version.status, StatusCode::OK);
    assert_eq!(version.json()["cdmi_specification_version"], VERSION);
}

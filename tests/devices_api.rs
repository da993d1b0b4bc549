use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use devices::domain::device::service::Service;
use devices::inbound::http::responses::{ApiErrorBody, DeviceResponseData};
use devices::inbound::http::router;
use devices::outbound::sqlite::Sqlite;

async fn app() -> Router {
    let sqlite = Sqlite::in_memory().await.unwrap();
    router(Service::new(sqlite))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

async fn create(app: &Router, name: &str, brand: &str, state: &str) -> DeviceResponseData {
    let (status, body) = send(
        app,
        "POST",
        "/api/devices",
        Some(json!({ "name": name, "brand": brand, "state": state })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    serde_json::from_value(body).unwrap()
}

fn devices(body: Value) -> Vec<DeviceResponseData> {
    serde_json::from_value(body).unwrap()
}

fn error(body: Value) -> ApiErrorBody {
    serde_json::from_value(body).unwrap()
}

fn ids(devices: &[DeviceResponseData]) -> Vec<String> {
    let mut ids: Vec<String> = devices.iter().map(|d| d.id.clone()).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_device_lifecycle_scenario() {
    let app = app().await;
    let a = create(&app, "iPhone 15", "Apple", "AVAILABLE").await;
    let b = create(&app, "MacBook Pro", "Apple", "IN_USE").await;
    let c = create(&app, "ThinkPad", "Lenovo", "INACTIVE").await;

    let (status, body) = send(&app, "GET", "/api/devices/brand/apple", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&devices(body)), ids(&[a.clone(), b.clone()]));

    let (status, body) = send(&app, "GET", "/api/devices/state/IN_USE", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(devices(body), vec![b.clone()]);

    let b_uri = format!("/api/devices/{}", b.id);
    let (status, body) = send(&app, "DELETE", &b_uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error(body),
        ApiErrorBody {
            status: 400,
            error: "Bad Request".to_string(),
            message: "cannot delete a device that is in use".to_string(),
            path: b_uri.clone(),
        }
    );

    let (status, body) = send(&app, "PUT", &b_uri, Some(json!({ "state": "AVAILABLE" }))).await;
    assert_eq!(status, StatusCode::OK);
    let updated: DeviceResponseData = serde_json::from_value(body).unwrap();
    assert_eq!(updated.state, "AVAILABLE");
    assert_eq!(updated.name, b.name);
    assert_eq!(updated.created_at, b.created_at);

    let (status, body) = send(&app, "DELETE", &b_uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", &b_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error(body).status, 404);

    let (status, body) = send(&app, "GET", "/api/devices", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&devices(body)), ids(&[a, c]));
}

#[tokio::test]
async fn test_create_returns_full_record() {
    let app = app().await;

    let created = create(&app, "Router", "Netgear", "IN_USE").await;
    let (status, body) = send(&app, "GET", &format!("/api/devices/{}", created.id), None).await;

    assert!(!created.id.is_empty());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["createdAt"], json!(created.created_at));
    assert_eq!(serde_json::from_value::<DeviceResponseData>(body).unwrap(), created);
}

#[tokio::test]
async fn test_create_rejects_invalid_bodies() {
    let app = app().await;
    let bodies = [
        json!({ "brand": "Apple", "state": "AVAILABLE" }),
        json!({ "name": "iPhone 15", "brand": "  ", "state": "AVAILABLE" }),
        json!({ "name": "iPhone 15", "brand": "Apple", "state": "BROKEN" }),
        json!({ "name": "iPhone 15", "brand": "Apple" }),
    ];

    for body in bodies {
        let (status, body) = send(&app, "POST", "/api/devices", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error = error(body);
        assert_eq!(error.error, "Bad Request");
        assert_eq!(error.path, "/api/devices");
    }

    let (_, body) = send(&app, "GET", "/api/devices", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = app().await;
    let missing = "/api/devices/550e8400-e29b-41d4-a716-446655440000";

    let (get, _) = send(&app, "GET", missing, None).await;
    let (put, _) = send(&app, "PUT", missing, Some(json!({ "name": "X" }))).await;
    let (delete, _) = send(&app, "DELETE", missing, None).await;
    let (malformed, body) = send(&app, "GET", "/api/devices/not-a-uuid", None).await;

    assert_eq!(get, StatusCode::NOT_FOUND);
    assert_eq!(put, StatusCode::NOT_FOUND);
    assert_eq!(delete, StatusCode::NOT_FOUND);
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
    assert_eq!(error(body).path, "/api/devices/not-a-uuid");
}

#[tokio::test]
async fn test_update_partial_merge() {
    let app = app().await;
    let created = create(&app, "ThinkPad", "Lenovo", "AVAILABLE").await;
    let uri = format!("/api/devices/{}", created.id);

    let body = json!({ "name": "ThinkPad X1", "brand": null });
    let (status, body) = send(&app, "PUT", &uri, Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    let updated: DeviceResponseData = serde_json::from_value(body).unwrap();
    assert_eq!(updated.name, "ThinkPad X1");
    assert_eq!(updated.brand, "Lenovo");
    assert_eq!(updated.state, "AVAILABLE");
    assert_eq!(updated.id, created.id);
}

#[tokio::test]
async fn test_update_in_use_name_rejected_without_effect() {
    let app = app().await;
    let created = create(&app, "MacBook Pro", "Apple", "IN_USE").await;
    let uri = format!("/api/devices/{}", created.id);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "name": "MacBook Air", "state": "AVAILABLE" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error(body).message,
        "cannot update name or brand of a device in use"
    );

    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(serde_json::from_value::<DeviceResponseData>(body).unwrap(), created);
}

#[tokio::test]
async fn test_update_rejects_blank_name_and_bad_json() {
    let app = app().await;
    let created = create(&app, "ThinkPad", "Lenovo", "AVAILABLE").await;
    let uri = format!("/api/devices/{}", created.id);

    let (blank, _) = send(&app, "PUT", &uri, Some(json!({ "name": "" }))).await;
    let (bad_state, _) = send(&app, "PUT", &uri, Some(json!({ "state": "available" }))).await;
    let (bad_json, _) = send(&app, "PUT", &uri, Some(json!("not an object"))).await;

    assert_eq!(blank, StatusCode::BAD_REQUEST);
    assert_eq!(bad_state, StatusCode::BAD_REQUEST);
    assert_eq!(bad_json, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_find_by_brand_ignores_case() {
    let app = app().await;
    create(&app, "iPhone 15", "Apple", "AVAILABLE").await;
    create(&app, "ThinkPad", "Lenovo", "INACTIVE").await;

    let (_, lower) = send(&app, "GET", "/api/devices/brand/apple", None).await;
    let (_, upper) = send(&app, "GET", "/api/devices/brand/APPLE", None).await;
    let (status, none) = send(&app, "GET", "/api/devices/brand/Samsung", None).await;

    assert_eq!(ids(&devices(lower.clone())), ids(&devices(upper)));
    assert_eq!(devices(lower).len(), 1);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_find_by_brand_ignores_non_ascii_case() {
    let app = app().await;
    let skoda = create(&app, "Enyaq", "ŠKODA", "AVAILABLE").await;

    // "škoda", percent-encoded
    let (status, body) = send(&app, "GET", "/api/devices/brand/%C5%A1koda", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&devices(body)), vec![skoda.id]);
}

#[tokio::test]
async fn test_find_by_state() {
    let app = app().await;
    let available = create(&app, "iPhone 15", "Apple", "AVAILABLE").await;
    let inactive = create(&app, "ThinkPad", "Lenovo", "INACTIVE").await;

    let (_, body) = send(&app, "GET", "/api/devices/state/AVAILABLE", None).await;
    assert_eq!(devices(body), vec![available]);

    let (_, body) = send(&app, "GET", "/api/devices/state/INACTIVE", None).await;
    assert_eq!(devices(body), vec![inactive]);

    let (_, body) = send(&app, "GET", "/api/devices/state/IN_USE", None).await;
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, "GET", "/api/devices/state/BROKEN", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error(body).path, "/api/devices/state/BROKEN");
}

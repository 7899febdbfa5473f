#[macro_use]
extern crate time_test;

mod common;

use rocket::http::{ContentType, Status};
use rocket::tokio;
use serde_json::Value;

use common::client;

#[tokio::test]
async fn test_health_status() {
    let client = client().await;
    time_test!("test_health_status");

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert!(
        response
            .headers()
            .get_one("Content-Security-Policy")
            .is_some()
    );

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[tokio::test]
async fn test_unknown_api_path_is_json_404() {
    let client = client().await;
    time_test!("test_unknown_api_path_is_json_404");

    let response = client.get("/api/v1/nothing").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "API endpoint not found");
    assert_eq!(body["path"], "/api/v1/nothing");
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_client_routes_serve_index() {
    let client = client().await;
    time_test!("test_client_routes_serve_index");

    let response = client.get("/dashboard/sales").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));
    let html = response.into_string().await.unwrap();
    assert!(html.contains("EasyGestion"));
}

#[tokio::test]
async fn test_missing_upload_is_404() {
    let client = client().await;
    time_test!("test_missing_upload_is_404");

    let response = client.get("/uploads/missing.pdf").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "File not found");
    assert_eq!(body["path"], "/uploads/missing.pdf");
    assert_eq!(body["status"], 404);
}

#[test]
fn test_mistyped_config_aborts_startup() {
    let figment = rocket::Config::figment()
        .merge(("jwt_secret", "my-production-secret"))
        .merge(("jwt_expires_in", "soon"));
    assert!(easygestion_api::build_rocket(figment).is_err());
}

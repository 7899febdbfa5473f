//! Helpers shared by the integration tests.

#![allow(dead_code)]

use rocket::http::{Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{Value, json};

use easygestion_api::orm::testing::test_rocket;

pub async fn client() -> Client {
    Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance")
}

/// Logs in and returns the access token from the response body.
pub async fn login(client: &Client, email: &str, password: &str) -> String {
    let response = client
        .post("/api/v1/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok, "login as {} failed", email);
    let body: Value = response.into_json().await.expect("login body");
    body["token"].as_str().expect("token in login body").to_string()
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

/// Employee id linked to the account behind `token`.
pub async fn own_employee_id(client: &Client, token: &str) -> i32 {
    let response = client
        .get("/api/v1/auth/me")
        .header(bearer(token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("me body");
    body["user"]["employee"]["id"]
        .as_i64()
        .expect("account has an employee record") as i32
}

/// Id of the active package called `name`.
pub async fn package_id(client: &Client, token: &str, name: &str) -> i32 {
    let response = client
        .get("/api/v1/packages")
        .header(bearer(token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.expect("packages body");
    body["packages"]
        .as_array()
        .expect("packages array")
        .iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["id"].as_i64())
        .unwrap_or_else(|| panic!("package {} not found", name)) as i32
}

#[macro_use]
extern crate time_test;

mod common;

use rocket::http::{ContentType, Header, Status};
use rocket::tokio;
use serde_json::{Value, json};

use common::{bearer, client, login};
use easygestion_api::orm::testing::{
    ADMIN_EMAIL, ALICE_EMAIL, SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD, TEST_PASSWORD,
};

#[tokio::test]
async fn test_login_success_sets_cookie_and_returns_token() {
    let client = client().await;
    time_test!("test_login_success_sets_cookie_and_returns_token");

    let response = client
        .post("/api/v1/auth/login")
        .json(&json!({ "email": ALICE_EMAIL, "password": TEST_PASSWORD }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert!(response.cookies().get("accessToken").is_some());

    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], ALICE_EMAIL);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_login_email_is_case_insensitive() {
    let client = client().await;
    time_test!("test_login_email_is_case_insensitive");

    let response = client
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "  ALICE@Salon.Test ", "password": TEST_PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn test_login_failures() {
    let client = client().await;
    time_test!("test_login_failures");

    for (email, password) in [
        (ALICE_EMAIL, "wrong_password"),
        ("nobody@salon.test", TEST_PASSWORD),
    ] {
        let response = client
            .post("/api/v1/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error"], "Invalid credentials");
    }

    let response = client
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "", "password": "" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Email and password are required");
}

#[tokio::test]
async fn test_default_super_admin_can_log_in() {
    let client = client().await;
    time_test!("test_default_super_admin_can_log_in");

    let token = login(&client, SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD).await;
    let response = client
        .get("/api/v1/auth/me")
        .header(bearer(&token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["user"]["role"], "superAdmin");
    assert!(body["user"]["employee"].is_null());
}

#[tokio::test]
async fn test_register_creates_plain_user() {
    let client = client().await;
    time_test!("test_register_creates_plain_user");

    let response = client
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "newcomer",
            "email": "Newcomer@Salon.test",
            "password": TEST_PASSWORD,
            "role": "admin"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "newcomer@salon.test");
    // Anonymous callers cannot pick their role
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn test_super_admin_can_register_admin() {
    let client = client().await;
    time_test!("test_super_admin_can_register_admin");

    let token = login(&client, SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD).await;
    let response = client
        .post("/api/v1/auth/register")
        .header(bearer(&token))
        .json(&json!({
            "username": "second-manager",
            "email": "manager2@salon.test",
            "password": TEST_PASSWORD,
            "role": "admin"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_cookie_register_needs_csrf_token_to_grant_role() {
    let client = client().await;
    time_test!("test_cookie_register_needs_csrf_token_to_grant_role");

    login(&client, SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD).await;
    let response = client.get("/api/v1/csrf-token").dispatch().await;
    let body: Value = response.into_json().await.unwrap();
    let csrf = body["csrfToken"].as_str().unwrap().to_string();

    let response = client
        .post("/api/v1/auth/register")
        .header(Header::new("X-CSRF-Token", csrf))
        .json(&json!({
            "username": "cookie-manager",
            "email": "cookie.manager@salon.test",
            "password": TEST_PASSWORD,
            "role": "admin"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["user"]["role"], "admin");

    // Registering replaced the session cookie, so sign back in
    login(&client, SUPERADMIN_EMAIL, SUPERADMIN_PASSWORD).await;
    let response = client
        .post("/api/v1/auth/register")
        .json(&json!({
            "username": "cookie-stylist",
            "email": "cookie.stylist@salon.test",
            "password": TEST_PASSWORD,
            "role": "admin"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn test_register_validation_and_duplicates() {
    let client = client().await;
    time_test!("test_register_validation_and_duplicates");

    let response = client
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "x", "email": "not-an-email", "password": "weak" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].as_array().unwrap().len() >= 3);

    let response = client
        .post("/api/v1/auth/register")
        .json(&json!({ "username": "someone", "email": ADMIN_EMAIL, "password": TEST_PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "User already exists");
}

#[tokio::test]
async fn test_me_requires_token() {
    let client = client().await;
    time_test!("test_me_requires_token");

    let response = client.get("/api/v1/auth/me").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Access token required");

    let response = client
        .get("/api/v1/auth/me")
        .header(bearer("not.a.token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_cookie_session_and_logout() {
    let client = client().await;
    time_test!("test_cookie_session_and_logout");

    login(&client, ALICE_EMAIL, TEST_PASSWORD).await;

    // The tracked client replays the accessToken cookie
    let response = client.get("/api/v1/auth/me").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["user"]["email"], ALICE_EMAIL);
    assert_eq!(body["user"]["employee"]["name"], "Alice Martin");

    let response = client.post("/api/v1/auth/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["message"], "Logout successful");

    let response = client.get("/api/v1/auth/me").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_cookie_requests_need_csrf_token() {
    let client = client().await;
    time_test!("test_cookie_requests_need_csrf_token");

    login(&client, ALICE_EMAIL, TEST_PASSWORD).await;
    let expense = json!({ "category": "Fournitures", "amount": 12.5 });

    let response = client
        .post("/api/v1/expenses")
        .header(ContentType::JSON)
        .body(expense.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid CSRF token");

    let response = client.get("/api/v1/csrf-token").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert!(response.cookies().get("_csrf").is_some());
    let body: Value = response.into_json().await.unwrap();
    let csrf = body["csrfToken"].as_str().unwrap().to_string();

    let response = client
        .post("/api/v1/expenses")
        .header(ContentType::JSON)
        .header(Header::new("X-CSRF-Token", csrf))
        .body(expense.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
}

#[tokio::test]
async fn test_deactivated_user_is_rejected() {
    let client = client().await;
    time_test!("test_deactivated_user_is_rejected");

    let alice_token = login(&client, ALICE_EMAIL, TEST_PASSWORD).await;
    let admin_token = login(&client, ADMIN_EMAIL, TEST_PASSWORD).await;

    let response = client
        .get("/api/v1/auth/me")
        .header(bearer(&alice_token))
        .dispatch()
        .await;
    let body: Value = response.into_json().await.unwrap();
    let alice_id = body["user"]["id"].as_i64().unwrap();

    let response = client
        .put(format!("/api/v1/users/{}", alice_id))
        .header(bearer(&admin_token))
        .json(&json!({ "isActive": false }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // Existing tokens stop working immediately
    let response = client
        .get("/api/v1/auth/me")
        .header(bearer(&alice_token))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "User not found or inactive");

    let response = client
        .post("/api/v1/auth/login")
        .json(&json!({ "email": ALICE_EMAIL, "password": TEST_PASSWORD }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

//! Account registration, login and logout.
//!
//! A successful login or registration returns the access token in the body
//! and also stores it in the `accessToken` cookie, so browser clients and
//! API clients can pick whichever transport suits them.

use rocket::http::{CookieJar, Status};
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiResult, api_error, bad_request, internal_error, not_found, validation_failed};
use crate::config::AppConfig;
use crate::csrf::{generate_token, set_csrf_cookie};
use crate::logged_json::LoggedJson;
use crate::models::{Role, UserInput, UserProfile, UserWithEmployee};
use crate::orm::DbConn;
use crate::orm::login::{authenticate, hash_password};
use crate::orm::user::{find_conflicting_user, get_user_with_employee, insert_user};
use crate::session_guards::{
    AuthenticatedUser, clear_access_token_cookie, set_access_token_cookie,
};
use crate::token::issue_token;
use crate::validation::{Validator, normalize_email};

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Only honoured when the caller is a signed-in super admin.
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register endpoint.
///
/// - **URL:** `/api/v1/auth/register`
/// - **Method:** `POST`
/// - **Authentication:** None; a super admin may pass `role`
///
/// # Response
///
/// **Success (HTTP 201 Created):**
/// ```json
/// { "message": "User registered successfully", "user": { ... }, "token": "eyJ..." }
/// ```
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "Validation failed", "details": ["A valid email is required"] }
/// { "error": "User already exists" }
/// ```
#[post("/v1/auth/register", data = "<request>")]
pub async fn register(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    caller: Option<AuthenticatedUser>,
    request: LoggedJson<RegisterRequest>,
) -> ApiResult<status::Created<Json<Value>>> {
    let request = request.into_inner();

    let mut validator = Validator::new();
    validator
        .username(&request.username)
        .email(&request.email)
        .password(&request.password);
    validator.finish().map_err(validation_failed)?;

    let role = match (request.role, caller.as_ref()) {
        (Some(role), Some(caller)) if caller.is_super_admin() => role,
        _ => Role::User,
    };

    let password_hash = hash_password(&request.password).map_err(internal_error)?;
    let username = request.username.trim().to_string();
    let email = normalize_email(&request.email);

    let user = db
        .run(move |conn| {
            if find_conflicting_user(conn, Some(&username), Some(&email), None)
                .map_err(internal_error)?
                .is_some()
            {
                return Err(bad_request("User already exists"));
            }
            insert_user(
                conn,
                UserInput {
                    username,
                    email,
                    password_hash,
                    role,
                    avatar: None,
                },
            )
            .map_err(|e| {
                if super::is_unique_violation(&e) {
                    bad_request("User already exists")
                } else {
                    internal_error(e)
                }
            })
        })
        .await?;

    let token = issue_token(config, &user).map_err(internal_error)?;
    set_access_token_cookie(cookies, &token, config);
    info!("Registered user {} with role {}", user.email, user.role);

    Ok(status::Created::new("/api/v1/auth/me").body(Json(json!({
        "message": "User registered successfully",
        "user": UserProfile::from(user),
        "token": token,
    }))))
}

/// Login endpoint.
///
/// - **URL:** `/api/v1/auth/login`
/// - **Method:** `POST`
/// - **Authentication:** None
///
/// The email is matched case-insensitively. Unknown accounts, wrong
/// passwords and deactivated accounts all produce the same 401.
///
/// **Success (HTTP 200 OK):**
/// ```json
/// { "message": "Login successful", "user": { ... }, "token": "eyJ..." }
/// ```
#[post("/v1/auth/login", data = "<request>")]
pub async fn login(
    db: DbConn,
    cookies: &CookieJar<'_>,
    config: &State<AppConfig>,
    request: LoggedJson<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let user = match authenticate(&db, &request.email, &request.password).await {
        Ok(user) => user,
        Err(status) if status == Status::BadRequest => {
            return Err(bad_request("Email and password are required"));
        }
        Err(status) if status == Status::Unauthorized => {
            warn!("Failed login for {}", normalize_email(&request.email));
            return Err(api_error(Status::Unauthorized, "Invalid credentials"));
        }
        Err(status) => return Err(api_error(status, "Internal server error")),
    };

    let token = issue_token(config, &user).map_err(internal_error)?;
    set_access_token_cookie(cookies, &token, config);
    info!("User {} logged in", user.email);

    Ok(Json(json!({
        "message": "Login successful",
        "user": UserProfile::from(user),
        "token": token,
    })))
}

/// Logout endpoint.
///
/// - **URL:** `/api/v1/auth/logout`
/// - **Method:** `POST`
/// - **Authentication:** None
///
/// Tokens are stateless; logging out only drops the cookie.
#[post("/v1/auth/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Json<Value> {
    clear_access_token_cookie(cookies);
    Json(json!({ "message": "Logout successful" }))
}

/// Current user endpoint.
///
/// - **URL:** `/api/v1/auth/me`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Returns the caller with their employee record, or `"employee": null`
/// for accounts that are not employees.
#[get("/v1/auth/me")]
pub async fn me(db: DbConn, auth_user: AuthenticatedUser) -> ApiResult<Json<Value>> {
    let user_id = auth_user.id();
    let user: UserWithEmployee = db
        .run(move |conn| get_user_with_employee(conn, user_id))
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("User not found"))?
        .into();
    Ok(Json(json!({ "user": user })))
}

/// CSRF token endpoint.
///
/// - **URL:** `/api/v1/csrf-token`
/// - **Method:** `GET`
/// - **Authentication:** None
///
/// Issues a fresh token, stores it in the `_csrf` cookie and returns it as
/// `{ "csrfToken": "..." }`. Cookie-authenticated POST, PUT and DELETE
/// requests must send it back in the `X-CSRF-Token` header.
#[get("/v1/csrf-token")]
pub fn csrf_token(cookies: &CookieJar<'_>, config: &State<AppConfig>) -> Json<Value> {
    let token = generate_token();
    set_csrf_cookie(cookies, &token, config.secure_cookies);
    Json(json!({ "csrfToken": token }))
}

pub fn routes() -> Vec<Route> {
    routes![register, login, logout, me, csrf_token]
}

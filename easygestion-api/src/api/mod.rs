//! API version 1.
//!
//! Every resource module exports `routes()`; they are mounted together
//! under `/api`, so a route declared as `/v1/sales/...` is served at
//! `/api/v1/sales/...`.

pub mod admin_charge;
pub mod alert;
pub mod analytics;
pub mod auth;
pub mod employee;
pub mod expense;
pub mod goal;
pub mod package;
pub mod receipt;
pub mod salary;
pub mod sale;
pub mod spa;
pub mod status;
pub mod user;

use std::fmt::Display;

use diesel::SqliteConnection;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Serialize;
use ts_rs::TS;

use crate::models::Employee;
use crate::orm::employee::get_employee;
use crate::session_guards::Caller;

/// Error body returned by every handler.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

pub type ApiError = Custom<Json<ErrorResponse>>;
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(code: Status, message: impl Into<String>) -> ApiError {
    Custom(
        code,
        Json(ErrorResponse {
            error: message.into(),
            details: Vec::new(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    api_error(Status::BadRequest, message)
}

pub fn forbidden(message: impl Into<String>) -> ApiError {
    api_error(Status::Forbidden, message)
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    api_error(Status::NotFound, message)
}

pub fn conflict(message: impl Into<String>) -> ApiError {
    api_error(Status::Conflict, message)
}

/// Logs the cause and hides it from the client.
pub fn internal_error(e: impl Display) -> ApiError {
    error!("Internal error: {}", e);
    api_error(Status::InternalServerError, "Internal server error")
}

/// 400 "Validation failed" with one entry per problem.
pub fn validation_failed(details: Vec<String>) -> ApiError {
    Custom(
        Status::BadRequest,
        Json(ErrorResponse {
            error: "Validation failed".to_string(),
            details,
        }),
    )
}

pub fn is_unique_violation(e: &DieselError) -> bool {
    matches!(e, DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
}

/// Loads an employee the caller may act on.
///
/// Admins reach every employee; a `user` only the record linked to their
/// own account.
pub fn ensure_employee_access(
    conn: &mut SqliteConnection,
    caller: Caller,
    employee_id: i32,
) -> ApiResult<Employee> {
    let employee = get_employee(conn, employee_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Employee not found"))?;
    if caller.is_admin() || employee.user_id == caller.id {
        Ok(employee)
    } else {
        Err(forbidden("Access denied"))
    }
}

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(user::routes());
    routes.extend(employee::routes());
    routes.extend(package::routes());
    routes.extend(sale::routes());
    routes.extend(receipt::routes());
    routes.extend(expense::routes());
    routes.extend(salary::routes());
    routes.extend(admin_charge::routes());
    routes.extend(analytics::routes());
    routes.extend(goal::routes());
    routes.extend(alert::routes());
    routes
}

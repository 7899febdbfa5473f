//! Employee records.
//!
//! Employees are created through `POST /api/v1/users`; this module only
//! reads and edits the HR fields.

use chrono::NaiveDate;
use rocket::Route;
use rocket::serde::json::{Json, Value, json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiResult, ensure_employee_access, internal_error, not_found, validation_failed};
use crate::logged_json::LoggedJson;
use crate::models::{EmployeeChangeset, EmployeeWithUser, UserSummary};
use crate::orm::DbConn;
use crate::orm::employee::{get_employee, list_employees_with_users, update_employee};
use crate::session_guards::{AdminUser, AuthenticatedUser};
use crate::validation::Validator;

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    #[ts(type = "string | null")]
    pub hire_date: Option<NaiveDate>,
}

/// List Employees endpoint.
///
/// - **URL:** `/api/v1/employees`
/// - **Method:** `GET`
/// - **Authentication:** Admin
#[get("/v1/employees")]
pub async fn list_employees(db: DbConn, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let employees: Vec<EmployeeWithUser> = db
        .run(list_employees_with_users)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(|(employee, user)| EmployeeWithUser {
            employee,
            user: UserSummary::from(user),
        })
        .collect();
    Ok(Json(json!({ "employees": employees })))
}

/// Get Employee endpoint.
///
/// - **URL:** `/api/v1/employees/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** Admin, or the employee themself
#[get("/v1/employees/<employee_id>")]
pub async fn get_employee_by_id(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let employee = db
        .run(move |conn| ensure_employee_access(conn, caller, employee_id))
        .await?;
    Ok(Json(json!({ "employee": employee })))
}

/// Update Employee endpoint.
///
/// - **URL:** `/api/v1/employees/<employee_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin
///
/// Body: any of `name`, `position`, `hireDate`. The deduction percentage
/// has its own endpoint under `/api/v1/users`.
#[put("/v1/employees/<employee_id>", data = "<request>")]
pub async fn update_employee_by_id(
    db: DbConn,
    _admin: AdminUser,
    employee_id: i32,
    request: LoggedJson<UpdateEmployeeRequest>,
) -> ApiResult<Json<Value>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    if let Some(name) = &request.name {
        validator.not_blank(name, "Name");
    }
    if let Some(position) = &request.position {
        validator.not_blank(position, "Position");
    }
    validator.finish().map_err(validation_failed)?;

    let employee = db
        .run(move |conn| {
            if get_employee(conn, employee_id)
                .map_err(internal_error)?
                .is_none()
            {
                return Err(not_found("Employee not found"));
            }
            update_employee(
                conn,
                employee_id,
                EmployeeChangeset {
                    name: request.name,
                    position: request.position,
                    hire_date: request.hire_date,
                    ..Default::default()
                },
            )
            .map_err(internal_error)
        })
        .await?;

    Ok(Json(json!({
        "message": "Employee updated successfully",
        "employee": employee,
    })))
}

pub fn routes() -> Vec<Route> {
    routes![list_employees, get_employee_by_id, update_employee_by_id]
}

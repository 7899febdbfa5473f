//! Payroll.
//!
//! Salaries are generated for every employee at once from the sales and
//! receipts dated inside the requested period, both ends included.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};

use super::{ApiResult, bad_request, ensure_employee_access, internal_error, not_found};
use crate::logged_json::LoggedJson;
use crate::models::GenerateSalariesRequest;
use crate::orm::DbConn;
use crate::orm::salary::{delete_salary, generate_salaries, list_salaries_for_employee};
use crate::session_guards::{AdminUser, AuthenticatedUser};

/// List Salaries endpoint.
///
/// - **URL:** `/api/v1/salaries/employee/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** Admin, or the employee themself
///
/// Latest period first.
#[get("/v1/salaries/employee/<employee_id>")]
pub async fn list_salaries(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let salaries = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            list_salaries_for_employee(conn, employee_id).map_err(internal_error)
        })
        .await?;
    Ok(Json(json!({ "salaries": salaries })))
}

/// Generate Salaries endpoint.
///
/// - **URL:** `/api/v1/salaries/generate`
/// - **Method:** `POST`
/// - **Authentication:** Admin
///
/// Body: `{ "periodStart": "2025-03-01", "periodEnd": "2025-03-31" }`
///
/// For each employee, `baseSalary` is the sum of their sales and receipts
/// in the period and `totalSalary` is what remains after their deduction
/// percentage, never below zero.
///
/// **Success (HTTP 201 Created):**
/// ```json
/// { "message": "Salaries generated successfully", "salaries": [ ... ] }
/// ```
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "Period start must not be after period end" }
/// ```
#[post("/v1/salaries/generate", data = "<request>")]
pub async fn generate(
    db: DbConn,
    admin: AdminUser,
    request: LoggedJson<GenerateSalariesRequest>,
) -> ApiResult<status::Created<Json<Value>>> {
    let GenerateSalariesRequest {
        period_start,
        period_end,
    } = request.into_inner();
    if period_start > period_end {
        return Err(bad_request("Period start must not be after period end"));
    }

    let salaries = db
        .run(move |conn| generate_salaries(conn, period_start, period_end))
        .await
        .map_err(internal_error)?;
    info!(
        "Admin {} generated {} salaries for {} to {}",
        admin.user.email,
        salaries.len(),
        period_start,
        period_end
    );

    Ok(status::Created::new("/api/v1/salaries").body(Json(json!({
        "message": "Salaries generated successfully",
        "salaries": salaries,
    }))))
}

/// Delete Salary endpoint.
///
/// - **URL:** `/api/v1/salaries/<salary_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Admin
#[delete("/v1/salaries/<salary_id>")]
pub async fn delete_salary_by_id(
    db: DbConn,
    _admin: AdminUser,
    salary_id: i32,
) -> ApiResult<Json<Value>> {
    let deleted = db
        .run(move |conn| delete_salary(conn, salary_id))
        .await
        .map_err(internal_error)?;
    if deleted == 0 {
        return Err(not_found("Salary not found"));
    }
    Ok(Json(json!({ "message": "Salary deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![list_salaries, generate, delete_salary_by_id]
}

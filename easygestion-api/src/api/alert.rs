//! Notifications shown to employees.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};

use super::{ApiResult, ensure_employee_access, internal_error, not_found, validation_failed};
use crate::logged_json::LoggedJson;
use crate::models::AlertInput;
use crate::orm::DbConn;
use crate::orm::alert::{get_alert, insert_alert, list_alerts_for_employee, mark_alert_read};
use crate::session_guards::{AdminUser, AuthenticatedUser};
use crate::validation::Validator;

/// List Alerts endpoint.
///
/// - **URL:** `/api/v1/alerts/employee/<employee_id>?unread=true`
/// - **Method:** `GET`
/// - **Authentication:** Admin, or the employee themself
#[get("/v1/alerts/employee/<employee_id>?<unread>")]
pub async fn list_alerts(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    unread: Option<bool>,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let unread_only = unread.unwrap_or(false);
    let alerts = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            list_alerts_for_employee(conn, employee_id, unread_only).map_err(internal_error)
        })
        .await?;
    Ok(Json(json!({ "alerts": alerts })))
}

/// Create Alert endpoint.
///
/// - **URL:** `/api/v1/alerts/employee/<employee_id>`
/// - **Method:** `POST`
/// - **Authentication:** Admin
///
/// Body: `{ "message": "Inventaire samedi", "type": "warning" }`
#[post("/v1/alerts/employee/<employee_id>", data = "<request>")]
pub async fn create_alert(
    db: DbConn,
    admin: AdminUser,
    employee_id: i32,
    request: LoggedJson<AlertInput>,
) -> ApiResult<status::Created<Json<Value>>> {
    let input = request.into_inner();
    let mut validator = Validator::new();
    validator.not_blank(&input.message, "Message");
    validator.finish().map_err(validation_failed)?;

    let caller = AuthenticatedUser::from(admin).caller();
    let alert = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            insert_alert(conn, employee_id, &input.message, input.alert_type)
                .map_err(internal_error)
        })
        .await?;

    Ok(status::Created::new(format!("/api/v1/alerts/employee/{}", employee_id)).body(Json(
        json!({
            "message": "Alert created successfully",
            "alert": alert,
        }),
    )))
}

/// Mark Alert Read endpoint.
///
/// - **URL:** `/api/v1/alerts/<alert_id>/read`
/// - **Method:** `PUT`
/// - **Authentication:** Admin, or the employee the alert belongs to
#[put("/v1/alerts/<alert_id>/read")]
pub async fn mark_read(
    db: DbConn,
    auth_user: AuthenticatedUser,
    alert_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let alert = db
        .run(move |conn| {
            let alert = get_alert(conn, alert_id)
                .map_err(internal_error)?
                .ok_or_else(|| not_found("Alert not found"))?;
            ensure_employee_access(conn, caller, alert.employee_id)?;
            mark_alert_read(conn, alert_id).map_err(internal_error)
        })
        .await?;
    Ok(Json(json!({
        "message": "Alert marked as read",
        "alert": alert,
    })))
}

pub fn routes() -> Vec<Route> {
    routes![list_alerts, create_alert, mark_read]
}

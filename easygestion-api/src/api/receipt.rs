//! Free-amount payments collected by employees.

use chrono::NaiveDateTime;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiResult, ensure_employee_access, internal_error, not_found, validation_failed};
use crate::dates::deserialize_optional_datetime;
use crate::logged_json::LoggedJson;
use crate::models::{NewReceipt, ReceiptChangeset};
use crate::orm::receipt::{
    delete_receipt_for_employee, get_receipt_for_employee, insert_receipt,
    list_receipts_for_employee, update_receipt,
};
use crate::orm::{DbConn, now};
use crate::session_guards::AuthenticatedUser;
use crate::validation::Validator;

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateReceiptRequest {
    pub client_name: String,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateReceiptRequest {
    pub client_name: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDateTime>,
}

/// List Receipts endpoint.
///
/// - **URL:** `/api/v1/receipts/employee/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** Admin, or the employee themself
#[get("/v1/receipts/employee/<employee_id>")]
pub async fn list_receipts(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let receipts = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            list_receipts_for_employee(conn, employee_id).map_err(internal_error)
        })
        .await?;
    Ok(Json(json!({ "receipts": receipts })))
}

/// Create Receipt endpoint.
///
/// - **URL:** `/api/v1/receipts/employee/<employee_id>`
/// - **Method:** `POST`
/// - **Authentication:** Admin, or the employee themself
///
/// Body: `{ "clientName": "Mme Roux", "amount": 25, "description": "Couleur" }`
#[post("/v1/receipts/employee/<employee_id>", data = "<request>")]
pub async fn create_receipt(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    request: LoggedJson<CreateReceiptRequest>,
) -> ApiResult<status::Created<Json<Value>>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    validator
        .not_blank(&request.client_name, "Client name")
        .amount(request.amount, "Amount");
    validator.finish().map_err(validation_failed)?;

    let caller = auth_user.caller();
    let receipt = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            let timestamp = now();
            insert_receipt(
                conn,
                NewReceipt {
                    employee_id,
                    client_name: request.client_name.trim().to_string(),
                    amount: request.amount,
                    date: request.date.unwrap_or(timestamp),
                    description: request.description,
                    created_at: timestamp,
                    updated_at: timestamp,
                },
            )
            .map_err(internal_error)
        })
        .await?;

    Ok(status::Created::new(format!(
        "/api/v1/receipts/employee/{}/receipt/{}",
        employee_id, receipt.id
    ))
    .body(Json(json!({
        "message": "Receipt created successfully",
        "receipt": receipt,
    }))))
}

/// Update Receipt endpoint.
///
/// - **URL:** `/api/v1/receipts/employee/<employee_id>/receipt/<receipt_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin, or the employee themself
#[put(
    "/v1/receipts/employee/<employee_id>/receipt/<receipt_id>",
    data = "<request>"
)]
pub async fn update_receipt_by_id(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    receipt_id: i32,
    request: LoggedJson<UpdateReceiptRequest>,
) -> ApiResult<Json<Value>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    if let Some(client_name) = &request.client_name {
        validator.not_blank(client_name, "Client name");
    }
    if let Some(amount) = request.amount {
        validator.amount(amount, "Amount");
    }
    validator.finish().map_err(validation_failed)?;

    let caller = auth_user.caller();
    let receipt = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            if get_receipt_for_employee(conn, employee_id, receipt_id)
                .map_err(internal_error)?
                .is_none()
            {
                return Err(not_found("Receipt not found"));
            }
            update_receipt(
                conn,
                receipt_id,
                ReceiptChangeset {
                    client_name: request.client_name,
                    amount: request.amount,
                    date: request.date,
                    description: request.description,
                    ..Default::default()
                },
            )
            .map_err(internal_error)
        })
        .await?;

    Ok(Json(json!({
        "message": "Receipt updated successfully",
        "receipt": receipt,
    })))
}

/// Delete Receipt endpoint.
///
/// - **URL:** `/api/v1/receipts/employee/<employee_id>/receipt/<receipt_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Admin, or the employee themself
#[delete("/v1/receipts/employee/<employee_id>/receipt/<receipt_id>")]
pub async fn delete_receipt(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    receipt_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    db.run(move |conn| {
        ensure_employee_access(conn, caller, employee_id)?;
        match delete_receipt_for_employee(conn, employee_id, receipt_id)
            .map_err(internal_error)?
        {
            0 => Err(not_found("Receipt not found")),
            _ => Ok(()),
        }
    })
    .await?;
    Ok(Json(json!({ "message": "Receipt deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_receipts,
        create_receipt,
        update_receipt_by_id,
        delete_receipt
    ]
}

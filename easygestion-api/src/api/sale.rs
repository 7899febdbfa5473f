//! Package sales recorded by employees.
//!
//! Every route is scoped to one employee. Admins may act for any employee;
//! other accounts only for the employee record linked to them.

use chrono::NaiveDateTime;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiResult, ensure_employee_access, internal_error, not_found, validation_failed};
use crate::dates::deserialize_optional_datetime;
use crate::logged_json::LoggedJson;
use crate::models::{NewSale, SaleChangeset, SaleWithPackage};
use crate::orm::package::get_active_package;
use crate::orm::sale::{
    delete_sale_for_employee, get_sale_for_employee, insert_sale, list_sales_for_employee,
    update_sale,
};
use crate::orm::{DbConn, now};
use crate::session_guards::AuthenticatedUser;
use crate::validation::Validator;

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateSaleRequest {
    pub package_id: i32,
    pub client_name: String,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDateTime>,
    /// Only used for packages priced at zero.
    pub amount: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateSaleRequest {
    pub client_name: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDateTime>,
}

/// The amount charged for a sale: the package price, or the explicit
/// amount when the package is priced per client (price 0).
pub fn sale_amount(package_price: f64, requested: Option<f64>) -> f64 {
    match requested {
        Some(amount) if package_price == 0.0 => amount,
        _ => package_price,
    }
}

/// List Sales endpoint.
///
/// - **URL:** `/api/v1/sales/employee/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** Admin, or the employee themself
///
/// Newest first, each sale with its `package`.
#[get("/v1/sales/employee/<employee_id>")]
pub async fn list_sales(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let sales: Vec<SaleWithPackage> = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            list_sales_for_employee(conn, employee_id).map_err(internal_error)
        })
        .await?
        .into_iter()
        .map(SaleWithPackage::from)
        .collect();
    Ok(Json(json!({ "sales": sales })))
}

/// Create Sale endpoint.
///
/// - **URL:** `/api/v1/sales/employee/<employee_id>`
/// - **Method:** `POST`
/// - **Authentication:** Admin, or the employee themself
///
/// Body: `{ "packageId": 2, "clientName": "M. Petit", "date": "2025-03-14" }`
///
/// **Failure (HTTP 404 Not Found):**
/// ```json
/// { "error": "Employee not found" }
/// { "error": "Package not found or inactive" }
/// ```
#[post("/v1/sales/employee/<employee_id>", data = "<request>")]
pub async fn create_sale(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    request: LoggedJson<CreateSaleRequest>,
) -> ApiResult<status::Created<Json<Value>>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    validator.not_blank(&request.client_name, "Client name");
    if let Some(amount) = request.amount {
        validator.amount(amount, "Amount");
    }
    validator.finish().map_err(validation_failed)?;

    let caller = auth_user.caller();
    let sale = db
        .run(move |conn| -> ApiResult<SaleWithPackage> {
            ensure_employee_access(conn, caller, employee_id)?;
            let package = get_active_package(conn, request.package_id)
                .map_err(internal_error)?
                .ok_or_else(|| not_found("Package not found or inactive"))?;

            let timestamp = now();
            let sale = insert_sale(
                conn,
                NewSale {
                    employee_id,
                    package_id: package.id,
                    client_name: request.client_name.trim().to_string(),
                    amount: sale_amount(package.price, request.amount),
                    date: request.date.unwrap_or(timestamp),
                    description: request.description,
                    created_at: timestamp,
                    updated_at: timestamp,
                },
            )
            .map_err(internal_error)?;
            Ok(SaleWithPackage { sale, package })
        })
        .await?;

    Ok(status::Created::new(format!(
        "/api/v1/sales/employee/{}/sale/{}",
        employee_id, sale.sale.id
    ))
    .body(Json(json!({
        "message": "Sale created successfully",
        "sale": sale,
    }))))
}

/// Update Sale endpoint.
///
/// - **URL:** `/api/v1/sales/employee/<employee_id>/sale/<sale_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin, or the employee themself
#[put("/v1/sales/employee/<employee_id>/sale/<sale_id>", data = "<request>")]
pub async fn update_sale_by_id(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    sale_id: i32,
    request: LoggedJson<UpdateSaleRequest>,
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
    let sale = db
        .run(move |conn| -> ApiResult<SaleWithPackage> {
            ensure_employee_access(conn, caller, employee_id)?;
            let (_, package) = get_sale_for_employee(conn, employee_id, sale_id)
                .map_err(internal_error)?
                .ok_or_else(|| not_found("Sale not found"))?;
            let sale = update_sale(
                conn,
                sale_id,
                SaleChangeset {
                    client_name: request.client_name,
                    amount: request.amount,
                    date: request.date,
                    description: request.description,
                    ..Default::default()
                },
            )
            .map_err(internal_error)?;
            Ok(SaleWithPackage { sale, package })
        })
        .await?;

    Ok(Json(json!({
        "message": "Sale updated successfully",
        "sale": sale,
    })))
}

/// Delete Sale endpoint.
///
/// - **URL:** `/api/v1/sales/employee/<employee_id>/sale/<sale_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Admin, or the employee themself
#[delete("/v1/sales/employee/<employee_id>/sale/<sale_id>")]
pub async fn delete_sale(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
    sale_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    db.run(move |conn| {
        ensure_employee_access(conn, caller, employee_id)?;
        match delete_sale_for_employee(conn, employee_id, sale_id).map_err(internal_error)? {
            0 => Err(not_found("Sale not found")),
            _ => Ok(()),
        }
    })
    .await?;
    Ok(Json(json!({ "message": "Sale deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![list_sales, create_sale, update_sale_by_id, delete_sale]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_amount_only_for_free_priced_packages() {
        assert_eq!(sale_amount(12.0, None), 12.0);
        assert_eq!(sale_amount(12.0, Some(30.0)), 12.0);
        assert_eq!(sale_amount(0.0, Some(30.0)), 30.0);
        assert_eq!(sale_amount(0.0, None), 0.0);
    }
}

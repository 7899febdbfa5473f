//! Monthly overhead of the salon (rent, utilities and the like).
//!
//! A charge is either sent as a single `amount`, which is booked as
//! `charges`, or as a breakdown of the five components. `totalCharges` is
//! always recomputed from the components.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{
    ApiResult, bad_request, internal_error, is_unique_violation, not_found, validation_failed,
};
use crate::logged_json::LoggedJson;
use crate::models::ChargeBreakdown;
use crate::orm::DbConn;
use crate::orm::admin_charge::{
    delete_admin_charge, get_admin_charge, get_admin_charge_for_month, insert_admin_charge,
    list_admin_charges, update_admin_charge,
};
use crate::session_guards::AdminUser;
use crate::validation::Validator;

pub const MIN_YEAR: i32 = 2020;
const DUPLICATE_MONTH: &str = "Admin charge already exists for this month";

/// Amount fields accepted on create and update.
#[derive(Debug, Default, Clone, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChargeFields {
    pub amount: Option<f64>,
    pub rent: Option<f64>,
    pub charges: Option<f64>,
    pub operating_costs: Option<f64>,
    pub electricity: Option<f64>,
    pub salaries: Option<f64>,
}

impl ChargeFields {
    fn components(&self) -> [(Option<f64>, &'static str); 5] {
        [
            (self.rent, "Rent"),
            (self.charges, "Charges"),
            (self.operating_costs, "Operating costs"),
            (self.electricity, "Electricity"),
            (self.salaries, "Salaries"),
        ]
    }

    pub fn has_breakdown(&self) -> bool {
        self.components().iter().any(|(value, _)| value.is_some())
    }

    fn validate(&self, validator: &mut Validator) {
        if let Some(amount) = self.amount {
            validator.amount(amount, "Amount");
        }
        for (value, field) in self.components() {
            if let Some(value) = value {
                validator.amount(value, field);
            }
        }
    }

    /// Applies these fields on top of `base`. Breakdown fields win over
    /// `amount`; with no breakdown field, `amount` replaces `charges`.
    pub fn apply(&self, base: ChargeBreakdown) -> ChargeBreakdown {
        if self.has_breakdown() {
            ChargeBreakdown {
                rent: self.rent.unwrap_or(base.rent),
                charges: self.charges.unwrap_or(base.charges),
                operating_costs: self.operating_costs.unwrap_or(base.operating_costs),
                electricity: self.electricity.unwrap_or(base.electricity),
                salaries: self.salaries.unwrap_or(base.salaries),
            }
        } else if let Some(amount) = self.amount {
            ChargeBreakdown {
                charges: amount,
                ..base
            }
        } else {
            base
        }
    }
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CreateAdminChargeRequest {
    pub month: i32,
    pub year: i32,
    #[serde(flatten)]
    pub fields: ChargeFields,
}

/// List Admin Charges endpoint.
///
/// - **URL:** `/api/v1/admin-charges`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// Most recent month first.
#[get("/v1/admin-charges")]
pub async fn list_charges(db: DbConn, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let charges = db.run(list_admin_charges).await.map_err(internal_error)?;
    Ok(Json(json!({ "adminCharges": charges })))
}

/// Create Admin Charge endpoint.
///
/// - **URL:** `/api/v1/admin-charges`
/// - **Method:** `POST`
/// - **Authentication:** Admin
///
/// Body: `{ "month": 3, "year": 2025, "amount": 1200 }` or
/// `{ "month": 3, "year": 2025, "rent": 900, "electricity": 80 }`
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "Admin charge already exists for this month" }
/// ```
#[post("/v1/admin-charges", data = "<request>")]
pub async fn create_charge(
    db: DbConn,
    _admin: AdminUser,
    request: LoggedJson<CreateAdminChargeRequest>,
) -> ApiResult<status::Created<Json<Value>>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    validator
        .check(
            (1..=12).contains(&request.month),
            "Month must be between 1 and 12",
        )
        .check(
            request.year >= MIN_YEAR,
            format!("Year must be {} or later", MIN_YEAR),
        );
    request.fields.validate(&mut validator);
    validator.finish().map_err(validation_failed)?;

    let breakdown = request.fields.apply(ChargeBreakdown::default());
    let (month, year) = (request.month, request.year);
    let charge = db
        .run(move |conn| {
            if get_admin_charge_for_month(conn, month, year)
                .map_err(internal_error)?
                .is_some()
            {
                return Err(bad_request(DUPLICATE_MONTH));
            }
            insert_admin_charge(conn, breakdown, month, year).map_err(|e| {
                if is_unique_violation(&e) {
                    bad_request(DUPLICATE_MONTH)
                } else {
                    internal_error(e)
                }
            })
        })
        .await?;

    Ok(status::Created::new(format!("/api/v1/admin-charges/{}", charge.id)).body(Json(json!({
        "message": "Admin charge created successfully",
        "adminCharge": charge,
    }))))
}

/// Update Admin Charge endpoint.
///
/// - **URL:** `/api/v1/admin-charges/<charge_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin
///
/// Fields not sent keep their current value.
#[put("/v1/admin-charges/<charge_id>", data = "<request>")]
pub async fn update_charge(
    db: DbConn,
    _admin: AdminUser,
    charge_id: i32,
    request: LoggedJson<ChargeFields>,
) -> ApiResult<Json<Value>> {
    let fields = request.into_inner();
    let mut validator = Validator::new();
    fields.validate(&mut validator);
    validator.finish().map_err(validation_failed)?;

    let charge = db
        .run(move |conn| {
            let current = get_admin_charge(conn, charge_id)
                .map_err(internal_error)?
                .ok_or_else(|| not_found("Admin charge not found"))?;
            let breakdown = fields.apply(ChargeBreakdown::from(&current));
            update_admin_charge(conn, charge_id, breakdown).map_err(internal_error)
        })
        .await?;

    Ok(Json(json!({
        "message": "Admin charge updated successfully",
        "adminCharge": charge,
    })))
}

/// Delete Admin Charge endpoint.
///
/// - **URL:** `/api/v1/admin-charges/<charge_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Admin
#[delete("/v1/admin-charges/<charge_id>")]
pub async fn delete_charge(
    db: DbConn,
    _admin: AdminUser,
    charge_id: i32,
) -> ApiResult<Json<Value>> {
    let deleted = db
        .run(move |conn| delete_admin_charge(conn, charge_id))
        .await
        .map_err(internal_error)?;
    if deleted == 0 {
        return Err(not_found("Admin charge not found"));
    }
    Ok(Json(json!({ "message": "Admin charge deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![list_charges, create_charge, update_charge, delete_charge]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> ChargeBreakdown {
        ChargeBreakdown {
            rent: 900.0,
            charges: 100.0,
            operating_costs: 50.0,
            electricity: 70.0,
            salaries: 0.0,
        }
    }

    #[test]
    fn amount_alone_books_charges() {
        let fields = ChargeFields {
            amount: Some(1200.0),
            ..Default::default()
        };
        let applied = fields.apply(ChargeBreakdown::default());
        assert_eq!(applied.charges, 1200.0);
        assert_eq!(applied.total(), 1200.0);

        let applied = fields.apply(existing());
        assert_eq!(applied.charges, 1200.0);
        assert_eq!(applied.rent, 900.0);
    }

    #[test]
    fn breakdown_wins_over_amount() {
        let fields = ChargeFields {
            amount: Some(5000.0),
            rent: Some(950.0),
            ..Default::default()
        };
        let applied = fields.apply(existing());
        assert_eq!(applied.rent, 950.0);
        assert_eq!(applied.charges, 100.0);
        assert_eq!(applied.total(), 1170.0);
    }

    #[test]
    fn empty_fields_keep_current_values() {
        assert_eq!(ChargeFields::default().apply(existing()), existing());
        assert!(!ChargeFields::default().has_breakdown());
    }
}

//! Monthly figures for the management dashboard.

use chrono::Utc;
use rocket::Route;
use rocket::serde::json::{Json, Value, json};

use super::{ApiResult, bad_request, internal_error};
use crate::dates::CalendarMonth;
use crate::orm::DbConn;
use crate::orm::analytics::{dashboard, revenue_series};
use crate::session_guards::AdminUser;

pub const DEFAULT_REVENUE_MONTHS: u32 = 12;
pub const MAX_REVENUE_MONTHS: u32 = 60;

fn current_month() -> ApiResult<CalendarMonth> {
    CalendarMonth::containing(Utc::now().date_naive())
        .ok_or_else(|| internal_error("current date has no calendar month"))
}

/// Resolves the `month`/`year` query pair. A missing half is taken from the
/// current UTC month.
pub fn requested_month(month: Option<u32>, year: Option<i32>) -> ApiResult<CalendarMonth> {
    let current = current_month()?;
    let month = month.unwrap_or(current.month());
    let year = year.unwrap_or(current.year());
    CalendarMonth::new(year, month).ok_or_else(|| bad_request("Invalid month or year"))
}

pub fn clamp_months(months: Option<u32>) -> u32 {
    months
        .unwrap_or(DEFAULT_REVENUE_MONTHS)
        .clamp(1, MAX_REVENUE_MONTHS)
}

/// Dashboard endpoint.
///
/// - **URL:** `/api/v1/analytics/dashboard?month=3&year=2025`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "currentMonth": {
///     "month": 3, "year": 2025,
///     "totalSales": 540, "totalReceipts": 310, "totalExpenses": 120,
///     "totalSalaries": 400, "totalAdminCharges": 1200, "netProfit": -870
///   },
///   "employeePerformance": [ { "id": 1, "name": "Alice Martin", "total": 610, ... } ],
///   "popularPackages": [ { "id": 2, "name": "Coupe de cheveux", "salesCount": 20, "totalRevenue": 240, ... } ]
/// }
/// ```
#[get("/v1/analytics/dashboard?<month>&<year>")]
pub async fn dashboard_analytics(
    db: DbConn,
    _admin: AdminUser,
    month: Option<u32>,
    year: Option<i32>,
) -> ApiResult<Json<Value>> {
    let month = requested_month(month, year)?;
    let analytics = db
        .run(move |conn| dashboard(conn, month))
        .await
        .map_err(internal_error)?;
    Ok(Json(json!(analytics)))
}

/// Revenue endpoint.
///
/// - **URL:** `/api/v1/analytics/revenue?months=12`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// One point per month ending with the current month, oldest first.
/// `months` is clamped to 1..=60.
#[get("/v1/analytics/revenue?<months>")]
pub async fn revenue(
    db: DbConn,
    _admin: AdminUser,
    months: Option<u32>,
) -> ApiResult<Json<Value>> {
    let months = clamp_months(months);
    let latest = current_month()?;
    let series = db
        .run(move |conn| revenue_series(conn, latest, months))
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "revenue": series })))
}

pub fn routes() -> Vec<Route> {
    routes![dashboard_analytics, revenue]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_are_clamped() {
        assert_eq!(clamp_months(None), 12);
        assert_eq!(clamp_months(Some(0)), 1);
        assert_eq!(clamp_months(Some(6)), 6);
        assert_eq!(clamp_months(Some(600)), 60);
    }

    #[test]
    fn explicit_month_is_validated() {
        let month = requested_month(Some(2), Some(2024)).unwrap();
        assert_eq!(month.label(), "2024-02");
        assert_eq!(month.days(), 29);
        assert!(requested_month(Some(13), Some(2024)).is_err());
    }
}

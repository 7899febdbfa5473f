use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::admin_charges;

/// Monthly overhead of the salon, one row per (month, year).
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = admin_charges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminCharge {
    pub id: i32,
    pub rent: f64,
    pub charges: f64,
    pub operating_costs: f64,
    pub electricity: f64,
    pub salaries: f64,
    pub total_charges: f64,
    pub month: i32,
    pub year: i32,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = admin_charges)]
pub struct NewAdminCharge {
    pub rent: f64,
    pub charges: f64,
    pub operating_costs: f64,
    pub electricity: f64,
    pub salaries: f64,
    pub total_charges: f64,
    pub month: i32,
    pub year: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = admin_charges)]
pub struct AdminChargeChangeset {
    pub rent: f64,
    pub charges: f64,
    pub operating_costs: f64,
    pub electricity: f64,
    pub salaries: f64,
    pub total_charges: f64,
    pub updated_at: NaiveDateTime,
}

/// The five overhead components. `total` is always derived from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChargeBreakdown {
    pub rent: f64,
    pub charges: f64,
    pub operating_costs: f64,
    pub electricity: f64,
    pub salaries: f64,
}

impl ChargeBreakdown {
    pub fn total(&self) -> f64 {
        self.rent + self.charges + self.operating_costs + self.electricity + self.salaries
    }
}

impl From<&AdminCharge> for ChargeBreakdown {
    fn from(charge: &AdminCharge) -> Self {
        Self {
            rent: charge.rent,
            charges: charge.charges,
            operating_costs: charge.operating_costs,
            electricity: charge.electricity,
            salaries: charge.salaries,
        }
    }
}

use chrono::NaiveDateTime;
use diesel::{AsChangeset, Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::receipts;

/// A free-amount payment collected by an employee.
#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    TS,
)]
#[diesel(belongs_to(crate::models::employee::Employee))]
#[diesel(table_name = receipts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Receipt {
    pub id: i32,
    pub employee_id: i32,
    pub client_name: String,
    pub amount: f64,
    #[ts(type = "string")]
    pub date: NaiveDateTime,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = receipts)]
pub struct NewReceipt {
    pub employee_id: i32,
    pub client_name: String,
    pub amount: f64,
    pub date: NaiveDateTime,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = receipts)]
pub struct ReceiptChangeset {
    pub client_name: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

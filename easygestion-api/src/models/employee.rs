use chrono::{NaiveDate, NaiveDateTime};
use diesel::{AsChangeset, Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::UserSummary;
use crate::schema::employees;

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
#[diesel(belongs_to(crate::models::user::User))]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub position: String,
    #[ts(type = "string")]
    pub hire_date: NaiveDate,
    /// Share of gross takings retained by the salon, 0..=100.
    pub deduction_percentage: f64,
    pub contract: Option<String>,
    pub employment_declaration: Option<String>,
    pub certification: Option<String>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = employees)]
pub struct NewEmployee {
    pub user_id: i32,
    pub name: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub deduction_percentage: f64,
    pub contract: Option<String>,
    pub employment_declaration: Option<String>,
    pub certification: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Employee fields supplied when hiring; the owning user id is assigned
/// once the account exists.
#[derive(Debug, Clone)]
pub struct EmployeeInput {
    pub name: String,
    pub position: String,
    pub hire_date: NaiveDate,
    pub deduction_percentage: f64,
    pub contract: Option<String>,
    pub employment_declaration: Option<String>,
    pub certification: Option<String>,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = employees)]
pub struct EmployeeChangeset {
    pub name: Option<String>,
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub deduction_percentage: Option<f64>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmployeeWithUser {
    #[serde(flatten)]
    pub employee: Employee,
    pub user: UserSummary,
}

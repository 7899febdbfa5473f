use chrono::NaiveDateTime;
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::goals;

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
#[diesel(table_name = goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Goal {
    pub id: i32,
    pub employee_id: i32,
    pub monthly_objective: f64,
    pub daily_objective: f64,
    pub month: i32,
    pub year: i32,
    pub remaining_amount: f64,
    pub is_completed: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = goals)]
pub struct NewGoal {
    pub employee_id: i32,
    pub monthly_objective: f64,
    pub daily_objective: f64,
    pub month: i32,
    pub year: i32,
    pub remaining_amount: f64,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GoalInput {
    pub monthly_objective: f64,
    pub daily_objective: Option<f64>,
    pub month: i32,
    pub year: i32,
}

use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::UserSummary;
use crate::schema::expenses;

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Expense {
    pub id: i32,
    pub category: String,
    pub amount: f64,
    #[ts(type = "string")]
    pub date: NaiveDateTime,
    pub description: Option<String>,
    /// Null once the creating account has been deleted.
    pub created_by: Option<i32>,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = expenses)]
pub struct NewExpense {
    pub category: String,
    pub amount: f64,
    pub date: NaiveDateTime,
    pub description: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset, Default)]
#[diesel(table_name = expenses)]
pub struct ExpenseChangeset {
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseWithCreator {
    #[serde(flatten)]
    pub expense: Expense,
    pub creator: Option<UserSummary>,
}

//! Salon expenses.
//!
//! Any signed-in account may record an expense; only admins see the full
//! list. An expense can be edited or removed by whoever recorded it, or by
//! an admin.

use chrono::NaiveDateTime;
use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{ApiResult, forbidden, internal_error, not_found, validation_failed};
use crate::dates::deserialize_optional_datetime;
use crate::logged_json::LoggedJson;
use crate::models::{Expense, ExpenseChangeset, ExpenseWithCreator, NewExpense, UserSummary};
use crate::orm::expense::{
    delete_expense, get_expense, insert_expense, list_expenses_with_creators, update_expense,
};
use crate::orm::{DbConn, now};
use crate::session_guards::{AdminUser, AuthenticatedUser, Caller};
use crate::validation::Validator;

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct CreateExpenseRequest {
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct UpdateExpenseRequest {
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    #[ts(type = "string | null")]
    pub date: Option<NaiveDateTime>,
}

fn load_owned_expense(
    conn: &mut diesel::SqliteConnection,
    caller: Caller,
    expense_id: i32,
) -> ApiResult<Expense> {
    let expense = get_expense(conn, expense_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Expense not found"))?;
    if caller.is_admin() || expense.created_by == Some(caller.id) {
        Ok(expense)
    } else {
        Err(forbidden("Access denied"))
    }
}

/// List Expenses endpoint.
///
/// - **URL:** `/api/v1/expenses`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// Newest first, each with a `creator` summary (`null` once the account
/// that recorded it is deleted).
#[get("/v1/expenses")]
pub async fn list_expenses(db: DbConn, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let expenses: Vec<ExpenseWithCreator> = db
        .run(list_expenses_with_creators)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(|(expense, creator)| ExpenseWithCreator {
            expense,
            creator: creator.map(UserSummary::from),
        })
        .collect();
    Ok(Json(json!({ "expenses": expenses })))
}

/// Create Expense endpoint.
///
/// - **URL:** `/api/v1/expenses`
/// - **Method:** `POST`
/// - **Authentication:** Required
///
/// Body: `{ "category": "Produits", "amount": 54.9, "date": "2025-03-02" }`
#[post("/v1/expenses", data = "<request>")]
pub async fn create_expense(
    db: DbConn,
    auth_user: AuthenticatedUser,
    request: LoggedJson<CreateExpenseRequest>,
) -> ApiResult<status::Created<Json<Value>>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    validator
        .not_blank(&request.category, "Category")
        .amount(request.amount, "Amount");
    validator.finish().map_err(validation_failed)?;

    let created_by = auth_user.id();
    let expense = db
        .run(move |conn| {
            let timestamp = now();
            insert_expense(
                conn,
                NewExpense {
                    category: request.category,
                    amount: request.amount,
                    date: request.date.unwrap_or(timestamp),
                    description: request.description,
                    created_by: Some(created_by),
                    created_at: timestamp,
                    updated_at: timestamp,
                },
            )
        })
        .await
        .map_err(internal_error)?;

    Ok(status::Created::new(format!("/api/v1/expenses/{}", expense.id)).body(Json(json!({
        "message": "Expense created successfully",
        "expense": expense,
    }))))
}

/// Update Expense endpoint.
///
/// - **URL:** `/api/v1/expenses/<expense_id>`
/// - **Method:** `PUT`
/// - **Authentication:** The creator, or an admin
#[put("/v1/expenses/<expense_id>", data = "<request>")]
pub async fn update_expense_by_id(
    db: DbConn,
    auth_user: AuthenticatedUser,
    expense_id: i32,
    request: LoggedJson<UpdateExpenseRequest>,
) -> ApiResult<Json<Value>> {
    let request = request.into_inner();
    let mut validator = Validator::new();
    if let Some(category) = &request.category {
        validator.not_blank(category, "Category");
    }
    if let Some(amount) = request.amount {
        validator.amount(amount, "Amount");
    }
    validator.finish().map_err(validation_failed)?;

    let caller = auth_user.caller();
    let expense = db
        .run(move |conn| {
            load_owned_expense(conn, caller, expense_id)?;
            update_expense(
                conn,
                expense_id,
                ExpenseChangeset {
                    category: request.category,
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
        "message": "Expense updated successfully",
        "expense": expense,
    })))
}

/// Delete Expense endpoint.
///
/// - **URL:** `/api/v1/expenses/<expense_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** The creator, or an admin
#[delete("/v1/expenses/<expense_id>")]
pub async fn delete_expense_by_id(
    db: DbConn,
    auth_user: AuthenticatedUser,
    expense_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    db.run(move |conn| {
        load_owned_expense(conn, caller, expense_id)?;
        delete_expense(conn, expense_id).map_err(internal_error)
    })
    .await?;
    Ok(Json(json!({ "message": "Expense deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_expenses,
        create_expense,
        update_expense_by_id,
        delete_expense_by_id
    ]
}

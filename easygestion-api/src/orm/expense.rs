use chrono::NaiveDateTime;
use diesel::dsl::sum;
use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{Expense, ExpenseChangeset, NewExpense, User};
use crate::schema::{expenses, users};

pub fn insert_expense(
    conn: &mut SqliteConnection,
    mut new_expense: NewExpense,
) -> QueryResult<Expense> {
    let timestamp = now();
    new_expense.category = new_expense.category.trim().to_string();
    new_expense.created_at = timestamp;
    new_expense.updated_at = timestamp;
    diesel::insert_into(expenses::table)
        .values(&new_expense)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    expenses::table.find(last_id).first::<Expense>(conn)
}

pub fn get_expense(conn: &mut SqliteConnection, expense_id: i32) -> QueryResult<Option<Expense>> {
    expenses::table
        .find(expense_id)
        .first::<Expense>(conn)
        .optional()
}

/// All expenses, newest first, with the account that recorded them when it
/// still exists.
pub fn list_expenses_with_creators(
    conn: &mut SqliteConnection,
) -> QueryResult<Vec<(Expense, Option<User>)>> {
    expenses::table
        .left_join(users::table.on(expenses::created_by.eq(users::id.nullable())))
        .select((expenses::all_columns, users::all_columns.nullable()))
        .order((expenses::date.desc(), expenses::id.desc()))
        .load::<(Expense, Option<User>)>(conn)
}

pub fn update_expense(
    conn: &mut SqliteConnection,
    expense_id: i32,
    mut changes: ExpenseChangeset,
) -> QueryResult<Expense> {
    changes.category = changes.category.map(|c| c.trim().to_string());
    changes.updated_at = Some(now());
    diesel::update(expenses::table.find(expense_id))
        .set(&changes)
        .execute(conn)?;
    expenses::table.find(expense_id).first::<Expense>(conn)
}

pub fn delete_expense(conn: &mut SqliteConnection, expense_id: i32) -> QueryResult<usize> {
    diesel::delete(expenses::table.find(expense_id)).execute(conn)
}

pub fn sum_expenses_between(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> QueryResult<f64> {
    let total = expenses::table
        .filter(expenses::date.ge(start))
        .filter(expenses::date.lt(end))
        .select(sum(expenses::amount))
        .first::<Option<f64>>(conn)?;
    Ok(total.unwrap_or(0.0))
}

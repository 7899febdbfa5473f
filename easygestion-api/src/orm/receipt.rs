use chrono::NaiveDateTime;
use diesel::dsl::sum;
use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{NewReceipt, Receipt, ReceiptChangeset};
use crate::schema::receipts;

pub fn insert_receipt(
    conn: &mut SqliteConnection,
    mut new_receipt: NewReceipt,
) -> QueryResult<Receipt> {
    let timestamp = now();
    new_receipt.created_at = timestamp;
    new_receipt.updated_at = timestamp;
    diesel::insert_into(receipts::table)
        .values(&new_receipt)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    receipts::table.find(last_id).first::<Receipt>(conn)
}

pub fn list_receipts_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> QueryResult<Vec<Receipt>> {
    receipts::table
        .filter(receipts::employee_id.eq(employee_id))
        .order((receipts::date.desc(), receipts::id.desc()))
        .load::<Receipt>(conn)
}

pub fn get_receipt_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
    receipt_id: i32,
) -> QueryResult<Option<Receipt>> {
    receipts::table
        .filter(receipts::id.eq(receipt_id))
        .filter(receipts::employee_id.eq(employee_id))
        .first::<Receipt>(conn)
        .optional()
}

pub fn update_receipt(
    conn: &mut SqliteConnection,
    receipt_id: i32,
    mut changes: ReceiptChangeset,
) -> QueryResult<Receipt> {
    changes.client_name = changes.client_name.map(|c| c.trim().to_string());
    changes.updated_at = Some(now());
    diesel::update(receipts::table.find(receipt_id))
        .set(&changes)
        .execute(conn)?;
    receipts::table.find(receipt_id).first::<Receipt>(conn)
}

pub fn delete_receipt_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
    receipt_id: i32,
) -> QueryResult<usize> {
    diesel::delete(
        receipts::table
            .filter(receipts::id.eq(receipt_id))
            .filter(receipts::employee_id.eq(employee_id)),
    )
    .execute(conn)
}

/// Sum of receipt amounts with `start <= date < end`.
pub fn sum_receipts_between(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
    employee_id: Option<i32>,
) -> QueryResult<f64> {
    let mut query = receipts::table
        .filter(receipts::date.ge(start))
        .filter(receipts::date.lt(end))
        .select(sum(receipts::amount))
        .into_boxed();
    if let Some(id) = employee_id {
        query = query.filter(receipts::employee_id.eq(id));
    }
    Ok(query.first::<Option<f64>>(conn)?.unwrap_or(0.0))
}

pub fn receipts_totals_by_employee(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> QueryResult<Vec<(i32, f64)>> {
    let rows = receipts::table
        .filter(receipts::date.ge(start))
        .filter(receipts::date.lt(end))
        .group_by(receipts::employee_id)
        .select((receipts::employee_id, sum(receipts::amount)))
        .load::<(i32, Option<f64>)>(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, total)| (id, total.unwrap_or(0.0)))
        .collect())
}

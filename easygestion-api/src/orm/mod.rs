pub mod admin_charge;
pub mod alert;
pub mod analytics;
mod db;
pub mod employee;
pub mod expense;
pub mod goal;
pub mod login;
pub mod package;
pub mod receipt;
pub mod salary;
pub mod sale;
pub mod testing;
pub mod user;

pub use db::*;

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::BigInt;

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = BigInt)]
    last_insert_rowid: i64,
}

/// Id of the row most recently inserted on this connection.
pub(crate) fn last_insert_rowid(conn: &mut SqliteConnection) -> QueryResult<i32> {
    let row = diesel::sql_query("SELECT last_insert_rowid() as last_insert_rowid")
        .get_result::<LastInsertRowId>(conn)?;
    Ok(row.last_insert_rowid as i32)
}

/// Current UTC time as stored in every `created_at`/`updated_at` column.
pub(crate) fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

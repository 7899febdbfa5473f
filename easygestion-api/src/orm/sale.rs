use chrono::NaiveDateTime;
use diesel::dsl::{count, sum};
use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{NewSale, Package, Sale, SaleChangeset};
use crate::schema::{packages, sales};

pub fn insert_sale(conn: &mut SqliteConnection, mut new_sale: NewSale) -> QueryResult<Sale> {
    let timestamp = now();
    new_sale.created_at = timestamp;
    new_sale.updated_at = timestamp;
    diesel::insert_into(sales::table)
        .values(&new_sale)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    sales::table.find(last_id).first::<Sale>(conn)
}

/// Sales of one employee, newest first, each with its package.
pub fn list_sales_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> QueryResult<Vec<(Sale, Package)>> {
    sales::table
        .inner_join(packages::table)
        .filter(sales::employee_id.eq(employee_id))
        .select((sales::all_columns, packages::all_columns))
        .order((sales::date.desc(), sales::id.desc()))
        .load::<(Sale, Package)>(conn)
}

/// Looks a sale up only within the given employee's records.
pub fn get_sale_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
    sale_id: i32,
) -> QueryResult<Option<(Sale, Package)>> {
    sales::table
        .inner_join(packages::table)
        .filter(sales::id.eq(sale_id))
        .filter(sales::employee_id.eq(employee_id))
        .select((sales::all_columns, packages::all_columns))
        .first::<(Sale, Package)>(conn)
        .optional()
}

pub fn update_sale(
    conn: &mut SqliteConnection,
    sale_id: i32,
    mut changes: SaleChangeset,
) -> QueryResult<Sale> {
    changes.client_name = changes.client_name.map(|c| c.trim().to_string());
    changes.updated_at = Some(now());
    diesel::update(sales::table.find(sale_id))
        .set(&changes)
        .execute(conn)?;
    sales::table.find(sale_id).first::<Sale>(conn)
}

pub fn delete_sale_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
    sale_id: i32,
) -> QueryResult<usize> {
    diesel::delete(
        sales::table
            .filter(sales::id.eq(sale_id))
            .filter(sales::employee_id.eq(employee_id)),
    )
    .execute(conn)
}

/// Sum of sale amounts with `start <= date < end`, optionally for a single
/// employee.
pub fn sum_sales_between(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
    employee_id: Option<i32>,
) -> QueryResult<f64> {
    let mut query = sales::table
        .filter(sales::date.ge(start))
        .filter(sales::date.lt(end))
        .select(sum(sales::amount))
        .into_boxed();
    if let Some(id) = employee_id {
        query = query.filter(sales::employee_id.eq(id));
    }
    Ok(query.first::<Option<f64>>(conn)?.unwrap_or(0.0))
}

/// Per-employee sale totals in `[start, end)`.
pub fn sales_totals_by_employee(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> QueryResult<Vec<(i32, f64)>> {
    let rows = sales::table
        .filter(sales::date.ge(start))
        .filter(sales::date.lt(end))
        .group_by(sales::employee_id)
        .select((sales::employee_id, sum(sales::amount)))
        .load::<(i32, Option<f64>)>(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, total)| (id, total.unwrap_or(0.0)))
        .collect())
}

/// Per-package sale count and revenue in `[start, end)`.
pub fn sales_totals_by_package(
    conn: &mut SqliteConnection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> QueryResult<Vec<(i32, i64, f64)>> {
    let rows = sales::table
        .filter(sales::date.ge(start))
        .filter(sales::date.lt(end))
        .group_by(sales::package_id)
        .select((sales::package_id, count(sales::id), sum(sales::amount)))
        .load::<(i32, i64, Option<f64>)>(conn)?;
    Ok(rows
        .into_iter()
        .map(|(id, n, total)| (id, n, total.unwrap_or(0.0)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{at, insert_test_sale, seeded_employee, setup_test_db};

    #[test]
    fn test_list_sales_newest_first_with_package() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 1, 10));
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 5, 10));

        let rows = list_sales_for_employee(&mut conn, employee.id).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].0.date > rows[1].0.date);
        assert_eq!(rows[0].1.id, package.id);
    }

    #[test]
    fn test_get_sale_scoped_to_employee() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        let sale = insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 1, 10));

        assert!(get_sale_for_employee(&mut conn, employee.id, sale.id).unwrap().is_some());
        assert!(get_sale_for_employee(&mut conn, employee.id + 1, sale.id).unwrap().is_none());
        assert_eq!(delete_sale_for_employee(&mut conn, employee.id + 1, sale.id).unwrap(), 0);
        assert_eq!(delete_sale_for_employee(&mut conn, employee.id, sale.id).unwrap(), 1);
    }

    #[test]
    fn test_sum_sales_between_is_half_open() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 1, 0));
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 31, 23));
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 4, 1, 0));

        let total =
            sum_sales_between(&mut conn, at(2025, 3, 1, 0), at(2025, 4, 1, 0), None).unwrap();
        assert_eq!(total, package.price * 2.0);

        let none = sum_sales_between(
            &mut conn,
            at(2025, 3, 1, 0),
            at(2025, 4, 1, 0),
            Some(employee.id + 1),
        )
        .unwrap();
        assert_eq!(none, 0.0);
    }

    #[test]
    fn test_totals_by_package() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 2, 9));
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 3, 9));

        let totals =
            sales_totals_by_package(&mut conn, at(2025, 3, 1, 0), at(2025, 4, 1, 0)).unwrap();
        assert_eq!(totals, vec![(package.id, 2, package.price * 2.0)]);
    }
}

use chrono::NaiveDate;
use diesel::dsl::sum;
use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::dates::{period_bounds, round_cents};
use crate::models::{Employee, NewSalary, Salary};
use crate::orm::receipt::sum_receipts_between;
use crate::orm::sale::sum_sales_between;
use crate::schema::{employees, salaries};

/// Applies a deduction percentage to gross takings. The result never goes
/// below zero.
pub fn compute_salary(base: f64, deduction_percentage: f64) -> f64 {
    let deduction = base * deduction_percentage / 100.0;
    round_cents((base - deduction).max(0.0))
}

/// Generates one salary per employee for the days `period_start..=period_end`.
///
/// Gross takings are every sale and receipt dated inside the period. All
/// rows are written in a single transaction.
pub fn generate_salaries(
    conn: &mut SqliteConnection,
    period_start: NaiveDate,
    period_end: NaiveDate,
) -> QueryResult<Vec<Salary>> {
    let (lower, upper) = period_bounds(period_start, period_end);
    conn.transaction(|conn| {
        let staff = employees::table
            .order(employees::id.asc())
            .load::<Employee>(conn)?;

        let mut generated = Vec::with_capacity(staff.len());
        for employee in staff {
            let sales = sum_sales_between(conn, lower, upper, Some(employee.id))?;
            let receipts = sum_receipts_between(conn, lower, upper, Some(employee.id))?;
            let base = round_cents(sales + receipts);
            let timestamp = now();

            diesel::insert_into(salaries::table)
                .values(&NewSalary {
                    employee_id: employee.id,
                    base_salary: base,
                    commission_percentage: employee.deduction_percentage,
                    total_salary: compute_salary(base, employee.deduction_percentage),
                    period_start,
                    period_end,
                    created_at: timestamp,
                    updated_at: timestamp,
                })
                .execute(conn)?;
            let id = last_insert_rowid(conn)?;
            generated.push(salaries::table.find(id).first::<Salary>(conn)?);
        }
        Ok(generated)
    })
}

/// Salaries of one employee, latest period first.
pub fn list_salaries_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> QueryResult<Vec<Salary>> {
    salaries::table
        .filter(salaries::employee_id.eq(employee_id))
        .order((salaries::period_end.desc(), salaries::id.desc()))
        .load::<Salary>(conn)
}

pub fn delete_salary(conn: &mut SqliteConnection, salary_id: i32) -> QueryResult<usize> {
    diesel::delete(salaries::table.find(salary_id)).execute(conn)
}

/// Total paid out in salaries whose period starts within `first..=last`.
pub fn sum_salaries_starting_between(
    conn: &mut SqliteConnection,
    first: NaiveDate,
    last: NaiveDate,
) -> QueryResult<f64> {
    let total = salaries::table
        .filter(salaries::period_start.ge(first))
        .filter(salaries::period_start.le(last))
        .select(sum(salaries::total_salary))
        .first::<Option<f64>>(conn)?;
    Ok(total.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{
        at, insert_test_receipt, insert_test_sale, insert_test_staff, seeded_employee,
        setup_test_db,
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_compute_salary() {
        assert_eq!(compute_salary(1000.0, 40.0), 600.0);
        assert_eq!(compute_salary(1000.0, 0.0), 1000.0);
        assert_eq!(compute_salary(1000.0, 100.0), 0.0);
        assert_eq!(compute_salary(0.0, 40.0), 0.0);
        assert_eq!(compute_salary(33.33, 33.0), 22.33);
    }

    #[test]
    fn test_generate_salaries_includes_last_day() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        // Inside: first instant and last evening of the period.
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 1, 0));
        insert_test_receipt(&mut conn, employee.id, 50.0, at(2025, 3, 31, 23));
        // Outside.
        insert_test_receipt(&mut conn, employee.id, 1000.0, at(2025, 4, 1, 0));

        let generated = generate_salaries(&mut conn, day(2025, 3, 1), day(2025, 3, 31)).unwrap();
        assert_eq!(generated.len(), 1);

        let salary = &generated[0];
        let base = package.price + 50.0;
        assert_eq!(salary.employee_id, employee.id);
        assert_eq!(salary.base_salary, base);
        assert_eq!(salary.commission_percentage, employee.deduction_percentage);
        assert_eq!(
            salary.total_salary,
            compute_salary(base, employee.deduction_percentage)
        );
        assert_eq!(salary.period_end, day(2025, 3, 31));
    }

    #[test]
    fn test_generate_salaries_covers_idle_employees() {
        let mut conn = setup_test_db();
        let (busy, package) = seeded_employee(&mut conn);
        let idle = insert_test_staff(&mut conn, "idle", "Idle", 10.0);
        insert_test_sale(&mut conn, busy.id, &package, at(2025, 3, 3, 10));

        let generated = generate_salaries(&mut conn, day(2025, 3, 1), day(2025, 3, 31)).unwrap();
        let idle_salary = generated.iter().find(|s| s.employee_id == idle.id).unwrap();
        assert_eq!(idle_salary.base_salary, 0.0);
        assert_eq!(idle_salary.total_salary, 0.0);

        assert_eq!(list_salaries_for_employee(&mut conn, busy.id).unwrap().len(), 1);
    }

    #[test]
    fn test_sum_salaries_by_period_start() {
        let mut conn = setup_test_db();
        let (employee, package) = seeded_employee(&mut conn);
        insert_test_sale(&mut conn, employee.id, &package, at(2025, 3, 3, 10));
        generate_salaries(&mut conn, day(2025, 3, 1), day(2025, 3, 31)).unwrap();

        let march = sum_salaries_starting_between(&mut conn, day(2025, 3, 1), day(2025, 3, 31))
            .unwrap();
        assert_eq!(march, compute_salary(package.price, employee.deduction_percentage));
        let april = sum_salaries_starting_between(&mut conn, day(2025, 4, 1), day(2025, 4, 30))
            .unwrap();
        assert_eq!(april, 0.0);
    }
}

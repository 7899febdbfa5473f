//! Monthly aggregates for the dashboard and the revenue chart.
//!
//! Sums are computed in SQL with `GROUP BY`; ranking and truncation happen
//! here so ties can be broken deterministically.

use std::collections::HashMap;

use diesel::prelude::*;

use crate::dates::{CalendarMonth, round_cents};
use crate::models::{
    DashboardAnalytics, Employee, EmployeePerformance, MonthlySummary, Package,
    PackagePopularity, RevenuePoint,
};
use crate::orm::admin_charge::get_admin_charge_for_month;
use crate::orm::expense::sum_expenses_between;
use crate::orm::receipt::{receipts_totals_by_employee, sum_receipts_between};
use crate::orm::salary::sum_salaries_starting_between;
use crate::orm::sale::{sales_totals_by_employee, sales_totals_by_package, sum_sales_between};
use crate::schema::{employees, packages};

/// How many entries the dashboard rankings keep.
pub const RANKING_SIZE: usize = 5;

pub fn monthly_summary(
    conn: &mut SqliteConnection,
    month: CalendarMonth,
) -> QueryResult<MonthlySummary> {
    let (start, end) = month.bounds();
    let total_sales = sum_sales_between(conn, start, end, None)?;
    let total_receipts = sum_receipts_between(conn, start, end, None)?;
    let total_expenses = sum_expenses_between(conn, start, end)?;
    let total_salaries =
        sum_salaries_starting_between(conn, month.first_day(), month.last_day())?;
    let total_admin_charges =
        get_admin_charge_for_month(conn, month.month() as i32, month.year())?
            .map(|c| c.total_charges)
            .unwrap_or(0.0);

    let net_profit =
        total_sales + total_receipts - total_expenses - total_salaries - total_admin_charges;

    Ok(MonthlySummary {
        month: month.month(),
        year: month.year(),
        total_sales: round_cents(total_sales),
        total_receipts: round_cents(total_receipts),
        total_expenses: round_cents(total_expenses),
        total_salaries: round_cents(total_salaries),
        total_admin_charges: round_cents(total_admin_charges),
        net_profit: round_cents(net_profit),
    })
}

/// Employees ranked by sales plus receipts within the month.
pub fn employee_performance(
    conn: &mut SqliteConnection,
    month: CalendarMonth,
    limit: usize,
) -> QueryResult<Vec<EmployeePerformance>> {
    let (start, end) = month.bounds();
    let sales: HashMap<i32, f64> = sales_totals_by_employee(conn, start, end)?
        .into_iter()
        .collect();
    let receipts: HashMap<i32, f64> = receipts_totals_by_employee(conn, start, end)?
        .into_iter()
        .collect();

    let staff = employees::table.load::<Employee>(conn)?;
    let mut ranking: Vec<EmployeePerformance> = staff
        .into_iter()
        .map(|employee| {
            let total_sales = sales.get(&employee.id).copied().unwrap_or(0.0);
            let total_receipts = receipts.get(&employee.id).copied().unwrap_or(0.0);
            EmployeePerformance {
                id: employee.id,
                name: employee.name,
                total_sales: round_cents(total_sales),
                total_receipts: round_cents(total_receipts),
                total: round_cents(total_sales + total_receipts),
            }
        })
        .collect();

    ranking.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.id.cmp(&b.id)));
    ranking.truncate(limit);
    Ok(ranking)
}

/// Packages sold within the month, ranked by revenue, then by number of
/// sales.
pub fn popular_packages(
    conn: &mut SqliteConnection,
    month: CalendarMonth,
    limit: usize,
) -> QueryResult<Vec<PackagePopularity>> {
    let (start, end) = month.bounds();
    let totals = sales_totals_by_package(conn, start, end)?;
    let ids: Vec<i32> = totals.iter().map(|(id, _, _)| *id).collect();
    let catalogue: HashMap<i32, Package> = packages::table
        .filter(packages::id.eq_any(&ids))
        .load::<Package>(conn)?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut ranking: Vec<PackagePopularity> = totals
        .into_iter()
        .filter_map(|(id, sales_count, revenue)| {
            catalogue.get(&id).map(|package| PackagePopularity {
                id,
                name: package.name.clone(),
                price: package.price,
                sales_count,
                total_revenue: round_cents(revenue),
            })
        })
        .collect();

    ranking.sort_by(|a, b| {
        b.total_revenue
            .total_cmp(&a.total_revenue)
            .then(b.sales_count.cmp(&a.sales_count))
            .then(a.id.cmp(&b.id))
    });
    ranking.truncate(limit);
    Ok(ranking)
}

pub fn dashboard(
    conn: &mut SqliteConnection,
    month: CalendarMonth,
) -> QueryResult<DashboardAnalytics> {
    Ok(DashboardAnalytics {
        current_month: monthly_summary(conn, month)?,
        employee_performance: employee_performance(conn, month, RANKING_SIZE)?,
        popular_packages: popular_packages(conn, month, RANKING_SIZE)?,
    })
}

/// One point per month for the `months` months ending with `latest`,
/// oldest first.
pub fn revenue_series(
    conn: &mut SqliteConnection,
    latest: CalendarMonth,
    months: u32,
) -> QueryResult<Vec<RevenuePoint>> {
    let mut series = Vec::with_capacity(months as usize);
    for offset in (0..months as i32).rev() {
        let Some(month) = latest.shifted(-offset) else {
            continue;
        };
        let (start, end) = month.bounds();
        let sales = sum_sales_between(conn, start, end, None)?;
        let receipts = sum_receipts_between(conn, start, end, None)?;
        let expenses = sum_expenses_between(conn, start, end)?;
        series.push(RevenuePoint {
            month: month.label(),
            sales: round_cents(sales),
            receipts: round_cents(receipts),
            expenses: round_cents(expenses),
            total_revenue: round_cents(sales + receipts),
        });
    }
    Ok(series)
}

use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::dates::round_cents;
use crate::models::{AdminCharge, AdminChargeChangeset, ChargeBreakdown, NewAdminCharge};
use crate::schema::admin_charges;

pub fn insert_admin_charge(
    conn: &mut SqliteConnection,
    breakdown: ChargeBreakdown,
    month: i32,
    year: i32,
) -> QueryResult<AdminCharge> {
    let timestamp = now();
    diesel::insert_into(admin_charges::table)
        .values(&NewAdminCharge {
            rent: breakdown.rent,
            charges: breakdown.charges,
            operating_costs: breakdown.operating_costs,
            electricity: breakdown.electricity,
            salaries: breakdown.salaries,
            total_charges: round_cents(breakdown.total()),
            month,
            year,
            created_at: timestamp,
            updated_at: timestamp,
        })
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    admin_charges::table.find(last_id).first::<AdminCharge>(conn)
}

pub fn get_admin_charge(
    conn: &mut SqliteConnection,
    charge_id: i32,
) -> QueryResult<Option<AdminCharge>> {
    admin_charges::table
        .find(charge_id)
        .first::<AdminCharge>(conn)
        .optional()
}

pub fn get_admin_charge_for_month(
    conn: &mut SqliteConnection,
    month: i32,
    year: i32,
) -> QueryResult<Option<AdminCharge>> {
    admin_charges::table
        .filter(admin_charges::month.eq(month))
        .filter(admin_charges::year.eq(year))
        .first::<AdminCharge>(conn)
        .optional()
}

/// Most recent month first.
pub fn list_admin_charges(conn: &mut SqliteConnection) -> QueryResult<Vec<AdminCharge>> {
    admin_charges::table
        .order((admin_charges::year.desc(), admin_charges::month.desc()))
        .load::<AdminCharge>(conn)
}

/// Replaces the breakdown of a charge and recomputes its total.
pub fn update_admin_charge(
    conn: &mut SqliteConnection,
    charge_id: i32,
    breakdown: ChargeBreakdown,
) -> QueryResult<AdminCharge> {
    diesel::update(admin_charges::table.find(charge_id))
        .set(&AdminChargeChangeset {
            rent: breakdown.rent,
            charges: breakdown.charges,
            operating_costs: breakdown.operating_costs,
            electricity: breakdown.electricity,
            salaries: breakdown.salaries,
            total_charges: round_cents(breakdown.total()),
            updated_at: now(),
        })
        .execute(conn)?;
    admin_charges::table.find(charge_id).first::<AdminCharge>(conn)
}

pub fn delete_admin_charge(conn: &mut SqliteConnection, charge_id: i32) -> QueryResult<usize> {
    diesel::delete(admin_charges::table.find(charge_id)).execute(conn)
}

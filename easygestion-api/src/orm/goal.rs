use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::dates::{CalendarMonth, round_cents};
use crate::models::{AlertType, Goal, NewGoal};
use crate::orm::alert::insert_alert;
use crate::orm::receipt::sum_receipts_between;
use crate::orm::sale::sum_sales_between;
use crate::schema::goals;

/// Objectives for one employee and one month, validated by the caller.
#[derive(Debug, Clone, Copy)]
pub struct GoalTarget {
    pub month: CalendarMonth,
    pub monthly_objective: f64,
    pub daily_objective: Option<f64>,
}

impl GoalTarget {
    /// The explicit daily objective, or the monthly one spread over the
    /// days of the month.
    pub fn daily(&self) -> f64 {
        self.daily_objective
            .unwrap_or_else(|| round_cents(self.monthly_objective / self.month.days() as f64))
    }
}

pub fn completion_message(month: i32, year: i32) -> String {
    format!("Monthly objective reached for {:02}/{}", month, year)
}

pub fn get_goal(conn: &mut SqliteConnection, goal_id: i32) -> QueryResult<Option<Goal>> {
    goals::table.find(goal_id).first::<Goal>(conn).optional()
}

/// Recomputes what is left to reach the objective from the employee's
/// sales and receipts in the goal's month.
///
/// A goal that becomes completed raises a `monthly` alert.
pub fn refresh_goal_progress(conn: &mut SqliteConnection, goal: Goal) -> QueryResult<Goal> {
    let Some(month) = CalendarMonth::new(goal.year, goal.month as u32) else {
        return Ok(goal);
    };
    let (start, end) = month.bounds();
    let achieved = sum_sales_between(conn, start, end, Some(goal.employee_id))?
        + sum_receipts_between(conn, start, end, Some(goal.employee_id))?;
    let remaining = round_cents((goal.monthly_objective - achieved).max(0.0));
    let completed = achieved >= goal.monthly_objective;

    if remaining == goal.remaining_amount && completed == goal.is_completed {
        return Ok(goal);
    }

    diesel::update(goals::table.find(goal.id))
        .set((
            goals::remaining_amount.eq(remaining),
            goals::is_completed.eq(completed),
            goals::updated_at.eq(now()),
        ))
        .execute(conn)?;

    if completed && !goal.is_completed {
        insert_alert(
            conn,
            goal.employee_id,
            &completion_message(goal.month, goal.year),
            AlertType::Monthly,
        )?;
    }

    goals::table.find(goal.id).first::<Goal>(conn)
}

/// Goals of one employee, latest month first, with progress refreshed.
pub fn list_goals_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> QueryResult<Vec<Goal>> {
    conn.transaction(|conn| {
        let stored = goals::table
            .filter(goals::employee_id.eq(employee_id))
            .order((goals::year.desc(), goals::month.desc()))
            .load::<Goal>(conn)?;
        stored
            .into_iter()
            .map(|goal| refresh_goal_progress(conn, goal))
            .collect()
    })
}

/// Creates the goal for `(employee, month)` or replaces its objectives.
pub fn upsert_goal(
    conn: &mut SqliteConnection,
    employee_id: i32,
    target: GoalTarget,
) -> QueryResult<Goal> {
    let month = target.month.month() as i32;
    let year = target.month.year();
    let daily = target.daily();

    conn.transaction(|conn| {
        let existing = goals::table
            .filter(goals::employee_id.eq(employee_id))
            .filter(goals::month.eq(month))
            .filter(goals::year.eq(year))
            .first::<Goal>(conn)
            .optional()?;

        let id = match existing {
            Some(goal) => {
                diesel::update(goals::table.find(goal.id))
                    .set((
                        goals::monthly_objective.eq(target.monthly_objective),
                        goals::daily_objective.eq(daily),
                        goals::updated_at.eq(now()),
                    ))
                    .execute(conn)?;
                goal.id
            }
            None => {
                let timestamp = now();
                diesel::insert_into(goals::table)
                    .values(&NewGoal {
                        employee_id,
                        monthly_objective: target.monthly_objective,
                        daily_objective: daily,
                        month,
                        year,
                        remaining_amount: target.monthly_objective,
                        is_completed: false,
                        created_at: timestamp,
                        updated_at: timestamp,
                    })
                    .execute(conn)?;
                last_insert_rowid(conn)?
            }
        };

        let goal = goals::table.find(id).first::<Goal>(conn)?;
        refresh_goal_progress(conn, goal)
    })
}

pub fn delete_goal(conn: &mut SqliteConnection, goal_id: i32) -> QueryResult<usize> {
    diesel::delete(goals::table.find(goal_id)).execute(conn)
}

//! Monthly takings objectives per employee.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};

use super::{
    ApiResult, bad_request, ensure_employee_access, internal_error, not_found, validation_failed,
};
use crate::dates::CalendarMonth;
use crate::logged_json::LoggedJson;
use crate::models::GoalInput;
use crate::orm::DbConn;
use crate::orm::goal::{GoalTarget, delete_goal, list_goals_for_employee, upsert_goal};
use crate::session_guards::{AdminUser, AuthenticatedUser};
use crate::validation::Validator;

/// List Goals endpoint.
///
/// - **URL:** `/api/v1/goals/employee/<employee_id>`
/// - **Method:** `GET`
/// - **Authentication:** Admin, or the employee themself
///
/// Progress (`remainingAmount`, `isCompleted`) is recomputed on every read.
#[get("/v1/goals/employee/<employee_id>")]
pub async fn list_goals(
    db: DbConn,
    auth_user: AuthenticatedUser,
    employee_id: i32,
) -> ApiResult<Json<Value>> {
    let caller = auth_user.caller();
    let goals = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            list_goals_for_employee(conn, employee_id).map_err(internal_error)
        })
        .await?;
    Ok(Json(json!({ "goals": goals })))
}

/// Set Goal endpoint.
///
/// - **URL:** `/api/v1/goals/employee/<employee_id>`
/// - **Method:** `POST`
/// - **Authentication:** Admin
///
/// Body: `{ "monthlyObjective": 3000, "dailyObjective": 120, "month": 3, "year": 2025 }`
///
/// Replaces the objectives when the employee already has a goal for that
/// month. Without `dailyObjective` the monthly objective is spread evenly
/// over the days of the month.
#[post("/v1/goals/employee/<employee_id>", data = "<request>")]
pub async fn set_goal(
    db: DbConn,
    admin: AdminUser,
    employee_id: i32,
    request: LoggedJson<GoalInput>,
) -> ApiResult<status::Created<Json<Value>>> {
    let input = request.into_inner();
    let mut validator = Validator::new();
    validator.amount(input.monthly_objective, "Monthly objective").check(
        input.monthly_objective != 0.0,
        "Monthly objective must be greater than zero",
    );
    if let Some(daily) = input.daily_objective {
        validator.amount(daily, "Daily objective");
    }
    validator.finish().map_err(validation_failed)?;

    let month = u32::try_from(input.month)
        .ok()
        .and_then(|month| CalendarMonth::new(input.year, month))
        .ok_or_else(|| bad_request("Invalid month or year"))?;
    let target = GoalTarget {
        month,
        monthly_objective: input.monthly_objective,
        daily_objective: input.daily_objective,
    };

    let caller = AuthenticatedUser::from(admin).caller();
    let goal = db
        .run(move |conn| {
            ensure_employee_access(conn, caller, employee_id)?;
            upsert_goal(conn, employee_id, target).map_err(internal_error)
        })
        .await?;

    Ok(status::Created::new(format!("/api/v1/goals/employee/{}", employee_id)).body(Json(
        json!({
            "message": "Goal saved successfully",
            "goal": goal,
        }),
    )))
}

/// Delete Goal endpoint.
///
/// - **URL:** `/api/v1/goals/<goal_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Admin
#[delete("/v1/goals/<goal_id>")]
pub async fn delete_goal_by_id(
    db: DbConn,
    _admin: AdminUser,
    goal_id: i32,
) -> ApiResult<Json<Value>> {
    let deleted = db
        .run(move |conn| delete_goal(conn, goal_id))
        .await
        .map_err(internal_error)?;
    if deleted == 0 {
        return Err(not_found("Goal not found"));
    }
    Ok(Json(json!({ "message": "Goal deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![list_goals, set_goal, delete_goal_by_id]
}

//! API endpoints for managing accounts.
//!
//! Hiring an employee creates the login account and the employee record
//! together from one multipart form, with the employee's documents attached
//! as file parts. Responses never include password hashes.

use chrono::NaiveDate;
use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};
use rocket::{Route, State};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::{
    ApiResult, bad_request, forbidden, internal_error, is_unique_violation, not_found,
    validation_failed,
};
use crate::config::AppConfig;
use crate::logged_json::LoggedJson;
use crate::models::{
    EmployeeInput, Role, UserChangeset, UserInput, UserProfile, UserWithEmployee,
};
use crate::orm::DbConn;
use crate::orm::employee::{create_user_with_employee, set_deduction_percentage};
use crate::orm::login::hash_password;
use crate::orm::user::{
    delete_user_with_cleanup, find_conflicting_user, get_user, list_users_with_employees,
    update_user,
};
use crate::session_guards::{AdminUser, SuperAdminUser};
use crate::uploads::{UploadKind, remove_uploads, store_upload};
use crate::validation::{Validator, normalize_email};

/// Multipart body of `POST /api/v1/users`.
///
/// Text fields are optional at the form level so that missing values are
/// reported together as validation errors rather than as a parse failure.
#[derive(Debug, FromForm)]
pub struct CreateEmployeeForm<'r> {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    #[field(name = "hireDate")]
    pub hire_date: Option<String>,
    #[field(name = "deductionPercentage")]
    pub deduction_percentage: Option<f64>,
    pub avatar: Option<TempFile<'r>>,
    pub contract: Option<TempFile<'r>>,
    #[field(name = "employmentDeclaration")]
    pub employment_declaration: Option<TempFile<'r>>,
    pub certification: Option<TempFile<'r>>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeductionPercentageRequest {
    pub deduction_percentage: f64,
}

/// The validated text part of a [`CreateEmployeeForm`].
struct HireDetails {
    username: String,
    email: String,
    password: String,
    name: String,
    position: String,
    hire_date: NaiveDate,
    deduction_percentage: f64,
}

fn validate_hire_form(form: &CreateEmployeeForm<'_>) -> Result<HireDetails, Vec<String>> {
    let text = |value: &Option<String>| value.as_deref().unwrap_or("").to_string();
    let username = text(&form.username);
    let email = text(&form.email);
    let password = text(&form.password);
    let name = text(&form.name);
    let position = text(&form.position);
    let hire_date = form
        .hire_date
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
    let deduction_percentage = form.deduction_percentage.unwrap_or(0.0);

    let mut validator = Validator::new();
    validator
        .username(&username)
        .email(&email)
        .password(&password)
        .not_blank(&name, "Name")
        .not_blank(&position, "Position")
        .check(hire_date.is_some(), "Hire date must be a date (YYYY-MM-DD)")
        .percentage(deduction_percentage, "Deduction percentage");
    validator.finish()?;

    Ok(HireDetails {
        username: username.trim().to_string(),
        email: normalize_email(&email),
        password,
        name,
        position,
        hire_date: hire_date.unwrap_or_default(),
        deduction_percentage,
    })
}

/// List Users endpoint.
///
/// - **URL:** `/api/v1/users`
/// - **Method:** `GET`
/// - **Authentication:** Admin
///
/// Returns `{ "users": [...] }` ordered by id, each with its `employee`
/// record or `null`.
#[get("/v1/users")]
pub async fn list_users(db: DbConn, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let users: Vec<UserWithEmployee> = db
        .run(list_users_with_employees)
        .await
        .map_err(internal_error)?
        .into_iter()
        .map(UserWithEmployee::from)
        .collect();
    Ok(Json(json!({ "users": users })))
}

/// Create Employee endpoint.
///
/// - **URL:** `/api/v1/users`
/// - **Method:** `POST` (`multipart/form-data`)
/// - **Authentication:** Admin
///
/// Fields: `username`, `email`, `password`, `name`, `position`,
/// `hireDate`, `deductionPercentage`. Optional files: `avatar`,
/// `contract`, `employmentDeclaration`, `certification`.
///
/// Files are written before the database transaction and removed again
/// if it fails.
///
/// **Success (HTTP 201 Created):**
/// ```json
/// { "message": "Employee created successfully", "user": { ... }, "employee": { ... } }
/// ```
///
/// **Failure (HTTP 400 Bad Request):**
/// ```json
/// { "error": "User already exists" }
/// ```
#[post("/v1/users", data = "<form>")]
pub async fn create_employee_account(
    db: DbConn,
    config: &State<AppConfig>,
    admin: AdminUser,
    form: Form<CreateEmployeeForm<'_>>,
) -> ApiResult<status::Created<Json<Value>>> {
    let mut form = form.into_inner();
    let details = validate_hire_form(&form).map_err(validation_failed)?;

    let username = details.username.clone();
    let email = details.email.clone();
    let clash = db
        .run(move |conn| find_conflicting_user(conn, Some(&username), Some(&email), None))
        .await
        .map_err(internal_error)?;
    if clash.is_some() {
        return Err(bad_request("User already exists"));
    }

    let password_hash = hash_password(&details.password).map_err(internal_error)?;

    let dir = config.upload_dir.clone();
    let mut stored = Vec::new();
    let mut saved = [None, None, None, None];
    let parts = [
        (form.avatar.as_mut(), UploadKind::Avatar),
        (form.contract.as_mut(), UploadKind::Contract),
        (
            form.employment_declaration.as_mut(),
            UploadKind::EmploymentDeclaration,
        ),
        (form.certification.as_mut(), UploadKind::Certification),
    ];
    for (slot, (part, kind)) in saved.iter_mut().zip(parts) {
        let Some(file) = part else { continue };
        match store_upload(file, &dir, kind).await {
            Ok(name) => {
                if let Some(name) = &name {
                    stored.push(name.clone());
                }
                *slot = name;
            }
            Err(e) => {
                remove_uploads(&dir, &stored).await;
                return Err(internal_error(format!("failed to store upload: {}", e)));
            }
        }
    }
    let [avatar, contract, employment_declaration, certification] = saved;

    let user_input = UserInput {
        username: details.username,
        email: details.email,
        password_hash,
        role: Role::User,
        avatar,
    };
    let employee_input = EmployeeInput {
        name: details.name,
        position: details.position,
        hire_date: details.hire_date,
        deduction_percentage: details.deduction_percentage,
        contract,
        employment_declaration,
        certification,
    };

    let result = db
        .run(move |conn| create_user_with_employee(conn, user_input, employee_input))
        .await;

    match result {
        Ok((user, employee)) => {
            info!(
                "Admin {} hired {} as employee {}",
                admin.user.email, user.email, employee.id
            );
            Ok(status::Created::new(format!("/api/v1/employees/{}", employee.id)).body(
                Json(json!({
                    "message": "Employee created successfully",
                    "user": UserProfile::from(user),
                    "employee": employee,
                })),
            ))
        }
        Err(e) => {
            remove_uploads(&dir, &stored).await;
            if is_unique_violation(&e) {
                Err(bad_request("User already exists"))
            } else {
                Err(internal_error(e))
            }
        }
    }
}

/// Update User endpoint.
///
/// - **URL:** `/api/v1/users/<user_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin
///
/// Only a super admin may grant the `superAdmin` role or modify an account
/// that already holds it.
#[put("/v1/users/<user_id>", data = "<request>")]
pub async fn update_user_account(
    db: DbConn,
    admin: AdminUser,
    user_id: i32,
    request: LoggedJson<UpdateUserRequest>,
) -> ApiResult<Json<Value>> {
    let request = request.into_inner();

    let mut validator = Validator::new();
    if let Some(username) = &request.username {
        validator.username(username);
    }
    if let Some(email) = &request.email {
        validator.email(email);
    }
    validator.finish().map_err(validation_failed)?;

    let caller_is_super = admin.user.role == Role::SuperAdmin;
    let user = db
        .run(move |conn| {
            let target = get_user(conn, user_id)
                .map_err(internal_error)?
                .ok_or_else(|| not_found("User not found"))?;

            if !caller_is_super
                && (target.role == Role::SuperAdmin || request.role == Some(Role::SuperAdmin))
            {
                return Err(forbidden("Insufficient permissions"));
            }

            if find_conflicting_user(
                conn,
                request.username.as_deref(),
                request.email.as_deref(),
                Some(user_id),
            )
            .map_err(internal_error)?
            .is_some()
            {
                return Err(bad_request("Username or email already in use"));
            }

            let changes = UserChangeset {
                username: request.username,
                email: request.email,
                role: request.role,
                is_active: request.is_active,
                ..Default::default()
            };
            update_user(conn, user_id, changes).map_err(|e| {
                if is_unique_violation(&e) {
                    bad_request("Username or email already in use")
                } else {
                    internal_error(e)
                }
            })
        })
        .await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "user": UserProfile::from(user),
    })))
}

/// Set Deduction Percentage endpoint.
///
/// - **URL:** `/api/v1/users/<user_id>/deduction-percentage`
/// - **Method:** `PUT`
/// - **Authentication:** Admin
///
/// Body: `{ "deductionPercentage": 35 }`, between 0 and 100.
#[put("/v1/users/<user_id>/deduction-percentage", data = "<request>")]
pub async fn update_deduction_percentage(
    db: DbConn,
    _admin: AdminUser,
    user_id: i32,
    request: LoggedJson<DeductionPercentageRequest>,
) -> ApiResult<Json<Value>> {
    let percentage = request.deduction_percentage;
    let mut validator = Validator::new();
    validator.percentage(percentage, "Deduction percentage");
    validator.finish().map_err(validation_failed)?;

    let employee = db
        .run(move |conn| set_deduction_percentage(conn, user_id, percentage))
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Employee not found"))?;

    Ok(Json(json!({
        "message": "Deduction percentage updated successfully",
        "employee": employee,
    })))
}

/// Delete User endpoint.
///
/// - **URL:** `/api/v1/users/<user_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Super admin
///
/// Removes the account, its employee record and everything recorded for
/// that employee. Expenses the user entered stay, without a creator.
#[delete("/v1/users/<user_id>")]
pub async fn delete_user(
    db: DbConn,
    super_admin: SuperAdminUser,
    user_id: i32,
) -> ApiResult<Json<Value>> {
    if super_admin.id() == user_id {
        return Err(bad_request("You cannot delete your own account"));
    }

    let deleted = db
        .run(move |conn| delete_user_with_cleanup(conn, user_id))
        .await
        .map_err(internal_error)?;
    if deleted == 0 {
        return Err(not_found("User not found"));
    }

    info!("Super admin {} deleted user {}", super_admin.user.email, user_id);
    Ok(Json(json!({ "message": "User deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_users,
        create_employee_account,
        update_user_account,
        update_deduction_percentage,
        delete_user
    ]
}

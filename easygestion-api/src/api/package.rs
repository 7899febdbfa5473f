//! The salon's service catalogue.

use rocket::Route;
use rocket::response::status;
use rocket::serde::json::{Json, Value, json};

use super::{ApiResult, internal_error, not_found, validation_failed};
use crate::logged_json::LoggedJson;
use crate::models::{PackageInput, UpdatePackageRequest};
use crate::orm::DbConn;
use crate::orm::package::{
    deactivate_package, get_package, insert_package, list_active_packages, list_all_packages,
    update_package,
};
use crate::session_guards::{AdminUser, AuthenticatedUser};
use crate::validation::Validator;

/// List Packages endpoint.
///
/// - **URL:** `/api/v1/packages`
/// - **Method:** `GET`
/// - **Authentication:** Required
///
/// Active packages only, ordered by name.
#[get("/v1/packages")]
pub async fn list_packages(db: DbConn, _user: AuthenticatedUser) -> ApiResult<Json<Value>> {
    let packages = db
        .run(list_active_packages)
        .await
        .map_err(internal_error)?;
    Ok(Json(json!({ "packages": packages })))
}

/// List All Packages endpoint, including deactivated ones.
///
/// - **URL:** `/api/v1/packages/all`
/// - **Method:** `GET`
/// - **Authentication:** Admin
#[get("/v1/packages/all")]
pub async fn list_every_package(db: DbConn, _admin: AdminUser) -> ApiResult<Json<Value>> {
    let packages = db.run(list_all_packages).await.map_err(internal_error)?;
    Ok(Json(json!({ "packages": packages })))
}

/// Create Package endpoint.
///
/// - **URL:** `/api/v1/packages`
/// - **Method:** `POST`
/// - **Authentication:** Admin
///
/// Body: `{ "name": "Barbe", "price": 7 }`
#[post("/v1/packages", data = "<request>")]
pub async fn create_package(
    db: DbConn,
    _admin: AdminUser,
    request: LoggedJson<PackageInput>,
) -> ApiResult<status::Created<Json<Value>>> {
    let input = request.into_inner();
    let mut validator = Validator::new();
    validator
        .not_blank(&input.name, "Name")
        .amount(input.price, "Price");
    validator.finish().map_err(validation_failed)?;

    let package = db
        .run(move |conn| insert_package(conn, input))
        .await
        .map_err(internal_error)?;
    info!("Created package {} '{}'", package.id, package.name);

    Ok(status::Created::new(format!("/api/v1/packages/{}", package.id)).body(Json(json!({
        "message": "Package created successfully",
        "package": package,
    }))))
}

/// Update Package endpoint.
///
/// - **URL:** `/api/v1/packages/<package_id>`
/// - **Method:** `PUT`
/// - **Authentication:** Admin
///
/// Body: any of `name`, `price`, `isActive`. Setting `isActive` back to
/// true restores a deleted package.
#[put("/v1/packages/<package_id>", data = "<request>")]
pub async fn update_package_by_id(
    db: DbConn,
    _admin: AdminUser,
    package_id: i32,
    request: LoggedJson<UpdatePackageRequest>,
) -> ApiResult<Json<Value>> {
    let changes = request.into_inner();
    let mut validator = Validator::new();
    if let Some(name) = &changes.name {
        validator.not_blank(name, "Name");
    }
    if let Some(price) = changes.price {
        validator.amount(price, "Price");
    }
    validator.finish().map_err(validation_failed)?;

    let package = db
        .run(move |conn| {
            if get_package(conn, package_id)
                .map_err(internal_error)?
                .is_none()
            {
                return Err(not_found("Package not found"));
            }
            update_package(conn, package_id, changes).map_err(internal_error)
        })
        .await?;

    Ok(Json(json!({
        "message": "Package updated successfully",
        "package": package,
    })))
}

/// Delete Package endpoint.
///
/// - **URL:** `/api/v1/packages/<package_id>`
/// - **Method:** `DELETE`
/// - **Authentication:** Admin
///
/// Deactivates the package; sales that reference it are untouched.
#[delete("/v1/packages/<package_id>")]
pub async fn delete_package(
    db: DbConn,
    _admin: AdminUser,
    package_id: i32,
) -> ApiResult<Json<Value>> {
    let updated = db
        .run(move |conn| deactivate_package(conn, package_id))
        .await
        .map_err(internal_error)?;
    if updated == 0 {
        return Err(not_found("Package not found"));
    }
    Ok(Json(json!({ "message": "Package deleted successfully" })))
}

pub fn routes() -> Vec<Route> {
    routes![
        list_packages,
        list_every_package,
        create_package,
        update_package_by_id,
        delete_package
    ]
}

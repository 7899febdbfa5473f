#[macro_use]
extern crate rocket;

use rocket::figment::Figment;
use rocket::figment::value::Map;
use rocket::fs::{FileServer, Options};
use rocket::http::{Method, Status};
use rocket::request::Request;
use rocket::serde::json::{Json, Value, json};
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};

pub mod admin_init_fairing;
pub mod api;
pub mod config;
pub mod csrf;
pub mod dates;
pub mod logged_json;
pub mod models;
pub mod orm;
pub use orm::DbConn;
pub mod schema;
pub mod security_headers;
pub mod session_guards;
pub mod token;
pub mod uploads;
pub mod validation;

#[cfg(test)]
pub mod generate_types;

use crate::config::{AppConfig, ConfigError};
use crate::session_guards::AuthFailure;

/// The `{error, path, status}` body shared by catchers and fallback routes.
pub(crate) fn error_json(message: &str, status: Status, path: &str) -> Json<Value> {
    Json(json!({
        "error": message,
        "path": path,
        "status": status.code
    }))
}

fn error_body(message: &str, status: u16, req: &Request) -> Json<Value> {
    error_json(
        message,
        Status::new(status),
        &req.uri().path().to_string(),
    )
}

/// The reason recorded by a failing auth guard, if any.
fn auth_failure(req: &Request) -> Option<&'static str> {
    req.local_cache(AuthFailure::default).0
}

#[catch(400)]
fn bad_request(req: &Request) -> Json<Value> {
    error_body("Bad Request", 400, req)
}

#[catch(401)]
fn unauthorized(req: &Request) -> Json<Value> {
    error_body(auth_failure(req).unwrap_or("Unauthorized"), 401, req)
}

#[catch(403)]
fn forbidden(req: &Request) -> Json<Value> {
    error_body(auth_failure(req).unwrap_or("Forbidden"), 403, req)
}

#[catch(404)]
fn not_found(req: &Request) -> Json<Value> {
    error_body("Not Found", 404, req)
}

#[catch(404)]
fn api_not_found(req: &Request) -> Json<Value> {
    error_body("API endpoint not found", 404, req)
}

#[catch(413)]
fn payload_too_large(req: &Request) -> Json<Value> {
    error_body("File too large", 413, req)
}

#[catch(422)]
fn unprocessable_entity(req: &Request) -> Json<Value> {
    error_body("Unprocessable Entity", 422, req)
}

#[catch(500)]
fn internal_server_error(req: &Request) -> Json<Value> {
    error_body("Internal server error", 500, req)
}

#[catch(default)]
fn default_catcher(status: Status, req: &Request) -> Json<Value> {
    error_body(status.reason().unwrap_or("Unknown Error"), status.code, req)
}

pub fn mount_api_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api", api::routes())
}

fn cors_fairing(origin: &str) -> Option<rocket_cors::Cors> {
    let methods = [Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options];
    let options = CorsOptions {
        allowed_origins: AllowedOrigins::some_exact(&[origin]),
        allowed_methods: methods.into_iter().map(From::from).collect(),
        allowed_headers: AllowedHeaders::some(&[
            "Authorization",
            "Content-Type",
            csrf::CSRF_HEADER,
        ]),
        allow_credentials: true,
        ..Default::default()
    };
    match options.to_cors() {
        Ok(cors) => Some(cors),
        Err(e) => {
            error!("Invalid CORS configuration for origin '{}': {}", origin, e);
            None
        }
    }
}

fn log_rocket_info(rocket: &Rocket<Build>) {
    let figment = rocket.figment();

    if let Ok(address) = figment.extract_inner::<String>("address") {
        info!("Rocket is running at: {}", address);
    }

    if let Ok(port) = figment.extract_inner::<u16>("port") {
        info!("Rocket is listening on port: {}", port);
    }

    match figment.extract_inner::<Map<String, Value>>("databases.sqlite_db") {
        Ok(db_config) => {
            if let Some(Value::String(url)) = db_config.get("url") {
                info!("Database URL: {}", url);
            } else {
                warn!("Database URL not found in configuration");
            }
        }
        Err(e) => {
            warn!("Failed to extract database configuration: {}", e);
        }
    }

    info!(
        "Build: v{} ({}){}",
        api::status::built_info::PKG_VERSION,
        api::status::built_info::BUILT_TIME_UTC,
        api::status::built_info::GIT_COMMIT_HASH
            .map(|commit| format!(", commit {}", commit))
            .unwrap_or_default()
    );
}

/// Assembles the application on top of `figment`.
///
/// Shared by the server binary and [`orm::testing::test_rocket`]; the only
/// difference between the two is where the figment comes from. Fails when
/// the figment does not hold a usable [`AppConfig`].
pub fn build_rocket(figment: Figment) -> Result<Rocket<Build>, ConfigError> {
    let config = config::app_config(&figment)?;
    let upload_dir = config.upload_dir.clone();
    let static_dir = config.static_dir.clone();
    let cors = (!config.cors_origin.trim().is_empty())
        .then(|| cors_fairing(config.cors_origin.trim()))
        .flatten();

    let mut rocket = rocket::custom(figment)
        .manage(config)
        .attach(DbConn::fairing())
        .attach(orm::set_foreign_keys_fairing())
        .attach(orm::run_migrations_fairing())
        .attach(admin_init_fairing::admin_init_fairing())
        .attach(uploads::upload_dir_fairing())
        .attach(security_headers::shield())
        .attach(security_headers::content_security_policy_fairing());

    if let Some(cors) = cors {
        rocket = rocket.attach(cors);
    }

    let rocket = rocket
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                payload_too_large,
                unprocessable_entity,
                internal_server_error,
                default_catcher
            ],
        )
        .register("/api", catchers![api_not_found]);

    Ok(mount_api_routes(rocket)
        .mount("/", api::status::routes())
        .mount("/uploads", FileServer::new(upload_dir, Options::Missing).rank(5))
        .mount("/", FileServer::new(static_dir, Options::Index | Options::Missing))
        .mount("/", api::spa::routes()))
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("DATABASE_URL must be set: {0}")]
    DatabaseUrl(#[from] std::env::VarError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Builds the production server from `.env`, `Rocket.toml` and the
/// environment.
///
/// Note that this function doesn't get tested by our tests. Tests build
/// their instance with `orm::testing::test_rocket`.
pub fn rocket() -> Result<Rocket<Build>, StartupError> {
    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }
    let database_url = std::env::var("DATABASE_URL")?;

    let rocket = build_rocket(config::figment(database_url))?;
    log_rocket_info(&rocket);
    Ok(rocket)
}

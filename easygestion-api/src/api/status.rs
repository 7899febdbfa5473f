//! Health check endpoint
//!
//! Served outside `/api` so load balancers and uptime probes can reach it
//! without knowing the API version.

use chrono::{SecondsFormat, Utc};
use rocket::{Route, serde::json::Json};
use serde::Serialize;
use ts_rs::TS;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HealthStatus {
    status: &'static str,
    timestamp: String,
    version: &'static str,
    built: &'static str,
    git_commit: Option<&'static str>,
}

/// Health Status endpoint.
///
/// - **URL:** `/health`
/// - **Method:** `GET`
/// - **Purpose:** Returns the health status of the application
/// - **Authentication:** None required
///
/// # Response
///
/// **Success (HTTP 200 OK):**
/// ```json
/// {
///   "status": "OK",
///   "timestamp": "2025-03-14T09:30:00.000Z",
///   "version": "0.1.0",
///   "built": "Fri, 14 Mar 2025 08:12:43 +0000",
///   "gitCommit": "cd51275141a2e7d49737aa7dd4e8ff7c9a804d67"
/// }
/// ```
#[get("/health")]
pub fn health_status() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "OK",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
        built: built_info::BUILT_TIME_UTC,
        git_commit: built_info::GIT_COMMIT_HASH,
    })
}

/// Returns a vector of all routes defined in this module.
pub fn routes() -> Vec<Route> {
    routes![health_status]
}

//! Single-page application fallback.
//!
//! Client-side routes such as `/dashboard/sales` have no file behind them,
//! so any GET that neither the API nor the static file server answered
//! gets `index.html`.

use std::path::PathBuf;

use rocket::fs::NamedFile;
use rocket::http::Status;
use rocket::http::uri::Origin;
use rocket::response::status;
use rocket::serde::json::{Json, Value};
use rocket::{Route, State};

use crate::config::AppConfig;
use crate::error_json;

/// Paths owned by the server rather than the client-side router.
const RESERVED_PREFIXES: [&str; 2] = ["api", "uploads"];

fn is_reserved(path: &std::path::Path) -> bool {
    path.components()
        .next()
        .and_then(|first| first.as_os_str().to_str())
        .is_some_and(|first| RESERVED_PREFIXES.contains(&first))
}

#[get("/<path..>", rank = 20)]
pub async fn index_fallback(
    path: PathBuf,
    uri: &Origin<'_>,
    config: &State<AppConfig>,
) -> Result<NamedFile, status::Custom<Json<Value>>> {
    let request_path = uri.path().to_string();
    let not_found = |message: &str| {
        status::Custom(
            Status::NotFound,
            error_json(message, Status::NotFound, &request_path),
        )
    };

    if is_reserved(&path) {
        let message = if path.starts_with("api") {
            "API endpoint not found"
        } else {
            "File not found"
        };
        return Err(not_found(message));
    }

    let index = config.static_dir.join("index.html");
    NamedFile::open(&index).await.map_err(|e| {
        debug!("No SPA index at {}: {}", index.display(), e);
        not_found("Frontend not built")
    })
}

pub fn routes() -> Vec<Route> {
    routes![index_fallback]
}

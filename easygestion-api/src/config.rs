//! Application settings layered on top of Rocket's own configuration.
//!
//! Values come from the same figment Rocket reads (`Rocket.toml`,
//! `ROCKET_*`), plus `EASYGESTION_*` environment variables, e.g.
//! `EASYGESTION_JWT_SECRET` or `EASYGESTION_UPLOAD_DIR`.

use std::path::PathBuf;

use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use rocket::figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use thiserror::Error;

use crate::token::hmac_algorithm;

pub const ENV_PREFIX: &str = "EASYGESTION_";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub jwt_secret: String,
    /// One of HS256, HS384, HS512. Tokens signed with anything else are rejected.
    pub jwt_algorithm: String,
    /// Token lifetime in seconds; also the max-age of the token cookie.
    pub jwt_expires_in: i64,
    pub jwt_audience: String,
    pub jwt_issuer: String,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Allowed CORS origin. Empty disables CORS handling entirely.
    pub cors_origin: String,
    pub secure_cookies: bool,
    pub default_admin_email: String,
    pub default_admin_username: String,
    pub default_admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "Acc3ssTok3nS3c3t!".to_string(),
            jwt_algorithm: "HS256".to_string(),
            jwt_expires_in: 3600,
            jwt_audience: "my_backend_api".to_string(),
            jwt_issuer: "my_authentication_server".to_string(),
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("dist/public"),
            cors_origin: String::new(),
            secure_cookies: false,
            default_admin_email: "superadmin@example.com".to_string(),
            default_admin_username: "superadmin".to_string(),
            default_admin_password: "admin".to_string(),
        }
    }
}

/// Request size limits: 1 MiB JSON bodies and 5 MiB per uploaded file.
pub fn default_limits() -> Limits {
    Limits::default()
        .limit("json", 1.mebibytes())
        .limit("file", 5.mebibytes())
        .limit("data-form", 24.mebibytes())
}

/// Builds the production figment. Later providers override earlier ones.
pub fn figment(database_url: String) -> Figment {
    Figment::from(rocket::Config::default())
        .merge(("limits", default_limits()))
        .merge(Toml::file("Rocket.toml").nested())
        .merge(Env::prefixed("ROCKET_").global())
        .merge(Env::prefixed(ENV_PREFIX).global())
        .merge(("databases.sqlite_db.url", database_url))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid application configuration: {0}")]
    Extract(Box<rocket::figment::Error>),
    #[error("unsupported jwt_algorithm '{0}', expected HS256, HS384 or HS512")]
    UnsupportedAlgorithm(String),
    #[error("jwt_secret must not be empty")]
    EmptySecret,
}

/// Extracts and checks [`AppConfig`].
///
/// Any value of the wrong type aborts startup: falling back to defaults
/// would replace an operator's secret with the built-in one.
pub fn app_config(figment: &Figment) -> Result<AppConfig, ConfigError> {
    let config = figment
        .extract::<AppConfig>()
        .map_err(|e| ConfigError::Extract(Box::new(e)))?;

    if hmac_algorithm(&config.jwt_algorithm).is_none() {
        return Err(ConfigError::UnsupportedAlgorithm(config.jwt_algorithm));
    }
    if config.jwt_secret.is_empty() {
        return Err(ConfigError::EmptySecret);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let config = app_config(&Figment::from(rocket::Config::default())).unwrap();
        assert_eq!(config.jwt_algorithm, "HS256");
        assert_eq!(config.jwt_expires_in, 3600);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert!(config.cors_origin.is_empty());
    }

    #[test]
    fn later_providers_override_defaults() {
        let figment = Figment::from(rocket::Config::default())
            .merge(("jwt_secret", "another-secret"))
            .merge(("jwt_expires_in", 120))
            .merge(("cors_origin", "http://localhost:5173"));
        let config = app_config(&figment).unwrap();
        assert_eq!(config.jwt_secret, "another-secret");
        assert_eq!(config.jwt_expires_in, 120);
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.jwt_issuer, "my_authentication_server");
    }

    #[test]
    fn wrongly_typed_value_is_rejected_not_defaulted() {
        let figment = Figment::from(rocket::Config::default())
            .merge(("jwt_secret", "my-production-secret"))
            .merge(("jwt_expires_in", "soon"));
        assert!(matches!(app_config(&figment), Err(ConfigError::Extract(_))));
    }

    #[test]
    fn asymmetric_algorithm_is_rejected() {
        let figment = Figment::from(rocket::Config::default()).merge(("jwt_algorithm", "RS256"));
        match app_config(&figment) {
            Err(ConfigError::UnsupportedAlgorithm(alg)) => assert_eq!(alg, "RS256"),
            other => panic!("expected UnsupportedAlgorithm, got {:?}", other),
        }
    }

    #[test]
    fn hmac_variants_are_accepted() {
        for alg in ["HS256", "HS384", "HS512"] {
            let figment = Figment::from(rocket::Config::default()).merge(("jwt_algorithm", alg));
            assert_eq!(app_config(&figment).unwrap().jwt_algorithm, alg);
        }
    }

    #[test]
    fn empty_secret_is_rejected() {
        let figment = Figment::from(rocket::Config::default()).merge(("jwt_secret", ""));
        assert!(matches!(app_config(&figment), Err(ConfigError::EmptySecret)));
    }
}

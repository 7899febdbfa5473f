//! JWT access tokens.
//!
//! Tokens are HMAC-signed with the configured secret. Verification pins the
//! algorithm, audience and issuer to the configured values, so a token minted
//! for another service or signed with a different algorithm is rejected even
//! when the secret matches.

use std::str::FromStr;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::models::{Role, User};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
    pub iss: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unsupported signing algorithm '{0}'")]
    UnsupportedAlgorithm(String),
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Parses `name` as one of the HMAC algorithms, the only family usable
/// with a shared secret.
pub fn hmac_algorithm(name: &str) -> Option<Algorithm> {
    match Algorithm::from_str(name) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Some(alg),
        _ => None,
    }
}

fn signing_algorithm(config: &AppConfig) -> Result<Algorithm, TokenError> {
    hmac_algorithm(&config.jwt_algorithm)
        .ok_or_else(|| TokenError::UnsupportedAlgorithm(config.jwt_algorithm.clone()))
}

/// Issues a signed access token for `user`.
pub fn issue_token(config: &AppConfig, user: &User) -> Result<String, TokenError> {
    let algorithm = signing_algorithm(config)?;
    let now = Utc::now().timestamp();
    let claims = Claims {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        role: user.role,
        iat: now,
        exp: now + config.jwt_expires_in,
        aud: config.jwt_audience.clone(),
        iss: config.jwt_issuer.clone(),
    };

    encode(
        &Header::new(algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(TokenError::Encode)
}

/// Verifies signature, expiry, algorithm, audience and issuer.
pub fn verify_token(config: &AppConfig, token: &str) -> Result<Claims, TokenError> {
    let algorithm = signing_algorithm(config)?;
    let mut validation = Validation::new(algorithm);
    validation.leeway = 0;
    validation.set_audience(&[config.jwt_audience.as_str()]);
    validation.set_issuer(&[config.jwt_issuer.as_str()]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(TokenError::Invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now().naive_utc();
        User {
            id: 7,
            username: "camille".to_string(),
            email: "camille@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Admin,
            avatar: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_token_verifies() {
        let config = AppConfig::default();
        let token = issue_token(&config, &sample_user()).expect("token");
        let claims = verify_token(&config, &token).expect("claims");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.username, "camille");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.aud, "my_backend_api");
        assert_eq!(claims.iss, "my_authentication_server");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue_token(&AppConfig::default(), &sample_user()).unwrap();
        let other = AppConfig {
            jwt_secret: "not-the-secret".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(verify_token(&other, &token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn rejects_foreign_audience_and_issuer() {
        let token = issue_token(&AppConfig::default(), &sample_user()).unwrap();

        let audience = AppConfig {
            jwt_audience: "another_api".to_string(),
            ..AppConfig::default()
        };
        assert!(verify_token(&audience, &token).is_err());

        let issuer = AppConfig {
            jwt_issuer: "someone_else".to_string(),
            ..AppConfig::default()
        };
        assert!(verify_token(&issuer, &token).is_err());
    }

    #[test]
    fn rejects_other_algorithm() {
        let hs512 = AppConfig {
            jwt_algorithm: "HS512".to_string(),
            ..AppConfig::default()
        };
        let token = issue_token(&hs512, &sample_user()).unwrap();
        assert!(verify_token(&AppConfig::default(), &token).is_err());
        assert!(verify_token(&hs512, &token).is_ok());
    }

    #[test]
    fn rejects_expired_token() {
        let expired = AppConfig {
            jwt_expires_in: -10,
            ..AppConfig::default()
        };
        let token = issue_token(&expired, &sample_user()).unwrap();
        assert!(verify_token(&AppConfig::default(), &token).is_err());
    }

    #[test]
    fn refuses_asymmetric_algorithms() {
        let rsa = AppConfig {
            jwt_algorithm: "RS256".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            issue_token(&rsa, &sample_user()),
            Err(TokenError::UnsupportedAlgorithm(_))
        ));
    }
}

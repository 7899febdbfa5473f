//! Double-submit CSRF protection for cookie-authenticated requests.
//!
//! `GET /api/v1/csrf-token` stores a random token in the `_csrf` cookie and
//! returns it in the body. State-changing requests that authenticate with
//! the `accessToken` cookie must echo it in the `X-CSRF-Token` header.

use rand::Rng;
use rocket::http::{Cookie, CookieJar, Method, SameSite};
use rocket::request::Request;
use subtle::ConstantTimeEq;

pub const CSRF_COOKIE: &str = "_csrf";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

pub fn set_csrf_cookie(cookies: &CookieJar<'_>, token: &str, secure: bool) {
    let cookie = Cookie::build((CSRF_COOKIE, token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .build();
    cookies.add(cookie);
}

/// Safe methods never need a token.
pub fn requires_token(method: Method) -> bool {
    !matches!(method, Method::Get | Method::Head | Method::Options)
}

/// Compares two tokens without short-circuiting on the first difference.
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}

/// True when the header token matches the cookie token.
pub fn request_has_valid_token(request: &Request<'_>) -> bool {
    let Some(cookie) = request.cookies().get(CSRF_COOKIE) else {
        return false;
    };
    let Some(header) = request.headers().get_one(CSRF_HEADER) else {
        return false;
    };
    tokens_match(cookie.value(), header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(hex::decode(&a).unwrap().len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn token_comparison() {
        assert!(tokens_match("abc123", "abc123"));
        assert!(!tokens_match("abc123", "abc124"));
        assert!(!tokens_match("abc123", "abc12"));
        assert!(!tokens_match("abc123", "abc123abc123"));
        assert!(!tokens_match("", ""));
    }

    #[test]
    fn only_unsafe_methods_require_token() {
        assert!(!requires_token(Method::Get));
        assert!(!requires_token(Method::Head));
        assert!(!requires_token(Method::Options));
        assert!(requires_token(Method::Post));
        assert!(requires_token(Method::Put));
        assert!(requires_token(Method::Delete));
    }
}

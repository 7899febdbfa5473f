//! Token-based authentication and authorization guards for Rocket routes.
//!
//! The access token is read from the `Authorization: Bearer` header or,
//! failing that, from the `accessToken` cookie. Cookie-authenticated
//! requests that change state must also pass the CSRF check.
//!
//! ```rust,ignore
//! #[get("/v1/packages/all")]
//! fn all_packages(user: AdminUser) -> String {
//!     format!("Catalogue for {}", user.user.username)
//! }
//! ```
//!
//! When a guard rejects a request it records the reason in the request's
//! local cache as an [`AuthFailure`]; the 401 and 403 catchers use it as
//! the error message.

use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};

use crate::DbConn;
use crate::config::AppConfig;
use crate::csrf;
use crate::models::{Role, User};
use crate::orm::user::get_user;
use crate::token::verify_token;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Why the last auth guard on this request failed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthFailure(pub Option<&'static str>);

fn reject<T>(request: &Request<'_>, status: Status, reason: &'static str) -> request::Outcome<T, ()> {
    request.local_cache(|| AuthFailure(Some(reason)));
    Outcome::Error((status, ()))
}

fn bearer_token<'a>(request: &'a Request<'_>) -> Option<&'a str> {
    request
        .headers()
        .get_one("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Sets the token cookie after login or registration.
pub fn set_access_token_cookie(cookies: &CookieJar<'_>, token: &str, config: &AppConfig) {
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token.to_string()))
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(rocket::time::Duration::seconds(config.jwt_expires_in))
        .build();
    cookies.add(cookie);
}

pub fn clear_access_token_cookie(cookies: &CookieJar<'_>) {
    cookies.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
}

/// A request guard for routes that require a signed-in, active account.
///
/// The role is always taken from the database, never from the token, so a
/// demotion takes effect on the next request.
///
/// - `401 "Access token required"`: no header and no cookie
/// - `401 "Invalid or expired token"`: bad signature, expiry, audience,
///   issuer or algorithm
/// - `403 "Invalid CSRF token"`: cookie auth on a state-changing request
///   without a matching `X-CSRF-Token`
/// - `401 "User not found or inactive"`
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(config) = request.rocket().state::<AppConfig>() else {
            error!("AppConfig is not managed; cannot authenticate requests");
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let (token, via_cookie) = match bearer_token(request) {
            Some(token) => (token.to_string(), false),
            None => match request.cookies().get(ACCESS_TOKEN_COOKIE) {
                Some(cookie) => (cookie.value().to_string(), true),
                None => return reject(request, Status::Unauthorized, "Access token required"),
            },
        };

        let claims = match verify_token(config, &token) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Rejected access token: {}", e);
                return reject(request, Status::Unauthorized, "Invalid or expired token");
            }
        };

        if via_cookie
            && csrf::requires_token(request.method())
            && !csrf::request_has_valid_token(request)
        {
            return reject(request, Status::Forbidden, "Invalid CSRF token");
        }

        let db = match request.guard::<DbConn>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        let user_id = claims.id;
        match db.run(move |conn| get_user(conn, user_id)).await {
            Ok(Some(user)) if user.is_active => Outcome::Success(AuthenticatedUser { user }),
            Ok(_) => reject(request, Status::Unauthorized, "User not found or inactive"),
            Err(e) => {
                error!("Database error loading user {}: {}", user_id, e);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

/// The identity of the caller, small enough to move into `db.run` closures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i32,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl AuthenticatedUser {
    pub fn caller(&self) -> Caller {
        Caller {
            id: self.user.id,
            role: self.user.role,
        }
    }

    pub fn id(&self) -> i32 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    /// Admins and super admins.
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    pub fn is_super_admin(&self) -> bool {
        self.user.role == Role::SuperAdmin
    }
}

/// Macro to create role-specific request guards
macro_rules! create_role_guard {
    ($(#[$doc:meta])* $name:ident, $allowed:expr) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub struct $name {
            pub user: User,
        }

        impl $name {
            pub fn id(&self) -> i32 {
                self.user.id
            }
        }

        impl From<$name> for AuthenticatedUser {
            fn from(guard: $name) -> Self {
                AuthenticatedUser { user: guard.user }
            }
        }

        #[rocket::async_trait]
        impl<'r> FromRequest<'r> for $name {
            type Error = ();

            async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
                let auth_user = match AuthenticatedUser::from_request(request).await {
                    Outcome::Success(user) => user,
                    Outcome::Error(e) => return Outcome::Error(e),
                    Outcome::Forward(f) => return Outcome::Forward(f),
                };

                let allowed: fn(&Role) -> bool = $allowed;
                if allowed(&auth_user.user.role) {
                    Outcome::Success($name {
                        user: auth_user.user,
                    })
                } else {
                    reject(request, Status::Forbidden, "Insufficient permissions")
                }
            }
        }
    };
}

create_role_guard!(
    /// Requires the `admin` or `superAdmin` role.
    AdminUser,
    |role| role.is_admin()
);

create_role_guard!(
    /// Requires the `superAdmin` role.
    SuperAdminUser,
    |role| *role == Role::SuperAdmin
);

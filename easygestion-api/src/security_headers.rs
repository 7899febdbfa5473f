use rocket::fairing::AdHoc;
use rocket::shield::Shield;

pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; style-src 'self' 'unsafe-inline'; \
     script-src 'self'; img-src 'self' data: https:";

/// Rocket's default Shield policies (nosniff, frame options, permissions).
pub fn shield() -> Shield {
    Shield::default()
}

/// Adds the Content-Security-Policy header to every response.
pub fn content_security_policy_fairing() -> AdHoc {
    AdHoc::on_response("Content Security Policy", |_req, res| {
        Box::pin(async move {
            res.set_raw_header("Content-Security-Policy", CONTENT_SECURITY_POLICY);
        })
    })
}

//! Input validation shared by the API handlers and the admin CLI.

use std::sync::LazyLock;

use regex::Regex;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 14;
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Lowercases and trims an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

/// Lists every password rule `password` breaks. Empty means acceptable.
pub fn password_violations(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("Password must contain a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("Password must contain an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain a digit".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        problems.push(format!(
            "Password must contain one of {}",
            PASSWORD_SPECIALS
        ));
    }
    problems
}

/// Collects field errors so a request can report all of them at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(message.into());
        }
        self
    }

    pub fn username(&mut self, username: &str) -> &mut Self {
        self.check(
            username.trim().chars().count() >= MIN_USERNAME_LEN,
            format!("Username must be at least {} characters long", MIN_USERNAME_LEN),
        )
    }

    pub fn email(&mut self, email: &str) -> &mut Self {
        self.check(is_valid_email(email), "A valid email is required")
    }

    pub fn password(&mut self, password: &str) -> &mut Self {
        self.errors.extend(password_violations(password));
        self
    }

    pub fn not_blank(&mut self, value: &str, field: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), format!("{} is required", field))
    }

    pub fn amount(&mut self, value: f64, field: &str) -> &mut Self {
        self.check(
            value.is_finite() && value >= 0.0,
            format!("{} must be a non-negative number", field),
        )
    }

    pub fn percentage(&mut self, value: f64, field: &str) -> &mut Self {
        self.check(
            value.is_finite() && (0.0..=100.0).contains(&value),
            format!("{} must be between 0 and 100", field),
        )
    }

    pub fn push(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), Vec<String>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strong_password() {
        assert!(password_violations("Salon-Passw0rd!!").is_empty());
    }

    #[test]
    fn reports_every_missing_class() {
        let problems = password_violations("short");
        assert_eq!(problems.len(), 4);
        assert!(problems.iter().any(|p| p.contains("14")));
        assert!(problems.iter().any(|p| p.contains("uppercase")));
        assert!(problems.iter().any(|p| p.contains("digit")));
        assert!(problems.iter().any(|p| p.contains("@$!%*?&")));
    }

    #[test]
    fn other_symbols_do_not_count_as_special() {
        let problems = password_violations("Salon-Passw0rd##");
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn email_checks() {
        assert!(is_valid_email("alice@salon.test"));
        assert!(is_valid_email("first.last+tag@mail.example.fr"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@salon"));
        assert!(!is_valid_email("@salon.test"));
        assert_eq!(normalize_email("  Alice@Salon.TEST "), "alice@salon.test");
    }

    #[test]
    fn validator_collects_errors() {
        let mut v = Validator::new();
        v.username("ab")
            .email("nope")
            .amount(-1.0, "Amount")
            .percentage(101.0, "Deduction percentage")
            .not_blank("  ", "Name");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 5);

        let mut ok = Validator::new();
        ok.username("alice").amount(0.0, "Amount").percentage(100.0, "Deduction");
        assert!(ok.finish().is_ok());
    }
}

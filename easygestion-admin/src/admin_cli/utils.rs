use diesel::{prelude::*, sqlite::SqliteConnection};
use dotenvy::dotenv;
use easygestion_api::orm::set_foreign_keys;
use regex::Regex;
use rpassword::read_password;
use std::io::{self, Write};

pub fn establish_connection() -> Result<SqliteConnection, Box<dyn std::error::Error>> {
    dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let mut conn = SqliteConnection::establish(&database_url)?;
    set_foreign_keys(&mut conn)?;
    Ok(conn)
}

/// Builds a matcher for `ls`/`rm` style search terms: a regex by default, a
/// plain substring when `fixed_string` is set.
pub fn search_matcher(
    term: &str,
    fixed_string: bool,
) -> Result<Box<dyn Fn(&str) -> bool>, Box<dyn std::error::Error>> {
    if fixed_string {
        let needle = term.to_string();
        Ok(Box::new(move |haystack: &str| haystack.contains(&needle)))
    } else {
        let regex = Regex::new(term)
            .map_err(|e| format!("Invalid regex pattern '{}': {}", term, e))?;
        Ok(Box::new(move |haystack: &str| regex.is_match(haystack)))
    }
}

/// Asks a y/N question on stdin. Anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> Result<bool, Box<dyn std::error::Error>> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let answer = input.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

pub fn prompt_for_password() -> Result<String, Box<dyn std::error::Error>> {
    print!("Enter new password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    if password.is_empty() {
        return Err("Password cannot be empty".into());
    }

    print!("Confirm new password: ");
    io::stdout().flush()?;
    let confirm_password = read_password()?;

    if password != confirm_password {
        return Err("Passwords do not match".into());
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_matcher_fixed_string() {
        let matcher = search_matcher("a.b", true).unwrap();
        assert!(matcher("xa.by"));
        assert!(!matcher("axb"));
    }

    #[test]
    fn test_search_matcher_regex() {
        let matcher = search_matcher("^ali", false).unwrap();
        assert!(matcher("alice@salon.test"));
        assert!(!matcher("bob.alice@salon.test"));

        assert!(search_matcher("(", false).is_err());
    }
}

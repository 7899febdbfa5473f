use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use easygestion_api::models::{Role, User, UserChangeset, UserInput};
use easygestion_api::orm::login::hash_password;
use easygestion_api::orm::user::{
    count_users_with_role, delete_user_with_cleanup, find_conflicting_user, get_user_by_email,
    insert_user, list_all_users, update_user,
};
use easygestion_api::validation::{
    MIN_USERNAME_LEN, is_valid_email, normalize_email, password_violations,
};

use super::utils::{confirm, prompt_for_password, search_matcher};

#[derive(Subcommand)]
pub enum UserAction {
    #[command(about = "Add a new user")]
    Add {
        #[arg(short, long, help = "Username")]
        username: String,
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "Password (will be prompted securely if not provided)")]
        password: Option<String>,
        #[arg(short, long, default_value = "user", help = "Role: user, admin or superAdmin")]
        role: Role,
    },
    #[command(about = "Change user password")]
    ChangePassword {
        #[arg(short, long, help = "Email address")]
        email: String,
        #[arg(short, long, help = "New password (will be prompted securely if not provided)")]
        password: Option<String>,
    },
    #[command(about = "List users, optionally filtered by search term")]
    Ls {
        #[arg(help = "Search term matched against username and email (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "Remove users matching search term")]
    Rm {
        #[arg(help = "Search term to match users for removal (regex by default, use -F for fixed string)")]
        search_term: String,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
        #[arg(short = 'y', long = "yes", help = "Skip confirmation prompt")]
        yes: bool,
    },
    #[command(about = "Change a user's role")]
    SetRole {
        #[arg(short, long, help = "User email address")]
        email: String,
        #[arg(short, long, help = "Role: user, admin or superAdmin")]
        role: Role,
    },
    #[command(about = "Allow a user to log in again")]
    Activate {
        #[arg(short, long, help = "User email address")]
        email: String,
    },
    #[command(about = "Block a user from logging in without deleting their data")]
    Deactivate {
        #[arg(short, long, help = "User email address")]
        email: String,
    },
}

pub fn handle_user_command_with_conn(
    conn: &mut SqliteConnection,
    action: UserAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        UserAction::Add {
            username,
            email,
            password,
            role,
        } => {
            add_user_impl(conn, &username, &email, password, role)?;
        }
        UserAction::ChangePassword { email, password } => {
            change_password_impl(conn, &email, password)?;
        }
        UserAction::Ls { search_term, fixed_string } => {
            list_users_impl(conn, search_term, fixed_string)?;
        }
        UserAction::Rm { search_term, fixed_string, yes } => {
            remove_users_impl(conn, &search_term, fixed_string, yes)?;
        }
        UserAction::SetRole { email, role } => {
            set_role_impl(conn, &email, role)?;
        }
        UserAction::Activate { email } => {
            set_active_impl(conn, &email, true)?;
        }
        UserAction::Deactivate { email } => {
            set_active_impl(conn, &email, false)?;
        }
    }
    Ok(())
}

fn require_user(conn: &mut SqliteConnection, email: &str) -> Result<User, Box<dyn std::error::Error>> {
    get_user_by_email(conn, &normalize_email(email))?
        .ok_or_else(|| format!("User with email '{}' not found", email).into())
}

/// Hashes `password` after checking it against the same policy the API
/// enforces on registration.
fn checked_password_hash(password: &str) -> Result<String, Box<dyn std::error::Error>> {
    let violations = password_violations(password);
    if !violations.is_empty() {
        return Err(format!("Password rejected: {}", violations.join("; ")).into());
    }
    hash_password(password).map_err(|e| format!("Failed to hash password: {}", e).into())
}

pub fn add_user_impl(
    conn: &mut SqliteConnection,
    username: &str,
    email: &str,
    password: Option<String>,
    role: Role,
) -> Result<User, Box<dyn std::error::Error>> {
    let username = username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(format!("Username must be at least {} characters", MIN_USERNAME_LEN).into());
    }
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(format!("Invalid email address: {}", email).into());
    }
    if find_conflicting_user(conn, Some(username), Some(&email), None)?.is_some() {
        return Err(format!("A user named '{}' or with email '{}' already exists", username, email).into());
    }

    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };
    let password_hash = checked_password_hash(&password)?;

    let created_user = insert_user(
        conn,
        UserInput {
            username: username.to_string(),
            email,
            password_hash,
            role,
            avatar: None,
        },
    )?;

    println!("User created successfully!");
    println!("ID: {}", created_user.id);
    println!("Username: {}", created_user.username);
    println!("Email: {}", created_user.email);
    println!("Role: {}", created_user.role);

    Ok(created_user)
}

pub fn change_password_impl(
    conn: &mut SqliteConnection,
    email: &str,
    password: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = require_user(conn, email)?;
    let password = match password {
        Some(p) => p,
        None => prompt_for_password()?,
    };
    let password_hash = checked_password_hash(&password)?;

    update_user(
        conn,
        user.id,
        UserChangeset {
            password_hash: Some(password_hash),
            ..Default::default()
        },
    )?;

    println!("Password changed successfully for user: {}", user.email);
    Ok(())
}

/// Users whose username or email matches the search term, or every user
/// when there is none.
pub fn matching_users(
    conn: &mut SqliteConnection,
    search_term: Option<&str>,
    fixed_string: bool,
) -> Result<Vec<User>, Box<dyn std::error::Error>> {
    let users = list_all_users(conn)?;
    let Some(term) = search_term else {
        return Ok(users);
    };
    let matches = search_matcher(term, fixed_string)?;
    Ok(users
        .into_iter()
        .filter(|user| matches(&user.username) || matches(&user.email))
        .collect())
}

pub fn list_users_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let users = matching_users(conn, search_term.as_deref(), fixed_string)?;

    if users.is_empty() {
        println!("No users found.");
    } else {
        println!("Users:");
        for user in users {
            println!(
                "  ID: {}, Username: {}, Email: {}, Role: {}, Active: {}, Created: {}",
                user.id,
                user.username,
                user.email,
                user.role,
                user.is_active,
                user.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }
    }
    Ok(())
}

pub fn remove_users_impl(
    conn: &mut SqliteConnection,
    search_term: &str,
    fixed_string: bool,
    yes: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let users = matching_users(conn, Some(search_term), fixed_string)?;

    if users.is_empty() {
        println!("No users found matching the search term.");
        return Ok(0);
    }

    let super_admins = count_users_with_role(conn, Role::SuperAdmin)?;
    let doomed_super_admins = users.iter().filter(|u| u.role == Role::SuperAdmin).count() as i64;
    if doomed_super_admins > 0 && doomed_super_admins >= super_admins {
        return Err("Refusing to remove every superAdmin account".into());
    }

    println!("Found {} user(s) matching the search term:", users.len());
    for user in &users {
        println!("  ID: {}, Username: {}, Email: {}", user.id, user.username, user.email);
    }

    if !yes && !confirm("Are you sure you want to delete these users and their employee records?")? {
        println!("Operation cancelled.");
        return Ok(0);
    }

    let mut removed = 0;
    for user in users {
        match delete_user_with_cleanup(conn, user.id) {
            Ok(count) if count > 0 => {
                println!("Deleted user: {} (ID: {})", user.email, user.id);
                removed += count;
            }
            Ok(_) => println!("User {} was already gone", user.email),
            Err(e) => eprintln!("Failed to delete user {}: {}", user.email, e),
        }
    }

    println!("Successfully deleted {} user(s).", removed);
    Ok(removed)
}

pub fn set_role_impl(
    conn: &mut SqliteConnection,
    email: &str,
    role: Role,
) -> Result<User, Box<dyn std::error::Error>> {
    let user = require_user(conn, email)?;
    if user.role == Role::SuperAdmin
        && role != Role::SuperAdmin
        && count_users_with_role(conn, Role::SuperAdmin)? <= 1
    {
        return Err("Cannot demote the last superAdmin account".into());
    }

    let updated = update_user(
        conn,
        user.id,
        UserChangeset {
            role: Some(role),
            ..Default::default()
        },
    )?;
    println!("Role of {} is now {}", updated.email, updated.role);
    Ok(updated)
}

pub fn set_active_impl(
    conn: &mut SqliteConnection,
    email: &str,
    active: bool,
) -> Result<User, Box<dyn std::error::Error>> {
    let user = require_user(conn, email)?;
    let updated = update_user(
        conn,
        user.id,
        UserChangeset {
            is_active: Some(active),
            ..Default::default()
        },
    )?;
    println!(
        "User {} {}",
        updated.email,
        if active { "activated" } else { "deactivated" }
    );
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easygestion_api::orm::login::verify_password;
    use easygestion_api::orm::testing::{
        SUPERADMIN_EMAIL, TEST_PASSWORD, insert_test_staff, setup_test_db,
    };

    fn add_super_admin(conn: &mut SqliteConnection) -> User {
        add_user_impl(
            conn,
            "root",
            SUPERADMIN_EMAIL,
            Some(TEST_PASSWORD.to_string()),
            Role::SuperAdmin,
        )
        .unwrap()
    }

    #[test]
    fn test_add_user_normalizes_email_and_hashes_password() {
        let mut conn = setup_test_db();
        let user = add_user_impl(
            &mut conn,
            "  manager ",
            "Manager@Salon.TEST",
            Some(TEST_PASSWORD.to_string()),
            Role::Admin,
        )
        .unwrap();

        assert_eq!(user.username, "manager");
        assert_eq!(user.email, "manager@salon.test");
        assert_eq!(user.role, Role::Admin);
        assert!(verify_password(TEST_PASSWORD, &user.password_hash));
    }

    #[test]
    fn test_add_user_rejects_weak_password_and_duplicates() {
        let mut conn = setup_test_db();
        let weak = add_user_impl(&mut conn, "weak", "weak@salon.test", Some("short".into()), Role::User);
        assert!(weak.is_err());
        assert!(get_user_by_email(&mut conn, "weak@salon.test").unwrap().is_none());

        add_user_impl(&mut conn, "dup", "dup@salon.test", Some(TEST_PASSWORD.into()), Role::User).unwrap();
        let again = add_user_impl(&mut conn, "dup", "other@salon.test", Some(TEST_PASSWORD.into()), Role::User);
        assert!(again.is_err());
    }

    #[test]
    fn test_change_password() {
        let mut conn = setup_test_db();
        insert_test_staff(&mut conn, "carla", "Carla Dupont", 10.0);

        change_password_impl(&mut conn, "carla@salon.test", Some("An0ther-Str0ng!pass".into())).unwrap();

        let user = get_user_by_email(&mut conn, "carla@salon.test").unwrap().unwrap();
        assert!(verify_password("An0ther-Str0ng!pass", &user.password_hash));
        assert!(!verify_password(TEST_PASSWORD, &user.password_hash));

        assert!(change_password_impl(&mut conn, "nobody@salon.test", Some(TEST_PASSWORD.into())).is_err());
    }

    #[test]
    fn test_matching_users_regex_and_fixed() {
        let mut conn = setup_test_db();
        insert_test_staff(&mut conn, "alice", "Alice Martin", 40.0);
        insert_test_staff(&mut conn, "bob", "Bob Durand", 0.0);

        let all = matching_users(&mut conn, None, false).unwrap();
        assert_eq!(all.len(), 2);

        let regex = matching_users(&mut conn, Some("^b"), false).unwrap();
        assert_eq!(regex.len(), 1);
        assert_eq!(regex[0].username, "bob");

        let fixed = matching_users(&mut conn, Some("e@salon"), true).unwrap();
        assert_eq!(fixed.len(), 1);
        assert_eq!(fixed[0].username, "alice");
    }

    #[test]
    fn test_remove_users_cascades() {
        let mut conn = setup_test_db();
        add_super_admin(&mut conn);
        insert_test_staff(&mut conn, "alice", "Alice Martin", 40.0);

        let removed = remove_users_impl(&mut conn, "alice", true, true).unwrap();
        assert_eq!(removed, 1);
        assert!(get_user_by_email(&mut conn, "alice@salon.test").unwrap().is_none());
    }

    #[test]
    fn test_last_super_admin_is_protected() {
        let mut conn = setup_test_db();
        add_super_admin(&mut conn);

        assert!(remove_users_impl(&mut conn, "root", true, true).is_err());
        assert!(set_role_impl(&mut conn, SUPERADMIN_EMAIL, Role::Admin).is_err());

        add_user_impl(&mut conn, "root2", "root2@salon.test", Some(TEST_PASSWORD.into()), Role::SuperAdmin)
            .unwrap();
        let demoted = set_role_impl(&mut conn, SUPERADMIN_EMAIL, Role::Admin).unwrap();
        assert_eq!(demoted.role, Role::Admin);
    }

    #[test]
    fn test_activate_and_deactivate() {
        let mut conn = setup_test_db();
        insert_test_staff(&mut conn, "bob", "Bob Durand", 0.0);

        let user = set_active_impl(&mut conn, "bob@salon.test", false).unwrap();
        assert!(!user.is_active);
        let user = set_active_impl(&mut conn, "BOB@salon.test", true).unwrap();
        assert!(user.is_active);
    }
}

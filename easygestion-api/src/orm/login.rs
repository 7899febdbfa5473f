//! Credential checks for login.
//!
//! The lookup functions are generic over [`DbRunner`] so the same code runs
//! against the pooled `DbConn` in production and a `FakeDbConn` in unit
//! tests.

use argon2::{
    Argon2, PasswordHasher,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};
use diesel::prelude::*;
use rocket::http::Status;

use crate::DbConn;
use crate::models::User;
use crate::orm::testing::FakeDbConn;
use crate::schema::users;

/// Trait for abstracting database operations to support both production and testing.
pub trait DbRunner {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static;
}

impl DbRunner for DbConn {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        DbConn::run(self, f)
    }
}

impl DbRunner for FakeDbConn<'_> {
    fn run<F, R>(&self, f: F) -> impl std::future::Future<Output = R>
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        FakeDbConn::run(self, f)
    }
}

pub async fn find_user_by_email<D: DbRunner>(db: &D, email: &str) -> Result<Option<User>, Status> {
    let email = email.trim().to_lowercase();
    db.run(move |conn| {
        users::table
            .filter(users::email.eq(email))
            .first::<User>(conn)
            .optional()
    })
    .await
    .map_err(|e| {
        error!("Failed to look up user by email: {}", e);
        Status::InternalServerError
    })
}

/// Checks `password` against an Argon2 PHC string. A stored hash that does
/// not parse never verifies.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn hash_password(password: &str) -> Result<String, password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Resolves an email/password pair to an active user.
///
/// Unknown email, wrong password and deactivated accounts are all reported
/// as `Unauthorized` so callers cannot tell them apart.
pub async fn authenticate<D: DbRunner>(db: &D, email: &str, password: &str) -> Result<User, Status> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(Status::BadRequest);
    }

    let Some(user) = find_user_by_email(db, email).await? else {
        return Err(Status::Unauthorized);
    };

    if !verify_password(password, &user.password_hash) || !user.is_active {
        return Err(Status::Unauthorized);
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserChangeset, UserInput};
    use crate::orm::testing::{setup_test_db, setup_test_dbconn};
    use crate::orm::user::{insert_user, update_user};

    const PASSWORD: &str = "Coupe-Barbe-2025!";

    fn insert_dummy_user(conn: &mut diesel::SqliteConnection) -> User {
        insert_user(
            conn,
            UserInput {
                username: "karim".to_string(),
                email: "karim@salon.test".to_string(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role: Role::User,
                avatar: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password(PASSWORD).unwrap();
        assert!(verify_password(PASSWORD, &hash));
        assert!(!verify_password("wrong password", &hash));
        assert!(!verify_password(PASSWORD, "not-a-phc-string"));
    }

    #[tokio::test]
    async fn test_find_user_by_email_is_case_insensitive() {
        let mut conn = setup_test_db();
        let inserted = insert_dummy_user(&mut conn);
        let fake_db = setup_test_dbconn(&mut conn);

        let found = find_user_by_email(&fake_db, " Karim@Salon.test ")
            .await
            .expect("db query should succeed");
        assert_eq!(found.map(|u| u.id), Some(inserted.id));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let mut conn = setup_test_db();
        let inserted = insert_dummy_user(&mut conn);

        {
            let fake_db = setup_test_dbconn(&mut conn);
            let user = authenticate(&fake_db, "karim@salon.test", PASSWORD)
                .await
                .unwrap();
            assert_eq!(user.id, inserted.id);

            assert_eq!(
                authenticate(&fake_db, "karim@salon.test", "nope").await,
                Err(Status::Unauthorized)
            );
            assert_eq!(
                authenticate(&fake_db, "ghost@salon.test", PASSWORD).await,
                Err(Status::Unauthorized)
            );
            assert_eq!(
                authenticate(&fake_db, "", PASSWORD).await,
                Err(Status::BadRequest)
            );
        }

        update_user(
            &mut conn,
            inserted.id,
            UserChangeset {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();
        let fake_db = setup_test_dbconn(&mut conn);
        assert_eq!(
            authenticate(&fake_db, "karim@salon.test", PASSWORD).await,
            Err(Status::Unauthorized)
        );
    }
}

use diesel::prelude::*;
use rocket::Rocket;
use rocket::fairing::AdHoc;

use crate::config::AppConfig;
use crate::models::{Role, UserInput};
use crate::orm::DbConn;
use crate::orm::login::hash_password;
use crate::orm::package::seed_default_packages;
use crate::orm::user::{get_user_by_email, get_user_by_username, insert_user};

/// Installs the default super admin and the default package catalogue.
///
/// The account comes from `default_admin_email`, `default_admin_username`
/// and `default_admin_password` (env `EASYGESTION_DEFAULT_ADMIN_*`). It is
/// only created when no user holds that email.
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin User Initialization", |rocket| async {
        let config = match rocket.state::<AppConfig>() {
            Some(config) => config.clone(),
            None => {
                error!("[admin-init] ERROR: AppConfig is not managed.");
                return Err(rocket);
            }
        };

        let Some(conn) = get_db_connection(&rocket).await else {
            return Err(rocket);
        };

        let result = conn
            .run(move |c| {
                create_admin_user_if_needed(c, &config)?;
                let seeded = seed_default_packages(c)?;
                if seeded > 0 {
                    info!("[admin-init] Installed {} default packages", seeded);
                }
                Ok::<(), diesel::result::Error>(())
            })
            .await;

        match result {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: initialization failed: {:?}", e);
                Err(rocket)
            }
        }
    })
}

async fn get_db_connection(rocket: &Rocket<rocket::Build>) -> Option<DbConn> {
    match DbConn::get_one(rocket).await {
        Some(conn) => Some(conn),
        None => {
            error!("[admin-init] ERROR: Could not get DB connection.");
            None
        }
    }
}

fn create_admin_user_if_needed(
    c: &mut SqliteConnection,
    config: &AppConfig,
) -> Result<(), diesel::result::Error> {
    let admin_email = config.default_admin_email.trim().to_lowercase();
    if get_user_by_email(c, &admin_email)?.is_some() {
        info!("[admin-init] Admin user '{}' already exists", admin_email);
        return Ok(());
    }

    let mut username = config.default_admin_username.trim().to_string();
    if get_user_by_username(c, &username)?.is_some() {
        username = format!("{}-{}", username, chrono::Utc::now().timestamp());
    }

    let password_hash = hash_password(&config.default_admin_password)
        .map_err(|e| diesel::result::Error::QueryBuilderError(e.to_string().into()))?;

    let user = insert_user(
        c,
        UserInput {
            username,
            email: admin_email,
            password_hash,
            role: Role::SuperAdmin,
            avatar: None,
        },
    )?;
    info!("[admin-init] Created super admin '{}'", user.email);

    if config.default_admin_password == AppConfig::default().default_admin_password {
        warn!(
            "[admin-init] Super admin '{}' uses the built-in default password; change it with easygestion-admin",
            user.email
        );
    }
    Ok(())
}

//! Test support: an in-memory Rocket instance with deterministic accounts,
//! plus small helpers for ORM unit tests.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rocket::figment::{
    util::map,
    value::{Map, Value},
};
use rocket::{Build, Rocket, fairing::AdHoc};
use uuid::Uuid;

use super::db::{DbConn, run_pending_migrations, set_foreign_keys};
use crate::models::{
    Employee, EmployeeInput, NewReceipt, NewSale, Package, PackageInput, Receipt, Role, Sale,
    UserInput,
};
use crate::orm::employee::{create_user_with_employee, insert_employee};
use crate::orm::login::hash_password;
use crate::orm::package::insert_package;
use crate::orm::receipt::insert_receipt;
use crate::orm::sale::insert_sale;
use crate::orm::user::{get_user_by_email, insert_user};

/// Password shared by every account created by [`test_rocket`], except the
/// default super admin.
pub const TEST_PASSWORD: &str = "Str0ngPassw0rd!!";
pub const ADMIN_EMAIL: &str = "admin@salon.test";
/// Employee with a 40% deduction.
pub const ALICE_EMAIL: &str = "alice@salon.test";
/// Employee with no deduction.
pub const BOB_EMAIL: &str = "bob@salon.test";
pub const SUPERADMIN_EMAIL: &str = "superadmin@example.com";
pub const SUPERADMIN_PASSWORD: &str = "admin";

/// Trades durability for speed. Only for tests.
fn set_sqlite_test_pragmas(conn: &mut diesel::SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(
        r#"
        PRAGMA synchronous = OFF;
        PRAGMA journal_mode = OFF;
        "#,
    )
}

fn set_sqlite_test_pragmas_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Set SQLite Test Pragmas", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            return Err(rocket);
        };
        match conn.run(set_sqlite_test_pragmas).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("Failed to set SQLite test pragmas: {}", e);
                Err(rocket)
            }
        }
    })
}

fn test_data_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Test Data Initialization", |rocket| async {
        let Some(conn) = DbConn::get_one(&rocket).await else {
            return Err(rocket);
        };
        match conn.run(create_test_data).await {
            Ok(()) => {
                info!("Test data initialization completed");
                Ok(rocket)
            }
            Err(e) => {
                error!("Failed to create test data: {}", e);
                Err(rocket)
            }
        }
    })
}

/// Accounts every integration test can rely on. The default super admin
/// comes from the admin init fairing.
fn create_test_data(conn: &mut SqliteConnection) -> QueryResult<()> {
    let hash = hash_password(TEST_PASSWORD)
        .map_err(|e| diesel::result::Error::QueryBuilderError(e.to_string().into()))?;

    if get_user_by_email(conn, ADMIN_EMAIL)?.is_none() {
        insert_user(
            conn,
            UserInput {
                username: "manager".to_string(),
                email: ADMIN_EMAIL.to_string(),
                password_hash: hash.clone(),
                role: Role::Admin,
                avatar: None,
            },
        )?;
    }

    for (username, email, name, pct) in [
        ("alice", ALICE_EMAIL, "Alice Martin", 40.0),
        ("bob", BOB_EMAIL, "Bob Durand", 0.0),
    ] {
        if get_user_by_email(conn, email)?.is_some() {
            continue;
        }
        create_user_with_employee(
            conn,
            UserInput {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash.clone(),
                role: Role::User,
                avatar: None,
            },
            EmployeeInput {
                name: name.to_string(),
                position: "Coiffeur".to_string(),
                hire_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap_or_default(),
                deduction_percentage: pct,
                contract: None,
                employment_declaration: None,
                certification: None,
            },
        )?;
    }
    Ok(())
}

/// A scratch directory for one test instance, containing `index.html` when
/// `with_index` is set.
fn scratch_dir(label: &str, with_index: bool) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("easygestion-{}-{}", label, Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch directory");
    if with_index {
        std::fs::write(
            dir.join("index.html"),
            "<!doctype html><html><body><div id=\"root\">EasyGestion</div></body></html>",
        )
        .expect("write index.html");
    }
    dir
}

/// Creates a Rocket instance for integration tests.
///
/// Each call gets its own shared in-memory database with migrations run,
/// the default super admin and package catalogue installed, and the
/// accounts described by the `*_EMAIL` constants. Uploads and static
/// assets live in fresh temporary directories.
pub fn test_rocket() -> Rocket<Build> {
    let unique_db_name = format!("file:test_db_{}?mode=memory&cache=shared", Uuid::new_v4());

    let db_config: Map<_, Value> = map! {
        "url" => unique_db_name.into(),
        "pool_size" => 5.into(),
        "timeout" => 5.into(),
    };

    let figment = rocket::Config::figment()
        .merge(("limits", crate::config::default_limits()))
        .merge(("databases", map!["sqlite_db" => db_config]))
        .merge((
            "upload_dir",
            scratch_dir("uploads", false).to_string_lossy().to_string(),
        ))
        .merge((
            "static_dir",
            scratch_dir("static", true).to_string_lossy().to_string(),
        ));

    crate::build_rocket(figment)
        .expect("valid test configuration")
        .attach(set_sqlite_test_pragmas_fairing())
        .attach(test_data_init_fairing())
}

/// Fresh in-memory database with foreign keys on and all migrations run.
pub fn setup_test_db() -> SqliteConnection {
    let mut conn = SqliteConnection::establish(":memory:")
        .expect("Failed to create in-memory SQLite database");
    set_foreign_keys(&mut conn).expect("enable foreign keys");
    run_pending_migrations(&mut conn).expect("run migrations");
    conn
}

/// Gives a borrowed connection the async `.run()` interface of `DbConn`.
pub struct FakeDbConn<'a>(Mutex<&'a mut diesel::SqliteConnection>);

impl FakeDbConn<'_> {
    pub async fn run<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut diesel::SqliteConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut conn = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut **conn)
    }
}

pub fn setup_test_dbconn<'a>(conn: &'a mut diesel::SqliteConnection) -> FakeDbConn<'a> {
    FakeDbConn(Mutex::new(conn))
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid test timestamp")
}

pub fn insert_test_employee(
    conn: &mut SqliteConnection,
    user_id: i32,
    name: &str,
    deduction_percentage: f64,
) -> Employee {
    insert_employee(
        conn,
        user_id,
        EmployeeInput {
            name: name.to_string(),
            position: "Coiffeur".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 9, 1).expect("valid date"),
            deduction_percentage,
            contract: None,
            employment_declaration: None,
            certification: None,
        },
    )
    .expect("insert test employee")
}

/// Creates a `user` account named `username` together with its employee.
pub fn insert_test_staff(
    conn: &mut SqliteConnection,
    username: &str,
    name: &str,
    deduction_percentage: f64,
) -> Employee {
    let user = insert_user(
        conn,
        UserInput {
            username: username.to_string(),
            email: format!("{}@salon.test", username),
            password_hash: hash_password(TEST_PASSWORD).expect("hash password"),
            role: Role::User,
            avatar: None,
        },
    )
    .expect("insert test user");
    insert_test_employee(conn, user.id, name, deduction_percentage)
}

/// An employee with a 40% deduction and a 12.00 package to sell.
pub fn seeded_employee(conn: &mut SqliteConnection) -> (Employee, Package) {
    let employee = insert_test_staff(conn, "alice", "Alice Martin", 40.0);
    let package = insert_package(
        conn,
        PackageInput {
            name: "Coupe de cheveux".to_string(),
            price: 12.0,
        },
    )
    .expect("insert test package");
    (employee, package)
}

pub fn insert_test_sale(
    conn: &mut SqliteConnection,
    employee_id: i32,
    package: &Package,
    date: NaiveDateTime,
) -> Sale {
    insert_sale(
        conn,
        NewSale {
            employee_id,
            package_id: package.id,
            client_name: "Client".to_string(),
            amount: package.price,
            date,
            description: None,
            created_at: date,
            updated_at: date,
        },
    )
    .expect("insert test sale")
}

pub fn insert_test_receipt(
    conn: &mut SqliteConnection,
    employee_id: i32,
    amount: f64,
    date: NaiveDateTime,
) -> Receipt {
    insert_receipt(
        conn,
        NewReceipt {
            employee_id,
            client_name: "Client".to_string(),
            amount,
            date,
            description: None,
            created_at: date,
            updated_at: date,
        },
    )
    .expect("insert test receipt")
}

use clap::Subcommand;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use easygestion_api::models::Role;
use easygestion_api::orm::run_pending_migrations;
use easygestion_api::orm::user::count_users_with_role;
use easygestion_api::schema::{employees, packages, sales, users};

#[derive(Subcommand)]
pub enum DbAction {
    #[command(about = "Apply pending schema migrations")]
    Migrate,
    #[command(about = "Show row counts for the main tables")]
    Status,
}

pub fn handle_db_command_with_conn(
    conn: &mut SqliteConnection,
    action: DbAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DbAction::Migrate => migrate_impl(conn)?,
        DbAction::Status => {
            let status = status_impl(conn)?;
            println!("Users: {} ({} superAdmin)", status.users, status.super_admins);
            println!("Employees: {}", status.employees);
            println!("Packages: {}", status.packages);
            println!("Sales: {}", status.sales);
        }
    }
    Ok(())
}

pub fn migrate_impl(conn: &mut SqliteConnection) -> Result<(), Box<dyn std::error::Error>> {
    run_pending_migrations(conn).map_err(|e| format!("Migration failed: {}", e))?;
    println!("Database schema is up to date.");
    Ok(())
}

#[derive(Debug, PartialEq)]
pub struct DbStatus {
    pub users: i64,
    pub super_admins: i64,
    pub employees: i64,
    pub packages: i64,
    pub sales: i64,
}

pub fn status_impl(conn: &mut SqliteConnection) -> Result<DbStatus, Box<dyn std::error::Error>> {
    Ok(DbStatus {
        users: users::table.count().get_result(conn)?,
        super_admins: count_users_with_role(conn, Role::SuperAdmin)?,
        employees: employees::table.count().get_result(conn)?,
        packages: packages::table.count().get_result(conn)?,
        sales: sales::table.count().get_result(conn)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use easygestion_api::orm::testing::{seeded_employee, setup_test_db};

    #[test]
    fn test_migrate_is_idempotent() {
        let mut conn = setup_test_db();
        migrate_impl(&mut conn).unwrap();
        assert_eq!(status_impl(&mut conn).unwrap().users, 0);
    }

    #[test]
    fn test_status_counts_rows() {
        let mut conn = setup_test_db();
        seeded_employee(&mut conn);

        let status = status_impl(&mut conn).unwrap();
        assert_eq!(
            status,
            DbStatus {
                users: 1,
                super_admins: 0,
                employees: 1,
                packages: 1,
                sales: 0,
            }
        );
    }
}

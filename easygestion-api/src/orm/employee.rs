use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{
    Employee, EmployeeChangeset, EmployeeInput, NewEmployee, User, UserInput,
};
use crate::orm::user::insert_user;
use crate::schema::{employees, users};

pub fn insert_employee(
    conn: &mut SqliteConnection,
    user_id: i32,
    input: EmployeeInput,
) -> QueryResult<Employee> {
    let timestamp = now();
    let new_employee = NewEmployee {
        user_id,
        name: input.name.trim().to_string(),
        position: input.position.trim().to_string(),
        hire_date: input.hire_date,
        deduction_percentage: input.deduction_percentage,
        contract: input.contract,
        employment_declaration: input.employment_declaration,
        certification: input.certification,
        created_at: timestamp,
        updated_at: timestamp,
    };

    diesel::insert_into(employees::table)
        .values(&new_employee)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    employees::table.find(last_id).first::<Employee>(conn)
}

/// Creates a user account and its employee record atomically.
pub fn create_user_with_employee(
    conn: &mut SqliteConnection,
    user: UserInput,
    employee: EmployeeInput,
) -> QueryResult<(User, Employee)> {
    conn.transaction(|conn| {
        let user = insert_user(conn, user)?;
        let employee = insert_employee(conn, user.id, employee)?;
        Ok((user, employee))
    })
}

pub fn get_employee(conn: &mut SqliteConnection, employee_id: i32) -> QueryResult<Option<Employee>> {
    employees::table
        .find(employee_id)
        .first::<Employee>(conn)
        .optional()
}

pub fn get_employee_by_user(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> QueryResult<Option<Employee>> {
    employees::table
        .filter(employees::user_id.eq(user_id))
        .first::<Employee>(conn)
        .optional()
}

pub fn list_employees(conn: &mut SqliteConnection) -> QueryResult<Vec<Employee>> {
    employees::table
        .order((employees::name.asc(), employees::id.asc()))
        .load::<Employee>(conn)
}

/// Employees with their accounts, ordered by name.
pub fn list_employees_with_users(
    conn: &mut SqliteConnection,
) -> QueryResult<Vec<(Employee, User)>> {
    employees::table
        .inner_join(users::table)
        .select((employees::all_columns, users::all_columns))
        .order((employees::name.asc(), employees::id.asc()))
        .load::<(Employee, User)>(conn)
}

pub fn get_employee_with_user(
    conn: &mut SqliteConnection,
    employee_id: i32,
) -> QueryResult<Option<(Employee, User)>> {
    employees::table
        .inner_join(users::table)
        .filter(employees::id.eq(employee_id))
        .select((employees::all_columns, users::all_columns))
        .first::<(Employee, User)>(conn)
        .optional()
}

pub fn update_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
    mut changes: EmployeeChangeset,
) -> QueryResult<Employee> {
    changes.name = changes.name.map(|n| n.trim().to_string());
    changes.position = changes.position.map(|p| p.trim().to_string());
    changes.updated_at = Some(now());
    diesel::update(employees::table.find(employee_id))
        .set(&changes)
        .execute(conn)?;
    employees::table.find(employee_id).first::<Employee>(conn)
}

/// Sets the deduction percentage of the employee linked to `user_id`.
/// Returns `None` when that user has no employee record.
pub fn set_deduction_percentage(
    conn: &mut SqliteConnection,
    user_id: i32,
    percentage: f64,
) -> QueryResult<Option<Employee>> {
    let Some(employee) = get_employee_by_user(conn, user_id)? else {
        return Ok(None);
    };
    update_employee(
        conn,
        employee.id,
        EmployeeChangeset {
            deduction_percentage: Some(percentage),
            ..Default::default()
        },
    )
    .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::orm::login::hash_password;
    use crate::orm::testing::setup_test_db;
    use chrono::NaiveDate;

    fn user_input(username: &str) -> UserInput {
        UserInput {
            username: username.to_string(),
            email: format!("{}@salon.test", username),
            password_hash: hash_password("Salon-Passw0rd!!").unwrap(),
            role: Role::User,
            avatar: None,
        }
    }

    fn employee_input(name: &str) -> EmployeeInput {
        EmployeeInput {
            name: name.to_string(),
            position: "Coiffeur".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            deduction_percentage: 35.0,
            contract: Some("contract_1_x.pdf".to_string()),
            employment_declaration: None,
            certification: None,
        }
    }

    #[test]
    fn test_create_user_with_employee() {
        let mut conn = setup_test_db();
        let (user, employee) =
            create_user_with_employee(&mut conn, user_input("hugo"), employee_input("Hugo"))
                .unwrap();

        assert_eq!(employee.user_id, user.id);
        assert_eq!(employee.deduction_percentage, 35.0);
        assert_eq!(employee.contract.as_deref(), Some("contract_1_x.pdf"));
        assert_eq!(
            get_employee_by_user(&mut conn, user.id).unwrap().map(|e| e.id),
            Some(employee.id)
        );
    }

    #[test]
    fn test_create_user_with_employee_rolls_back() {
        let mut conn = setup_test_db();
        create_user_with_employee(&mut conn, user_input("hugo"), employee_input("Hugo")).unwrap();

        // Same username: the user insert fails, nothing is left behind.
        let mut clash = user_input("hugo");
        clash.email = "other@salon.test".to_string();
        assert!(create_user_with_employee(&mut conn, clash, employee_input("Hugo 2")).is_err());

        // Invalid percentage: the employee insert fails after the user insert.
        let mut bad = employee_input("Nina");
        bad.deduction_percentage = 150.0;
        assert!(create_user_with_employee(&mut conn, user_input("nina"), bad).is_err());

        let users: i64 = users::table.count().get_result(&mut conn).unwrap();
        let employees: i64 = employees::table.count().get_result(&mut conn).unwrap();
        assert_eq!(users, 1);
        assert_eq!(employees, 1);
    }

    #[test]
    fn test_set_deduction_percentage() {
        let mut conn = setup_test_db();
        let (user, _) =
            create_user_with_employee(&mut conn, user_input("hugo"), employee_input("Hugo"))
                .unwrap();

        let updated = set_deduction_percentage(&mut conn, user.id, 42.5).unwrap().unwrap();
        assert_eq!(updated.deduction_percentage, 42.5);
        assert_eq!(updated.name, "Hugo");

        assert!(set_deduction_percentage(&mut conn, 9999, 10.0).unwrap().is_none());
    }

    #[test]
    fn test_list_employees_with_users_sorted_by_name() {
        let mut conn = setup_test_db();
        create_user_with_employee(&mut conn, user_input("zoe"), employee_input("Zoé")).unwrap();
        create_user_with_employee(&mut conn, user_input("ali"), employee_input("Ali")).unwrap();

        let rows = list_employees_with_users(&mut conn).unwrap();
        let names: Vec<&str> = rows.iter().map(|(e, _)| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ali", "Zoé"]);
        assert_eq!(rows[0].1.username, "ali");
    }
}

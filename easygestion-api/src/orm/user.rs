use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{Employee, NewUser, Role, User, UserChangeset, UserInput};
use crate::schema::{alerts, employees, expenses, goals, receipts, salaries, sales, users};

/// Inserts a new user. The email is stored lowercased.
pub fn insert_user(conn: &mut SqliteConnection, input: UserInput) -> QueryResult<User> {
    let timestamp = now();
    let new_user = NewUser {
        username: input.username.trim().to_string(),
        email: input.email.trim().to_lowercase(),
        password_hash: input.password_hash,
        role: input.role,
        avatar: input.avatar,
        is_active: true,
        created_at: timestamp,
        updated_at: timestamp,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    users::table.find(last_id).first::<User>(conn)
}

/// Gets a single user by ID.
pub fn get_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<User>> {
    users::table.find(user_id).first::<User>(conn).optional()
}

/// Gets a single user by email (case-insensitive).
pub fn get_user_by_email(conn: &mut SqliteConnection, email: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::email.eq(email.trim().to_lowercase()))
        .first::<User>(conn)
        .optional()
}

pub fn get_user_by_username(
    conn: &mut SqliteConnection,
    username: &str,
) -> QueryResult<Option<User>> {
    users::table
        .filter(users::username.eq(username.trim()))
        .first::<User>(conn)
        .optional()
}

/// Finds any user already holding `username` or `email`, optionally
/// ignoring one user id (for updates).
pub fn find_conflicting_user(
    conn: &mut SqliteConnection,
    username: Option<&str>,
    email: Option<&str>,
    exclude_id: Option<i32>,
) -> QueryResult<Option<User>> {
    let mut query = users::table.into_boxed();
    match (username, email) {
        (Some(u), Some(e)) => {
            query = query.filter(
                users::username
                    .eq(u.trim().to_string())
                    .or(users::email.eq(e.trim().to_lowercase())),
            )
        }
        (Some(u), None) => query = query.filter(users::username.eq(u.trim().to_string())),
        (None, Some(e)) => query = query.filter(users::email.eq(e.trim().to_lowercase())),
        (None, None) => return Ok(None),
    }
    if let Some(id) = exclude_id {
        query = query.filter(users::id.ne(id));
    }
    query.first::<User>(conn).optional()
}

/// Returns all users in ascending order by id.
pub fn list_all_users(conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
    users::table.order(users::id.asc()).load::<User>(conn)
}

/// Returns every user together with their employee record, if any.
pub fn list_users_with_employees(
    conn: &mut SqliteConnection,
) -> QueryResult<Vec<(User, Option<Employee>)>> {
    users::table
        .left_join(employees::table)
        .select((users::all_columns, employees::all_columns.nullable()))
        .order(users::id.asc())
        .load::<(User, Option<Employee>)>(conn)
}

pub fn get_user_with_employee(
    conn: &mut SqliteConnection,
    user_id: i32,
) -> QueryResult<Option<(User, Option<Employee>)>> {
    users::table
        .left_join(employees::table)
        .filter(users::id.eq(user_id))
        .select((users::all_columns, employees::all_columns.nullable()))
        .first::<(User, Option<Employee>)>(conn)
        .optional()
}

/// Applies `changes` to a user, stamping `updated_at`.
pub fn update_user(
    conn: &mut SqliteConnection,
    user_id: i32,
    mut changes: UserChangeset,
) -> QueryResult<User> {
    changes.username = changes.username.map(|u| u.trim().to_string());
    changes.email = changes.email.map(|e| e.trim().to_lowercase());
    changes.updated_at = Some(now());
    diesel::update(users::table.find(user_id))
        .set(&changes)
        .execute(conn)?;
    users::table.find(user_id).first::<User>(conn)
}

pub fn count_users_with_role(conn: &mut SqliteConnection, role: Role) -> QueryResult<i64> {
    users::table
        .filter(users::role.eq(role))
        .count()
        .get_result(conn)
}

/// Deletes a user and everything hanging off their employee record.
///
/// Expenses the user recorded are kept with `created_by` cleared. Returns
/// the number of user rows deleted (0 or 1).
pub fn delete_user_with_cleanup(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let employee_ids: Vec<i32> = employees::table
            .filter(employees::user_id.eq(user_id))
            .select(employees::id)
            .load(conn)?;

        if !employee_ids.is_empty() {
            diesel::delete(sales::table.filter(sales::employee_id.eq_any(&employee_ids)))
                .execute(conn)?;
            diesel::delete(receipts::table.filter(receipts::employee_id.eq_any(&employee_ids)))
                .execute(conn)?;
            diesel::delete(salaries::table.filter(salaries::employee_id.eq_any(&employee_ids)))
                .execute(conn)?;
            diesel::delete(goals::table.filter(goals::employee_id.eq_any(&employee_ids)))
                .execute(conn)?;
            diesel::delete(alerts::table.filter(alerts::employee_id.eq_any(&employee_ids)))
                .execute(conn)?;
            diesel::delete(employees::table.filter(employees::id.eq_any(&employee_ids)))
                .execute(conn)?;
        }

        diesel::update(expenses::table.filter(expenses::created_by.eq(user_id)))
            .set(expenses::created_by.eq(None::<i32>))
            .execute(conn)?;

        diesel::delete(users::table.find(user_id)).execute(conn)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::login::hash_password;
    use crate::orm::testing::{insert_test_employee, setup_test_db};

    fn input(username: &str, email: &str, role: Role) -> UserInput {
        UserInput {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password("Salon-Passw0rd!!").unwrap(),
            role,
            avatar: None,
        }
    }

    #[test]
    fn test_insert_user_normalizes_email() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, input(" lea ", "Lea@Salon.TEST", Role::User)).unwrap();

        assert_eq!(user.username, "lea");
        assert_eq!(user.email, "lea@salon.test");
        assert_eq!(user.role, Role::User);
        assert!(user.is_active);

        let found = get_user_by_email(&mut conn, "LEA@salon.test").unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[test]
    fn test_duplicate_email_is_rejected_by_database() {
        let mut conn = setup_test_db();
        insert_user(&mut conn, input("lea", "lea@salon.test", Role::User)).unwrap();
        let result = insert_user(&mut conn, input("lea2", "lea@salon.test", Role::User));
        assert!(result.is_err());
    }

    #[test]
    fn test_find_conflicting_user() {
        let mut conn = setup_test_db();
        let lea = insert_user(&mut conn, input("lea", "lea@salon.test", Role::User)).unwrap();

        let by_name = find_conflicting_user(&mut conn, Some("lea"), Some("x@salon.test"), None)
            .unwrap();
        assert_eq!(by_name.map(|u| u.id), Some(lea.id));

        let by_mail = find_conflicting_user(&mut conn, None, Some("LEA@salon.test"), None).unwrap();
        assert!(by_mail.is_some());

        let excluded =
            find_conflicting_user(&mut conn, Some("lea"), None, Some(lea.id)).unwrap();
        assert!(excluded.is_none());

        assert!(find_conflicting_user(&mut conn, None, None, None).unwrap().is_none());
    }

    #[test]
    fn test_update_user_changes_only_given_fields() {
        let mut conn = setup_test_db();
        let user = insert_user(&mut conn, input("lea", "lea@salon.test", Role::User)).unwrap();

        let updated = update_user(
            &mut conn,
            user.id,
            UserChangeset {
                role: Some(Role::Admin),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(updated.username, "lea");
        assert_eq!(updated.role, Role::Admin);
        assert!(!updated.is_active);
        assert!(updated.updated_at >= user.updated_at);
    }

    #[test]
    fn test_list_users_with_employees() {
        let mut conn = setup_test_db();
        let lea = insert_user(&mut conn, input("lea", "lea@salon.test", Role::User)).unwrap();
        insert_user(&mut conn, input("boss", "boss@salon.test", Role::Admin)).unwrap();
        insert_test_employee(&mut conn, lea.id, "Léa Petit", 30.0);

        let rows = list_users_with_employees(&mut conn).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].1.as_ref().map(|e| e.name.as_str()), Some("Léa Petit"));
        assert!(rows[1].1.is_none());
    }

    #[test]
    fn test_delete_user_with_cleanup() {
        use crate::models::NewExpense;

        let mut conn = setup_test_db();
        let lea = insert_user(&mut conn, input("lea", "lea@salon.test", Role::User)).unwrap();
        insert_test_employee(&mut conn, lea.id, "Léa Petit", 30.0);
        let ts = now();
        diesel::insert_into(expenses::table)
            .values(&NewExpense {
                category: "Supplies".to_string(),
                amount: 12.0,
                date: ts,
                description: None,
                created_by: Some(lea.id),
                created_at: ts,
                updated_at: ts,
            })
            .execute(&mut conn)
            .unwrap();

        assert_eq!(delete_user_with_cleanup(&mut conn, lea.id).unwrap(), 1);
        assert!(get_user(&mut conn, lea.id).unwrap().is_none());

        let remaining_employees: i64 = employees::table.count().get_result(&mut conn).unwrap();
        assert_eq!(remaining_employees, 0);

        let creators: Vec<Option<i32>> = expenses::table
            .select(expenses::created_by)
            .load(&mut conn)
            .unwrap();
        assert_eq!(creators, vec![None]);

        assert_eq!(delete_user_with_cleanup(&mut conn, lea.id).unwrap(), 0);
    }
}

use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{Alert, AlertType, NewAlert};
use crate::schema::alerts;

pub fn insert_alert(
    conn: &mut SqliteConnection,
    employee_id: i32,
    message: &str,
    alert_type: AlertType,
) -> QueryResult<Alert> {
    let timestamp = now();
    diesel::insert_into(alerts::table)
        .values(&NewAlert {
            employee_id,
            message: message.trim().to_string(),
            alert_type,
            is_read: false,
            date: timestamp,
            created_at: timestamp,
            updated_at: timestamp,
        })
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    alerts::table.find(last_id).first::<Alert>(conn)
}

pub fn get_alert(conn: &mut SqliteConnection, alert_id: i32) -> QueryResult<Option<Alert>> {
    alerts::table.find(alert_id).first::<Alert>(conn).optional()
}

/// Newest first. With `unread_only` the alerts already read are skipped.
pub fn list_alerts_for_employee(
    conn: &mut SqliteConnection,
    employee_id: i32,
    unread_only: bool,
) -> QueryResult<Vec<Alert>> {
    let mut query = alerts::table
        .filter(alerts::employee_id.eq(employee_id))
        .into_boxed();
    if unread_only {
        query = query.filter(alerts::is_read.eq(false));
    }
    query
        .order((alerts::date.desc(), alerts::id.desc()))
        .load::<Alert>(conn)
}

pub fn mark_alert_read(conn: &mut SqliteConnection, alert_id: i32) -> QueryResult<Alert> {
    diesel::update(alerts::table.find(alert_id))
        .set((alerts::is_read.eq(true), alerts::updated_at.eq(now())))
        .execute(conn)?;
    alerts::table.find(alert_id).first::<Alert>(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::{seeded_employee, setup_test_db};

    #[test]
    fn test_unread_filter() {
        let mut conn = setup_test_db();
        let (employee, _) = seeded_employee(&mut conn);
        let first = insert_alert(&mut conn, employee.id, "Stock bas", AlertType::Warning).unwrap();
        insert_alert(&mut conn, employee.id, " Objectif du jour ", AlertType::Daily).unwrap();

        let read = mark_alert_read(&mut conn, first.id).unwrap();
        assert!(read.is_read);

        let all = list_alerts_for_employee(&mut conn, employee.id, false).unwrap();
        assert_eq!(all.len(), 2);
        let unread = list_alerts_for_employee(&mut conn, employee.id, true).unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].message, "Objectif du jour");
        assert_eq!(unread[0].alert_type, AlertType::Daily);
    }
}

use diesel::prelude::*;

use super::{last_insert_rowid, now};
use crate::models::{NewPackage, Package, PackageInput, UpdatePackageRequest};
use crate::schema::packages;

/// Catalogue installed on a fresh database.
pub const DEFAULT_PACKAGES: [(&str, f64); 6] = [
    ("Barbe", 7.0),
    ("Coupe de cheveux", 12.0),
    ("Coupe de cheveux sans contour", 16.0),
    ("Coupe de cheveux avec contour", 19.0),
    ("Coupe de cheveux enfant", 10.0),
    ("Service personnalisé", 0.0),
];

pub fn insert_package(conn: &mut SqliteConnection, input: PackageInput) -> QueryResult<Package> {
    let timestamp = now();
    diesel::insert_into(packages::table)
        .values(&NewPackage {
            name: input.name.trim().to_string(),
            price: input.price,
            is_active: true,
            created_at: timestamp,
            updated_at: timestamp,
        })
        .execute(conn)?;

    let last_id = last_insert_rowid(conn)?;
    packages::table.find(last_id).first::<Package>(conn)
}

pub fn get_package(conn: &mut SqliteConnection, package_id: i32) -> QueryResult<Option<Package>> {
    packages::table
        .find(package_id)
        .first::<Package>(conn)
        .optional()
}

pub fn get_active_package(
    conn: &mut SqliteConnection,
    package_id: i32,
) -> QueryResult<Option<Package>> {
    packages::table
        .filter(packages::id.eq(package_id))
        .filter(packages::is_active.eq(true))
        .first::<Package>(conn)
        .optional()
}

/// Active packages ordered by name.
pub fn list_active_packages(conn: &mut SqliteConnection) -> QueryResult<Vec<Package>> {
    packages::table
        .filter(packages::is_active.eq(true))
        .order(packages::name.asc())
        .load::<Package>(conn)
}

pub fn list_all_packages(conn: &mut SqliteConnection) -> QueryResult<Vec<Package>> {
    packages::table
        .order((packages::is_active.desc(), packages::name.asc()))
        .load::<Package>(conn)
}

pub fn update_package(
    conn: &mut SqliteConnection,
    package_id: i32,
    mut changes: UpdatePackageRequest,
) -> QueryResult<Package> {
    changes.name = changes.name.map(|n| n.trim().to_string());
    changes.updated_at = Some(now());
    diesel::update(packages::table.find(package_id))
        .set(&changes)
        .execute(conn)?;
    packages::table.find(package_id).first::<Package>(conn)
}

/// Soft-deletes a package so past sales keep their reference.
pub fn deactivate_package(conn: &mut SqliteConnection, package_id: i32) -> QueryResult<usize> {
    diesel::update(packages::table.find(package_id))
        .set((packages::is_active.eq(false), packages::updated_at.eq(now())))
        .execute(conn)
}

/// Installs [`DEFAULT_PACKAGES`] when the table is empty. Returns how many
/// packages were created.
pub fn seed_default_packages(conn: &mut SqliteConnection) -> QueryResult<usize> {
    conn.transaction(|conn| {
        let existing: i64 = packages::table.count().get_result(conn)?;
        if existing > 0 {
            return Ok(0);
        }
        let timestamp = now();
        let rows: Vec<NewPackage> = DEFAULT_PACKAGES
            .iter()
            .map(|(name, price)| NewPackage {
                name: name.to_string(),
                price: *price,
                is_active: true,
                created_at: timestamp,
                updated_at: timestamp,
            })
            .collect();
        diesel::insert_into(packages::table).values(&rows).execute(conn)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::testing::setup_test_db;

    #[test]
    fn test_seed_default_packages_only_once() {
        let mut conn = setup_test_db();
        assert_eq!(seed_default_packages(&mut conn).unwrap(), 6);
        assert_eq!(seed_default_packages(&mut conn).unwrap(), 0);

        let names: Vec<String> = list_active_packages(&mut conn)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names.first().map(String::as_str), Some("Barbe"));
        assert!(names.contains(&"Service personnalisé".to_string()));
    }

    #[test]
    fn test_deactivated_package_leaves_active_list() {
        let mut conn = setup_test_db();
        let pkg = insert_package(
            &mut conn,
            PackageInput {
                name: " Dégradé ".to_string(),
                price: 22.0,
            },
        )
        .unwrap();
        assert_eq!(pkg.name, "Dégradé");
        assert!(get_active_package(&mut conn, pkg.id).unwrap().is_some());

        assert_eq!(deactivate_package(&mut conn, pkg.id).unwrap(), 1);
        assert!(get_active_package(&mut conn, pkg.id).unwrap().is_none());
        assert!(get_package(&mut conn, pkg.id).unwrap().is_some());
        assert!(list_active_packages(&mut conn).unwrap().is_empty());
        assert_eq!(list_all_packages(&mut conn).unwrap().len(), 1);
    }

    #[test]
    fn test_update_package_partial() {
        let mut conn = setup_test_db();
        let pkg = insert_package(
            &mut conn,
            PackageInput {
                name: "Barbe".to_string(),
                price: 7.0,
            },
        )
        .unwrap();

        let updated = update_package(
            &mut conn,
            pkg.id,
            UpdatePackageRequest {
                price: Some(8.5),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.name, "Barbe");
        assert_eq!(updated.price, 8.5);
        assert!(updated.is_active);
    }
}

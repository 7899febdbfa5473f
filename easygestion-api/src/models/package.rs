use chrono::NaiveDateTime;
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::packages;

/// A priced service offered by the salon.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = packages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Package {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = packages)]
pub struct NewPackage {
    pub name: String,
    pub price: f64,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct PackageInput {
    pub name: String,
    pub price: f64,
}

#[derive(Debug, Default, Deserialize, Serialize, AsChangeset, TS)]
#[diesel(table_name = packages)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdatePackageRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub is_active: Option<bool>,
    #[serde(skip)]
    pub updated_at: Option<NaiveDateTime>,
}

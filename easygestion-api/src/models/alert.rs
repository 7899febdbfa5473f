use chrono::NaiveDateTime;
use diesel::{
    Associations, Identifiable, Insertable, Queryable, Selectable,
    deserialize::{self, FromSql},
    serialize::{self, Output, ToSql},
    sql_types::Text,
    sqlite::Sqlite,
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::schema::alerts;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    TS,
    diesel::expression::AsExpression,
    diesel::deserialize::FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Daily,
    Monthly,
    Warning,
}

impl ToSql<Text, Sqlite> for AlertType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        let s = match self {
            AlertType::Daily => "daily",
            AlertType::Monthly => "monthly",
            AlertType::Warning => "warning",
        };
        out.set_value(s);
        Ok(serialize::IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for AlertType {
    fn from_sql(
        bytes: <Sqlite as diesel::backend::Backend>::RawValue<'_>,
    ) -> deserialize::Result<Self> {
        let s = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        match s.as_str() {
            "daily" => Ok(AlertType::Daily),
            "monthly" => Ok(AlertType::Monthly),
            "warning" => Ok(AlertType::Warning),
            _ => Err(format!("Invalid AlertType value: {}", s).into()),
        }
    }
}

#[derive(
    Queryable,
    Selectable,
    Identifiable,
    Associations,
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    TS,
)]
#[diesel(belongs_to(crate::models::employee::Employee))]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Alert {
    pub id: i32,
    pub employee_id: i32,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub is_read: bool,
    #[ts(type = "string")]
    pub date: NaiveDateTime,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
    #[ts(type = "string")]
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = alerts)]
pub struct NewAlert {
    pub employee_id: i32,
    pub message: String,
    pub alert_type: AlertType,
    pub is_read: bool,
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize, Serialize, TS)]
#[ts(export)]
pub struct AlertInput {
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
}

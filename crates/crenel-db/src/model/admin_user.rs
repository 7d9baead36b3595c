use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::schema;

/// An administrator account.
///
/// Not serializable: the password hash must never travel past this crate.
#[derive(Debug, Clone, PartialEq, Eq, Identifiable, Queryable, Selectable)]
#[diesel(table_name = schema::admin_user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = schema::admin_user)]
pub struct NewAdminUser<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
}

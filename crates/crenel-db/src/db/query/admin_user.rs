//! Queries over the `admin_user` table.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema::admin_user;
use crate::model::admin_user::{AdminUser, NewAdminUser};

#[must_use]
pub fn by_email(email: &str) -> admin_user::BoxedQuery<'static, diesel::pg::Pg> {
    admin_user::table
        .into_boxed()
        .filter(admin_user::email.eq(email.to_string()))
}

/// ## Summary
/// Loads one administrator by email address.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn fetch_by_email(
    conn: &mut DbConnection<'_>,
    email: &str,
) -> QueryResult<Option<AdminUser>> {
    by_email(email).first(conn).await.optional()
}

/// ## Summary
/// Inserts a new administrator and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, row: &NewAdminUser<'_>) -> QueryResult<AdminUser> {
    diesel::insert_into(admin_user::table)
        .values(row)
        .get_result(conn)
        .await
}

//! Queries over the `intervenant` table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::intervenant;
use crate::db::transaction::with_transaction;
use crate::error::DbResult;
use crate::model::intervenant::{Intervenant, IntervenantChanges, NewIntervenant};

/// Number of rows a listing page holds.
pub const PAGE_SIZE: i64 = 5;

fn like_pattern(term: &str) -> String {
    format!("%{term}%")
}

#[must_use]
pub fn all() -> intervenant::BoxedQuery<'static, diesel::pg::Pg> {
    intervenant::table.into_boxed()
}

#[must_use]
pub fn by_id(id: Uuid) -> intervenant::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(intervenant::id.eq(id))
}

#[must_use]
pub fn by_key(key: &str) -> intervenant::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(intervenant::key.eq(key.to_string()))
}

#[must_use]
pub fn by_email(email: &str) -> intervenant::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(intervenant::email.eq(email.to_string()))
}

/// ## Summary
/// Returns a query matching every intervenant whose first name, last name,
/// email, or access key contains `term`, case-insensitively. An empty term
/// matches everything.
#[must_use]
pub fn filtered(term: &str) -> intervenant::BoxedQuery<'static, diesel::pg::Pg> {
    let pattern = like_pattern(term);
    all().filter(
        intervenant::firstname
            .ilike(pattern.clone())
            .or(intervenant::lastname.ilike(pattern.clone()))
            .or(intervenant::email.ilike(pattern.clone()))
            .or(intervenant::key.ilike(pattern)),
    )
}

/// ## Summary
/// Loads one intervenant by id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn fetch_by_id(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<Intervenant>> {
    by_id(id).first(conn).await.optional()
}

/// ## Summary
/// Loads one intervenant by access key.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn fetch_by_key(
    conn: &mut DbConnection<'_>,
    key: &str,
) -> QueryResult<Option<Intervenant>> {
    by_key(key).first(conn).await.optional()
}

/// ## Summary
/// Loads one intervenant by email address.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn fetch_by_email(
    conn: &mut DbConnection<'_>,
    email: &str,
) -> QueryResult<Option<Intervenant>> {
    by_email(email).first(conn).await.optional()
}

/// ## Summary
/// Loads one listing page of matches for `term`, ordered by first name.
/// Pages are 1-based; anything below 1 is treated as the first page.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_page(
    conn: &mut DbConnection<'_>,
    term: &str,
    page: i64,
) -> QueryResult<Vec<Intervenant>> {
    let offset = (page.max(1) - 1) * PAGE_SIZE;
    filtered(term)
        .order(intervenant::firstname.asc())
        .limit(PAGE_SIZE)
        .offset(offset)
        .load(conn)
        .await
}

/// ## Summary
/// Counts every row matching `term`, across all pages.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn count_filtered(conn: &mut DbConnection<'_>, term: &str) -> QueryResult<i64> {
    let pattern = like_pattern(term);
    intervenant::table
        .filter(
            intervenant::firstname
                .ilike(pattern.clone())
                .or(intervenant::lastname.ilike(pattern.clone()))
                .or(intervenant::email.ilike(pattern.clone()))
                .or(intervenant::key.ilike(pattern)),
        )
        .count()
        .get_result(conn)
        .await
}

/// ## Summary
/// Inserts a new intervenant and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails, including unique
/// violations on `email` or `key`.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    row: &NewIntervenant<'_>,
) -> QueryResult<Intervenant> {
    diesel::insert_into(intervenant::table)
        .values(row)
        .get_result(conn)
        .await
}

/// ## Summary
/// Applies a partial profile update and returns the fresh row, or `None`
/// if no such intervenant exists.
///
/// The changeset must touch at least one column; callers check
/// [`IntervenantChanges::is_empty`] first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &IntervenantChanges<'_>,
) -> QueryResult<Option<Intervenant>> {
    diesel::update(intervenant::table.find(id))
        .set(changes)
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Deletes one intervenant, returning how many rows went away.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(intervenant::table.find(id)).execute(conn).await
}

/// ## Summary
/// Replaces the stored availability document in a single statement.
///
/// Returns the number of rows updated, so callers can distinguish a
/// vanished intervenant (0) from a successful save (1).
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn save_availability(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    document: &serde_json::Value,
) -> QueryResult<usize> {
    diesel::update(intervenant::table.find(id))
        .set(intervenant::availability.eq(document))
        .execute(conn)
        .await
}

/// ## Summary
/// Gives one intervenant a new access key and expiry date. Returns the
/// fresh row, or `None` if no such intervenant exists.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn regenerate_key(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    key: &str,
    enddate: DateTime<Utc>,
) -> QueryResult<Option<Intervenant>> {
    diesel::update(intervenant::table.find(id))
        .set((intervenant::key.eq(key), intervenant::enddate.eq(enddate)))
        .get_result(conn)
        .await
        .optional()
}

/// ## Summary
/// Gives every intervenant a fresh, distinct access key and the same new
/// expiry date, all inside one transaction. Returns how many rows changed.
///
/// ## Errors
/// Rolls back and returns the first failure; either every key rotates or
/// none does.
#[tracing::instrument(skip(conn))]
pub async fn regenerate_all_keys(
    conn: &mut DbConnection<'_>,
    enddate: DateTime<Utc>,
) -> DbResult<usize> {
    with_transaction(conn, |conn| {
        async move {
            let ids: Vec<Uuid> = intervenant::table.select(intervenant::id).load(conn).await?;
            let mut updated = 0;
            for id in ids {
                let key = Uuid::new_v4().to_string();
                updated += diesel::update(intervenant::table.find(id))
                    .set((intervenant::key.eq(key), intervenant::enddate.eq(enddate)))
                    .execute(conn)
                    .await?;
            }
            tracing::debug!(updated, "rotated all access keys");
            Ok(updated)
        }
        .scope_boxed()
    })
    .await
}

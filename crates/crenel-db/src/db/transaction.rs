use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedBoxFuture;

use crate::db::connection::DbConnection;
use crate::error::{DbError, DbResult};

/// ## Summary
/// Runs `callback` inside a database transaction, committing on `Ok` and
/// rolling back on `Err`.
///
/// ## Errors
/// Returns the callback's error, or the commit/rollback failure.
pub async fn with_transaction<'pool, 'a, T, F>(
    conn: &mut DbConnection<'pool>,
    callback: F,
) -> DbResult<T>
where
    F: for<'r> FnOnce(&'r mut DbConnection<'pool>) -> ScopedBoxFuture<'a, 'r, DbResult<T>>
        + Send
        + 'a,
    T: Send + 'a,
{
    conn.transaction::<T, DbError, F>(callback).await
}

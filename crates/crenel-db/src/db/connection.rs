use std::future::Future;
use std::pin::Pin;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

use crate::error::DbResult;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConnection<'a> = PooledConnection<'a, AsyncPgConnection>;

/// ## Summary
/// Builds the connection pool the whole application shares.
///
/// The pool holds `size` connections and keeps them open for the lifetime
/// of the process.
///
/// ## Errors
/// Returns an error if the initial connections cannot be established.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str, size: u8) -> DbResult<DbPool> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(u32::from(size))
        .min_idle(Some(u32::from(size)))
        .test_on_check_out(false)
        .idle_timeout(None)
        .max_lifetime(None)
        .build(manager)
        .await?;
    tracing::debug!(size, "database pool ready");
    Ok(pool)
}

impl super::DbProvider for DbPool {
    fn get_connection<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = DbResult<DbConnection<'a>>> + Send + 'a>> {
        Box::pin(async move { Ok(self.get().await?) })
    }
}

use std::future::Future;
use std::pin::Pin;

use crate::error::DbResult;

pub mod connection;
pub mod migrate;
pub mod query;
pub mod revision;
pub mod schema;
pub mod transaction;

/// A source of pooled database connections.
///
/// The handler layer only ever sees this trait, so tests can substitute
/// their own pool.
pub trait DbProvider: Send + Sync {
    fn get_connection<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = DbResult<connection::DbConnection<'a>>> + Send + 'a>>;
}

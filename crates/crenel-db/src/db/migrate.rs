//! Embedded schema migrations.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{DbError, DbResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// ## Summary
/// Applies every pending migration, using a dedicated synchronous
/// connection on a blocking thread.
///
/// ## Errors
/// Returns an error if connecting fails or a migration cannot be applied.
#[tracing::instrument(skip(database_url))]
pub async fn run_pending(database_url: &str) -> DbResult<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || -> DbResult<()> {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|error| DbError::MigrationError(error.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|error| DbError::MigrationError(error.to_string()))?;
        for version in applied {
            tracing::info!(%version, "applied migration");
        }
        Ok(())
    })
    .await
    .map_err(|error| DbError::MigrationError(error.to_string()))?
}

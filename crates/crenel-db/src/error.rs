use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] diesel::result::Error),

    #[error("Pool error: {0}")]
    PoolError(#[from] diesel_async::pooled_connection::bb8::RunError),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    CoreError(#[from] crenel_core::error::CoreError),
}

impl From<diesel_async::pooled_connection::PoolError> for DbError {
    fn from(error: diesel_async::pooled_connection::PoolError) -> Self {
        Self::PoolError(diesel_async::pooled_connection::bb8::RunError::User(error))
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;

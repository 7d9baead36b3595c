//! Persistence layer: connection pooling, schema, models, and queries
//! for intervenant records and administrator accounts.

pub mod db;
pub mod error;
pub mod model;

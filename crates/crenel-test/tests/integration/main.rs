//! HTTP integration tests, one module per API surface.
//!
//! Tests marked `#[ignore]` need a running PostgreSQL instance; see
//! `helpers::get_base_database_url` for how it is located.

mod admin;
mod availability;
mod healthcheck;
mod helpers;

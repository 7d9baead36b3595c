//! HTTP layer: routing, middleware, and request handlers.

pub mod app;
pub mod config;
pub mod db_handler;
pub mod error;
pub mod middleware;

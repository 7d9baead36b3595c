//! Business operations on top of the persistence layer: administrator
//! authentication, intervenant management, and availability calendars.

pub mod auth;
pub mod availability;
pub mod error;
pub mod intervenant;

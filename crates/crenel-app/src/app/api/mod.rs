mod admin;
mod availability;
mod healthcheck;
mod response;

use salvo::Router;

// Re-export route constants from core
pub use crenel_core::constants::{
    ADMIN_ROUTE_COMPONENT, ADMIN_ROUTE_PREFIX, API_ROUTE_COMPONENT, API_ROUTE_PREFIX,
    AVAILABILITY_ROUTE_COMPONENT, AVAILABILITY_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the main API router: the public healthcheck, the key-scoped
/// availability calendar, and the Basic-auth guarded admin surface.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(healthcheck::routes())
        .push(availability::routes())
        .push(admin::routes())
}

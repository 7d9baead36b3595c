use salvo::Router;

use crenel_core::constants::ADMIN_ROUTE_COMPONENT;

use crate::middleware::admin_auth::AdminAuthMiddleware;

mod intervenants;

/// Admin API surface. Everything below this router sits behind HTTP Basic
/// authentication against the stored admin accounts.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(ADMIN_ROUTE_COMPONENT)
        .hoop(AdminAuthMiddleware)
        .push(intervenants::routes())
}

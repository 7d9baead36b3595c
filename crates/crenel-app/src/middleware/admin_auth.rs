use salvo::Depot;
use salvo::http::{HeaderValue, StatusCode, header};
use tracing::error;

use crate::{config::get_config_from_depot, db_handler::get_db_from_depot};
use crenel_service::auth::authenticate::{authenticate_admin, parse_basic_header};
use crenel_service::error::ServiceError;

/// Depot key under which the authenticated administrator's email is stored.
pub const ADMIN_EMAIL_KEY: &str = "admin_email";

/// ## Summary
/// Guards the admin routes with HTTP Basic authentication against the
/// administrator accounts.
///
/// ## Side Effects
/// Inserts the authenticated administrator's email into the depot under
/// [`ADMIN_EMAIL_KEY`] for downstream handlers.
///
/// ## Errors
/// Responds 401 with a `WWW-Authenticate` challenge when credentials are
/// missing or wrong, and stops the request from reaching the handlers.
pub struct AdminAuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AdminAuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let config = match get_config_from_depot(depot) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = ?e, "Failed to get config from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let credentials = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_basic_header);

        let Some(credentials) = credentials else {
            tracing::debug!("missing or malformed Basic credentials");
            challenge(res, &config.auth.realm);
            ctrl.skip_rest();
            return;
        };

        let provider = match get_db_from_depot(depot) {
            Ok(p) => p,
            Err(e) => {
                error!(error = ?e, "Failed to get database provider from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        let mut conn = match provider.get_connection().await {
            Ok(c) => c,
            Err(e) => {
                error!(error = ?e, "Failed to get database connection");
                res.status_code(StatusCode::SERVICE_UNAVAILABLE);
                ctrl.skip_rest();
                return;
            }
        };

        match authenticate_admin(&mut conn, &credentials).await {
            Ok(admin) => {
                depot.insert(ADMIN_EMAIL_KEY, admin.email);
            }
            Err(ServiceError::NotAuthenticated) => {
                tracing::debug!(email = %credentials.email, "administrator login rejected");
                challenge(res, &config.auth.realm);
                ctrl.skip_rest();
            }
            Err(service_err) => {
                error!(error = ?service_err, "Authentication failed with error");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
            }
        }
    }
}

fn challenge(res: &mut salvo::Response, realm: &str) {
    res.status_code(StatusCode::UNAUTHORIZED);
    if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{realm}\"")) {
        let _ = res.add_header(header::WWW_AUTHENTICATE, value, true);
    }
}

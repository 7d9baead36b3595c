use chrono::{DateTime, Utc};
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::app::api::response::{ErrorResponse, write_service_error};
use crate::db_handler::get_db_from_depot;
use crate::middleware::admin_auth::ADMIN_EMAIL_KEY;
use crenel_service::intervenant::{self, ProfileChanges};

/// ## Summary
/// Create intervenant request payload
#[derive(Debug, Deserialize)]
pub struct CreateIntervenantRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

/// ## Summary
/// Update intervenant request payload. Absent fields stay untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateIntervenantRequest {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub enddate: Option<DateTime<Utc>>,
}

/// ## Summary
/// Bulk key rotation response payload
#[derive(Debug, Serialize)]
pub struct RotatedKeysResponse {
    pub rotated: usize,
}

fn admin_email(depot: &Depot) -> &str {
    depot
        .get::<String>(ADMIN_EMAIL_KEY)
        .map_or("unknown", String::as_str)
}

/// ## Summary
/// GET /api/admin/intervenants - Page through the intervenant roster
///
/// Accepts `query` (case-insensitive substring over names, email, and key)
/// and `page` (1-based) query parameters.
///
/// ## Errors
/// Returns HTTP 500 if database operations fail
/// Returns HTTP 503 if no database connection is available
#[handler]
async fn list_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let term = req.query::<String>("query").unwrap_or_default();
    let page = req.query::<i64>("page").unwrap_or(1);

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match intervenant::list(&mut conn, &term, page).await {
        Ok(listing) => res.render(Json(listing)),
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// POST /api/admin/intervenants - Register a new intervenant
///
/// ## Side Effects
/// - Creates the row with a fresh UUID access key and a two-month expiry
/// - Starts from an empty availability document
///
/// ## Errors
/// Returns HTTP 400 for a malformed body, empty name, or bad email
/// Returns HTTP 409 if the email is already registered
#[handler]
async fn create_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing create intervenant request");

    let create_req: CreateIntervenantRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse create intervenant request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match intervenant::create(
        &mut conn,
        &create_req.email,
        &create_req.firstname,
        &create_req.lastname,
    )
    .await
    {
        Ok(created) => {
            tracing::info!(
                id = %created.id,
                email = %created.email,
                created_by = %admin_email(depot),
                "Intervenant created successfully"
            );
            res.status_code(StatusCode::CREATED);
            res.render(Json(created));
        }
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// GET /api/admin/intervenants/{id} - Fetch one intervenant
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if no such intervenant exists
#[handler]
async fn fetch_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(id_str) = req.param::<String>("id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Intervenant ID required".to_string(),
        }));
        return;
    };

    let Ok(id) = uuid::Uuid::parse_str(&id_str) else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid intervenant ID format".to_string(),
        }));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match intervenant::fetch(&mut conn, id).await {
        Ok(row) => res.render(Json(row)),
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// PUT /api/admin/intervenants/{id} - Update an intervenant's profile
///
/// Only email, firstname, and lastname can change; the key and its expiry
/// move through the dedicated key routes.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id or body
/// Returns HTTP 404 if no such intervenant exists
/// Returns HTTP 409 if the new email belongs to someone else
#[handler]
async fn update_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing update intervenant request");

    let Some(id_str) = req.param::<String>("id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Intervenant ID required".to_string(),
        }));
        return;
    };

    let Ok(id) = uuid::Uuid::parse_str(&id_str) else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid intervenant ID format".to_string(),
        }));
        return;
    };

    let update_req: UpdateIntervenantRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse update intervenant request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    let changes = ProfileChanges {
        email: update_req.email.as_deref(),
        firstname: update_req.firstname.as_deref(),
        lastname: update_req.lastname.as_deref(),
        enddate: update_req.enddate,
    };

    match intervenant::update(&mut conn, id, &changes).await {
        Ok(updated) => {
            tracing::info!(
                id = %updated.id,
                updated_by = %admin_email(depot),
                "Intervenant updated successfully"
            );
            res.render(Json(updated));
        }
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// DELETE /api/admin/intervenants/{id} - Remove an intervenant
///
/// The calendar behind their access key disappears with the row.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if no such intervenant exists
#[handler]
async fn delete_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing delete intervenant request");

    let Some(id_str) = req.param::<String>("id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Intervenant ID required".to_string(),
        }));
        return;
    };

    let Ok(id) = uuid::Uuid::parse_str(&id_str) else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid intervenant ID format".to_string(),
        }));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match intervenant::delete(&mut conn, id).await {
        Ok(()) => {
            tracing::info!(
                %id,
                deleted_by = %admin_email(depot),
                "Intervenant deleted successfully"
            );
            res.status_code(StatusCode::NO_CONTENT);
        }
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// POST /api/admin/intervenants/{id}/key - Rotate one access key
///
/// The old key stops resolving immediately; the expiry moves two months
/// out from now.
///
/// ## Errors
/// Returns HTTP 400 for a malformed id
/// Returns HTTP 404 if no such intervenant exists
#[handler]
async fn regenerate_key_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing key regeneration request");

    let Some(id_str) = req.param::<String>("id") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Intervenant ID required".to_string(),
        }));
        return;
    };

    let Ok(id) = uuid::Uuid::parse_str(&id_str) else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Invalid intervenant ID format".to_string(),
        }));
        return;
    };

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match intervenant::regenerate_key(&mut conn, id).await {
        Ok(updated) => {
            tracing::info!(
                id = %updated.id,
                rotated_by = %admin_email(depot),
                "Access key regenerated"
            );
            res.render(Json(updated));
        }
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// POST /api/admin/intervenants/keys - Rotate every access key
///
/// Every intervenant receives a distinct new key and the same fresh
/// two-month expiry. All previously shared links stop working.
///
/// ## Errors
/// Returns HTTP 500 if database operations fail
/// Returns HTTP 503 if no database connection is available
#[handler]
async fn regenerate_all_handler(depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing bulk key regeneration request");

    let provider = match get_db_from_depot(depot) {
        Ok(p) => p,
        Err(e) => {
            error!(error = ?e, "Failed to get database provider");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }));
            return;
        }
    };

    let mut conn = match provider.get_connection().await {
        Ok(c) => c,
        Err(e) => {
            error!(error = ?e, "Failed to get database connection");
            res.status_code(StatusCode::SERVICE_UNAVAILABLE);
            res.render(Json(ErrorResponse {
                error: "Database unavailable".to_string(),
            }));
            return;
        }
    };

    match intervenant::regenerate_all_keys(&mut conn).await {
        Ok(rotated) => {
            tracing::info!(
                rotated,
                rotated_by = %admin_email(depot),
                "All access keys regenerated"
            );
            res.render(Json(RotatedKeysResponse { rotated }));
        }
        Err(e) => write_service_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    // "keys" has to sit in front of the "{id}" wildcard.
    Router::with_path("intervenants")
        .get(list_handler)
        .post(create_handler)
        .push(Router::with_path("keys").post(regenerate_all_handler))
        .push(
            Router::with_path("{id}")
                .get(fetch_handler)
                .put(update_handler)
                .delete(delete_handler)
                .push(Router::with_path("key").post(regenerate_key_handler)),
        )
}

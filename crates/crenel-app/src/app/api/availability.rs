use chrono::{DateTime, Utc};
use salvo::{Depot, Request, Response, Router, handler, http::StatusCode, writing::Json};
use serde::Deserialize;
use tracing::error;

use crenel_core::constants::AVAILABILITY_ROUTE_COMPONENT;
use crenel_service::availability::{SlotSelection, add_slot, calendar_view, remove_slot};

use crate::app::api::response::{ErrorResponse, write_service_error};
use crate::config::get_config_from_depot;
use crate::db_handler::get_db_from_depot;

/// ## Summary
/// Slot payload for add/remove requests. Instants are UTC; the optional
/// revision makes the edit conditional on the stored document state.
#[derive(Debug, Deserialize)]
pub struct SlotRequest {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub revision: Option<String>,
}

/// ## Summary
/// GET /api/availability/{key} - Expanded calendar view for one intervenant
///
/// The key is the only credential: no other authentication applies. An
/// expired key still resolves, but to an `expired` view with no events.
///
/// ## Errors
/// Returns HTTP 404 if no intervenant carries the key
/// Returns HTTP 500 if the stored document is unreadable or expansion fails
/// Returns HTTP 503 if no database connection is available
#[handler]
async fn calendar_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    let Some(key) = req.param::<String>("key") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Access key required".to_string(),
        }));
        return;
    };

    let settings = match get_config_from_depot(depot) {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "Failed to get configuration");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
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

    match calendar_view(&mut conn, &settings, &key).await {
        Ok(view) => res.render(Json(view)),
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// POST /api/availability/{key}/events - Add a slot to the weekly schedule
///
/// The selected range is folded onto the recurring week it falls in and
/// persisted; the response carries the refreshed calendar view.
///
/// ## Errors
/// Returns HTTP 400 for a malformed body or an empty/day-spanning range
/// Returns HTTP 403 if the key has expired
/// Returns HTTP 404 if no intervenant carries the key
/// Returns HTTP 409 if the revision precondition fails
#[handler]
async fn add_event_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing add slot request");

    let Some(key) = req.param::<String>("key") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Access key required".to_string(),
        }));
        return;
    };

    let slot_req: SlotRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse add slot request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let settings = match get_config_from_depot(depot) {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "Failed to get configuration");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
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

    let selection = SlotSelection {
        start: slot_req.start,
        end: slot_req.end,
    };

    match add_slot(
        &mut conn,
        &settings,
        &key,
        selection,
        slot_req.revision.as_deref(),
    )
    .await
    {
        Ok(view) => res.render(Json(view)),
        Err(e) => write_service_error(res, &e),
    }
}

/// ## Summary
/// POST /api/availability/{key}/events/delete - Remove a slot
///
/// Deletes the weekly rule matching the selected range from the week it
/// falls in. Removing a slot nobody stored is a no-op that still returns
/// the refreshed view.
///
/// ## Errors
/// Returns HTTP 400 for a malformed body or an empty/day-spanning range
/// Returns HTTP 403 if the key has expired
/// Returns HTTP 404 if no intervenant carries the key
/// Returns HTTP 409 if the revision precondition fails
#[handler]
async fn remove_event_handler(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    tracing::debug!("Processing remove slot request");

    let Some(key) = req.param::<String>("key") else {
        res.status_code(StatusCode::BAD_REQUEST);
        res.render(Json(ErrorResponse {
            error: "Access key required".to_string(),
        }));
        return;
    };

    let slot_req: SlotRequest = match req.parse_json().await {
        Ok(r) => r,
        Err(e) => {
            error!(error = ?e, "Failed to parse remove slot request");
            res.status_code(StatusCode::BAD_REQUEST);
            res.render(Json(ErrorResponse {
                error: "Invalid request body".to_string(),
            }));
            return;
        }
    };

    let settings = match get_config_from_depot(depot) {
        Ok(s) => s,
        Err(e) => {
            error!(error = ?e, "Failed to get configuration");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
            res.render(Json(ErrorResponse {
                error: "Internal server error".to_string(),
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

    let selection = SlotSelection {
        start: slot_req.start,
        end: slot_req.end,
    };

    match remove_slot(
        &mut conn,
        &settings,
        &key,
        selection,
        slot_req.revision.as_deref(),
    )
    .await
    {
        Ok(view) => res.render(Json(view)),
        Err(e) => write_service_error(res, &e),
    }
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(AVAILABILITY_ROUTE_COMPONENT).push(
        Router::with_path("{key}").get(calendar_handler).push(
            Router::with_path("events")
                .post(add_event_handler)
                .push(Router::with_path("delete").post(remove_event_handler)),
        ),
    )
}

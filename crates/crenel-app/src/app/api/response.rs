//! Shared response plumbing for the JSON API.

use salvo::http::StatusCode;
use salvo::writing::Json;
use serde::Serialize;

use crenel_service::error::ServiceError;

/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// ## Summary
/// Maps a service error onto an HTTP response: a status code and a JSON
/// error body. Internal failures are logged and come back as an opaque 500.
pub fn write_service_error(res: &mut salvo::Response, error: &ServiceError) {
    let status = match error {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::KeyExpired(_) => StatusCode::FORBIDDEN,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::DatabaseError(_)
        | ServiceError::ScheduleError(_)
        | ServiceError::CoreError(_)
        | ServiceError::MalformedDocument(_)
        | ServiceError::InvalidConfiguration(_)
        | ServiceError::InvariantViolation(_)
        | ServiceError::DieselError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = ?error, "request failed");
        "Internal server error".to_string()
    } else {
        tracing::debug!(error = %error, "request rejected");
        error.to_string()
    };

    res.status_code(status);
    res.render(Json(ErrorResponse { error: message }));
}

#![allow(clippy::unused_async, unused_must_use)]
//! Tests for the healthcheck endpoint.
//!
//! Verifies the service answers without configuration or database access.

use salvo::http::StatusCode;

use super::helpers::*;

/// ## Summary
/// Test that the healthcheck responds 200 with a plain "OK" body.
#[test_log::test(tokio::test)]
async fn healthcheck_returns_ok() {
    let service = create_test_service();

    let response = TestRequest::get("/api/healthcheck").send(service).await;

    response.assert_status(StatusCode::OK);
}

/// ## Summary
/// Test that the healthcheck body is exactly "OK".
#[test_log::test(tokio::test)]
async fn healthcheck_body_is_ok() {
    let service = create_test_service();

    let response = TestRequest::get("/api/healthcheck").send(service).await;

    assert_eq!(response.body_string(), "OK");
}

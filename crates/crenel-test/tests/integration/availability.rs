#![allow(clippy::unused_async, unused_must_use)]
//! Tests for the key-scoped availability calendar.
//!
//! Verifies calendar expansion over the pinned 2024/2025 academic year,
//! the expired-key view, slot addition and removal, and the revision
//! precondition. The test configuration localizes to Europe/Paris, so
//! September events sit at UTC+2 and November events at UTC+1.

use salvo::http::StatusCode;
use serde_json::json;

use crenel_test::component::db::revision::document_revision;

use super::helpers::*;

// ============================================================================
// Request Validation (no database required)
// ============================================================================

/// ## Summary
/// Test that a malformed slot body is rejected before any lookup.
#[test_log::test(tokio::test)]
async fn malformed_slot_body_is_rejected() {
    let service = create_test_service();

    let response = TestRequest::post("/api/availability/some-key/events")
        .content_type("application/json")
        .body("{not json")
        .send(service)
        .await;

    response
        .assert_status(StatusCode::BAD_REQUEST)
        .assert_body_contains("Invalid request body");
}

// ============================================================================
// Calendar View Tests (database required)
// ============================================================================

/// ## Summary
/// Test that an unknown access key resolves to 404.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn unknown_key_is_not_found() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get("/api/availability/no-such-key")
        .send(&service)
        .await;

    response
        .assert_status(StatusCode::NOT_FOUND)
        .assert_body_contains("error");
}

/// ## Summary
/// Test that an empty availability document yields an empty calendar with
/// a usable revision tag.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn empty_document_yields_empty_calendar() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_intervenant("anna@example.org", "Anna", "Leroy", "key-anna", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get("/api/availability/key-anna")
        .send(&service)
        .await;

    let view: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_eq!(view["status"], "ok");
    assert_eq!(view["firstname"], "Anna");
    assert_eq!(view["lastname"], "Leroy");
    assert_eq!(view["events"], json!([]));
    assert_eq!(view["revision"], document_revision(&json!({})));
}

/// ## Summary
/// Test that a default weekly rule expands across the academic year,
/// localized from Paris wall-clock time to UTC.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn default_schedule_expands_over_the_academic_year() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let document = json!({
        "default": [{"days": "lundi", "from": "09:00", "to": "12:00"}]
    });
    test_db
        .seed_intervenant_with_availability(
            "marc@example.org",
            "Marc",
            "Petit",
            "key-marc",
            future_enddate(),
            &document,
        )
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get("/api/availability/key-marc")
        .send(&service)
        .await;

    let view: serde_json::Value = response.assert_status(StatusCode::OK).json();
    let events = view["events"].as_array().expect("events array");

    // 44 Mondays between 2024-09-02 and 2025-06-30, minus the two in the
    // holiday break.
    assert_eq!(events.len(), 42);
    assert_eq!(events[0]["start"], "2024-09-02T07:00:00Z");
    assert_eq!(events[0]["end"], "2024-09-02T10:00:00Z");
    assert_eq!(events[0]["title"], "Disponibilité (09:00 - 12:00)");
    assert_eq!(view["revision"], document_revision(&document));
}

/// ## Summary
/// Test that an unreadable stored document surfaces as a server error,
/// not as a silently empty calendar.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn unreadable_document_is_a_server_error() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let document = json!({
        "default": [{"days": "lundi", "from": "9h00", "to": "12:00"}]
    });
    test_db
        .seed_intervenant_with_availability(
            "paul@example.org",
            "Paul",
            "Roux",
            "key-paul",
            future_enddate(),
            &document,
        )
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get("/api/availability/key-paul")
        .send(&service)
        .await;

    response
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR)
        .assert_body_contains("Internal server error");
}

// ============================================================================
// Expired Key Tests
// ============================================================================

/// ## Summary
/// Test that an expired key still resolves, but to an event-free view
/// that keeps the stored document's revision tag.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn expired_key_shows_an_expired_view() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let document = json!({
        "default": [{"days": "mardi", "from": "10:00", "to": "11:00"}]
    });
    test_db
        .seed_intervenant_with_availability(
            "ines@example.org",
            "Inès",
            "Garnier",
            "key-ines",
            past_enddate(),
            &document,
        )
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::get("/api/availability/key-ines")
        .send(&service)
        .await;

    let view: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_eq!(view["status"], "expired");
    assert_eq!(view["events"], json!([]));
    assert_eq!(view["revision"], document_revision(&document));
}

/// ## Summary
/// Test that an expired key cannot edit the document.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn expired_key_rejects_edits() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_intervenant("ines@example.org", "Inès", "Garnier", "key-ines", past_enddate())
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::post("/api/availability/key-ines/events")
        .json_body(&json!({
            "start": "2024-11-04T08:00:00Z",
            "end": "2024-11-04T11:00:00Z"
        }))
        .send(&service)
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

// ============================================================================
// Slot Edit Tests
// ============================================================================

/// ## Summary
/// Test that adding a slot persists it under the ISO week it falls in and
/// shows up in the refreshed view.
///
/// 08:00-11:00 UTC on 2024-11-04 is 09:00-12:00 in Paris (winter time),
/// a Monday of ISO week 45.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn adding_a_slot_persists_and_expands() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let id = test_db
        .seed_intervenant("lucie@example.org", "Lucie", "Marchand", "key-lucie", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let response = TestRequest::post("/api/availability/key-lucie/events")
        .json_body(&json!({
            "start": "2024-11-04T08:00:00Z",
            "end": "2024-11-04T11:00:00Z"
        }))
        .send(&service)
        .await;

    let view: serde_json::Value = response.assert_status(StatusCode::OK).json();
    let events = view["events"].as_array().expect("events array");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["start"], "2024-11-04T08:00:00Z");
    assert_eq!(events[0]["end"], "2024-11-04T11:00:00Z");

    let row = test_db
        .get_intervenant(id)
        .await
        .expect("Failed to load intervenant")
        .expect("row still exists");
    assert_eq!(
        row.availability,
        json!({"S45": [{"days": "lundi", "from": "09:00", "to": "12:00"}]})
    );
}

/// ## Summary
/// Test that removing the slot just added restores the empty document.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn removing_a_slot_restores_the_document() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let id = test_db
        .seed_intervenant("lucie@example.org", "Lucie", "Marchand", "key-lucie", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let slot = json!({
        "start": "2024-11-04T08:00:00Z",
        "end": "2024-11-04T11:00:00Z"
    });

    TestRequest::post("/api/availability/key-lucie/events")
        .json_body(&slot)
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    let response = TestRequest::post("/api/availability/key-lucie/events/delete")
        .json_body(&slot)
        .send(&service)
        .await;

    let view: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_eq!(view["events"], json!([]));

    let row = test_db
        .get_intervenant(id)
        .await
        .expect("Failed to load intervenant")
        .expect("row still exists");
    assert_eq!(row.availability, json!({}));
}

/// ## Summary
/// Test that a selection spanning local midnight is rejected.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn day_spanning_slot_is_rejected() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_intervenant("lucie@example.org", "Lucie", "Marchand", "key-lucie", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    // 22:00 UTC to 01:00 UTC crosses midnight in Paris as well.
    let response = TestRequest::post("/api/availability/key-lucie/events")
        .json_body(&json!({
            "start": "2024-11-04T22:00:00Z",
            "end": "2024-11-05T01:00:00Z"
        }))
        .send(&service)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Revision Precondition Tests
// ============================================================================

/// ## Summary
/// Test that an edit conditioned on the current revision succeeds and a
/// stale one conflicts.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn stale_revision_is_rejected() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    test_db
        .seed_intervenant("nora@example.org", "Nora", "Blanc", "key-nora", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let service = create_db_test_service(&test_db.url()).await;

    let view: serde_json::Value = TestRequest::get("/api/availability/key-nora")
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let initial_revision = view["revision"].as_str().expect("revision tag").to_string();

    // A conditional edit against the current tag goes through.
    TestRequest::post("/api/availability/key-nora/events")
        .json_body(&json!({
            "start": "2024-11-04T08:00:00Z",
            "end": "2024-11-04T11:00:00Z",
            "revision": initial_revision
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::OK);

    // The same tag no longer matches the stored document.
    let response = TestRequest::post("/api/availability/key-nora/events")
        .json_body(&json!({
            "start": "2024-11-05T08:00:00Z",
            "end": "2024-11-05T11:00:00Z",
            "revision": initial_revision
        }))
        .send(&service)
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

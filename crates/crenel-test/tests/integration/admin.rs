#![allow(clippy::unused_async, unused_must_use)]
//! Tests for the Basic-auth guarded admin surface.
//!
//! Verifies intervenant CRUD, the paged and filtered listing, and single
//! and bulk access-key rotation. Every test seeds its own administrator
//! account and authenticates with it.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

const ADMIN_EMAIL: &str = "admin@example.org";
const ADMIN_PASSWORD: &str = "hunter2hunter2";

async fn seeded_admin_service(test_db: &TestDb) -> salvo::Service {
    test_db
        .seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD)
        .await
        .expect("Failed to seed admin");
    create_db_test_service(&test_db.url()).await
}

// ============================================================================
// Creation Tests
// ============================================================================

/// ## Summary
/// Test that creating an intervenant returns the full row with a fresh
/// key, an empty document, and an expiry past the creation date.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn creating_an_intervenant_returns_the_row() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let response = TestRequest::post("/api/admin/intervenants")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({
            "email": "sophie@example.org",
            "firstname": "Sophie",
            "lastname": "Bernard"
        }))
        .send(&service)
        .await;

    let created: serde_json::Value = response.assert_status(StatusCode::CREATED).json();
    assert_eq!(created["email"], "sophie@example.org");
    assert_eq!(created["firstname"], "Sophie");
    assert_eq!(created["lastname"], "Bernard");
    assert_eq!(created["availability"], json!({}));

    let key = created["key"].as_str().expect("key string");
    assert!(!key.is_empty());

    let id = created["id"].as_str().expect("id string");
    let fetched = TestRequest::get(&format!("/api/admin/intervenants/{id}"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await;
    let row: serde_json::Value = fetched.assert_status(StatusCode::OK).json();
    assert_eq!(row["email"], "sophie@example.org");
    assert_eq!(row["key"], key);
}

/// ## Summary
/// Test that a second registration under the same email conflicts.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn duplicate_email_conflicts() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let body = json!({
        "email": "sophie@example.org",
        "firstname": "Sophie",
        "lastname": "Bernard"
    });

    TestRequest::post("/api/admin/intervenants")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&body)
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let response = TestRequest::post("/api/admin/intervenants")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&body)
        .send(&service)
        .await;

    response
        .assert_status(StatusCode::CONFLICT)
        .assert_body_contains("already registered");
}

/// ## Summary
/// Test that malformed profile fields are rejected up front.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn invalid_profiles_are_rejected() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let response = TestRequest::post("/api/admin/intervenants")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({
            "email": "not-an-email",
            "firstname": "Sophie",
            "lastname": "Bernard"
        }))
        .send(&service)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = TestRequest::post("/api/admin/intervenants")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({
            "email": "sophie@example.org",
            "firstname": "   ",
            "lastname": "Bernard"
        }))
        .send(&service)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(
        test_db
            .count_intervenants()
            .await
            .expect("Failed to count intervenants"),
        0
    );
}

// ============================================================================
// Listing Tests
// ============================================================================

/// ## Summary
/// Test that the listing pages through five rows at a time.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn listing_is_paged() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    for i in 0..7 {
        test_db
            .seed_intervenant(
                &format!("person{i}@example.org"),
                &format!("Prenom{i}"),
                &format!("Nom{i}"),
                &format!("key-{i}"),
                future_enddate(),
            )
            .await
            .expect("Failed to seed intervenant");
    }

    let first: serde_json::Value = TestRequest::get("/api/admin/intervenants?page=1")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(first["page"], 1);
    assert_eq!(first["total"], 7);
    assert_eq!(first["total_pages"], 2);
    assert_eq!(first["items"].as_array().expect("items array").len(), 5);

    let second: serde_json::Value = TestRequest::get("/api/admin/intervenants?page=2")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(second["page"], 2);
    assert_eq!(second["items"].as_array().expect("items array").len(), 2);
}

/// ## Summary
/// Test that the filter term matches case-insensitively across the
/// profile fields.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn listing_filters_case_insensitively() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    test_db
        .seed_intervenant("amelie@example.org", "Amélie", "Durand", "key-amelie", future_enddate())
        .await
        .expect("Failed to seed intervenant");
    test_db
        .seed_intervenant("bruno@example.org", "Bruno", "Martin", "key-bruno", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let page: serde_json::Value = TestRequest::get("/api/admin/intervenants?query=DURAND")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(page["total"], 1);
    let items = page["items"].as_array().expect("items array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["lastname"], "Durand");
}

// ============================================================================
// Update and Delete Tests
// ============================================================================

/// ## Summary
/// Test that a partial update touches only the submitted fields.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn updating_a_profile_is_partial() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let id = test_db
        .seed_intervenant("margot@example.org", "Margot", "Faure", "key-margot", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let response = TestRequest::put(&format!("/api/admin/intervenants/{id}"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({"lastname": "Faure-Dupont"}))
        .send(&service)
        .await;

    let updated: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_eq!(updated["lastname"], "Faure-Dupont");
    assert_eq!(updated["firstname"], "Margot");
    assert_eq!(updated["email"], "margot@example.org");
    assert_eq!(updated["key"], "key-margot");
}

/// ## Summary
/// Test that an update can move the expiry date directly.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn updating_the_enddate_changes_expiry() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let id = test_db
        .seed_intervenant("margot@example.org", "Margot", "Faure", "key-margot", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let response = TestRequest::put(&format!("/api/admin/intervenants/{id}"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({"enddate": "2027-01-31T00:00:00Z"}))
        .send(&service)
        .await;

    let updated: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_eq!(updated["enddate"], "2027-01-31T00:00:00Z");
}

/// ## Summary
/// Test that updates against unknown ids and taken emails fail cleanly.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn update_conflicts_and_missing_rows_are_reported() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    test_db
        .seed_intervenant("amelie@example.org", "Amélie", "Durand", "key-amelie", future_enddate())
        .await
        .expect("Failed to seed intervenant");
    let bruno = test_db
        .seed_intervenant("bruno@example.org", "Bruno", "Martin", "key-bruno", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    let response = TestRequest::put(&format!("/api/admin/intervenants/{}", uuid::Uuid::new_v4()))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({"firstname": "Ghost"}))
        .send(&service)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = TestRequest::put(&format!("/api/admin/intervenants/{bruno}"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({"email": "amelie@example.org"}))
        .send(&service)
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let response = TestRequest::put("/api/admin/intervenants/not-a-uuid")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .json_body(&json!({"firstname": "Ghost"}))
        .send(&service)
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

/// ## Summary
/// Test that deletion removes the row and later lookups say so.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn deleting_removes_the_row() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let id = test_db
        .seed_intervenant("margot@example.org", "Margot", "Faure", "key-margot", future_enddate())
        .await
        .expect("Failed to seed intervenant");

    TestRequest::delete(&format!("/api/admin/intervenants/{id}"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert!(
        test_db
            .get_intervenant(id)
            .await
            .expect("Failed to load intervenant")
            .is_none()
    );

    let response = TestRequest::delete(&format!("/api/admin/intervenants/{id}"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============================================================================
// Key Rotation Tests
// ============================================================================

/// ## Summary
/// Test that rotating one key replaces it and pushes the expiry out.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn rotating_one_key_replaces_it() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let initial_enddate = future_enddate();
    let id = test_db
        .seed_intervenant("margot@example.org", "Margot", "Faure", "key-old", initial_enddate)
        .await
        .expect("Failed to seed intervenant");

    let response = TestRequest::post(&format!("/api/admin/intervenants/{id}/key"))
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await;

    let rotated: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_ne!(rotated["key"], "key-old");

    let row = test_db
        .get_intervenant(id)
        .await
        .expect("Failed to load intervenant")
        .expect("row still exists");
    assert_ne!(row.key, "key-old");
    // Two months out beats the seeded thirty days.
    assert!(row.enddate > initial_enddate);
}

/// ## Summary
/// Test that the bulk rotation touches every row and hands out distinct
/// keys.
#[test_log::test(tokio::test)]
#[ignore = "requires a running PostgreSQL instance"]
async fn rotating_all_keys_covers_every_row() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let service = seeded_admin_service(&test_db).await;

    let mut ids = Vec::new();
    for i in 0..3 {
        let id = test_db
            .seed_intervenant(
                &format!("person{i}@example.org"),
                &format!("Prenom{i}"),
                &format!("Nom{i}"),
                &format!("key-{i}"),
                future_enddate(),
            )
            .await
            .expect("Failed to seed intervenant");
        ids.push(id);
    }

    let response = TestRequest::post("/api/admin/intervenants/keys")
        .basic_auth(ADMIN_EMAIL, ADMIN_PASSWORD)
        .send(&service)
        .await;

    let summary: serde_json::Value = response.assert_status(StatusCode::OK).json();
    assert_eq!(summary["rotated"], 3);

    let mut keys = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        let row = test_db
            .get_intervenant(*id)
            .await
            .expect("Failed to load intervenant")
            .expect("row still exists");
        assert_ne!(row.key, format!("key-{i}"));
        keys.push(row.key);
    }
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 3);
}

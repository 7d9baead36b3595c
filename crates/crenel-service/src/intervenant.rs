//! Administrative management of intervenant accounts and their access keys.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use uuid::Uuid;

use crenel_db::db::connection::DbConnection;
use crenel_db::db::query::intervenant as intervenant_query;
use crenel_db::model::intervenant::{Intervenant, IntervenantChanges, NewIntervenant};

use crate::error::{ServiceError, ServiceResult};

pub use crenel_db::db::query::intervenant::PAGE_SIZE;

/// How long a fresh access key stays valid.
pub const KEY_VALIDITY_MONTHS: u32 = 2;

/// One page of the admin listing.
#[derive(Debug, Clone, Serialize)]
pub struct IntervenantPage {
    pub items: Vec<Intervenant>,
    pub page: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Profile fields an update may touch. `None` leaves the field alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileChanges<'a> {
    pub email: Option<&'a str>,
    pub firstname: Option<&'a str>,
    pub lastname: Option<&'a str>,
    pub enddate: Option<DateTime<Utc>>,
}

fn validate_email(email: &str) -> ServiceResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ServiceError::ValidationError(format!(
            "invalid email address: {email:?}"
        )));
    }
    Ok(())
}

fn validate_name(field: &'static str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::ValidationError(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

fn key_expiry(now: DateTime<Utc>) -> ServiceResult<DateTime<Utc>> {
    now.checked_add_months(Months::new(KEY_VALIDITY_MONTHS))
        .ok_or(ServiceError::InvariantViolation(
            "key expiry date overflowed",
        ))
}

fn page_count(total: i64) -> i64 {
    // Ceiling division; `i64::div_ceil` is still unstable (int_roundings).
    total / PAGE_SIZE + i64::from(total % PAGE_SIZE > 0)
}

/// ## Summary
/// Creates an intervenant with a fresh access key, a two-month expiry, and
/// an empty availability document.
///
/// ## Errors
/// - `ValidationError` for an empty name or a malformed email
/// - `Conflict` if the email is already registered
#[tracing::instrument(skip(conn))]
pub async fn create(
    conn: &mut DbConnection<'_>,
    email: &str,
    firstname: &str,
    lastname: &str,
) -> ServiceResult<Intervenant> {
    validate_email(email)?;
    validate_name("firstname", firstname)?;
    validate_name("lastname", lastname)?;

    if intervenant_query::fetch_by_email(conn, email).await?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "email already registered: {email}"
        )));
    }

    let now = Utc::now();
    let key = Uuid::new_v4().to_string();
    let empty_document = serde_json::json!({});
    let row = NewIntervenant {
        id: Uuid::new_v4(),
        email,
        firstname,
        lastname,
        key: &key,
        creationdate: now,
        enddate: key_expiry(now)?,
        availability: &empty_document,
    };

    let created = intervenant_query::insert(conn, &row).await?;
    tracing::info!(id = %created.id, email = %created.email, "intervenant created");
    Ok(created)
}

/// ## Summary
/// Loads one intervenant by id.
///
/// ## Errors
/// - `NotFound` if no such intervenant exists
#[tracing::instrument(skip(conn))]
pub async fn fetch(conn: &mut DbConnection<'_>, id: Uuid) -> ServiceResult<Intervenant> {
    intervenant_query::fetch_by_id(conn, id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("intervenant {id}")))
}

/// ## Summary
/// Applies a partial profile update. An all-`None` changeset is a no-op
/// that returns the current row.
///
/// ## Errors
/// - `NotFound` if no such intervenant exists
/// - `ValidationError` for an empty name or a malformed email
/// - `Conflict` if the new email belongs to someone else
#[tracing::instrument(skip(conn, changes))]
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &ProfileChanges<'_>,
) -> ServiceResult<Intervenant> {
    if let Some(email) = changes.email {
        validate_email(email)?;
    }
    if let Some(firstname) = changes.firstname {
        validate_name("firstname", firstname)?;
    }
    if let Some(lastname) = changes.lastname {
        validate_name("lastname", lastname)?;
    }

    let Some(current) = intervenant_query::fetch_by_id(conn, id).await? else {
        return Err(ServiceError::NotFound(format!("intervenant {id}")));
    };

    if let Some(email) = changes.email
        && email != current.email
        && intervenant_query::fetch_by_email(conn, email).await?.is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "email already registered: {email}"
        )));
    }

    let row_changes = IntervenantChanges {
        email: changes.email,
        firstname: changes.firstname,
        lastname: changes.lastname,
        enddate: changes.enddate,
    };
    if row_changes.is_empty() {
        return Ok(current);
    }

    let updated = intervenant_query::update(conn, id, &row_changes)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("intervenant {id}")))?;
    tracing::info!(id = %updated.id, "intervenant updated");
    Ok(updated)
}

/// ## Summary
/// Deletes an intervenant and with it the calendar behind their key.
///
/// ## Errors
/// - `NotFound` if no such intervenant exists
#[tracing::instrument(skip(conn))]
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> ServiceResult<()> {
    let removed = intervenant_query::delete(conn, id).await?;
    if removed == 0 {
        return Err(ServiceError::NotFound(format!("intervenant {id}")));
    }
    tracing::info!(%id, "intervenant deleted");
    Ok(())
}

/// ## Summary
/// Loads one page of the admin listing. The filter term matches names,
/// emails, and access keys, case-insensitively; pages are 1-based.
#[tracing::instrument(skip(conn))]
pub async fn list(
    conn: &mut DbConnection<'_>,
    term: &str,
    page: i64,
) -> ServiceResult<IntervenantPage> {
    let page = page.max(1);
    let total = intervenant_query::count_filtered(conn, term).await?;
    let items = intervenant_query::list_page(conn, term, page).await?;
    Ok(IntervenantPage {
        items,
        page,
        total,
        total_pages: page_count(total),
    })
}

/// ## Summary
/// Replaces one intervenant's access key and pushes the expiry two months
/// out. The old key stops resolving immediately.
///
/// ## Errors
/// - `NotFound` if no such intervenant exists
#[tracing::instrument(skip(conn))]
pub async fn regenerate_key(conn: &mut DbConnection<'_>, id: Uuid) -> ServiceResult<Intervenant> {
    let key = Uuid::new_v4().to_string();
    let enddate = key_expiry(Utc::now())?;
    let updated = intervenant_query::regenerate_key(conn, id, &key, enddate)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("intervenant {id}")))?;
    tracing::info!(id = %updated.id, "access key regenerated");
    Ok(updated)
}

/// ## Summary
/// Rotates every access key at once, giving each intervenant a distinct
/// new key and the same fresh expiry. Returns how many keys rotated.
#[tracing::instrument(skip(conn))]
pub async fn regenerate_all_keys(conn: &mut DbConnection<'_>) -> ServiceResult<usize> {
    let enddate = key_expiry(Utc::now())?;
    let rotated = intervenant_query::regenerate_all_keys(conn, enddate).await?;
    Ok(rotated)
}

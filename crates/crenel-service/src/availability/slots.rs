//! Write side: turning concrete calendar selections into document edits.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tracing_unwrap::ResultExt;

use crenel_core::config::Settings;
use crenel_db::db::connection::DbConnection;
use crenel_db::db::query::intervenant as intervenant_query;
use crenel_db::db::revision::document_revision;
use crenel_schedule::schedule::{
    AvailabilityMap, TimeOfDay, WeekKey, WeekNumber, Weekday, add_range, remove_range,
};

use super::calendar::{CalendarView, assemble_view, parse_document, resolve_timezone};
use crate::error::{ServiceError, ServiceResult};

/// A concrete slot the client selected on the calendar grid, as instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSelection {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

type EditFn = fn(&AvailabilityMap, WeekKey, Weekday, TimeOfDay, TimeOfDay) -> AvailabilityMap;

/// ## Summary
/// Derives the document coordinates of a selection: the ISO week it falls
/// in, its weekday, and its wall-clock times, all in the calendar timezone.
fn selection_parts(
    selection: SlotSelection,
    tz: Tz,
) -> ServiceResult<(WeekKey, Weekday, TimeOfDay, TimeOfDay)> {
    let start = selection.start.with_timezone(&tz).naive_local();
    let end = selection.end.with_timezone(&tz).naive_local();

    if end <= start {
        return Err(ServiceError::ValidationError(
            "slot end must come after its start".to_string(),
        ));
    }
    if start.date() != end.date() {
        return Err(ServiceError::ValidationError(
            "a slot must start and end on the same day".to_string(),
        ));
    }

    let week = WeekNumber::of(start.date());
    let weekday = Weekday::from(start.weekday());
    let from = TimeOfDay::from_time(start.time());
    let to = TimeOfDay::from_time(end.time());
    Ok((WeekKey::Week(week), weekday, from, to))
}

/// ## Summary
/// Adds the selected slot to the availability document behind `key` and
/// returns the refreshed calendar view.
///
/// When `expected_revision` is given, the edit only applies while the
/// stored document still carries that tag.
///
/// ## Side Effects
/// Persists the updated document.
///
/// ## Errors
/// - `NotFound` for an unknown key
/// - `KeyExpired` when the key has lapsed
/// - `Conflict` when the revision precondition fails
/// - `ValidationError` for a selection that is empty or spans days
/// - `MalformedDocument` when the stored document does not deserialize
#[tracing::instrument(skip(conn, settings, expected_revision))]
pub async fn add_slot(
    conn: &mut DbConnection<'_>,
    settings: &Settings,
    key: &str,
    selection: SlotSelection,
    expected_revision: Option<&str>,
) -> ServiceResult<CalendarView> {
    apply_edit(conn, settings, key, selection, expected_revision, add_range).await
}

/// ## Summary
/// Removes the selected slot from the availability document behind `key`
/// and returns the refreshed calendar view. Removing a slot nobody stored
/// is a no-op.
///
/// Errors and preconditions match [`add_slot`].
///
/// ## Errors
/// See [`add_slot`].
#[tracing::instrument(skip(conn, settings, expected_revision))]
pub async fn remove_slot(
    conn: &mut DbConnection<'_>,
    settings: &Settings,
    key: &str,
    selection: SlotSelection,
    expected_revision: Option<&str>,
) -> ServiceResult<CalendarView> {
    apply_edit(
        conn,
        settings,
        key,
        selection,
        expected_revision,
        remove_range,
    )
    .await
}

async fn apply_edit(
    conn: &mut DbConnection<'_>,
    settings: &Settings,
    key: &str,
    selection: SlotSelection,
    expected_revision: Option<&str>,
    edit: EditFn,
) -> ServiceResult<CalendarView> {
    let Some(row) = intervenant_query::fetch_by_key(conn, key).await? else {
        return Err(ServiceError::NotFound(format!(
            "no intervenant for key {key}"
        )));
    };

    let now = Utc::now();
    if row.is_expired(now) {
        tracing::debug!(id = %row.id, "rejecting edit through expired key");
        return Err(ServiceError::KeyExpired(key.to_string()));
    }

    if let Some(expected) = expected_revision {
        let current = document_revision(&row.availability);
        if current != expected {
            tracing::debug!(id = %row.id, "revision precondition failed");
            return Err(ServiceError::Conflict(
                "availability document changed since it was loaded".to_string(),
            ));
        }
    }

    let timezone = resolve_timezone(&settings.calendar.timezone)?;
    let (week, weekday, from, to) = selection_parts(selection, timezone)?;

    let map = parse_document(&row.availability)?;
    let updated = edit(&map, week, weekday, from, to);
    let document =
        serde_json::to_value(&updated).expect_or_log("an availability map always serializes");

    let saved = intervenant_query::save_availability(conn, row.id, &document).await?;
    if saved == 0 {
        return Err(ServiceError::NotFound(format!(
            "no intervenant for key {key}"
        )));
    }

    tracing::info!(id = %row.id, week = %week, day = %weekday, "availability document updated");
    assemble_view(&row, &updated, &document, settings, now.date_naive())
}

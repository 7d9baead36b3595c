//! Read side: expanding a stored availability document into calendar
//! events in UTC.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use uuid::Uuid;

use crenel_core::config::Settings;
use crenel_db::db::connection::DbConnection;
use crenel_db::db::query::intervenant as intervenant_query;
use crenel_db::db::revision::document_revision;
use crenel_db::model::intervenant::Intervenant;
use crenel_schedule::schedule::{AvailabilityMap, ExcludedWeeks, ExpansionWindow, expand};

use crate::error::{ServiceError, ServiceResult};

/// One expanded calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Life-cycle state of the access key behind a calendar view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Ok,
    Expired,
}

/// Everything a calendar client needs for one intervenant.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarView {
    pub status: KeyStatus,
    pub firstname: String,
    pub lastname: String,
    pub events: Vec<CalendarEvent>,
    pub revision: String,
}

/// ## Summary
/// Resolves the calendar view behind an access key.
///
/// An expired key still resolves: the view comes back tagged
/// [`KeyStatus::Expired`] with no events, so clients can tell a lapsed key
/// from an unknown one.
///
/// ## Errors
/// - `NotFound` if no intervenant carries the key
/// - `MalformedDocument` if the stored document does not deserialize
/// - Schedule or configuration errors from the expansion itself
#[tracing::instrument(skip(conn, settings))]
pub async fn calendar_view(
    conn: &mut DbConnection<'_>,
    settings: &Settings,
    key: &str,
) -> ServiceResult<CalendarView> {
    let Some(row) = intervenant_query::fetch_by_key(conn, key).await? else {
        return Err(ServiceError::NotFound(format!(
            "no intervenant for key {key}"
        )));
    };

    let now = Utc::now();
    if row.is_expired(now) {
        tracing::debug!(id = %row.id, "access key expired");
        return Ok(CalendarView {
            status: KeyStatus::Expired,
            firstname: row.firstname,
            lastname: row.lastname,
            events: Vec::new(),
            revision: document_revision(&row.availability),
        });
    }

    let map = parse_document(&row.availability)?;
    assemble_view(&row, &map, &row.availability, settings, now.date_naive())
}

/// Deserializes a stored document, strictly: unknown week selectors and
/// malformed times are hard failures, not things to skip over.
pub(super) fn parse_document(document: &serde_json::Value) -> ServiceResult<AvailabilityMap> {
    serde_json::from_value(document.clone())
        .map_err(|error| ServiceError::MalformedDocument(error.to_string()))
}

pub(super) fn assemble_view(
    row: &Intervenant,
    map: &AvailabilityMap,
    document: &serde_json::Value,
    settings: &Settings,
    today: NaiveDate,
) -> ServiceResult<CalendarView> {
    Ok(CalendarView {
        status: KeyStatus::Ok,
        firstname: row.firstname.clone(),
        lastname: row.lastname.clone(),
        events: expanded_events(map, settings, today)?,
        revision: document_revision(document),
    })
}

/// ## Summary
/// Expands `map` over the current academic year, skips the holiday break,
/// and localizes every event from the configured timezone to UTC.
pub(super) fn expanded_events(
    map: &AvailabilityMap,
    settings: &Settings,
    today: NaiveDate,
) -> ServiceResult<Vec<CalendarEvent>> {
    let timezone = resolve_timezone(&settings.calendar.timezone)?;
    let year = settings.calendar.academic_year(today);
    let window = ExpansionWindow::academic_year(year)?;
    let excluded = ExcludedWeeks::holiday_break(year)?;

    let events = expand(map, &window, &excluded)?;
    let mut localized = Vec::with_capacity(events.len());
    for event in events {
        localized.push(CalendarEvent {
            id: event.id,
            title: event.title,
            start: local_to_utc(event.start, timezone)?,
            end: local_to_utc(event.end, timezone)?,
        });
    }
    Ok(localized)
}

pub(super) fn resolve_timezone(name: &str) -> ServiceResult<Tz> {
    name.parse().map_err(|_err| {
        ServiceError::InvalidConfiguration(format!("unknown calendar timezone: {name}"))
    })
}

/// ## Summary
/// Converts a wall-clock time in `tz` to UTC. The first occurrence wins in
/// a DST fold; times inside a spring-forward gap shift ahead one hour.
///
/// ## Errors
/// Returns an error if the shifted time still does not exist.
pub(super) fn local_to_utc(local: NaiveDateTime, tz: Tz) -> ServiceResult<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, _second) => Ok(first.with_timezone(&Utc)),
        LocalResult::None => {
            let shifted = local + Duration::hours(1);
            match tz.from_local_datetime(&shifted) {
                LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                LocalResult::Ambiguous(first, _second) => Ok(first.with_timezone(&Utc)),
                LocalResult::None => Err(ServiceError::ValidationError(format!(
                    "time {local} does not exist in timezone {tz}"
                ))),
            }
        }
    }
}

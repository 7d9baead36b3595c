//! Expansion of the stored weekly document into dated calendar events.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use super::model::{AvailabilityMap, AvailabilityRule, Event};
use super::week::{iso_week_of, week_start};
use super::window::{ExcludedWeeks, ExpansionWindow};
use crate::error::{ScheduleError, ScheduleResult};

/// ## Summary
/// Expands the stored document into every concrete event inside `window`,
/// sorted by `(start, end)`.
///
/// Weeks are visited Monday to Monday starting at the week containing
/// `window.start`. Each week resolves to its explicit `S<n>` entry or the
/// `default` fallback; weeks in `excluded` contribute nothing. Dates falling
/// outside the window bounds (the partial first and last weeks) are dropped.
///
/// Event ids are freshly generated on every call: two expansions of the same
/// document agree on everything but the ids.
///
/// ## Errors
/// Returns an error if date arithmetic leaves the representable calendar
/// range.
pub fn expand(
    availability: &AvailabilityMap,
    window: &ExpansionWindow,
    excluded: &ExcludedWeeks,
) -> ScheduleResult<Vec<Event>> {
    let mut events = Vec::new();
    let mut monday = week_start(window.start);

    while monday <= window.end {
        let (iso_year, week_number) = iso_week_of(monday);

        if excluded.contains(iso_year, week_number) {
            tracing::trace!(%monday, iso_year, week = week_number.get(), "skipping excluded week");
            monday = next_monday(monday)?;
            continue;
        }

        if let Some(rules) = availability.rules_for_week(week_number) {
            for rule in rules {
                expand_rule_for_week(rule, monday, window, &mut events)?;
            }
        }

        monday = next_monday(monday)?;
    }

    events.sort_by_key(|event| (event.start, event.end));

    Ok(events)
}

/// Emits one event per recognized weekday of `rule` landing inside the
/// window during the week starting at `monday`.
fn expand_rule_for_week(
    rule: &AvailabilityRule,
    monday: NaiveDate,
    window: &ExpansionWindow,
    events: &mut Vec<Event>,
) -> ScheduleResult<()> {
    for weekday in rule.weekdays() {
        let date = monday
            .checked_add_days(Days::new(u64::from(weekday.offset_from_monday())))
            .ok_or(ScheduleError::DateOverflow(monday))?;

        if !window.contains(date) {
            continue;
        }

        events.push(Event {
            id: Uuid::new_v4(),
            title: rule.title(),
            start: date.and_time(rule.from.as_time()),
            end: date.and_time(rule.to.as_time()),
        });
    }

    Ok(())
}

fn next_monday(monday: NaiveDate) -> ScheduleResult<NaiveDate> {
    monday
        .checked_add_days(Days::new(7))
        .ok_or(ScheduleError::DateOverflow(monday))
}

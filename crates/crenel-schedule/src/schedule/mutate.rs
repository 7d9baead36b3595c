//! Pure mutations of the stored document: range addition and removal.
//!
//! Both operations return a fresh copy of the whole document; callers
//! persist it wholesale (read-modify-write).

use super::model::{AvailabilityMap, AvailabilityRule, TimeOfDay, WeekKey};
use super::week::Weekday;

/// ## Summary
/// Returns a copy of the document with a new single-day rule appended under
/// `week`, creating the entry when absent.
///
/// Overlapping or adjacent ranges are left as independent rules; selections
/// are recorded exactly as made, never merged or deduplicated.
#[must_use]
pub fn add_range(
    availability: &AvailabilityMap,
    week: WeekKey,
    weekday: Weekday,
    from: TimeOfDay,
    to: TimeOfDay,
) -> AvailabilityMap {
    let mut updated = availability.clone();
    updated
        .weeks
        .entry(week)
        .or_default()
        .push(AvailabilityRule::single_day(weekday, from, to));
    updated
}

/// ## Summary
/// Returns a copy of the document with `weekday` removed from every rule
/// under `week` whose time range matches `from`/`to` exactly.
///
/// Only the matching weekday token is removed, so a multi-day rule keeps its
/// other days (and any unrecognized tokens). A rule left with no tokens is
/// dropped, and a week left with no rules has its key deleted — an empty
/// list must never mask the `default` schedule. Everything that does not
/// match is preserved verbatim.
#[must_use]
pub fn remove_range(
    availability: &AvailabilityMap,
    week: WeekKey,
    weekday: Weekday,
    from: TimeOfDay,
    to: TimeOfDay,
) -> AvailabilityMap {
    let mut updated = availability.clone();

    let Some(rules) = updated.weeks.get_mut(&week) else {
        return updated;
    };

    rules.retain_mut(|rule| {
        if !rule.covers_range(from, to) {
            return true;
        }

        let mut removed = false;
        let kept: Vec<&str> = rule
            .days
            .split(',')
            .filter(|token| {
                if Weekday::parse(token) == Some(weekday) {
                    removed = true;
                    false
                } else {
                    true
                }
            })
            .collect();

        if !removed {
            return true;
        }
        if kept.is_empty() {
            return false;
        }

        let rebuilt = kept.join(",");
        rule.days = rebuilt;
        true
    });

    if rules.is_empty() {
        updated.weeks.remove(&week);
    }

    updated
}

//! Stored availability document model.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::week::{WeekNumber, Weekday};
use crate::error::{ScheduleError, ScheduleResult};

/// Minute-precision time of day, rendered as `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    #[must_use]
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parses a 24-hour `HH:mm` time.
    ///
    /// ## Errors
    /// Returns an error if the string is not a valid `HH:mm` time of day.
    pub fn parse(s: &str) -> ScheduleResult<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .ok()
            .map(Self)
            .ok_or_else(|| ScheduleError::InvalidTime(s.to_string()))
    }

    /// Truncates a full time to the minute precision the document stores.
    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        Self::new(time.hour(), time.minute()).expect("hour and minute come from a valid time")
    }

    #[must_use]
    pub const fn as_time(self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl Visitor<'_> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a time of day in HH:mm form")
            }

            fn visit_str<E>(self, v: &str) -> Result<TimeOfDay, E>
            where
                E: de::Error,
            {
                TimeOfDay::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// Week selector of the stored document: the `default` fallback entry or an
/// explicit `S<n>` entry for one ISO week.
///
/// The ordering places `Default` before any explicit week, which keeps the
/// serialized document canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WeekKey {
    Default,
    Week(WeekNumber),
}

impl WeekKey {
    /// Parses a stored week selector: `default` or `S<n>` with `n` in 1..=53.
    ///
    /// ## Errors
    /// Returns an error for any other key, so documents carrying unknown
    /// selectors fail loudly instead of silently dropping entries.
    pub fn parse(s: &str) -> ScheduleResult<Self> {
        if s == "default" {
            return Ok(Self::Default);
        }
        s.strip_prefix('S')
            .and_then(|digits| digits.parse::<u8>().ok())
            .and_then(WeekNumber::new)
            .map(Self::Week)
            .ok_or_else(|| ScheduleError::InvalidWeekKey(s.to_string()))
    }
}

// The `S<n>` string construction lives at this serde boundary and nowhere
// else.
impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Week(week) => write!(f, "S{week}"),
        }
    }
}

impl Serialize for WeekKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct WeekKeyVisitor;

        impl Visitor<'_> for WeekKeyVisitor {
            type Value = WeekKey;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("\"default\" or \"S<week>\"")
            }

            fn visit_str<E>(self, v: &str) -> Result<WeekKey, E>
            where
                E: de::Error,
            {
                WeekKey::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(WeekKeyVisitor)
    }
}

/// One recurring weekly rule: a raw day-token list and a time range.
///
/// `days` is a comma-delimited list of weekday tokens evaluated independently
/// (e.g. `"lundi,mercredi"`). The raw string round-trips storage unchanged;
/// tokens that do not name a weekday are skipped during expansion but never
/// rewritten. `from < to` is intended but not enforced: `from == to`
/// describes a degenerate zero-length slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub days: String,
    pub from: TimeOfDay,
    pub to: TimeOfDay,
}

impl AvailabilityRule {
    /// Rule covering a single weekday.
    #[must_use]
    pub fn single_day(weekday: Weekday, from: TimeOfDay, to: TimeOfDay) -> Self {
        Self {
            days: weekday.as_str().to_string(),
            from,
            to,
        }
    }

    /// The recognized weekdays in `days`, in token order. Unknown tokens are
    /// skipped.
    pub fn weekdays(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.days.split(',').filter_map(Weekday::parse)
    }

    /// Whether the rule covers this exact time range (minute equality, no
    /// tolerance window).
    #[must_use]
    pub fn covers_range(&self, from: TimeOfDay, to: TimeOfDay) -> bool {
        self.from == from && self.to == to
    }

    /// Display title for events expanded from this rule.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Disponibilité ({} - {})", self.from, self.to)
    }
}

/// The stored availability document: week selector → ordered rule list.
///
/// Backed by a `BTreeMap` so serialization is deterministic (`default`
/// first, explicit weeks ascending), which the revision-tag scheme relies
/// on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityMap {
    pub(crate) weeks: BTreeMap<WeekKey, Vec<AvailabilityRule>>,
}

impl AvailabilityMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Rules stored directly under `key`, without fallback.
    #[must_use]
    pub fn rules(&self, key: WeekKey) -> Option<&[AvailabilityRule]> {
        self.weeks.get(&key).map(Vec::as_slice)
    }

    /// Rules effective for `week`: the explicit `S<week>` entry when present,
    /// otherwise the `default` entry. An explicit entry masks the fallback
    /// even when its rule list is empty.
    #[must_use]
    pub fn rules_for_week(&self, week: WeekNumber) -> Option<&[AvailabilityRule]> {
        self.rules(WeekKey::Week(week))
            .or_else(|| self.rules(WeekKey::Default))
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (WeekKey, &[AvailabilityRule])> {
        self.weeks.iter().map(|(key, rules)| (*key, rules.as_slice()))
    }
}

impl FromIterator<(WeekKey, Vec<AvailabilityRule>)> for AvailabilityMap {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (WeekKey, Vec<AvailabilityRule>)>,
    {
        Self {
            weeks: iter.into_iter().collect(),
        }
    }
}

/// A concrete calendar event derived from the stored document. Never
/// persisted; regenerated on every expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

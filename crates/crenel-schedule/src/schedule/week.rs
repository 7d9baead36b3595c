//! ISO-8601 week helpers and the French weekday vocabulary of stored
//! documents.

use chrono::{Datelike, Days, NaiveDate};

/// Weekday, named by the lowercase French tokens stored documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Returns the storage token for this weekday.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "lundi",
            Self::Tuesday => "mardi",
            Self::Wednesday => "mercredi",
            Self::Thursday => "jeudi",
            Self::Friday => "vendredi",
            Self::Saturday => "samedi",
            Self::Sunday => "dimanche",
        }
    }

    /// Parses a weekday from a stored day token (trimmed, case-insensitive).
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "lundi" => Some(Self::Monday),
            "mardi" => Some(Self::Tuesday),
            "mercredi" => Some(Self::Wednesday),
            "jeudi" => Some(Self::Thursday),
            "vendredi" => Some(Self::Friday),
            "samedi" => Some(Self::Saturday),
            "dimanche" => Some(Self::Sunday),
            _ => None,
        }
    }

    /// Zero-based offset from Monday, the start of the ISO week.
    #[must_use]
    pub const fn offset_from_monday(self) -> u8 {
        match self {
            Self::Monday => 0,
            Self::Tuesday => 1,
            Self::Wednesday => 2,
            Self::Thursday => 3,
            Self::Friday => 4,
            Self::Saturday => 5,
            Self::Sunday => 6,
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated ISO-8601 week number (1..=53).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekNumber(u8);

impl WeekNumber {
    /// Creates a week number, rejecting values outside 1..=53.
    #[must_use]
    pub fn new(week: u8) -> Option<Self> {
        (1..=53).contains(&week).then_some(Self(week))
    }

    /// The ISO week number `date` falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "ISO week numbers are always in 1..=53"
        )]
        let week = date.iso_week().week() as u8;
        Self(week)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for WeekNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ## Summary
/// The (ISO year, ISO week) pair `date` falls in. The ISO year differs from
/// the calendar year around the new year: 2024-12-30 is week 1 of 2025.
#[must_use]
pub fn iso_week_of(date: NaiveDate) -> (i32, WeekNumber) {
    (date.iso_week().year(), WeekNumber::of(date))
}

/// ## Summary
/// Monday of the ISO week containing `date`, clamped at the calendar range.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MIN)
}

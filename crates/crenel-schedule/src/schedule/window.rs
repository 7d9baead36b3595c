//! Expansion window and excluded-week policy.
//!
//! Both are explicit data handed to `expand`: the window is fixed display
//! policy parameterized by year, and exclusions are a concrete set of
//! (ISO year, week) pairs rather than inline date arithmetic at call sites.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use super::week::{WeekNumber, iso_week_of};
use crate::error::{ScheduleError, ScheduleResult};

/// Inclusive date range events are expanded over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ExpansionWindow {
    /// ## Summary
    /// The display window for one academic year: September 2 of `start_year`
    /// through June 30 of the following year.
    ///
    /// ## Errors
    /// Returns an error when `start_year` falls outside the representable
    /// calendar range.
    pub fn academic_year(start_year: i32) -> ScheduleResult<Self> {
        let out_of_range =
            || ScheduleError::InvalidWindow(format!("academic year {start_year} is out of range"));

        let start = NaiveDate::from_ymd_opt(start_year, 9, 2).ok_or_else(out_of_range)?;
        let end = start_year
            .checked_add(1)
            .and_then(|year| NaiveDate::from_ymd_opt(year, 6, 30))
            .ok_or_else(out_of_range)?;

        Ok(Self { start, end })
    }

    /// Whether `date` lies inside the window, bounds included.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Set of (ISO year, ISO week) pairs skipped entirely during expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedWeeks {
    weeks: BTreeSet<(i32, WeekNumber)>,
}

impl ExcludedWeeks {
    /// No exclusions.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// ## Summary
    /// The winter holiday break around the turn of `boundary_year`: ISO week
    /// 52 of that year plus the immediately following ISO week — week 53 of
    /// the same ISO year when it has one, week 1 of the next otherwise.
    ///
    /// ## Errors
    /// Returns an error when `boundary_year` falls outside the representable
    /// calendar range.
    pub fn holiday_break(boundary_year: i32) -> ScheduleResult<Self> {
        let out_of_range = || {
            ScheduleError::InvalidWindow(format!(
                "holiday break year {boundary_year} is out of range"
            ))
        };

        // Every ISO year has at least 52 weeks.
        let break_start = NaiveDate::from_isoywd_opt(boundary_year, 52, chrono::Weekday::Mon)
            .ok_or_else(out_of_range)?;
        let following = break_start
            .checked_add_days(Days::new(7))
            .ok_or_else(out_of_range)?;

        Ok([iso_week_of(break_start), iso_week_of(following)]
            .into_iter()
            .collect())
    }

    /// Whether the week identified by the (ISO year, week) pair is excluded.
    #[must_use]
    pub fn contains(&self, iso_year: i32, week: WeekNumber) -> bool {
        self.weeks.contains(&(iso_year, week))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

impl FromIterator<(i32, WeekNumber)> for ExcludedWeeks {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (i32, WeekNumber)>,
    {
        Self {
            weeks: iter.into_iter().collect(),
        }
    }
}

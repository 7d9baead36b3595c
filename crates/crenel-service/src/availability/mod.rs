//! Availability calendars behind access keys: the read side expands the
//! stored document into concrete events, the write side turns calendar
//! selections into document edits.

mod calendar;
mod slots;

pub use calendar::{CalendarEvent, CalendarView, KeyStatus, calendar_view};
pub use slots::{SlotSelection, add_slot, remove_slot};

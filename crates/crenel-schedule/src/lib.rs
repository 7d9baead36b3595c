//! Recurring weekly availability: the stored-document model, ISO-week
//! helpers, window policy, and the expansion into concrete calendar events.

pub mod error;
pub mod schedule;

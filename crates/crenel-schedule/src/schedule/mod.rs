//! Availability schedule domain model.
//!
//! The persisted document maps week selectors (`default` or `S<n>`) to lists
//! of weekly rules. These types are designed for:
//! - Round-trip fidelity: the raw `days` token list survives storage untouched
//! - Deterministic serialization: canonical key ordering for stable revision tags
//! - Type safety: week keys and times are validated at the serde boundary

mod expand;
mod model;
mod mutate;
mod week;
mod window;

pub use expand::expand;
pub use model::{AvailabilityMap, AvailabilityRule, Event, TimeOfDay, WeekKey};
pub use mutate::{add_range, remove_range};
pub use week::{WeekNumber, Weekday, iso_week_of, week_start};
pub use window::{ExcludedWeeks, ExpansionWindow};

use chrono::NaiveDate;
use thiserror::Error;

/// Schedule domain errors
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid week key: {0}")]
    InvalidWeekKey(String),

    #[error("Invalid expansion window: {0}")]
    InvalidWindow(String),

    #[error("Date arithmetic overflow in the week of {0}")]
    DateOverflow(NaiveDate),
}

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;

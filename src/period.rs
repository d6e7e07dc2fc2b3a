//! Mapping calendar dates onto index periods.
//!
//! An index period is a calendar month, always represented by its first day.
//! A closing date is valued at its own month. An origin date is valued at the
//! month before it, since the index for the month of the purchase is not yet
//! settled when the purchase happens.

use chrono::{Datelike, Duration, NaiveDate};

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

pub fn closing_period(closing_date: NaiveDate) -> NaiveDate {
    month_start(closing_date)
}

/// First day of the month preceding `origin_date`'s month.
///
/// Only `None` for dates in the very first month chrono can represent.
pub fn origin_period(origin_date: NaiveDate) -> Option<NaiveDate> {
    let last_of_previous = month_start(origin_date).pred_opt()?;
    Some(month_start(last_of_previous))
}

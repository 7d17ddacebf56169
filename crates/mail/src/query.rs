//! Search-filter construction
//!
//! Builds the Gmail search string for the unread view: an unread
//! predicate plus a date lower bound derived from the selected range.

use chrono::{Days, Months, NaiveDate};

/// Time window for the unread search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    #[default]
    Week,
    Month,
}

impl TimeRange {
    /// Lower-bound date for a search running on `today`.
    ///
    /// Week is exactly seven days back. Month is one calendar month
    /// back, clamping to the last valid day when the source day does
    /// not exist in the target month (2024-03-31 becomes 2024-02-29).
    pub fn lower_bound(self, today: NaiveDate) -> NaiveDate {
        match self {
            TimeRange::Week => today.checked_sub_days(Days::new(7)).unwrap_or(today),
            TimeRange::Month => today.checked_sub_months(Months::new(1)).unwrap_or(today),
        }
    }
}

/// Build the Gmail filter string for `range` as of `today`.
///
/// Deterministic: the same inputs always produce the same string. The
/// date is zero-padded year/month/day.
pub fn build_filter(range: TimeRange, today: NaiveDate) -> String {
    format!(
        "is:unread after:{}",
        range.lower_bound(today).format("%Y/%m/%d")
    )
}

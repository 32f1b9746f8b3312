//! Date helpers for upstream queries.

use chrono::{Days, FixedOffset, NaiveDate, Utc};

/// Upstream date format, `DD.MM.YYYY`.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Format a date the way upstream expects it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Current date in a timezone `offset_hours` east of UTC.
///
/// Falls back to the UTC date for offsets chrono refuses.
pub fn today_at_offset(offset_hours: i32) -> NaiveDate {
    let now = Utc::now();
    match FixedOffset::east_opt(offset_hours * 3600) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

/// Inclusive range ending on `today` and starting `days` days earlier.
pub fn history_window(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

//! Quota period math.
//!
//! Usage counters are keyed by `(user, period_start, period_end)` where the
//! period is the UTC day: `[today, tomorrow)` as DATE columns. Counters for
//! a new period are created lazily on first use.

use chrono::{Days, NaiveDate};

use crate::types::Timestamp;

/// The daily usage window containing `now`.
pub fn daily_period(now: Timestamp) -> (NaiveDate, NaiveDate) {
    let start = now.date_naive();
    let end = start + Days::new(1);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn period_is_the_utc_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        let (start, end) = daily_period(now);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn period_rolls_over_month_ends() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap();
        let (start, end) = daily_period(now);
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
    }
}

//! Visible date ranges and navigation for each granularity

use crate::clock::Clock;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Cells in the month grid: six full weeks
pub const MONTH_GRID_DAYS: usize = 42;

/// The navigation unit of the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
}

impl Granularity {
    pub fn as_key(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            "month" => Some(Granularity::Month),
            _ => None,
        }
    }

    /// Whether events are laid out on a 24-hour column
    pub fn is_timed(self) -> bool {
        !matches!(self, Granularity::Month)
    }
}

/// One visible date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDay {
    pub date: NaiveDate,
    /// False only for month-grid lead/trail days from adjacent months
    pub in_current_month: bool,
}

/// Monday on or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    // Sunday = 0, so Monday lands on offset 0
    let offset = (date.weekday().num_days_from_sunday() + 6) % 7;
    date - Duration::days(offset as i64)
}

/// Ordered dates to display for `anchor`
pub fn days_in_view(anchor: NaiveDate, granularity: Granularity) -> Vec<ViewDay> {
    match granularity {
        Granularity::Day => vec![ViewDay {
            date: anchor,
            in_current_month: true,
        }],
        Granularity::Week => {
            let monday = week_start(anchor);
            (0..7)
                .map(|i| ViewDay {
                    date: monday + Duration::days(i),
                    in_current_month: true,
                })
                .collect()
        }
        Granularity::Month => {
            let first = anchor.with_day(1).unwrap_or(anchor);
            let start = week_start(first);
            (0..MONTH_GRID_DAYS as i64)
                .map(|i| {
                    let date = start + Duration::days(i);
                    ViewDay {
                        date,
                        in_current_month: is_same_month(date, anchor),
                    }
                })
                .collect()
        }
    }
}

/// Just the dates of `days_in_view`
pub fn dates_in_view(anchor: NaiveDate, granularity: Granularity) -> Vec<NaiveDate> {
    days_in_view(anchor, granularity)
        .into_iter()
        .map(|day| day.date)
        .collect()
}

/// Move the anchor by `delta` units.
///
/// Months clamp the day to the target month's length (Jan 31 + 1 month =
/// Feb 28/29), instead of rolling over into the following month.
pub fn shift(anchor: NaiveDate, granularity: Granularity, delta: i32) -> NaiveDate {
    let shifted = match granularity {
        Granularity::Day => anchor.checked_add_signed(Duration::days(delta as i64)),
        Granularity::Week => anchor.checked_add_signed(Duration::weeks(delta as i64)),
        Granularity::Month => {
            let months = Months::new(delta.unsigned_abs());
            if delta >= 0 {
                anchor.checked_add_months(months)
            } else {
                anchor.checked_sub_months(months)
            }
        }
    };

    shifted.unwrap_or_else(|| {
        tracing::warn!(%anchor, delta, granularity = granularity.as_key(), "date shift out of range");
        anchor
    })
}

pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

pub fn is_same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

pub fn is_today(date: NaiveDate, clock: &dyn Clock) -> bool {
    is_same_day(date, clock.today())
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether the period shown for `anchor` includes today.
/// Month compares calendar months, so lead/trail days do not count.
pub fn contains_today(anchor: NaiveDate, granularity: Granularity, clock: &dyn Clock) -> bool {
    let today = clock.today();
    match granularity {
        Granularity::Day => is_same_day(anchor, today),
        Granularity::Week => week_start(anchor) == week_start(today),
        Granularity::Month => is_same_month(anchor, today),
    }
}

/// Split the month grid into rows of seven
pub fn weeks(days: &[ViewDay]) -> Vec<&[ViewDay]> {
    days.chunks(7).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock_on(d: NaiveDate) -> FixedClock {
        FixedClock::new(d.and_hms_opt(12, 0, 0).unwrap())
    }

    #[test]
    fn test_day_view_is_anchor() {
        let days = days_in_view(date(2024, 3, 10), Granularity::Day);
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, date(2024, 3, 10));
    }

    #[test]
    fn test_week_view_monday_to_sunday() {
        // Every weekday of a few weeks, including year boundaries
        let mut anchor = date(2023, 12, 25);
        while anchor <= date(2024, 1, 14) {
            let dates = dates_in_view(anchor, Granularity::Week);
            assert_eq!(dates.len(), 7);
            assert_eq!(dates[0].weekday(), Weekday::Mon);
            assert!(dates.contains(&anchor));
            for pair in dates.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::days(1));
            }
            anchor += Duration::days(1);
        }
    }

    #[test]
    fn test_week_of_sunday_starts_previous_monday() {
        let dates = dates_in_view(date(2024, 3, 10), Granularity::Week);
        assert_eq!(dates[0], date(2024, 3, 4));
        assert_eq!(dates[6], date(2024, 3, 10));
    }

    #[test]
    fn test_month_grid_always_42_days() {
        for month in 1..=12 {
            for year in [2023, 2024, 2026] {
                let anchor = date(year, month, 15);
                let days = days_in_view(anchor, Granularity::Month);
                assert_eq!(days.len(), MONTH_GRID_DAYS);
                assert_eq!(days[0].date.weekday(), Weekday::Mon);
                assert!(days.iter().any(|d| d.date == date(year, month, 1)));
                for day in &days {
                    assert_eq!(day.in_current_month, day.date.month() == month);
                }
            }
        }
    }

    #[test]
    fn test_month_grid_lead_and_trail_days() {
        // March 2024 starts on a Friday
        let days = days_in_view(date(2024, 3, 20), Granularity::Month);
        assert_eq!(days[0].date, date(2024, 2, 26));
        assert!(!days[0].in_current_month);
        assert_eq!(days[4].date, date(2024, 3, 1));
        assert!(days[4].in_current_month);
        assert_eq!(days[41].date, date(2024, 4, 7));
        assert!(!days[41].in_current_month);
    }

    #[test]
    fn test_month_starting_on_monday_has_no_lead() {
        // April 2024 starts on a Monday and still gets six rows
        let days = days_in_view(date(2024, 4, 1), Granularity::Month);
        assert_eq!(days[0].date, date(2024, 4, 1));
        assert_eq!(days[41].date, date(2024, 5, 12));
        assert_eq!(weeks(&days).len(), 6);
    }

    #[test]
    fn test_shift_day_and_week() {
        assert_eq!(shift(date(2024, 2, 28), Granularity::Day, 1), date(2024, 2, 29));
        assert_eq!(shift(date(2024, 3, 1), Granularity::Day, -1), date(2024, 2, 29));
        assert_eq!(shift(date(2024, 12, 30), Granularity::Week, 1), date(2025, 1, 6));
        assert_eq!(shift(date(2024, 1, 3), Granularity::Week, -1), date(2023, 12, 27));
    }

    #[test]
    fn test_shift_month_clamps_day() {
        assert_eq!(shift(date(2024, 1, 31), Granularity::Month, 1), date(2024, 2, 29));
        assert_eq!(shift(date(2023, 1, 31), Granularity::Month, 1), date(2023, 2, 28));
        assert_eq!(shift(date(2024, 3, 31), Granularity::Month, -1), date(2024, 2, 29));
        assert_eq!(shift(date(2024, 12, 15), Granularity::Month, 1), date(2025, 1, 15));
        assert_eq!(shift(date(2024, 1, 15), Granularity::Month, -1), date(2023, 12, 15));
    }

    #[test]
    fn test_same_day_and_today() {
        let clock = clock_on(date(2024, 3, 10));
        assert!(is_today(date(2024, 3, 10), &clock));
        assert!(!is_today(date(2024, 3, 11), &clock));
        assert!(is_same_day(date(2024, 3, 10), date(2024, 3, 10)));
    }

    #[test]
    fn test_contains_today() {
        let clock = clock_on(date(2024, 3, 10));
        assert!(contains_today(date(2024, 3, 4), Granularity::Week, &clock));
        assert!(!contains_today(date(2024, 3, 11), Granularity::Week, &clock));
        assert!(contains_today(date(2024, 3, 31), Granularity::Month, &clock));
        // Feb grid shows March 1-10 as trail days, still not the current month
        assert!(!contains_today(date(2024, 2, 10), Granularity::Month, &clock));
        assert!(!contains_today(date(2024, 3, 9), Granularity::Day, &clock));
    }

    #[test]
    fn test_weekend() {
        assert!(is_weekend(date(2024, 3, 9)));
        assert!(is_weekend(date(2024, 3, 10)));
        assert!(!is_weekend(date(2024, 3, 11)));
    }

    #[test]
    fn test_granularity_keys() {
        for g in [Granularity::Day, Granularity::Week, Granularity::Month] {
            assert_eq!(Granularity::from_key(g.as_key()), Some(g));
        }
        assert_eq!(Granularity::from_key(" Week "), Some(Granularity::Week));
        assert_eq!(Granularity::from_key("year"), None);
    }
}

//! Clock-time arithmetic and fixed-locale date labels

use crate::error::{PlannerError, Result};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Hours in the day column
pub const HOURS_PER_DAY: f64 = 24.0;

/// Convert an "HH:MM" clock time to hours since midnight.
///
/// Anything other than two colon-separated integers is `InvalidFormat`.
/// Values are not range-checked: "25:90" converts to 26.5.
pub fn to_fractional_hour(time: &str) -> Result<f64> {
    let (hours, minutes) = time
        .trim()
        .split_once(':')
        .ok_or_else(|| PlannerError::invalid_time(time))?;

    let hours = parse_component(hours).ok_or_else(|| PlannerError::invalid_time(time))?;
    let minutes = parse_component(minutes).ok_or_else(|| PlannerError::invalid_time(time))?;

    Ok(hours as f64 + minutes as f64 / 60.0)
}

fn parse_component(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Fractional hour of a wall-clock time, minute resolution
pub fn fractional_hour_of(time: NaiveTime) -> f64 {
    time.hour() as f64 + time.minute() as f64 / 60.0
}

/// Ascending by start hour. Untimed entries (`None`) sort before timed ones.
pub fn compare_by_start(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.total_cmp(&b),
    }
}

/// Sort by start hour, keeping insertion order for equal starts.
/// `sort_by` is a stable merge sort, so ties never reorder.
pub fn sort_by_start<T>(items: &mut [T], start: impl Fn(&T) -> Option<f64>) {
    items.sort_by(|a, b| compare_by_start(start(a), start(b)));
}

/// Canonical `YYYY-MM-DD` key a record's stored date must match
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Label language. Tables are fixed so output never depends on the host locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    English,
    Russian,
}

const EN_WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];
const EN_WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const RU_WEEKDAYS: [&str; 7] = [
    "Понедельник", "Вторник", "Среда", "Четверг", "Пятница", "Суббота", "Воскресенье",
];
const RU_WEEKDAYS_SHORT: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];
const RU_MONTHS: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь",
    "Июль", "Август", "Сентябрь", "Октябрь", "Ноябрь", "Декабрь",
];
// Genitive forms, used after a day number ("10 Марта")
const RU_MONTHS_GENITIVE: [&str; 12] = [
    "Января", "Февраля", "Марта", "Апреля", "Мая", "Июня",
    "Июля", "Августа", "Сентября", "Октября", "Ноября", "Декабря",
];

impl Locale {
    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        let idx = weekday.num_days_from_monday() as usize;
        match self {
            Locale::English => EN_WEEKDAYS[idx],
            Locale::Russian => RU_WEEKDAYS[idx],
        }
    }

    pub fn weekday_short(self, weekday: Weekday) -> &'static str {
        let idx = weekday.num_days_from_monday() as usize;
        match self {
            Locale::English => EN_WEEKDAYS_SHORT[idx],
            Locale::Russian => RU_WEEKDAYS_SHORT[idx],
        }
    }

    pub fn month_name(self, date: NaiveDate) -> &'static str {
        let idx = date.month0() as usize;
        match self {
            Locale::English => EN_MONTHS[idx],
            Locale::Russian => RU_MONTHS[idx],
        }
    }

    fn month_name_after_day(self, date: NaiveDate) -> &'static str {
        match self {
            Locale::English => EN_MONTHS[date.month0() as usize],
            Locale::Russian => RU_MONTHS_GENITIVE[date.month0() as usize],
        }
    }

    /// Day view header, e.g. "10 March 2024, Sunday"
    pub fn format_day(self, date: NaiveDate) -> String {
        format!(
            "{} {} {}, {}",
            date.day(),
            self.month_name_after_day(date),
            date.year(),
            self.weekday_name(date.weekday())
        )
    }

    /// Week view header, e.g. "March, week 4–10". The month is the Monday's.
    pub fn format_week(self, monday: NaiveDate, sunday: NaiveDate) -> String {
        let week_word = match self {
            Locale::English => "week",
            Locale::Russian => "неделя",
        };
        format!(
            "{}, {} {}–{}",
            self.month_name_after_day(monday),
            week_word,
            monday.day(),
            sunday.day()
        )
    }

    /// Month view header, e.g. "March 2024"
    pub fn format_month(self, date: NaiveDate) -> String {
        format!("{} {}", self.month_name(date), date.year())
    }

    pub fn today_label(self) -> &'static str {
        match self {
            Locale::English => "Today",
            Locale::Russian => "Сегодня",
        }
    }

    /// Month cell overflow marker
    pub fn more_label(self, count: usize) -> String {
        match self {
            Locale::English => format!("+{} more", count),
            Locale::Russian => format!("еще {}...", count),
        }
    }
}

/// Labels for the time column. Midnight has no label.
pub fn hour_labels() -> Vec<Option<String>> {
    (0..24)
        .map(|hour| (hour > 0).then(|| format!("{:02}:00", hour)))
        .collect()
}

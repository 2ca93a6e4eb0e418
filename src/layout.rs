//! Geometry for the 24-hour grid and month cells

use crate::error::PlannerError;
use crate::projection::CalendarEvent;
use crate::time::HOURS_PER_DAY;

/// Smallest height an event box may have, in percent of the day column
pub const MIN_HEIGHT_PERCENT: f64 = 2.0;

/// Events shown in a month cell before collapsing into "+N more"
pub const MONTH_CELL_MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub min_height_percent: f64,
    pub month_cell_max_visible: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_height_percent: MIN_HEIGHT_PERCENT,
            month_cell_max_visible: MONTH_CELL_MAX_VISIBLE,
        }
    }
}

/// Vertical placement within a day column, both in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventBox {
    pub top_percent: f64,
    pub height_percent: f64,
}

impl EventBox {
    pub fn bottom_percent(&self) -> f64 {
        self.top_percent + self.height_percent
    }
}

/// Percent offset of a fractional hour from the top of the column
pub fn hour_to_percent(hour: f64) -> f64 {
    (hour / HOURS_PER_DAY) * 100.0
}

/// Box for a timed event, or `None` for an untimed one
pub fn position(event: &CalendarEvent, config: &LayoutConfig) -> Option<EventBox> {
    let start = event.start_hour?;
    let end = event.end_hour.unwrap_or(start);

    let mut duration = end - start;
    if duration < 0.0 {
        let error = PlannerError::InvalidRange(format!(
            "{} ends at {} before it starts at {}",
            event.id, event.end_time, event.start_time
        ));
        tracing::warn!(event_id = %event.id, %error, "flooring event height");
        duration = 0.0;
    }

    Some(EventBox {
        top_percent: hour_to_percent(start),
        height_percent: hour_to_percent(duration).max(config.min_height_percent),
    })
}

/// What a fixed-height month cell shows
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCell<'a> {
    pub visible: Vec<CalendarEvent<'a>>,
    pub overflow_count: usize,
}

/// First `max_visible` events in projection order, plus how many were cut
pub fn month_cell_content<'a>(events: Vec<CalendarEvent<'a>>, max_visible: usize) -> MonthCell<'a> {
    let overflow_count = events.len().saturating_sub(max_visible);
    let mut visible = events;
    visible.truncate(max_visible);
    MonthCell {
        visible,
        overflow_count,
    }
}

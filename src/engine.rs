//! The calendar capability the day, week and month renderers share.
//!
//! The engine holds no calendar state of its own: the host owns the anchor
//! date and the records, and hears about navigation and clicks through
//! [`CalendarHost`].

use crate::clock::Clock;
use crate::config::Config;
use crate::indicator::indicator_position;
use crate::layout::{EventBox, LayoutConfig, MonthCell, month_cell_content, position};
use crate::projection::{CalendarEvent, EventKind, EventSource, ProjectionMode, events_on_range};
use crate::range::{
    Granularity, ViewDay, contains_today, days_in_view, is_weekend, shift,
};
use crate::records::{Meeting, Schedule, Task};
use crate::time::Locale;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// Callbacks into the hosting application
pub trait CalendarHost {
    /// The anchor date should change
    fn on_navigate(&mut self, anchor: NaiveDate);

    /// A rendered event was clicked
    fn on_event_activated(&mut self, kind: EventKind, source: EventSource<'_>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Previous,
    Next,
    Today,
}

/// An event with its place in the day column
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEvent<'a> {
    pub event: CalendarEvent<'a>,
    pub placement: EventBox,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnContent<'a> {
    /// Day and week: events on the 24-hour grid
    Timed(Vec<PositionedEvent<'a>>),
    /// Month: a truncated cell
    Month(MonthCell<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub day_label: String,
    pub weekday_label: &'static str,
    pub is_today: bool,
    pub is_weekend: bool,
    pub in_current_month: bool,
    pub content: ColumnContent<'a>,
}

impl<'a> DayColumn<'a> {
    /// Events in display order, whichever layout they use
    pub fn events(&self) -> Vec<&CalendarEvent<'a>> {
        match &self.content {
            ColumnContent::Timed(events) => events.iter().map(|p| &p.event).collect(),
            ColumnContent::Month(cell) => cell.visible.iter().collect(),
        }
    }

    pub fn overflow_count(&self) -> usize {
        match &self.content {
            ColumnContent::Timed(_) => 0,
            ColumnContent::Month(cell) => cell.overflow_count,
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarView<'a> {
    pub anchor: NaiveDate,
    pub granularity: Granularity,
    pub title: String,
    /// Offer a jump to today only when it is off screen
    pub show_today_button: bool,
    pub columns: Vec<DayColumn<'a>>,
    pub indicator_percent: Option<f64>,
}

impl<'a> CalendarView<'a> {
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.columns.iter().map(|c| c.date).collect()
    }

    pub fn column(&self, date: NaiveDate) -> Option<&DayColumn<'a>> {
        self.columns.iter().find(|c| c.date == date)
    }

    /// Index of today's column, for drawing the now line
    pub fn today_column(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_today)
    }
}

pub struct CalendarEngine {
    clock: Arc<dyn Clock>,
    locale: Locale,
    layout: LayoutConfig,
}

impl CalendarEngine {
    pub fn new(clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            clock,
            locale: config.locale,
            layout: config.layout(),
        }
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Build the view using the engine's clock for "now"
    pub fn view<'a>(
        &self,
        anchor: NaiveDate,
        granularity: Granularity,
        tasks: &'a [Task],
        meetings: &'a [Meeting],
    ) -> CalendarView<'a> {
        self.view_at(self.clock.now(), anchor, granularity, tasks, meetings)
    }

    pub fn view_schedule<'a>(
        &self,
        anchor: NaiveDate,
        granularity: Granularity,
        schedule: &'a Schedule,
    ) -> CalendarView<'a> {
        self.view(anchor, granularity, &schedule.tasks, &schedule.meetings)
    }

    /// Build the view for an explicit "now", e.g. the live indicator's last tick
    #[tracing::instrument(level = "debug", skip(self, granularity, tasks, meetings), fields(granularity = granularity.as_key()))]
    pub fn view_at<'a>(
        &self,
        now: NaiveDateTime,
        anchor: NaiveDate,
        granularity: Granularity,
        tasks: &'a [Task],
        meetings: &'a [Meeting],
    ) -> CalendarView<'a> {
        let today = now.date();
        let days = days_in_view(anchor, granularity);
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();

        let mode = ProjectionMode::for_granularity(granularity);
        let mut by_date = events_on_range(&dates, tasks, meetings, mode);

        let columns = days
            .iter()
            .map(|day| {
                let events = by_date.remove(&day.date).unwrap_or_default();
                self.column(day, today, granularity, events)
            })
            .collect();

        let title = match granularity {
            Granularity::Day => self.locale.format_day(anchor),
            Granularity::Week => match (dates.first(), dates.last()) {
                (Some(first), Some(last)) => self.locale.format_week(*first, *last),
                _ => String::new(),
            },
            Granularity::Month => self.locale.format_month(anchor),
        };

        let show_today_button = match granularity {
            Granularity::Day => anchor != today,
            Granularity::Week => !dates.contains(&today),
            Granularity::Month => anchor.year() != today.year() || anchor.month() != today.month(),
        };

        CalendarView {
            anchor,
            granularity,
            title,
            show_today_button,
            indicator_percent: indicator_position(now, &dates, granularity),
            columns,
        }
    }

    fn column<'a>(
        &self,
        day: &ViewDay,
        today: NaiveDate,
        granularity: Granularity,
        events: Vec<CalendarEvent<'a>>,
    ) -> DayColumn<'a> {
        let content = if granularity.is_timed() {
            ColumnContent::Timed(
                events
                    .into_iter()
                    .filter_map(|event| {
                        let placement = position(&event, &self.layout)?;
                        Some(PositionedEvent { event, placement })
                    })
                    .collect(),
            )
        } else {
            ColumnContent::Month(month_cell_content(events, self.layout.month_cell_max_visible))
        };

        DayColumn {
            date: day.date,
            day_label: day.date.day().to_string(),
            weekday_label: self.locale.weekday_short(day.date.weekday()),
            is_today: day.date == today,
            is_weekend: is_weekend(day.date),
            in_current_month: day.in_current_month,
            content,
        }
    }

    /// Where a navigation action takes the anchor. Does not notify anyone.
    pub fn target(&self, anchor: NaiveDate, granularity: Granularity, navigation: Navigation) -> NaiveDate {
        match navigation {
            Navigation::Previous => shift(anchor, granularity, -1),
            Navigation::Next => shift(anchor, granularity, 1),
            Navigation::Today => self.clock.today(),
        }
    }

    pub fn navigate(
        &self,
        anchor: NaiveDate,
        granularity: Granularity,
        navigation: Navigation,
        host: &mut impl CalendarHost,
    ) -> NaiveDate {
        let target = self.target(anchor, granularity, navigation);
        tracing::debug!(%anchor, %target, ?navigation, "navigate");
        host.on_navigate(target);
        target
    }

    /// A click on a date cell makes it the anchor
    pub fn select_date(&self, date: NaiveDate, host: &mut impl CalendarHost) {
        host.on_navigate(date);
    }

    pub fn activate(&self, event: &CalendarEvent<'_>, host: &mut impl CalendarHost) {
        tracing::debug!(event_id = %event.id, kind = ?event.kind(), "event activated");
        host.on_event_activated(event.kind(), event.source);
    }

    /// Whether the period for `anchor` includes today
    pub fn is_current_period(&self, anchor: NaiveDate, granularity: Granularity) -> bool {
        contains_today(anchor, granularity, self.clock.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn engine_at(now: NaiveDateTime) -> CalendarEngine {
        CalendarEngine::new(Arc::new(FixedClock::new(now)), &Config::default())
    }

    fn records() -> (Vec<Task>, Vec<Meeting>) {
        let tasks = vec![
            Task::new("t1", "Task").scheduled("2024-03-10", Some("09:00")),
            Task::new("t2", "Untimed").scheduled("2024-03-10", None),
            Task::new("t3", "Monday").scheduled("2024-03-11", Some("08:00")),
            Task::new("t4", "Extra 1").scheduled("2024-03-10", Some("13:00")),
            Task::new("t5", "Extra 2").scheduled("2024-03-10", Some("14:00")),
        ];
        let meetings = vec![Meeting::new("m1", "Meeting").scheduled("2024-03-10", "10:00", "11:00")];
        (tasks, meetings)
    }

    #[derive(Default)]
    struct RecordingHost {
        anchors: Vec<NaiveDate>,
        activated: Vec<(EventKind, String)>,
    }

    impl CalendarHost for RecordingHost {
        fn on_navigate(&mut self, anchor: NaiveDate) {
            self.anchors.push(anchor);
        }

        fn on_event_activated(&mut self, kind: EventKind, source: EventSource<'_>) {
            let id = match source {
                EventSource::Task(task) => task.id.clone(),
                EventSource::Meeting(meeting) => meeting.id.clone(),
            };
            self.activated.push((kind, id));
        }
    }

    #[test]
    fn test_day_view() {
        let engine = engine_at(date(2024, 3, 10).and_hms_opt(12, 0, 0).unwrap());
        let (tasks, meetings) = records();
        let view = engine.view(date(2024, 3, 10), Granularity::Day, &tasks, &meetings);

        assert_eq!(view.title, "10 March 2024, Sunday");
        assert!(!view.show_today_button);
        assert_eq!(view.indicator_percent, Some(50.0));
        assert_eq!(view.columns.len(), 1);

        let column = &view.columns[0];
        assert!(column.is_today);
        assert!(column.is_weekend);
        let ColumnContent::Timed(events) = &column.content else {
            panic!("day view should be timed");
        };
        let ids: Vec<&str> = events.iter().map(|p| p.event.id).collect();
        assert_eq!(ids, vec!["t1", "m1", "t4", "t5"]);
        assert_eq!(events[0].placement.top_percent, 37.5);
    }

    #[test]
    fn test_day_view_not_today() {
        let engine = engine_at(date(2024, 3, 12).and_hms_opt(12, 0, 0).unwrap());
        let (tasks, meetings) = records();
        let view = engine.view(date(2024, 3, 10), Granularity::Day, &tasks, &meetings);
        assert_eq!(view.indicator_percent, None);
        assert!(view.show_today_button);
        assert_eq!(view.today_column(), None);
    }

    #[test]
    fn test_week_view_columns() {
        let engine = engine_at(date(2024, 3, 6).and_hms_opt(6, 0, 0).unwrap());
        let (tasks, meetings) = records();
        let view = engine.view(date(2024, 3, 8), Granularity::Week, &tasks, &meetings);

        assert_eq!(view.title, "March, week 4–10");
        assert_eq!(view.columns.len(), 7);
        assert_eq!(view.columns[0].weekday_label, "Mon");
        assert_eq!(view.today_column(), Some(2));
        assert_eq!(view.indicator_percent, Some(25.0));

        let sunday = view.column(date(2024, 3, 10)).unwrap();
        assert_eq!(sunday.events().len(), 4);
        // t3 belongs to the following week
        assert!(view.columns.iter().all(|c| c.events().iter().all(|e| e.id != "t3")));
    }

    #[test]
    fn test_month_view_cells() {
        let engine = engine_at(date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap());
        let (tasks, meetings) = records();
        let view = engine.view(date(2024, 3, 10), Granularity::Month, &tasks, &meetings);

        assert_eq!(view.title, "March 2024");
        assert_eq!(view.columns.len(), 42);
        assert_eq!(view.indicator_percent, None);
        assert!(!view.columns[0].in_current_month);

        let cell = view.column(date(2024, 3, 10)).unwrap();
        let ids: Vec<&str> = cell.events().iter().map(|e| e.id).collect();
        // Untimed task first, then by start time; two more hidden
        assert_eq!(ids, vec!["t2", "t1", "m1"]);
        assert_eq!(cell.overflow_count(), 2);
    }

    #[test]
    fn test_navigation_notifies_host() {
        let engine = engine_at(date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap());
        let mut host = RecordingHost::default();

        let next = engine.navigate(date(2024, 1, 31), Granularity::Month, Navigation::Next, &mut host);
        assert_eq!(next, date(2024, 2, 29));
        engine.navigate(date(2024, 3, 4), Granularity::Week, Navigation::Previous, &mut host);
        engine.navigate(date(2020, 1, 1), Granularity::Day, Navigation::Today, &mut host);
        engine.select_date(date(2024, 3, 20), &mut host);

        assert_eq!(
            host.anchors,
            vec![date(2024, 2, 29), date(2024, 2, 26), date(2024, 3, 10), date(2024, 3, 20)]
        );
    }

    #[test]
    fn test_activation_returns_source_record() {
        let engine = engine_at(date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap());
        let (tasks, meetings) = records();
        let view = engine.view(date(2024, 3, 10), Granularity::Day, &tasks, &meetings);
        let mut host = RecordingHost::default();

        for event in view.columns[0].events() {
            engine.activate(event, &mut host);
        }

        assert_eq!(host.activated[0], (EventKind::Task, "t1".to_string()));
        assert_eq!(host.activated[1], (EventKind::Meeting, "m1".to_string()));
    }

    #[test]
    fn test_view_is_repeatable() {
        let engine = engine_at(date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap());
        let schedule = {
            let (tasks, meetings) = records();
            Schedule::new(tasks, meetings)
        };
        let first = engine.view_schedule(date(2024, 3, 10), Granularity::Week, &schedule);
        let second = engine.view_schedule(date(2024, 3, 10), Granularity::Week, &schedule);
        assert_eq!(first, second);
    }

    #[test]
    fn test_current_period() {
        let engine = engine_at(date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap());
        assert!(engine.is_current_period(date(2024, 3, 4), Granularity::Week));
        assert!(!engine.is_current_period(date(2024, 4, 1), Granularity::Month));
    }

    #[test]
    fn test_russian_locale() {
        let config = Config {
            locale: Locale::Russian,
            ..Config::default()
        };
        let engine = CalendarEngine::new(
            Arc::new(FixedClock::new(date(2024, 3, 10).and_hms_opt(9, 0, 0).unwrap())),
            &config,
        );
        let view = engine.view(date(2024, 3, 10), Granularity::Month, &[], &[]);
        assert_eq!(view.title, "Март 2024");
        assert_eq!(view.columns[0].weekday_label, "Пн");
    }
}

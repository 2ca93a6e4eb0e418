//! Read-only projection of task and meeting records onto calendar dates

use crate::error::Result;
use crate::range::Granularity;
use crate::records::{Meeting, Task};
use crate::time::{date_key, sort_by_start, to_fractional_hour};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Task,
    Meeting,
}

/// Back-reference to the record an event was projected from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventSource<'a> {
    Task(&'a Task),
    Meeting(&'a Meeting),
}

impl EventSource<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            EventSource::Task(_) => EventKind::Task,
            EventSource::Meeting(_) => EventKind::Meeting,
        }
    }
}

/// A record as placed on one calendar date. Built per render, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent<'a> {
    pub id: &'a str,
    pub title: &'a str,
    /// "HH:MM", or empty for an untimed month entry
    pub start_time: &'a str,
    /// Equal to `start_time` for tasks
    pub end_time: &'a str,
    pub start_hour: Option<f64>,
    pub end_hour: Option<f64>,
    pub color: &'a str,
    pub date: NaiveDate,
    pub source: EventSource<'a>,
}

impl<'a> CalendarEvent<'a> {
    pub fn kind(&self) -> EventKind {
        self.source.kind()
    }

    pub fn is_timed(&self) -> bool {
        self.start_hour.is_some()
    }

    /// "09:00", "10:00 - 11:00", or "" when untimed
    pub fn time_label(&self) -> String {
        if self.end_time.is_empty() || self.end_time == self.start_time {
            self.start_time.to_string()
        } else {
            format!("{} - {}", self.start_time, self.end_time)
        }
    }
}

/// Which records qualify for a date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Day and week grids: an event needs a start time to be positioned
    Timed,
    /// Month cells: any dated record, untimed ones with an empty label
    AllDated,
}

impl ProjectionMode {
    pub fn for_granularity(granularity: Granularity) -> Self {
        if granularity.is_timed() {
            ProjectionMode::Timed
        } else {
            ProjectionMode::AllDated
        }
    }
}

fn project_task(task: &Task, date: NaiveDate, mode: ProjectionMode) -> Option<CalendarEvent<'_>> {
    let start_time = task.time_str();
    if start_time.is_none() && mode == ProjectionMode::Timed {
        return None;
    }

    let start_hour = match start_time.map(to_fractional_hour).transpose() {
        Ok(hour) => hour,
        Err(error) => {
            tracing::warn!(task_id = %task.id, %error, "skipping task with malformed start time");
            return None;
        }
    };

    let time = start_time.unwrap_or("");
    Some(CalendarEvent {
        id: &task.id,
        title: &task.name,
        start_time: time,
        end_time: time,
        start_hour,
        end_hour: start_hour,
        color: task.display_color(),
        date,
        source: EventSource::Task(task),
    })
}

fn meeting_hours(meeting: &Meeting) -> Result<(Option<f64>, Option<f64>)> {
    let start = meeting.time_str().map(to_fractional_hour).transpose()?;
    let end = match meeting.end_time_str() {
        Some(end) if start.is_some() => Some(to_fractional_hour(end)?),
        _ => start,
    };
    Ok((start, end))
}

fn project_meeting(
    meeting: &Meeting,
    date: NaiveDate,
    mode: ProjectionMode,
) -> Option<CalendarEvent<'_>> {
    if meeting.time_str().is_none() && mode == ProjectionMode::Timed {
        tracing::debug!(meeting_id = %meeting.id, "meeting without start time left off the time grid");
        return None;
    }

    let (start_hour, end_hour) = match meeting_hours(meeting) {
        Ok(hours) => hours,
        Err(error) => {
            tracing::warn!(meeting_id = %meeting.id, %error, "skipping meeting with malformed time");
            return None;
        }
    };

    let start_time = meeting.time_str().unwrap_or("");
    let end_time = if start_hour.is_some() {
        meeting.end_time_str().unwrap_or(start_time)
    } else {
        ""
    };

    Some(CalendarEvent {
        id: &meeting.id,
        title: &meeting.name,
        start_time,
        end_time,
        start_hour,
        end_hour,
        color: meeting.display_color(),
        date,
        source: EventSource::Meeting(meeting),
    })
}

/// Events on `date`, ascending by start time.
///
/// Tasks are collected before meetings and the sort is stable, so a task and
/// a meeting starting at the same minute always list the task first.
pub fn events_on_date<'a>(
    date: NaiveDate,
    tasks: &'a [Task],
    meetings: &'a [Meeting],
    mode: ProjectionMode,
) -> Vec<CalendarEvent<'a>> {
    let key = date_key(date);

    let mut events: Vec<CalendarEvent<'a>> = tasks
        .iter()
        .filter(|task| task.date_str() == Some(key.as_str()))
        .filter_map(|task| project_task(task, date, mode))
        .chain(
            meetings
                .iter()
                .filter(|meeting| meeting.date_str() == Some(key.as_str()))
                .filter_map(|meeting| project_meeting(meeting, date, mode)),
        )
        .collect();

    sort_by_start(&mut events, |event| event.start_hour);
    events
}

/// Events for each of `dates`, keyed by date. Every date is present, possibly
/// with an empty list.
///
/// Each record is bucketed by its own stored date key in a single pass, so an
/// event can never land in a neighbouring column.
pub fn events_on_range<'a>(
    dates: &[NaiveDate],
    tasks: &'a [Task],
    meetings: &'a [Meeting],
    mode: ProjectionMode,
) -> BTreeMap<NaiveDate, Vec<CalendarEvent<'a>>> {
    let keys: HashMap<String, NaiveDate> = dates.iter().map(|d| (date_key(*d), *d)).collect();
    let mut by_date: BTreeMap<NaiveDate, Vec<CalendarEvent<'a>>> =
        dates.iter().map(|d| (*d, Vec::new())).collect();

    for task in tasks {
        if let Some(&date) = task.date_str().and_then(|key| keys.get(key))
            && let Some(event) = project_task(task, date, mode)
            && let Some(bucket) = by_date.get_mut(&date)
        {
            bucket.push(event);
        }
    }

    for meeting in meetings {
        if let Some(&date) = meeting.date_str().and_then(|key| keys.get(key))
            && let Some(event) = project_meeting(meeting, date, mode)
            && let Some(bucket) = by_date.get_mut(&date)
        {
            bucket.push(event);
        }
    }

    for events in by_date.values_mut() {
        sort_by_start(events, |event| event.start_hour);
    }

    by_date
}

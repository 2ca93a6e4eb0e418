//! Task and meeting records as supplied by the hosting application.
//!
//! Field names follow the host's JSON (camelCase). Everything beyond id, name,
//! dates, times and color is opaque to the calendar and only handed back on
//! click.

use crate::error::{PlannerError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Color used for tasks that carry none
pub const DEFAULT_TASK_COLOR: &str = "#3B82F6";

// The payload enums accept the host's Russian labels as well. A value neither
// spelling knows lands in `Other` instead of failing the record.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    #[serde(alias = "Низкий")]
    Low,
    #[default]
    #[serde(alias = "Средний")]
    Medium,
    #[serde(alias = "Высокий")]
    High,
    #[serde(alias = "Критический")]
    Critical,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(alias = "Новая")]
    New,
    #[serde(alias = "В работе")]
    InProgress,
    #[serde(alias = "На проверке")]
    InReview,
    #[serde(alias = "Завершена")]
    Done,
    #[serde(other)]
    Other,
}

/// Stored only; occurrences are never expanded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatType {
    #[default]
    #[serde(alias = "Не повторяется")]
    None,
    #[serde(alias = "Ежедневно", alias = "Каждый день")]
    Daily,
    #[serde(alias = "Еженедельно", alias = "Каждую неделю")]
    Weekly,
    #[serde(alias = "Каждые 2 недели")]
    Biweekly,
    #[serde(alias = "Ежемесячно")]
    Monthly,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BusyStatus {
    #[default]
    #[serde(alias = "Занят")]
    Busy,
    #[serde(alias = "Под вопросом")]
    Tentative,
    #[serde(alias = "Свободен")]
    Free,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeetingType {
    #[serde(alias = "Стратегическое")]
    Strategic,
    #[default]
    #[serde(alias = "Рабочее")]
    Working,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// `YYYY-MM-DD`; absent or empty means unscheduled
    pub start_date: Option<String>,
    /// `HH:MM`; tasks are point events
    pub start_time: Option<String>,
    pub color: Option<String>,

    pub description: String,
    pub deadline: String,
    pub duration: String,
    pub assignee: String,
    pub creator: String,
    pub participants: Vec<String>,
    pub watchers: Vec<String>,
    pub priority: Priority,
    pub project: String,
    pub status: TaskStatus,
    pub reminder_time: String,
    pub repeat_type: RepeatType,
    pub planned_hours: String,
    pub actual_hours: String,
    pub expected_result: String,
    pub acceptance_criteria: Vec<String>,
    pub subtasks: Vec<String>,
    pub related_tasks: Vec<String>,
    pub tags: Vec<String>,
    pub notify_changes: bool,
    pub send_progress: bool,
    pub remind_deadline: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn scheduled(mut self, date: &str, time: Option<&str>) -> Self {
        self.start_date = Some(date.to_string());
        self.start_time = time.map(str::to_string);
        self
    }

    pub fn date_str(&self) -> Option<&str> {
        non_empty(self.start_date.as_deref())
    }

    pub fn time_str(&self) -> Option<&str> {
        non_empty(self.start_time.as_deref())
    }

    pub fn display_color(&self) -> &str {
        non_empty(self.color.as_deref()).unwrap_or(DEFAULT_TASK_COLOR)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarRef {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meeting {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    pub start_date: String,
    pub start_time: String,
    /// Should equal `start_date`; placement only ever uses the start date
    pub end_date: String,
    pub end_time: String,
    pub duration: String,
    /// Stored label, never converted
    pub timezone: String,
    pub calendar: CalendarRef,
    pub repeat_type: RepeatType,
    pub location: String,
    pub participants: Vec<String>,
    pub description: String,
    pub reminders: Vec<String>,
    pub event_color: String,
    pub busy_status: BusyStatus,
    pub notify_participants: bool,
    pub project_id: Option<String>,
    pub subproject_id: Option<String>,
}

impl Meeting {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn scheduled(mut self, date: &str, start: &str, end: &str) -> Self {
        self.start_date = date.to_string();
        self.end_date = date.to_string();
        self.start_time = start.to_string();
        self.end_time = end.to_string();
        self
    }

    pub fn date_str(&self) -> Option<&str> {
        non_empty(Some(&self.start_date))
    }

    pub fn time_str(&self) -> Option<&str> {
        non_empty(Some(&self.start_time))
    }

    pub fn end_time_str(&self) -> Option<&str> {
        non_empty(Some(&self.end_time))
    }

    /// Event color, then the calendar's color, then the task default
    pub fn display_color(&self) -> &str {
        non_empty(Some(&self.event_color))
            .or_else(|| non_empty(Some(&self.calendar.color)))
            .unwrap_or(DEFAULT_TASK_COLOR)
    }
}

/// Blank counts as absent; anything else is returned untouched so date keys
/// still have to match exactly
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Immutable view of the host's records for one render.
/// Cloning shares the underlying slices.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub tasks: Arc<[Task]>,
    pub meetings: Arc<[Meeting]>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScheduleFile {
    tasks: Vec<serde_json::Value>,
    meetings: Vec<serde_json::Value>,
}

/// Decode each record on its own so one bad entry only loses itself
fn decode_records<T: DeserializeOwned>(values: Vec<serde_json::Value>, kind: &str) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                let error = PlannerError::from(err);
                tracing::warn!(kind, index, %error, "skipping unreadable record");
                None
            }
        })
        .collect()
}

impl Schedule {
    pub fn new(tasks: Vec<Task>, meetings: Vec<Meeting>) -> Self {
        Self {
            tasks: tasks.into(),
            meetings: meetings.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let file: ScheduleFile = serde_json::from_str(json)?;
        Ok(Self::new(
            decode_records(file.tasks, "task"),
            decode_records(file.meetings, "meeting"),
        ))
    }

    /// Load a `{ "tasks": [...], "meetings": [...] }` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let schedule = Self::from_json(&content)?;
        tracing::info!(
            path = %path.display(),
            tasks = schedule.tasks.len(),
            meetings = schedule.meetings.len(),
            "loaded schedule snapshot"
        );
        Ok(schedule)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.meetings.is_empty()
    }
}

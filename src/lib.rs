//! Calendar scheduling and layout for tasks and meetings.
//!
//! Given task and meeting records, an anchor date and a granularity, the
//! engine works out which dates are visible, which events fall on each, where
//! they sit on a 24-hour column or in a month cell, and where the "now" line
//! goes.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod layout;
pub mod logging;
pub mod projection;
pub mod range;
pub mod records;
pub mod time;
pub mod ui;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use engine::{CalendarEngine, CalendarHost, CalendarView, ColumnContent, DayColumn, Navigation};
pub use error::{PlannerError, Result};
pub use indicator::{LiveIndicator, indicator_position};
pub use layout::{EventBox, LayoutConfig, MonthCell, month_cell_content, position};
pub use projection::{CalendarEvent, EventKind, EventSource, ProjectionMode, events_on_date, events_on_range};
pub use range::{Granularity, ViewDay, days_in_view, shift};
pub use records::{Meeting, Schedule, Task};
pub use time::{Locale, compare_by_start, to_fractional_hour};

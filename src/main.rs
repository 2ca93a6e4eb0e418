use crossterm::{
    cursor, execute,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{self, Clear, ClearType, disable_raw_mode, enable_raw_mode},
};
use chrono::NaiveDate;
use planboard::engine::{CalendarEngine, CalendarHost, Navigation};
use planboard::projection::{EventKind, EventSource};
use planboard::ui::{self, RenderState};
use planboard::{Clock, Config, Granularity, LiveIndicator, Schedule, SystemClock, logging};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Owns the anchor date; the engine only tells it where to go
struct Host {
    anchor: NaiveDate,
    granularity: Granularity,
    status_message: Option<String>,
}

impl CalendarHost for Host {
    fn on_navigate(&mut self, anchor: NaiveDate) {
        self.anchor = anchor;
        self.status_message = None;
    }

    fn on_event_activated(&mut self, kind: EventKind, source: EventSource<'_>) {
        tracing::info!(?kind, "opening event");
        let summary = match source {
            EventSource::Task(task) => format!(
                "Task: {} | {:?} | {:?} | {}",
                task.name,
                task.status,
                task.priority,
                if task.assignee.is_empty() { "unassigned" } else { task.assignee.as_str() }
            ),
            EventSource::Meeting(meeting) => format!(
                "Meeting: {} | {}-{} | {:?} | {}",
                meeting.name, meeting.start_time, meeting.end_time, meeting.busy_status, meeting.location
            ),
        };
        self.status_message = Some(summary);
    }
}

enum Action {
    Redraw,
    Quit,
}

fn handle_key(code: KeyCode, engine: &CalendarEngine, schedule: &Schedule, host: &mut Host) -> Action {
    match code {
        KeyCode::Char('h') | KeyCode::Left => {
            engine.navigate(host.anchor, host.granularity, Navigation::Previous, host);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            engine.navigate(host.anchor, host.granularity, Navigation::Next, host);
        }
        KeyCode::Char('t') => {
            engine.navigate(host.anchor, host.granularity, Navigation::Today, host);
        }
        KeyCode::Char('d') => host.granularity = Granularity::Day,
        KeyCode::Char('w') => host.granularity = Granularity::Week,
        KeyCode::Char('m') => host.granularity = Granularity::Month,
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            let view = engine.view_schedule(host.anchor, host.granularity, schedule);
            let event = view
                .column(host.anchor)
                .and_then(|column| column.events().get(index).map(|e| (*e).clone()));
            if let Some(event) = event {
                engine.activate(&event, host);
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
        _ => {}
    }
    Action::Redraw
}

fn run(
    engine: &CalendarEngine,
    schedule: &Schedule,
    host: &mut Host,
    indicator: &LiveIndicator,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticks = indicator.subscribe();
    let mut out = stdout();
    let mut dirty = true;

    loop {
        if dirty {
            let (width, height) = terminal::size().unwrap_or((80, 24));
            let notice = logging::recent_notices(1).into_iter().next();
            let status = host.status_message.clone().or(notice);
            let view = engine.view_at(
                indicator.now(),
                host.anchor,
                host.granularity,
                &schedule.tasks,
                &schedule.meetings,
            );
            let state = RenderState {
                width,
                height,
                locale: engine.locale(),
                status_message: status.as_deref(),
            };
            ui::render(&mut out, &view, &state)?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Action::Quit = handle_key(key.code, engine, schedule, host) {
                        return Ok(());
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if ticks.has_changed().unwrap_or(false) {
            ticks.borrow_and_update();
            dirty = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Before loading config so its sanitising warnings are recorded
    logging::init_tracing(Some(&Config::config_dir().join("planboard.log")))?;
    let config = Config::load()?;

    let snapshot_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.snapshot_path());
    let schedule = if snapshot_path.exists() {
        Schedule::load(&snapshot_path)?
    } else {
        tracing::warn!(path = %snapshot_path.display(), "no snapshot file, starting empty");
        Schedule::default()
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let engine = CalendarEngine::new(Arc::clone(&clock), &config);
    let mut host = Host {
        anchor: clock.today(),
        granularity: config.default_granularity,
        status_message: None,
    };
    let mut indicator = LiveIndicator::start(clock, config.indicator_interval());

    enable_raw_mode()?;
    // The key loop blocks on terminal polling; keep it off the worker pool
    let result = tokio::task::block_in_place(|| run(&engine, &schedule, &mut host, &indicator));

    // Restore the terminal even if drawing failed
    indicator.cancel();
    disable_raw_mode()?;
    execute!(stdout(), cursor::Show, Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    result
}

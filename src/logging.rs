use crate::error::Result;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const MAX_NOTICES: usize = 100;

/// Recent warnings, newest last, for the status line
static NOTICES: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Keep a message for display
pub fn push_notice(message: impl Into<String>) {
    if let Ok(mut notices) = NOTICES.lock() {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        notices.push(format!("[{}] {}", timestamp, message.into()));
        if notices.len() > MAX_NOTICES {
            notices.remove(0);
        }
    }
}

/// Most recent notices, newest first
pub fn recent_notices(count: usize) -> Vec<String> {
    if let Ok(notices) = NOTICES.lock() {
        notices.iter().rev().take(count).cloned().collect()
    } else {
        Vec::new()
    }
}

/// Copies WARN and ERROR events into the notice buffer
struct NoticeLayer;

#[derive(Default)]
struct NoticeVisitor {
    message: String,
    fields: Vec<String>,
}

impl Visit for NoticeVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }
}

impl<S: Subscriber> Layer<S> for NoticeLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // More verbose levels compare greater
        if *event.metadata().level() > Level::WARN {
            return;
        }
        let mut visitor = NoticeVisitor::default();
        event.record(&mut visitor);
        if visitor.fields.is_empty() {
            push_notice(visitor.message);
        } else {
            push_notice(format!("{} ({})", visitor.message, visitor.fields.join(", ")));
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `warn`.
///
/// With `log_file` set, formatted output goes there instead of stderr so a
/// full-screen UI is not drawn over.
pub fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };
    let stderr_layer = log_file.is_none().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
    });

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .with(NoticeLayer)
        .try_init();

    if let Err(err) = init_result {
        tracing::debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

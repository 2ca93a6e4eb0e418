//! The "now" line: where it sits, and the timer that keeps it current

use crate::clock::Clock;
use crate::layout::hour_to_percent;
use crate::range::Granularity;
use crate::time::fractional_hour_of;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How often the indicator re-samples the clock
pub const DEFAULT_TICK: Duration = Duration::from_secs(60);

/// Top percent of the now line, or `None` when it should not be drawn.
///
/// Month cells are day-granular and never show it. Day and week only show it
/// when today's date is one of the visible columns.
pub fn indicator_position(
    now: NaiveDateTime,
    visible_dates: &[NaiveDate],
    granularity: Granularity,
) -> Option<f64> {
    if !granularity.is_timed() || !visible_dates.contains(&now.date()) {
        return None;
    }
    Some(hour_to_percent(fractional_hour_of(now.time())))
}

/// A running tick. Dropping it stops the timer.
///
/// Each tick publishes the clock's current time on a watch channel; the
/// position itself is derived on demand since the visible dates belong to
/// whoever renders.
pub struct LiveIndicator {
    receiver: watch::Receiver<NaiveDateTime>,
    task: Option<JoinHandle<()>>,
}

impl LiveIndicator {
    /// Start ticking. Must be called from within a tokio runtime.
    pub fn start(clock: Arc<dyn Clock>, tick: Duration) -> Self {
        let (sender, receiver) = watch::channel(clock.now());

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // First tick completes immediately; the initial sample is already sent
            interval.tick().await;

            loop {
                interval.tick().await;
                let now = clock.now();
                tracing::trace!(%now, "indicator tick");
                if sender.send(now).is_err() {
                    break;
                }
            }
        });

        tracing::debug!(tick_secs = tick.as_secs(), "live indicator started");
        Self {
            receiver,
            task: Some(task),
        }
    }

    /// Stop the current timer, then start a fresh one
    pub fn restart(&mut self, clock: Arc<dyn Clock>, tick: Duration) {
        self.cancel();
        *self = Self::start(clock, tick);
    }

    /// Stop ticking. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("live indicator stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Latest sampled time
    pub fn now(&self) -> NaiveDateTime {
        *self.receiver.borrow()
    }

    /// Receiver that wakes on every tick
    pub fn subscribe(&self) -> watch::Receiver<NaiveDateTime> {
        self.receiver.clone()
    }

    pub fn position(&self, visible_dates: &[NaiveDate], granularity: Granularity) -> Option<f64> {
        indicator_position(self.now(), visible_dates, granularity)
    }
}

impl Drop for LiveIndicator {
    fn drop(&mut self) {
        self.cancel();
    }
}

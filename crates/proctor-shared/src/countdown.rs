//! Periodic next-exam countdown.
//!
//! A [`CountdownTicker`] recomputes the time left until a target instant on
//! a fixed period and hands each value to a callback. It stops by itself
//! once the target is reached (after reporting `None` once), when
//! [`CountdownTicker::stop`] is called, or when it is dropped.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::constants::COUNTDOWN_TICK_MS;
use crate::schedule::Countdown;

pub struct CountdownTicker {
    task: JoinHandle<()>,
}

impl CountdownTicker {
    /// Start ticking every second. Must be called inside a tokio runtime.
    pub fn spawn<F>(target: DateTime<Utc>, on_tick: F) -> Self
    where
        F: FnMut(Option<Countdown>) + Send + 'static,
    {
        Self::spawn_with_period(target, Duration::from_millis(COUNTDOWN_TICK_MS), on_tick)
    }

    pub fn spawn_with_period<F>(target: DateTime<Utc>, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(Option<Countdown>) + Send + 'static,
    {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let remaining = Countdown::between(Utc::now(), target);
                on_tick(remaining);
                if remaining.is_none() {
                    tracing::debug!(%target, "countdown reached target");
                    break;
                }
            }
        });

        Self { task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn stop(self) {
        // Drop does the work.
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.task.abort();
    }
}

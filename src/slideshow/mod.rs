// SPDX-License-Identifier: MPL-2.0
//! Slideshow timer.
//!
//! Drives auto-advance with a periodic trigger and brings the slideshow back
//! after a manual pause with a one-shot idle timer. Both timers are Tokio
//! tasks spawned on the runtime handle given at construction, so callers
//! never need to be inside the runtime themselves.
//!
//! # States
//!
//! ```text
//!            start                pause / manual_trigger
//! Stopped ───────────▶ Running ─────────────────────────▶ ManuallyPaused
//!    ▲                    ▲                                     │
//!    │ stop               └──────── resume / idle timeout ──────┘
//!    └──────────────────────── (from any state)
//! ```
//!
//! The advance callback runs on a runtime worker and must not block; the
//! application wiring turns it into a queued event.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Callback invoked on every periodic tick.
pub type AdvanceFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    /// Periodic trigger stopped, idle timer armed.
    ManuallyPaused,
}

struct TimerInner {
    state: TimerState,
    interval: Duration,
    periodic: Option<JoinHandle<()>>,
    idle: Option<JoinHandle<()>>,
    /// Bumped whenever the idle timer is re-armed or cancelled, so a task
    /// that already woke up can tell it has been superseded.
    idle_generation: u64,
}

struct Shared {
    runtime: Handle,
    advance: AdvanceFn,
    idle_timeout: Duration,
    inner: Mutex<TimerInner>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        cancel(&mut inner.periodic);
        cancel(&mut inner.idle);
    }
}

/// Periodic auto-advance with idle-resume.
///
/// Cloning is cheap and every clone controls the same timers. The timers are
/// cancelled when the last clone is dropped.
#[derive(Clone)]
pub struct SlideshowTimer {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for SlideshowTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("SlideshowTimer")
            .field("state", &inner.state)
            .field("interval", &inner.interval)
            .field("idle_timeout", &self.shared.idle_timeout)
            .finish()
    }
}

impl SlideshowTimer {
    /// Creates a stopped timer.
    pub fn new(
        runtime: Handle,
        interval: Duration,
        idle_timeout: Duration,
        advance: AdvanceFn,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                runtime,
                advance,
                idle_timeout,
                inner: Mutex::new(TimerInner {
                    state: TimerState::Stopped,
                    interval,
                    periodic: None,
                    idle: None,
                    idle_generation: 0,
                }),
            }),
        }
    }

    /// Starts the periodic trigger. No-op unless stopped.
    pub fn start(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state != TimerState::Stopped {
            return;
        }
        inner.state = TimerState::Running;
        arm_periodic(&self.shared, &mut inner);
        log::debug!("Slideshow started ({:?})", inner.interval);
    }

    /// Cancels both timers and clears the manual pause. Idempotent.
    pub fn stop(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state == TimerState::Stopped {
            return;
        }
        inner.state = TimerState::Stopped;
        cancel(&mut inner.periodic);
        cancel_idle(&mut inner);
        log::debug!("Slideshow stopped");
    }

    /// Stops the periodic trigger and arms the idle timer. Only acts while
    /// running.
    pub fn pause(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state != TimerState::Running {
            return;
        }
        enter_manual_pause(&self.shared, &mut inner);
        log::debug!("Slideshow paused");
    }

    /// Leaves a manual pause early. Only acts while manually paused.
    pub fn resume(&self) {
        let mut inner = self.shared.inner.lock();
        if inner.state != TimerState::ManuallyPaused {
            return;
        }
        cancel_idle(&mut inner);
        inner.state = TimerState::Running;
        arm_periodic(&self.shared, &mut inner);
        log::debug!("Slideshow resumed");
    }

    /// Changes the period.
    ///
    /// While running, the periodic trigger restarts immediately with the new
    /// period; otherwise the value is stored for the next start.
    pub fn set_interval(&self, interval: Duration) {
        let mut inner = self.shared.inner.lock();
        inner.interval = interval;
        if inner.state == TimerState::Running {
            arm_periodic(&self.shared, &mut inner);
        }
        log::debug!("Slideshow interval set to {interval:?}");
    }

    /// Records a manual navigation: pauses the slideshow and restarts the
    /// idle timer, even when already paused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] when the slideshow is stopped.
    pub fn manual_trigger(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            TimerState::Stopped => Err(Error::InvalidState(
                "manual trigger while slideshow is stopped".into(),
            )),
            TimerState::Running | TimerState::ManuallyPaused => {
                enter_manual_pause(&self.shared, &mut inner);
                log::debug!("Slideshow manual trigger");
                Ok(())
            }
        }
    }

    /// True unless stopped. A manually paused slideshow still counts as
    /// running because it resumes on its own.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() != TimerState::Stopped
    }

    #[must_use]
    pub fn is_manually_paused(&self) -> bool {
        self.state() == TimerState::ManuallyPaused
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.shared.inner.lock().state
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.shared.inner.lock().interval
    }
}

fn cancel(task: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = task.take() {
        handle.abort();
    }
}

fn cancel_idle(inner: &mut TimerInner) {
    cancel(&mut inner.idle);
    inner.idle_generation = inner.idle_generation.wrapping_add(1);
}

fn enter_manual_pause(shared: &Arc<Shared>, inner: &mut TimerInner) {
    cancel(&mut inner.periodic);
    inner.state = TimerState::ManuallyPaused;
    arm_idle(shared, inner);
}

/// Replaces the periodic task. The first tick comes one full period later.
fn arm_periodic(shared: &Arc<Shared>, inner: &mut TimerInner) {
    cancel(&mut inner.periodic);
    let period = inner.interval;
    let weak = Arc::downgrade(shared);

    inner.periodic = Some(shared.runtime.spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            if shared.inner.lock().state != TimerState::Running {
                break;
            }
            (shared.advance)();
        }
    }));
}

fn arm_idle(shared: &Arc<Shared>, inner: &mut TimerInner) {
    cancel_idle(inner);
    let generation = inner.idle_generation;
    let timeout = shared.idle_timeout;
    let weak: Weak<Shared> = Arc::downgrade(shared);

    inner.idle = Some(shared.runtime.spawn(async move {
        time::sleep(timeout).await;
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let mut inner = shared.inner.lock();
        if inner.state == TimerState::ManuallyPaused && inner.idle_generation == generation {
            inner.idle = None;
            inner.state = TimerState::Running;
            arm_periodic(&shared, &mut inner);
            log::debug!("Slideshow resumed after idle timeout");
        }
    }));
}

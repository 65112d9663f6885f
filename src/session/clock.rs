//! Time source and timer queue for the session state machine.
//!
//! Phase transitions that the UI used to hang off ambient timeouts (intro
//! delay, cutscene fade) are queued here as `ScheduledEvent`s and fired when
//! the controller is ticked. Tests drive a `ManualClock` instead of sleeping.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync {
    /// Monotonic instant used for timers.
    fn now(&self) -> Instant;
    /// Wall-clock time used for message timestamps.
    fn wall(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<(Instant, DateTime<Utc>)>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new((Instant::now(), Utc::now()))),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.0 += by;
        guard.1 += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).0
    }

    fn wall(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).1
    }
}

// ── Scheduler ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledEvent {
    IntroElapsed,
    CutsceneFadeElapsed,
}

/// Pending timers. At most one timer per event kind.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<(Instant, ScheduledEvent)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` at `deadline`, replacing an earlier timer of the same kind.
    pub fn schedule(&mut self, deadline: Instant, event: ScheduledEvent) {
        self.cancel(event);
        self.pending.push((deadline, event));
    }

    pub fn cancel(&mut self, event: ScheduledEvent) {
        self.pending.retain(|(_, e)| *e != event);
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(at, _)| *at).min()
    }

    /// Remove and return every event due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<ScheduledEvent> {
        let mut due: Vec<(Instant, ScheduledEvent)> = Vec::new();
        self.pending.retain(|entry| {
            if entry.0 <= now {
                due.push(*entry);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, e)| e).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_both_sources() {
        let clock = ManualClock::new();
        let (t0, w0) = (clock.now(), clock.wall());
        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.now() - t0, Duration::from_millis(1500));
        assert_eq!((clock.wall() - w0).num_milliseconds(), 1500);
    }

    #[test]
    fn events_fire_only_once_due() {
        let clock = ManualClock::new();
        let mut sched = Scheduler::new();
        sched.schedule(clock.now() + Duration::from_secs(2), ScheduledEvent::IntroElapsed);

        clock.advance(Duration::from_millis(1999));
        assert!(sched.take_due(clock.now()).is_empty());

        clock.advance(Duration::from_millis(1));
        assert_eq!(sched.take_due(clock.now()), vec![ScheduledEvent::IntroElapsed]);
        assert!(sched.take_due(clock.now()).is_empty());
    }

    #[test]
    fn rescheduling_replaces_existing_timer() {
        let now = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule(now + Duration::from_secs(1), ScheduledEvent::CutsceneFadeElapsed);
        sched.schedule(now + Duration::from_secs(5), ScheduledEvent::CutsceneFadeElapsed);

        assert!(sched.take_due(now + Duration::from_secs(2)).is_empty());
        assert_eq!(sched.next_deadline(), Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn due_events_come_back_in_deadline_order() {
        let now = Instant::now();
        let mut sched = Scheduler::new();
        sched.schedule(now + Duration::from_secs(3), ScheduledEvent::CutsceneFadeElapsed);
        sched.schedule(now + Duration::from_secs(1), ScheduledEvent::IntroElapsed);
        assert_eq!(
            sched.take_due(now + Duration::from_secs(10)),
            vec![ScheduledEvent::IntroElapsed, ScheduledEvent::CutsceneFadeElapsed]
        );
    }
}

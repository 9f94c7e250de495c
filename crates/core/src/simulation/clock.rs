//! Tick scheduling for the simulation clock
//!
//! The simulation never owns a real timer. It talks to a [`TickScheduler`],
//! which is started with an interval, stopped, and polled for the number of
//! ticks that came due since the last poll. Restarting a scheduler drops any
//! partial-tick phase: the next tick is one full interval after `start`.
//!
//! Two implementations ship with the crate:
//! - [`VirtualScheduler`] reads a shared [`VirtualClock`] that tests (or a
//!   fast headless run) advance by hand.
//! - [`WallClockScheduler`] reads [`Instant::now`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Shortest interval a scheduler will accept; keeps `poll` finite
const MIN_SCHEDULER_INTERVAL: Duration = Duration::from_millis(1);

/// Tick interval for a speed multiplier: `max(min_interval, base_interval / speed)`
pub fn tick_interval(speed_multiplier: f64, base_interval: Duration, min_interval: Duration) -> Duration {
    let scaled = base_interval.as_secs_f64() / speed_multiplier;
    if !scaled.is_finite() || scaled <= 0.0 {
        return min_interval;
    }
    Duration::from_secs_f64(scaled).max(min_interval)
}

/// Recurring tick source
pub trait TickScheduler {
    /// (Re)start ticking every `interval`, discarding any previous schedule
    fn start(&mut self, interval: Duration);

    /// Stop ticking; pending ticks are discarded
    fn stop(&mut self);

    /// Active interval, `None` while stopped
    fn interval(&self) -> Option<Duration>;

    /// Number of ticks due since the last poll (0 while stopped)
    fn poll(&mut self) -> u32;
}

impl<T: TickScheduler + ?Sized> TickScheduler for Box<T> {
    fn start(&mut self, interval: Duration) {
        (**self).start(interval);
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn interval(&self) -> Option<Duration> {
        (**self).interval()
    }

    fn poll(&mut self) -> u32 {
        (**self).poll()
    }
}

/// Manually advanced time source shared between a test and its schedulers
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now: Rc<Cell<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get() + dt);
    }
}

/// Scheduler driven by a [`VirtualClock`]
#[derive(Debug, Clone)]
pub struct VirtualScheduler {
    clock: VirtualClock,
    interval: Option<Duration>,
    next_due: Duration,
}

impl VirtualScheduler {
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            interval: None,
            next_due: Duration::ZERO,
        }
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }
}

impl TickScheduler for VirtualScheduler {
    fn start(&mut self, interval: Duration) {
        let interval = interval.max(MIN_SCHEDULER_INTERVAL);
        self.interval = Some(interval);
        self.next_due = self.clock.now() + interval;
    }

    fn stop(&mut self) {
        self.interval = None;
    }

    fn interval(&self) -> Option<Duration> {
        self.interval
    }

    fn poll(&mut self) -> u32 {
        let Some(interval) = self.interval else {
            return 0;
        };
        let now = self.clock.now();
        let mut due = 0;
        while self.next_due <= now {
            due += 1;
            self.next_due += interval;
        }
        due
    }
}

/// Scheduler driven by the monotonic system clock
#[derive(Debug, Clone, Default)]
pub struct WallClockScheduler {
    interval: Option<Duration>,
    next_due: Option<Instant>,
}

impl WallClockScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time until the next tick, `None` while stopped
    pub fn time_until_next(&self) -> Option<Duration> {
        self.next_due
            .map(|due| due.saturating_duration_since(Instant::now()))
    }
}

impl TickScheduler for WallClockScheduler {
    fn start(&mut self, interval: Duration) {
        let interval = interval.max(MIN_SCHEDULER_INTERVAL);
        self.interval = Some(interval);
        self.next_due = Some(Instant::now() + interval);
    }

    fn stop(&mut self) {
        self.interval = None;
        self.next_due = None;
    }

    fn interval(&self) -> Option<Duration> {
        self.interval
    }

    fn poll(&mut self) -> u32 {
        let (Some(interval), Some(mut next_due)) = (self.interval, self.next_due) else {
            return 0;
        };
        let now = Instant::now();
        let mut due = 0;
        while next_due <= now {
            due += 1;
            next_due += interval;
        }
        self.next_due = Some(next_due);
        due
    }
}

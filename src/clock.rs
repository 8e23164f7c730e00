//! # Clock
//!
//! Nanosecond timestamps for the timed kernels. Every implementation returns non-decreasing
//! values; which one backs [`PlatformClock`] is fixed at build time through the
//! `calendar-clock` feature, so nothing else in the crate knows which primitive is in use.
use std::cell::Cell;
use std::io;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic, non-decreasing nanosecond timestamps
pub trait Clock {
    /// Current timestamp in nanoseconds. Only differences between readings are meaningful.
    fn now(&self) -> u64;
}

/// Clock backed by the OS monotonic clock, immune to wall-clock adjustments
pub struct MonotonicClock {
    anchor: Instant,
}

impl MonotonicClock {
    /// Create the clock. `Instant` is always available on supported targets, so this never
    /// fails; the `Result` matches [`CalendarClock::new`] so either can back [`PlatformClock`].
    pub fn new() -> io::Result<Self> {
        Ok(MonotonicClock {
            anchor: Instant::now(),
        })
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> u64 {
        self.anchor.elapsed().as_nanos() as u64
    }
}

/// Calendar (wall) clock adapted to the monotonic contract: a reading never goes below the
/// previous one, so a backwards wall-clock step shows up as a zero-length interval.
pub struct CalendarClock {
    last: Cell<u64>,
}

impl CalendarClock {
    /// Create the clock, failing if the calendar clock can't be read
    pub fn new() -> io::Result<Self> {
        let start = calendar_nanos()?;
        Ok(CalendarClock {
            last: Cell::new(start),
        })
    }
}

impl Clock for CalendarClock {
    #[inline]
    fn now(&self) -> u64 {
        // a clock set before the epoch reads as a stall rather than a jump
        let reading = calendar_nanos().unwrap_or(0).max(self.last.get());
        self.last.set(reading);
        reading
    }
}

fn calendar_nanos() -> io::Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|since| since.as_nanos() as u64)
        .map_err(|e| io::Error::other(format!("calendar clock is before the epoch: {e}")))
}

/// Clock used by the harness on this build
#[cfg(not(feature = "calendar-clock"))]
pub type PlatformClock = MonotonicClock;

/// Clock used by the harness on this build
#[cfg(feature = "calendar-clock")]
pub type PlatformClock = CalendarClock;

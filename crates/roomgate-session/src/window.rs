//! Time-partitioned read/write access to a live session.
//!
//! Instead of locking a session's roster against concurrent readers and
//! writers, every session's lifetime is cut into recurring cycles. Each
//! cycle starts with a write window and ends with a read window:
//!
//! ```text
//!  session start
//!  │
//!  ├──── write ────┬─ read ─┼──── write ────┬─ read ─┼── …
//!  0              30       40              70       80   (seconds)
//! ```
//!
//! The two windows are disjoint and together cover the whole cycle, so
//! at every instant exactly one kind of access is allowed. This only
//! orders traffic as well as callers' clocks and round trips stay inside
//! the window margins; it is not a linearizability guarantee.

use std::fmt;
use std::time::{Duration, Instant};

use crate::SessionError;

/// The two kinds of access a session accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// The window schedule shared by every session on a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessWindowGate {
    cycle: Duration,
    write_window: Duration,
}

impl AccessWindowGate {
    /// Builds a schedule where each `cycle` opens with `write_window` of
    /// writes and spends the rest on reads.
    ///
    /// # Errors
    /// [`SessionError::InvalidConfig`] unless `0 < write_window < cycle`;
    /// both windows must be non-empty.
    pub fn new(cycle: Duration, write_window: Duration) -> Result<Self, SessionError> {
        if write_window.is_zero() || write_window >= cycle {
            return Err(SessionError::InvalidConfig(format!(
                "write window {write_window:?} must be non-zero and shorter than cycle {cycle:?}"
            )));
        }
        Ok(Self {
            cycle,
            write_window,
        })
    }

    pub fn cycle(&self) -> Duration {
        self.cycle
    }

    pub fn write_window(&self) -> Duration {
        self.write_window
    }

    pub fn read_window(&self) -> Duration {
        self.cycle - self.write_window
    }

    /// Which access is open `elapsed` after session start.
    pub fn open_at(&self, elapsed: Duration) -> Access {
        let phase = elapsed.as_nanos() % self.cycle.as_nanos();
        if phase < self.write_window.as_nanos() {
            Access::Write
        } else {
            Access::Read
        }
    }

    /// `true` iff `now` falls in a read window of a session started at
    /// `started_at`.
    pub fn can_read(&self, started_at: Instant, now: Instant) -> bool {
        self.open_at(now.saturating_duration_since(started_at)) == Access::Read
    }

    /// `true` iff `now` falls in a write window of a session started at
    /// `started_at`.
    pub fn can_write(&self, started_at: Instant, now: Instant) -> bool {
        self.open_at(now.saturating_duration_since(started_at)) == Access::Write
    }
}

impl Default for AccessWindowGate {
    /// 40 second cycles: 30 s of writes, then 10 s of reads.
    fn default() -> Self {
        Self {
            cycle: Duration::from_secs(40),
            write_window: Duration::from_secs(30),
        }
    }
}

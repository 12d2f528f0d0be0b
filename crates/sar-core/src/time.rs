//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing millisecond counter, `SimTime`.  Every
//! mission timeout (GPS transit, approach, patrol windows, claim leases) is
//! measured as a difference of two `SimTime`s, never as a count of ticks, so
//! the FSM behaves identically whether the driver ticks at 10 Hz or 60 Hz or
//! with a jittery variable step.
//!
//! Integer milliseconds keep lease comparisons exact: a claim stamped at
//! `T` with a 15 s timeout is stale at `T + 15_001 ms` and not a millisecond
//! earlier, regardless of how many ticks happened in between.

use std::fmt;
use std::time::Duration;

// ── SimTime ───────────────────────────────────────────────────────────────────

/// An absolute simulation timestamp in milliseconds since mission start.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    #[inline]
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms)
    }

    /// Build from fractional seconds (rounded to the nearest millisecond).
    #[inline]
    pub fn from_secs_f32(secs: f32) -> SimTime {
        SimTime((secs.max(0.0) * 1_000.0).round() as u64)
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f32(self) -> f32 {
        self.0 as f32 / 1_000.0
    }

    /// Time elapsed from `earlier` to `self`.  Saturates at zero if
    /// `earlier` is in the future.
    #[inline]
    pub fn since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl std::ops::Add<Duration> for SimTime {
    type Output = SimTime;
    #[inline]
    fn add(self, rhs: Duration) -> SimTime {
        SimTime(self.0 + rhs.as_millis() as u64)
    }
}

impl std::ops::Sub for SimTime {
    type Output = Duration;
    #[inline]
    fn sub(self, rhs: SimTime) -> Duration {
        self.since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={:.3}s", self.as_secs_f32())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// The fleet's shared clock.  Advanced once per tick by the driver.
///
/// `tick_duration` is the default step; [`advance_by`][Self::advance_by]
/// supports variable-rate drivers.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Default step used by [`advance`][Self::advance].
    pub tick_duration: Duration,
    /// Current simulation time.
    pub now: SimTime,
    /// Number of ticks taken so far.
    pub ticks: u64,
}

impl SimClock {
    /// Create a clock at `SimTime::ZERO` with the given fixed step.
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_duration,
            now: SimTime::ZERO,
            ticks: 0,
        }
    }

    /// Advance by one fixed step.
    #[inline]
    pub fn advance(&mut self) {
        self.advance_by(self.tick_duration);
    }

    /// Advance by an arbitrary step.
    #[inline]
    pub fn advance_by(&mut self, dt: Duration) {
        self.now = self.now + dt;
        self.ticks += 1;
    }

    /// The fixed step in seconds, as used by kinematic updates.
    #[inline]
    pub fn dt_secs(&self) -> f32 {
        self.tick_duration.as_secs_f32()
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tick {})", self.now, self.ticks)
    }
}

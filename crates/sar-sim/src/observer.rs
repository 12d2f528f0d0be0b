//! Fleet observer trait for progress reporting.

use sar_core::SimTime;

use crate::FleetSummary;

/// Callbacks invoked by [`Fleet::run`][crate::Fleet::run] and
/// [`Fleet::run_ticks`][crate::Fleet::run_ticks].
///
/// All methods have default no-op implementations.  Per-agent events
/// (phase changes, positions, completion) are delivered through
/// [`sar_agent::MissionObserver`] instead.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct Progress;
///
/// impl FleetObserver for Progress {
///     fn on_tick_end(&mut self, now: SimTime, active: usize) {
///         if now.as_millis() % 10_000 == 0 {
///             println!("{now}: {active} agents still searching");
///         }
///     }
/// }
/// ```
pub trait FleetObserver {
    /// Called before any agent is ticked.  `now` is the new tick's time.
    fn on_tick_start(&mut self, _now: SimTime) {}

    /// Called after every agent was ticked.  `active` counts agents that
    /// have not finished yet.
    fn on_tick_end(&mut self, _now: SimTime, _active: usize) {}

    /// Called once when [`Fleet::run`][crate::Fleet::run] stops.
    fn on_fleet_end(&mut self, _summary: &FleetSummary) {}
}

/// A [`FleetObserver`] that does nothing.
pub struct NoopFleetObserver;

impl FleetObserver for NoopFleetObserver {}

//! Fleet-level settings.

use std::time::Duration;

use crate::navigator::DEFAULT_SPEED;
use crate::{FleetError, FleetResult};

/// Settings shared by the whole fleet.  Per-agent tunables live in
/// [`sar_agent::AgentConfig`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    /// Master seed; every agent derives its own stream from it.
    pub seed:                  u64,
    /// Simulated time per tick, in milliseconds.
    pub tick_ms:               u64,
    /// Stop the run after this much simulated time.
    pub max_mission_secs:      f32,
    /// Default claim lease, in seconds.
    pub claim_timeout_secs:    f32,
    /// Cruise speed of every navigator.
    pub nav_speed:             f32,
    /// End the run as soon as one agent has landed beside the target.
    pub stop_on_first_success: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            tick_ms:               100,
            max_mission_secs:      600.0,
            claim_timeout_secs:    15.0,
            nav_speed:             DEFAULT_SPEED,
            stop_on_first_success: true,
        }
    }
}

impl FleetConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn claim_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.claim_timeout_secs)
    }

    pub fn validate(&self) -> FleetResult<()> {
        if self.tick_ms == 0 {
            return Err(FleetError::Config("tick_ms must be at least 1".into()));
        }
        if !(self.max_mission_secs.is_finite() && self.max_mission_secs > 0.0) {
            return Err(FleetError::Config(format!(
                "max_mission_secs must be positive, got {}",
                self.max_mission_secs
            )));
        }
        if !(self.claim_timeout_secs.is_finite() && self.claim_timeout_secs > 0.0) {
            return Err(FleetError::Config(format!(
                "claim_timeout_secs must be positive, got {}",
                self.claim_timeout_secs
            )));
        }
        if !(self.nav_speed.is_finite() && self.nav_speed > 0.0) {
            return Err(FleetError::Config(format!("nav_speed must be positive, got {}", self.nav_speed)));
        }
        Ok(())
    }
}

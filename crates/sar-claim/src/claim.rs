//! A single lease record.

use std::time::Duration;

use sar_core::{AgentId, SimTime};

/// Lease timeout applied to targets without an explicit override.
pub const DEFAULT_CLAIM_TIMEOUT: Duration = Duration::from_secs(15);

/// Lease state attached to one claimable entity.
///
/// `holder == None` means the target is free.  `timestamp` is the last time
/// the holder acquired or refreshed the lease.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Claim {
    pub holder:    Option<AgentId>,
    pub timestamp: SimTime,
    pub timeout:   Duration,
}

impl Claim {
    /// A free claim with the given lease timeout.
    pub fn free(timeout: Duration) -> Self {
        Self { holder: None, timestamp: SimTime::ZERO, timeout }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.holder.is_none()
    }

    /// `true` once strictly more than `timeout` has passed since the last
    /// acquire/refresh.
    #[inline]
    pub fn is_expired(&self, now: SimTime) -> bool {
        now.since(self.timestamp) > self.timeout
    }

    #[inline]
    pub fn is_held_by(&self, agent: AgentId) -> bool {
        self.holder == Some(agent)
    }
}

//! The shared lease table.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::{DashMap, DashSet};
use sar_core::{AgentId, EntityId, SimTime};

use crate::{Claim, ClaimError, ClaimResult, DEFAULT_CLAIM_TIMEOUT};

/// Cumulative counters, read with [`ClaimRegistry::stats`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimStats {
    /// `try_claim` calls that acquired a free target.
    pub granted:   u64,
    /// `try_claim` calls by the current holder (no state change).
    pub reentrant: u64,
    /// `try_claim` calls refused because another agent holds the target.
    pub denied:    u64,
    /// Stale claims cleared before a `try_claim`.
    pub evicted:   u64,
    /// `release` calls that actually freed a target.
    pub released:  u64,
}

#[derive(Default)]
struct Counters {
    granted:   AtomicU64,
    reentrant: AtomicU64,
    denied:    AtomicU64,
    evicted:   AtomicU64,
    released:  AtomicU64,
}

/// Lease table shared by every agent of the fleet (`Arc<ClaimRegistry>`).
///
/// Each operation runs while holding the DashMap shard lock of its target's
/// entry, so the evict → check → set sequence of [`try_claim`] is atomic with
/// respect to every other operation on the same target.  Two agents racing
/// for the same person get exactly one `true`.
///
/// Claim records are created lazily on first use with the registry's default
/// timeout; [`set_timeout`] pre-creates a record with a custom one.
///
/// The registry never calls out to navigation or perception code, so no
/// lock is held across anything that could block.
///
/// [`try_claim`]: Self::try_claim
/// [`set_timeout`]: Self::set_timeout
pub struct ClaimRegistry {
    claims:          DashMap<EntityId, Claim>,
    active:          DashSet<AgentId>,
    default_timeout: Duration,
    counters:        Counters,
}

impl Default for ClaimRegistry {
    fn default() -> Self {
        Self {
            claims:          DashMap::new(),
            active:          DashSet::new(),
            default_timeout: DEFAULT_CLAIM_TIMEOUT,
            counters:        Counters::default(),
        }
    }
}

impl ClaimRegistry {
    /// Registry with the 15 s default lease timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a custom default lease timeout.
    pub fn with_default_timeout(timeout: Duration) -> ClaimResult<Self> {
        if timeout.is_zero() {
            return Err(ClaimError::ZeroTimeout(EntityId::INVALID));
        }
        Ok(Self { default_timeout: timeout, ..Self::default() })
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    // ── Holder liveness ───────────────────────────────────────────────────

    /// Mark `agent` as alive.  Agents are also registered implicitly by
    /// their first [`try_claim`][Self::try_claim].
    pub fn register_agent(&self, agent: AgentId) {
        self.active.insert(agent);
    }

    /// Mark `agent` as gone.  Its claims become stale immediately and are
    /// evicted by the next contender.
    pub fn deactivate_agent(&self, agent: AgentId) {
        if self.active.remove(&agent).is_some() {
            tracing::debug!(agent = %agent, "claim holder deactivated");
        }
    }

    pub fn is_active(&self, agent: AgentId) -> bool {
        self.active.contains(&agent)
    }

    // ── Configuration ─────────────────────────────────────────────────────

    /// Override the lease timeout for one target.
    pub fn set_timeout(&self, target: EntityId, timeout: Duration) -> ClaimResult<()> {
        if timeout.is_zero() {
            return Err(ClaimError::ZeroTimeout(target));
        }
        self.claims
            .entry(target)
            .and_modify(|c| c.timeout = timeout)
            .or_insert_with(|| Claim::free(timeout));
        Ok(())
    }

    // ── Lease operations ──────────────────────────────────────────────────

    /// Try to acquire `target` for `agent` at time `now`.
    ///
    /// A stale claim is evicted first.  Returns `true` if `agent` holds the
    /// target afterwards; re-claiming a target you already hold returns
    /// `true` and leaves the timestamp untouched.
    pub fn try_claim(&self, target: EntityId, agent: AgentId, now: SimTime) -> bool {
        self.active.insert(agent);

        let mut entry = self
            .claims
            .entry(target)
            .or_insert_with(|| Claim::free(self.default_timeout));
        let claim = entry.value_mut();

        if let Some(holder) = claim.holder {
            if !self.active.contains(&holder) || claim.is_expired(now) {
                tracing::debug!(
                    target_id = %target,
                    stale_holder = %holder,
                    "evicting stale claim"
                );
                claim.holder = None;
                self.counters.evicted.fetch_add(1, Ordering::Relaxed);
            }
        }

        match claim.holder {
            None => {
                claim.holder = Some(agent);
                claim.timestamp = now;
                self.counters.granted.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(target_id = %target, agent = %agent, "claim granted");
                true
            }
            Some(holder) if holder == agent => {
                self.counters.reentrant.fetch_add(1, Ordering::Relaxed);
                true
            }
            Some(holder) => {
                self.counters.denied.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(
                    target_id = %target,
                    agent = %agent,
                    holder = %holder,
                    "claim denied (already held)"
                );
                false
            }
        }
    }

    /// Extend `agent`'s lease on `target`.  No-op unless `agent` is the holder.
    pub fn refresh(&self, target: EntityId, agent: AgentId, now: SimTime) {
        if let Some(mut claim) = self.claims.get_mut(&target) {
            if claim.is_held_by(agent) {
                claim.timestamp = now;
            }
        }
    }

    /// Free `target` if `agent` holds it.  Returns `true` if a claim was
    /// actually released; releasing someone else's claim does nothing.
    pub fn release(&self, target: EntityId, agent: AgentId) -> bool {
        let Some(mut claim) = self.claims.get_mut(&target) else {
            return false;
        };
        if !claim.is_held_by(agent) {
            return false;
        }
        claim.holder = None;
        self.counters.released.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(target_id = %target, agent = %agent, "claim released");
        true
    }

    // ── Inspection ────────────────────────────────────────────────────────

    /// The current non-stale holder of `target`, if any.  Does not evict.
    pub fn holder(&self, target: EntityId, now: SimTime) -> Option<AgentId> {
        let claim = self.claims.get(&target)?;
        let holder = claim.holder?;
        (self.active.contains(&holder) && !claim.is_expired(now)).then_some(holder)
    }

    /// Copy of the raw claim record for `target`.
    pub fn claim(&self, target: EntityId) -> Option<Claim> {
        self.claims.get(&target).map(|c| *c)
    }

    pub fn stats(&self) -> ClaimStats {
        ClaimStats {
            granted:   self.counters.granted.load(Ordering::Relaxed),
            reentrant: self.counters.reentrant.load(Ordering::Relaxed),
            denied:    self.counters.denied.load(Ordering::Relaxed),
            evicted:   self.counters.evicted.load(Ordering::Relaxed),
            released:  self.counters.released.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for ClaimRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimRegistry")
            .field("claims", &self.claims.len())
            .field("active_agents", &self.active.len())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

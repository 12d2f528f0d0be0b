//! Mission event hooks.
//!
//! Observers are owned by the agent they watch and receive every event in
//! emission order.  They are dropped when the mission reaches a terminal
//! phase, after the completion event.

use sar_core::{AgentId, EntityId, SimTime, Vec3};

use crate::AgentPhase;

/// Handle returned by [`SearchAgent::subscribe`][crate::SearchAgent::subscribe].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(pub u32);

/// Summary produced once, when a mission reaches `Done` or `Abort`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MissionReport {
    pub agent:            AgentId,
    pub success:          bool,
    pub finished_at:      SimTime,
    /// Total path length travelled, warps included.
    pub distance:         f32,
    /// The person the agent was committed to when it finished, if any.
    pub target:           Option<EntityId>,
    pub landing_attempts: u32,
}

/// Callbacks for mission progress.
///
/// All methods have default no-op implementations so observers only
/// override what they need.
pub trait MissionObserver: Send {
    /// The agent entered `phase`.  Never fires for a no-op transition.
    fn on_phase_change(&mut self, _agent: AgentId, _phase: AgentPhase) {}

    /// Sampled once per tick with the agent's position.
    fn on_position(&mut self, _agent: AgentId, _now: SimTime, _position: Vec3) {}

    /// The mission finished.  Fires exactly once.
    fn on_mission_complete(&mut self, _report: &MissionReport) {}
}

/// An observer that does nothing.
pub struct NoopObserver;

impl MissionObserver for NoopObserver {}

#[derive(Default)]
pub(crate) struct Subscriptions {
    next_id: u32,
    entries: Vec<(SubscriptionId, Box<dyn MissionObserver>)>,
}

impl Subscriptions {
    pub(crate) fn add(&mut self, observer: Box<dyn MissionObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> Option<Box<dyn MissionObserver>> {
        let idx = self.entries.iter().position(|(sid, _)| *sid == id)?;
        Some(self.entries.remove(idx).1)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn each(&mut self, mut f: impl FnMut(&mut dyn MissionObserver)) {
        for (_, obs) in &mut self.entries {
            f(obs.as_mut());
        }
    }
}

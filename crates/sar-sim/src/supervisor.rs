//! Mission-level bookkeeping across a fleet.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sar_agent::{AgentPhase, MissionObserver, MissionReport, SearchAgent, SubscriptionId};
use sar_core::{AgentId, EntityId, SimTime};

/// Where one agent's mission stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MissionStatus {
    InProgress(AgentPhase),
    Succeeded,
    Failed,
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStatus::InProgress(phase) => write!(f, "in progress (phase: {phase})"),
            MissionStatus::Succeeded => f.write_str("completed"),
            MissionStatus::Failed => f.write_str("failed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentRecord {
    pub status:      MissionStatus,
    /// Path length reported at completion; `0.0` while in progress.
    pub distance:    f32,
    pub finished_at: Option<SimTime>,
    pub target:      Option<EntityId>,
}

type Records = Arc<Mutex<BTreeMap<AgentId, AgentRecord>>>;

fn lock(records: &Records) -> MutexGuard<'_, BTreeMap<AgentId, AgentRecord>> {
    records.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tracks the status of every agent it is attached to.
///
/// Cloning yields another handle to the same records.  Each tracked agent
/// owns a probe observer that writes into the shared table, so the
/// supervisor keeps its data after the agent detaches its observers.
#[derive(Clone, Default)]
pub struct MissionSupervisor {
    records: Records,
}

impl MissionSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `agent`.
    pub fn track(&self, agent: &mut SearchAgent) -> SubscriptionId {
        lock(&self.records).insert(
            agent.id(),
            AgentRecord {
                status:      MissionStatus::InProgress(agent.phase()),
                distance:    0.0,
                finished_at: None,
                target:      None,
            },
        );
        agent.subscribe(Box::new(SupervisorProbe { records: Arc::clone(&self.records) }))
    }

    pub fn status(&self, agent: AgentId) -> Option<MissionStatus> {
        lock(&self.records).get(&agent).map(|r| r.status)
    }

    pub fn record(&self, agent: AgentId) -> Option<AgentRecord> {
        lock(&self.records).get(&agent).cloned()
    }

    /// Operator-facing one-liner, e.g. `"in progress (phase: searching)"`.
    pub fn status_line(&self, agent: AgentId) -> String {
        match self.status(agent) {
            Some(status) => status.to_string(),
            None => "not tracked".to_string(),
        }
    }

    /// Agents that landed beside their target, ascending.
    pub fn succeeded(&self) -> Vec<AgentId> {
        lock(&self.records)
            .iter()
            .filter(|(_, r)| r.status == MissionStatus::Succeeded)
            .map(|(&id, _)| id)
            .collect()
    }

    /// `(succeeded, failed, in_progress)` counts.
    pub fn counts(&self) -> (usize, usize, usize) {
        lock(&self.records).values().fold((0, 0, 0), |(s, f, p), r| match r.status {
            MissionStatus::Succeeded => (s + 1, f, p),
            MissionStatus::Failed => (s, f + 1, p),
            MissionStatus::InProgress(_) => (s, f, p + 1),
        })
    }

    pub fn tracked(&self) -> usize {
        lock(&self.records).len()
    }
}

impl fmt::Debug for MissionSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(lock(&self.records).iter()).finish()
    }
}

struct SupervisorProbe {
    records: Records,
}

impl MissionObserver for SupervisorProbe {
    fn on_phase_change(&mut self, agent: AgentId, phase: AgentPhase) {
        if phase.is_terminal() {
            return;
        }
        if let Some(r) = lock(&self.records).get_mut(&agent) {
            r.status = MissionStatus::InProgress(phase);
        }
    }

    fn on_mission_complete(&mut self, report: &MissionReport) {
        let mut records = lock(&self.records);
        let Some(r) = records.get_mut(&report.agent) else { return };
        r.status = if report.success { MissionStatus::Succeeded } else { MissionStatus::Failed };
        r.distance = report.distance;
        r.finished_at = Some(report.finished_at);
        r.target = report.target;
    }
}

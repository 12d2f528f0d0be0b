//! Mission phases.

use std::fmt;

/// The phase of one agent's mission.  Exactly one is active at a time;
/// `Done` and `Abort` are terminal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentPhase {
    /// Transit to the mission's GPS-derived search area.
    #[default]
    GoingToGps,
    /// Patrolling the search area, scanning for a matching person.
    Searching,
    /// Holding a claim, flying to a landing point next to the target.
    Approaching,
    /// Running the ascend/descend landing protocol.
    Landing,
    /// Landed next to the target.
    Done,
    /// Gave up after exhausting landing attempts.
    Abort,
}

impl AgentPhase {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentPhase::Done | AgentPhase::Abort)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentPhase::GoingToGps  => "going_to_gps",
            AgentPhase::Searching   => "searching",
            AgentPhase::Approaching => "approaching",
            AgentPhase::Landing     => "landing",
            AgentPhase::Done        => "done",
            AgentPhase::Abort       => "abort",
        }
    }
}

impl fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

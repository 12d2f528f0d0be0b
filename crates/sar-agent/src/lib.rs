//! `sar-agent` — the mission state machine of one search agent.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`phase`]    | `AgentPhase` enum                                                 |
//! | [`config`]   | `AgentConfig` — every tunable, with field defaults                |
//! | [`ports`]    | `NavigationPort`, `PerceptionPort`, `GroundPort`, `ObstaclePort`, `Ports<'a>` |
//! | [`sensing`]  | FOV / line-of-sight filtering and deterministic target ranking    |
//! | [`observer`] | `MissionObserver`, `MissionReport`, `SubscriptionId`              |
//! | [`agent`]    | `SearchAgent` — the FSM itself                                    |
//! | [`landing`]  | landing retry protocol (ascend → descend → retry)                 |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                                    |
//!
//! # Tick model
//!
//! ```text
//! driver loop (e.g. sar-sim's Fleet):
//!   advance navigation kinematics by dt
//!   for each agent: agent.tick(now, dt, &mut ports)
//!
//! agent.tick:
//!   GoingToGps  → Searching   (arrival, or 60 s timeout)
//!   Searching   → Approaching (designated target or best visible match claimed)
//!   Approaching → Landing     (approach point reached)      | → Searching on failure
//!   Landing     → Done        (clean touchdown)             | → Abort after N failed attempts
//! ```
//!
//! Every timeout is measured on the simulation clock passed to `tick`, so the
//! tick rate only affects resolution, never behaviour.  Each phase keeps its
//! own runtime state, which is discarded the moment the phase changes.

pub mod agent;
pub mod config;
pub mod error;
pub mod landing;
pub mod observer;
pub mod phase;
pub mod ports;
pub mod sensing;

#[cfg(test)]
mod tests;

pub use agent::SearchAgent;
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use landing::LandingStage;
pub use observer::{MissionObserver, MissionReport, NoopObserver, SubscriptionId};
pub use phase::AgentPhase;
pub use ports::{GroundPort, NavigationPort, ObstaclePort, PerceptionPort, Ports, Sighting};
pub use sensing::{RankedCandidate, ViewCone};

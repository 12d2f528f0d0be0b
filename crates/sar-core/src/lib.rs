//! `sar-core` — foundational types for the `rust_sar` search fleet.
//!
//! This crate is a dependency of every other `sar-*` crate.  It has no `sar-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `AgentId`, `EntityId`                                 |
//! | [`geo`]     | `Vec3`, horizontal angle helpers                      |
//! | [`time`]    | `SimTime`, `SimClock`                                 |
//! | [`rng`]     | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`error`]   | `SarError`, `SarResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SarError, SarResult};
pub use geo::Vec3;
pub use ids::{AgentId, EntityId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimTime};

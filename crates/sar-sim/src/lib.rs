//! `sar-sim` — an in-memory world and a fleet driver for `sar-agent`.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`area`]       | `NavArea` (flat disk with pillar obstacles), `Obstacle`     |
//! | [`world`]      | `World` — people in an R-tree; perception/ground/obstacle ports |
//! | [`navigator`]  | `SimNavigator` — kinematic `NavigationPort`                 |
//! | [`spawner`]    | `PersonSpawner`, `SpawnReport`                              |
//! | [`supervisor`] | `MissionSupervisor`, `MissionStatus`                        |
//! | [`config`]     | `FleetConfig`                                               |
//! | [`fleet`]      | `Fleet`, `FleetBuilder`, `FleetSummary`                     |
//! | [`observer`]   | `FleetObserver`, `NoopFleetObserver`                        |
//! | [`error`]      | `FleetError`, `FleetResult<T>`                              |
//!
//! # Tick loop
//!
//! ```text
//! per tick:
//!   ① clock.advance()
//!   ② for each active agent, ascending AgentId (Rayon with `parallel`):
//!        navigator.advance(dt)
//!        agent.tick(now, dt, Ports { navigator, world, world, world })
//!   ③ stop when every agent is terminal, when one succeeded and
//!      `stop_on_first_success` is set, or at `max_mission_secs`
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                           |
//! |------------|--------------------------------------------------|
//! | `parallel` | Ticks agents on Rayon's thread pool.             |
//! | `serde`    | `Serialize`/`Deserialize` on `FleetConfig`.      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut world = World::new(NavArea::new(Vec3::ZERO, 60.0));
//! let spawn = PersonSpawner::exhaustive(20, gps, 15.0)
//!     .spawn(&mut world, &mut SimRng::new(7), Some(&descriptor))?;
//! let mut fleet = FleetBuilder::new(FleetConfig::default(), world, descriptor, gps)
//!     .agents(3)
//!     .designated_target(spawn.designated)
//!     .build()?;
//! let summary = fleet.run(&mut NoopFleetObserver);
//! ```

pub mod area;
pub mod config;
pub mod error;
pub mod fleet;
pub mod navigator;
pub mod observer;
pub mod spawner;
pub mod supervisor;
pub mod world;


pub use area::{NavArea, Obstacle};
pub use config::FleetConfig;
pub use error::{FleetError, FleetResult};
pub use fleet::{Fleet, FleetBuilder, FleetSummary};
pub use navigator::SimNavigator;
pub use observer::{FleetObserver, NoopFleetObserver};
pub use spawner::{PersonSpawner, SpawnReport};
pub use supervisor::{AgentRecord, MissionStatus, MissionSupervisor};
pub use world::{PERSON_HEIGHT, PERSON_RADIUS, Person, World};

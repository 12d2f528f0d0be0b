//! Contracts between the state machine and the world it runs in.
//!
//! The agent never touches world objects directly.  Everything it needs is
//! asked through these four traits, bundled per tick into [`Ports`].  The
//! reference implementations live in `sar-sim`; tests use scripted fakes.

use sar_core::{EntityId, Vec3};
use sar_match::PersonProfile;

/// Path-following mobility for one agent.
///
/// `warp` is a teleport and works whether or not path following is
/// enabled; the landing protocol disables path following and moves the
/// agent vertically with `warp`.
pub trait NavigationPort: Send {
    fn position(&self) -> Vec3;

    /// Current heading.  Only its horizontal part is used.
    fn forward(&self) -> Vec3;

    /// Start moving toward `point`.  Returns `false` if no path exists.
    fn set_destination(&mut self, point: Vec3) -> bool;

    /// A path request is still being computed.
    fn has_pending_path(&self) -> bool;

    /// A path is currently being followed.
    fn has_path(&self) -> bool;

    /// Distance left on the current path, or `0.0` without one.
    fn remaining_distance(&self) -> f32;

    /// Teleport to `point`, dropping any current path.
    fn warp(&mut self, point: Vec3);

    fn is_on_navigable_surface(&self) -> bool;

    /// Closest navigable point within `max_distance` of `point`.
    fn sample_navigable(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;

    fn set_enabled(&mut self, enabled: bool);

    fn is_enabled(&self) -> bool;
}

/// One perceived person: identity, appearance and where to look at it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sighting {
    pub entity:   EntityId,
    pub profile:  PersonProfile,
    /// Ground position, used for bearing and distance.
    pub position: Vec3,
    /// Body center, used as the line-of-sight aim point.
    pub center:   Vec3,
}

/// Person perception.  Shared read-only by every agent of a fleet.
pub trait PerceptionPort: Send + Sync {
    /// People within `radius` of `origin`.  `forward` and `fov` are hints;
    /// the agent applies its own field-of-view filter to whatever comes back.
    fn query_candidates(&self, origin: Vec3, radius: f32, forward: Vec3, fov: f32) -> Vec<Sighting>;

    /// Current ground position of `entity`, or `None` once it no longer exists.
    fn locate(&self, entity: EntityId) -> Option<Vec3>;
}

/// Terrain height queries.
pub trait GroundPort: Send + Sync {
    /// Height of the ground directly below `point`, or `None` if nothing is there.
    fn sample_ground_height(&self, point: Vec3) -> Option<f32>;
}

/// Occlusion and contact queries.
pub trait ObstaclePort: Send + Sync {
    /// First thing hit on the segment `from → to`.  Static geometry reports
    /// [`EntityId::TERRAIN`].
    fn raycast(&self, from: Vec3, to: Vec3) -> Option<EntityId>;

    /// A person whose body overlaps a sphere of `radius` around `center`.
    fn person_contact(&self, center: Vec3, radius: f32) -> Option<EntityId>;
}

/// Everything one agent tick may touch.  Built fresh by the driver for each
/// agent, pairing that agent's navigator with the shared world services.
pub struct Ports<'a> {
    pub nav:        &'a mut dyn NavigationPort,
    pub perception: &'a dyn PerceptionPort,
    pub ground:     &'a dyn GroundPort,
    pub obstacles:  &'a dyn ObstaclePort,
}

impl<'a> Ports<'a> {
    /// Bundle a navigator with a world that provides the three shared services.
    pub fn new<W>(nav: &'a mut dyn NavigationPort, world: &'a W) -> Self
    where
        W: PerceptionPort + GroundPort + ObstaclePort,
    {
        Self { nav, perception: world, ground: world, obstacles: world }
    }
}

//! Kinematic navigation for simulated agents.

use std::sync::Arc;

use sar_agent::NavigationPort;
use sar_core::Vec3;

use crate::area::NavArea;

/// Default cruise speed in units per second.
pub const DEFAULT_SPEED: f32 = 5.0;

/// Straight-line, constant-speed mover over a [`NavArea`].
///
/// Paths are computed instantly (`has_pending_path` is always `false`) and
/// run straight to the destination at ground level.  The fleet calls
/// [`advance`](Self::advance) once per tick before ticking the agent.
#[derive(Clone, Debug)]
pub struct SimNavigator {
    area:        Arc<NavArea>,
    position:    Vec3,
    heading:     Vec3,
    destination: Option<Vec3>,
    enabled:     bool,
    speed:       f32,
}

impl SimNavigator {
    pub fn new(area: Arc<NavArea>, position: Vec3, speed: f32) -> Self {
        Self {
            area,
            position,
            heading: Vec3::FORWARD,
            destination: None,
            enabled: false,
            speed,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Move toward the destination for `dt` seconds.  Arriving clears the
    /// destination.  No-op while disabled.
    pub fn advance(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }
        let Some(dest) = self.destination else { return };

        let to = (dest - self.position).flat();
        let dist = to.length();
        let step = self.speed * dt;
        if dist <= step {
            self.position = dest;
            self.destination = None;
        } else {
            self.heading = to.normalized_or_zero();
            self.position = (self.position + self.heading * step).with_y(dest.y);
        }
    }
}

impl NavigationPort for SimNavigator {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.heading
    }

    fn set_destination(&mut self, point: Vec3) -> bool {
        if !self.area.contains(point) {
            return false;
        }
        self.destination = Some(point.with_y(self.area.ground_height()));
        true
    }

    fn has_pending_path(&self) -> bool {
        false
    }

    fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    fn remaining_distance(&self) -> f32 {
        self.destination.map_or(0.0, |d| self.position.horizontal_distance(d))
    }

    fn warp(&mut self, point: Vec3) {
        self.position = point;
        self.destination = None;
    }

    fn is_on_navigable_surface(&self) -> bool {
        self.area.contains(self.position) && (self.position.y - self.area.ground_height()).abs() < 0.5
    }

    fn sample_navigable(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.area.sample(point, max_distance)
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

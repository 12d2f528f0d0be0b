//! Target selection: view-cone and line-of-sight filtering, then ranking.

use std::cmp::Ordering;

use sar_core::{EntityId, Vec3};
use sar_match::{PersonDescriptor, score};

use crate::ports::{ObstaclePort, Sighting};

/// The agent's view at one instant.
#[derive(Copy, Clone, Debug)]
pub struct ViewCone {
    pub origin:     Vec3,
    pub forward:    Vec3,
    pub radius:     f32,
    /// Full horizontal field of view in degrees.
    pub fov:        f32,
    pub eye_height: f32,
}

impl ViewCone {
    /// Within range and within `fov / 2` of the heading, both measured on
    /// the horizontal plane.  A zero heading or a candidate directly below
    /// the origin counts as inside the cone.
    pub fn contains(&self, point: Vec3) -> bool {
        if self.origin.horizontal_distance(point) > self.radius {
            return false;
        }
        let to_point = (point - self.origin).flat();
        self.forward.flat().angle_deg(to_point) <= self.fov * 0.5
    }

    pub fn eye(&self) -> Vec3 {
        self.origin + Vec3::UP * self.eye_height
    }
}

/// A sighting that passed every filter and met the threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RankedCandidate {
    pub entity:   EntityId,
    pub score:    f32,
    pub distance: f32,
}

/// Ordering where the preferred candidate compares `Less`: higher score,
/// then closer, then lower entity id.
pub fn preference(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.distance.total_cmp(&b.distance))
        .then(a.entity.cmp(&b.entity))
}

/// The sightings that are in view, unobstructed and scoring at least
/// `threshold` against `target`.
pub fn visible_matches<'s>(
    view: &'s ViewCone,
    sightings: &'s [Sighting],
    target: &'s PersonDescriptor,
    threshold: f32,
    obstacles: &'s dyn ObstaclePort,
) -> impl Iterator<Item = RankedCandidate> + 's {
    let eye = view.eye();
    sightings
        .iter()
        .filter(move |s| view.contains(s.position))
        .filter(move |s| match obstacles.raycast(eye, s.center) {
            None => true,
            Some(hit) => hit == s.entity,
        })
        .filter_map(move |s| {
            let score = score(&s.profile, target);
            (score >= threshold).then(|| RankedCandidate {
                entity:   s.entity,
                score,
                distance: view.origin.horizontal_distance(s.position),
            })
        })
}

/// The best visible match, ranked by [`preference`].
pub fn best_match(
    view: &ViewCone,
    sightings: &[Sighting],
    target: &PersonDescriptor,
    threshold: f32,
    obstacles: &dyn ObstaclePort,
) -> Option<RankedCandidate> {
    visible_matches(view, sightings, target, threshold, obstacles).min_by(preference)
}

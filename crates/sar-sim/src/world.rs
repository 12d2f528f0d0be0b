//! The reference world: people, ground and occluders.
//!
//! # Spatial index
//!
//! People are indexed by their horizontal `[x, z]` position in an R-tree
//! (via `rstar`).  Perception radius queries and contact checks only touch
//! the people near the query point.

use std::collections::HashMap;
use std::sync::Arc;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use sar_agent::{GroundPort, ObstaclePort, PerceptionPort, Sighting};
use sar_core::{EntityId, Vec3};
use sar_match::PersonProfile;

use crate::area::{NavArea, segment_cylinder};

/// Body radius of a person (vertical cylinder).
pub const PERSON_RADIUS: f32 = 0.3;
/// Body height of a person.
pub const PERSON_HEIGHT: f32 = 1.8;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct PersonEntry {
    point:  [f32; 2], // [x, z]
    entity: EntityId,
}

impl RTreeObject for PersonEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PersonEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dz = self.point[1] - point[1];
        dx * dx + dz * dz
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// A spawned person.
#[derive(Clone, Debug, PartialEq)]
pub struct Person {
    pub profile:  PersonProfile,
    /// Ground position (bottom of the body cylinder).
    pub position: Vec3,
}

impl Person {
    pub fn center(&self) -> Vec3 {
        self.position + Vec3::UP * (PERSON_HEIGHT * 0.5)
    }
}

/// People on a [`NavArea`].  Implements the perception, ground and obstacle
/// ports; navigators share the same `NavArea`.
pub struct World {
    area:    Arc<NavArea>,
    people:  HashMap<EntityId, Person>,
    index:   RTree<PersonEntry>,
    next_id: u32,
}

impl World {
    pub fn new(area: NavArea) -> Self {
        Self {
            area:    Arc::new(area),
            people:  HashMap::new(),
            index:   RTree::new(),
            next_id: 0,
        }
    }

    pub fn area(&self) -> &Arc<NavArea> {
        &self.area
    }

    /// Place a person standing on the ground at `position`'s x/z.
    pub fn add_person(&mut self, profile: PersonProfile, position: Vec3) -> EntityId {
        let entity = EntityId(self.next_id);
        self.next_id += 1;
        let position = position.with_y(self.area.ground_height());
        self.index.insert(PersonEntry { point: [position.x, position.z], entity });
        self.people.insert(entity, Person { profile, position });
        entity
    }

    /// Remove a person.  Agents holding it as a target see it disappear on
    /// their next tick.  Returns `false` if it did not exist.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        let Some(person) = self.people.remove(&entity) else {
            return false;
        };
        self.index.remove(&PersonEntry { point: [person.position.x, person.position.z], entity });
        tracing::debug!(entity = %entity, "person despawned");
        true
    }

    pub fn person(&self, entity: EntityId) -> Option<&Person> {
        self.people.get(&entity)
    }

    pub fn people_count(&self) -> usize {
        self.people.len()
    }

    /// Entity ids of everyone in the world, ascending.
    pub fn entities(&self) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = self.people.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn near(&self, point: Vec3, radius: f32) -> impl Iterator<Item = (EntityId, &Person)> + '_ {
        self.index
            .locate_within_distance([point.x, point.z], radius * radius)
            .filter_map(|e| self.people.get(&e.entity).map(|p| (e.entity, p)))
    }
}

impl PerceptionPort for World {
    fn query_candidates(&self, origin: Vec3, radius: f32, _forward: Vec3, _fov: f32) -> Vec<Sighting> {
        let mut out: Vec<Sighting> = self
            .near(origin, radius)
            .map(|(entity, p)| Sighting {
                entity,
                profile:  p.profile.clone(),
                position: p.position,
                center:   p.center(),
            })
            .collect();
        out.sort_unstable_by_key(|s| s.entity);
        out
    }

    fn locate(&self, entity: EntityId) -> Option<Vec3> {
        self.people.get(&entity).map(|p| p.position)
    }
}

impl GroundPort for World {
    fn sample_ground_height(&self, point: Vec3) -> Option<f32> {
        self.area.over_ground(point).then(|| self.area.ground_height())
    }
}

impl ObstaclePort for World {
    fn raycast(&self, from: Vec3, to: Vec3) -> Option<EntityId> {
        let mut best: Option<(f32, EntityId)> = None;
        let mut consider = |t: f32, id: EntityId| {
            if best.is_none_or(|(bt, bid)| t < bt || (t == bt && id < bid)) {
                best = Some((t, id));
            }
        };

        for o in self.area.obstacles() {
            if let Some(t) = o.intersect_segment(from, to) {
                consider(t, EntityId::TERRAIN);
            }
        }

        let lo = [from.x.min(to.x) - PERSON_RADIUS, from.z.min(to.z) - PERSON_RADIUS];
        let hi = [from.x.max(to.x) + PERSON_RADIUS, from.z.max(to.z) + PERSON_RADIUS];
        for entry in self.index.locate_in_envelope_intersecting(&AABB::from_corners(lo, hi)) {
            let Some(p) = self.people.get(&entry.entity) else { continue };
            if let Some(t) = segment_cylinder(from, to, p.position, PERSON_RADIUS, PERSON_HEIGHT) {
                consider(t, entry.entity);
            }
        }

        best.map(|(_, id)| id)
    }

    fn person_contact(&self, center: Vec3, radius: f32) -> Option<EntityId> {
        self.near(center, radius + PERSON_RADIUS)
            .filter(|(_, p)| {
                center.y - radius < p.position.y + PERSON_HEIGHT && center.y + radius > p.position.y
            })
            .map(|(entity, _)| entity)
            .min()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("area", &self.area)
            .field("people", &self.people.len())
            .finish()
    }
}

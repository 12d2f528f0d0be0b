//! Crowd generation.

use sar_core::{EntityId, SimRng, Vec3};
use sar_match::{DescriptorPool, PersonDescriptor, PersonProfile};

use crate::{FleetError, FleetResult, World};

/// Snap radius tried first when projecting a spawn point onto the area.
const SNAP_NEAR: f32 = 3.0;
/// Fallback snap radius.
const SNAP_FAR: f32 = 1_000.0;

/// Outcome of [`PersonSpawner::spawn`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpawnReport {
    /// Every spawned person, in spawn order.
    pub people:     Vec<EntityId>,
    /// The person dressed as the mission descriptor, if one was forced in.
    pub designated: Option<EntityId>,
}

/// Dresses a crowd from a pool of distinct descriptors and scatters it over
/// a disk.
///
/// The pool is shuffled and each person gets a different entry, so at most
/// `pool.len()` people are spawned.  With a mission descriptor, one randomly
/// chosen slot is dressed as the target instead (with probability
/// `include_target_probability`) and reported as the designated target.
#[derive(Clone, Debug)]
pub struct PersonSpawner {
    pool:                           DescriptorPool,
    pub count:                      usize,
    pub center:                     Vec3,
    pub radius:                     f32,
    pub include_target_probability: f64,
}

impl PersonSpawner {
    pub fn new(pool: DescriptorPool, count: usize, center: Vec3, radius: f32) -> Self {
        Self { pool, count, center, radius, include_target_probability: 1.0 }
    }

    /// Spawner over every distinct fully-specified descriptor.
    pub fn exhaustive(count: usize, center: Vec3, radius: f32) -> Self {
        Self::new(DescriptorPool::exhaustive(), count, center, radius)
    }

    pub fn with_target_probability(mut self, p: f64) -> Self {
        self.include_target_probability = p;
        self
    }

    pub fn pool(&self) -> &DescriptorPool {
        &self.pool
    }

    /// Populate `world`.  Draws every random choice from `rng`, so a fixed
    /// seed reproduces the same crowd.
    pub fn spawn(
        &self,
        world: &mut World,
        rng: &mut SimRng,
        mission: Option<&PersonDescriptor>,
    ) -> FleetResult<SpawnReport> {
        let mut unique = self.pool.as_slice().to_vec();
        if unique.is_empty() && mission.is_none() {
            return Err(FleetError::EmptyPool);
        }
        rng.shuffle(&mut unique);

        let to_spawn = self.count.min(unique.len().max(1));
        if self.count > unique.len() {
            tracing::warn!(
                requested = self.count,
                available = unique.len(),
                spawning = to_spawn,
                "not enough distinct descriptors"
            );
        }

        let forced = match mission {
            Some(desc) if to_spawn > 0 && rng.gen_bool(self.include_target_probability) => {
                Some((rng.gen_range(0..to_spawn), *desc))
            }
            _ => None,
        };

        let mut report = SpawnReport::default();
        for i in 0..to_spawn {
            let desc = match forced {
                Some((slot, target)) if slot == i => target,
                _ if unique.is_empty() => continue,
                _ => unique[i % unique.len()],
            };

            let raw = rng.point_in_disk(self.center, self.radius);
            let area = world.area();
            let Some(pos) = area.sample(raw, SNAP_NEAR).or_else(|| area.sample(raw, SNAP_FAR)) else {
                tracing::warn!(point = %raw, "no navigable spawn point, skipping person");
                continue;
            };

            let backpack = desc.active_backpack().unwrap_or_else(|| rng.gen_bool(0.5));
            let entity = world.add_person(PersonProfile::from_descriptor(&desc, backpack), pos);
            report.people.push(entity);

            if forced.is_some_and(|(slot, _)| slot == i) {
                tracing::info!(entity = %entity, position = %pos, target = %desc, "mission target spawned");
                report.designated = Some(entity);
            }
        }

        tracing::info!(
            center = %self.center,
            radius = self.radius,
            count = report.people.len(),
            "crowd spawned"
        );
        Ok(report)
    }
}

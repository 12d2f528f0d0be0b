//! The navigable area: a flat disk of ground with pillar-shaped obstacles.

use sar_core::Vec3;

/// How far inside the boundary a snapped point is placed.
const EDGE_MARGIN: f32 = 0.05;

/// A vertical cylinder standing on the ground (tree, pillar, building
/// corner).  Blocks line of sight and is excluded from the navigable area.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstacle {
    /// Center of the cylinder's base.
    pub base:   Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(base: Vec3, radius: f32, height: f32) -> Self {
        Self { base, radius, height }
    }

    /// Entry parameter of the segment `from → to` into this cylinder.
    pub fn intersect_segment(&self, from: Vec3, to: Vec3) -> Option<f32> {
        segment_cylinder(from, to, self.base, self.radius, self.height)
    }
}

/// Smallest `t ∈ [0, 1]` at which `from + t·(to - from)` is inside the
/// vertical cylinder of `radius` and `height` standing on `base`.
pub(crate) fn segment_cylinder(from: Vec3, to: Vec3, base: Vec3, radius: f32, height: f32) -> Option<f32> {
    let d = to - from;
    let fx = from.x - base.x;
    let fz = from.z - base.z;

    // Horizontal interval: |(f + t·d)_xz| ≤ radius.
    let a = d.x * d.x + d.z * d.z;
    let c = fx * fx + fz * fz - radius * radius;
    let (h0, h1) = if a < 1e-9 {
        if c > 0.0 {
            return None;
        }
        (0.0, 1.0)
    } else {
        let b = 2.0 * (fx * d.x + fz * d.z);
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return None;
        }
        let s = disc.sqrt();
        ((-b - s) / (2.0 * a), (-b + s) / (2.0 * a))
    };

    // Vertical interval: base.y ≤ y(t) ≤ base.y + height.
    let bottom = base.y;
    let top = base.y + height;
    let (v0, v1) = if d.y.abs() < 1e-9 {
        if from.y < bottom || from.y > top {
            return None;
        }
        (0.0, 1.0)
    } else {
        let ta = (bottom - from.y) / d.y;
        let tb = (top - from.y) / d.y;
        (ta.min(tb), ta.max(tb))
    };

    let lo = h0.max(v0).max(0.0);
    let hi = h1.min(v1).min(1.0);
    (lo <= hi).then_some(lo)
}

/// Flat ground at `center.y` inside a disk of `radius`, minus obstacle
/// footprints.
///
/// Shared read-only (`Arc<NavArea>`) between the world and every navigator.
#[derive(Clone, Debug)]
pub struct NavArea {
    center:    Vec3,
    radius:    f32,
    obstacles: Vec<Obstacle>,
}

impl NavArea {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius, obstacles: Vec::new() }
    }

    /// Add a pillar of `radius` and `height` standing on the ground at `at`.
    pub fn with_obstacle(mut self, at: Vec3, radius: f32, height: f32) -> Self {
        self.obstacles.push(Obstacle::new(at.with_y(self.center.y), radius, height));
        self
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn ground_height(&self) -> f32 {
        self.center.y
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Inside the ground disk, ignoring obstacles.
    pub fn over_ground(&self, point: Vec3) -> bool {
        self.center.horizontal_distance(point) <= self.radius
    }

    /// Inside the disk and outside every obstacle footprint.
    pub fn contains(&self, point: Vec3) -> bool {
        self.over_ground(point)
            && self
                .obstacles
                .iter()
                .all(|o| o.base.horizontal_distance(point) >= o.radius)
    }

    /// Closest navigable ground point to `point`, if one lies within
    /// `max_distance` (measured horizontally).
    ///
    /// Points outside the disk are pulled onto its rim; points inside an
    /// obstacle footprint are pushed radially out of it.
    pub fn sample(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        let ground = self.ground_height();
        let mut snapped = point.with_y(ground);

        let offset = (snapped - self.center).flat();
        let dist = offset.length();
        if dist > self.radius {
            let keep = (self.radius - EDGE_MARGIN).max(0.0) / dist;
            snapped = self.center.with_y(ground) + offset * keep;
        }

        for o in &self.obstacles {
            let away = (snapped - o.base).flat();
            let d = away.length();
            if d < o.radius {
                let dir = if d > 1e-6 { away * (1.0 / d) } else { Vec3::new(1.0, 0.0, 0.0) };
                snapped = o.base.with_y(ground) + dir * (o.radius + EDGE_MARGIN);
            }
        }

        (self.contains(snapped) && snapped.horizontal_distance(point) <= max_distance).then_some(snapped)
    }
}

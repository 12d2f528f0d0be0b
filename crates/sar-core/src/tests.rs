//! Unit tests for sar-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, EntityId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(EntityId(0) < EntityId(1));
        assert!(AgentId(100) > AgentId(99));
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_eq!(EntityId::INVALID.0, u32::MAX);
        assert_ne!(EntityId::TERRAIN, EntityId::INVALID);
        assert_eq!(AgentId::default(), AgentId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "agent#7");
        assert_eq!(EntityId(3).to_string(), "entity#3");
    }
}

#[cfg(test)]
mod geo {
    use crate::Vec3;

    #[test]
    fn distance_and_flat() {
        let a = Vec3::new(0.0, 5.0, 0.0);
        let b = Vec3::new(3.0, 1.0, 4.0);
        assert!((a.horizontal_distance(b) - 5.0).abs() < 1e-5);
        assert!(a.distance(b) > 5.0);
        assert_eq!(b.flat(), Vec3::new(3.0, 0.0, 4.0));
    }

    #[test]
    fn angle_between_axes() {
        let fwd = Vec3::FORWARD;
        assert!((fwd.angle_deg(Vec3::new(1.0, 0.0, 0.0)) - 90.0).abs() < 1e-3);
        assert!((fwd.angle_deg(-fwd) - 180.0).abs() < 1e-3);
        assert!(fwd.angle_deg(Vec3::new(0.0, 0.0, 10.0)).abs() < 1e-3);
    }

    #[test]
    fn zero_vector_angle_is_zero() {
        assert_eq!(Vec3::FORWARD.angle_deg(Vec3::ZERO), 0.0);
        assert_eq!(Vec3::ZERO.normalized_or_zero(), Vec3::ZERO);
    }
}

#[cfg(test)]
mod time {
    use std::time::Duration;

    use crate::{SimClock, SimTime};

    #[test]
    fn since_saturates() {
        let a = SimTime::from_millis(1_000);
        let b = SimTime::from_millis(4_500);
        assert_eq!(b.since(a), Duration::from_millis(3_500));
        assert_eq!(a.since(b), Duration::ZERO);
        assert_eq!(b - a, Duration::from_millis(3_500));
    }

    #[test]
    fn secs_conversion_rounds() {
        assert_eq!(SimTime::from_secs_f32(1.2346), SimTime(1_235));
        assert_eq!(SimTime::from_secs_f32(-3.0), SimTime::ZERO);
        assert!((SimTime(2_500).as_secs_f32() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn clock_fixed_and_variable_steps() {
        let mut clock = SimClock::new(Duration::from_millis(100));
        clock.advance();
        clock.advance();
        assert_eq!(clock.now, SimTime(200));
        clock.advance_by(Duration::from_millis(35));
        assert_eq!(clock.now, SimTime(235));
        assert_eq!(clock.ticks, 3);
        assert!((clock.dt_secs() - 0.1).abs() < 1e-6);
    }
}

#[cfg(test)]
mod rng {
    use crate::{AgentId, AgentRng, SimRng, Vec3};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = AgentRng::new(12345, AgentId(0));
        let mut r2 = AgentRng::new(12345, AgentId(0));
        for _ in 0..100 {
            let a: f32 = r1.gen_range(0.0..1.0);
            let b: f32 = r2.gen_range(0.0..1.0);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_agents_differ() {
        let mut r0 = AgentRng::new(1, AgentId(0));
        let mut r1 = AgentRng::new(1, AgentId(1));
        let a: u64 = r0.gen_range(0..u64::MAX);
        let b: u64 = r1.gen_range(0..u64::MAX);
        assert_ne!(a, b, "seeds for adjacent agents should diverge");
    }

    #[test]
    fn disk_points_stay_inside() {
        let mut rng = SimRng::new(7);
        let center = Vec3::new(10.0, 2.0, -4.0);
        for _ in 0..500 {
            let p = rng.point_in_disk(center, 5.0);
            assert!(center.horizontal_distance(p) <= 5.0 + 1e-4);
            assert_eq!(p.y, 2.0);
        }
    }

    #[test]
    fn ring_offset_within_bounds() {
        let mut rng = AgentRng::new(3, AgentId(2));
        let target = Vec3::new(1.0, 0.0, 1.0);
        for _ in 0..500 {
            let p = rng.ring_offset(target, 2.0, 4.0);
            let d = target.horizontal_distance(p);
            assert!((2.0 - 1e-4..4.0 + 1e-4).contains(&d), "got {d}");
        }
    }

    #[test]
    fn degenerate_ring_uses_min() {
        let mut rng = AgentRng::new(3, AgentId(2));
        let p = rng.ring_offset(Vec3::ZERO, 3.0, 3.0);
        assert!((p.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = AgentRng::new(0, AgentId(0));
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}

//! Unit tests for sar-agent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sar_claim::ClaimRegistry;
use sar_core::{AgentId, EntityId, SimClock, Vec3};
use sar_match::{HeadgearType, ItemColor, PersonDescriptor, PersonProfile};

use crate::{
    AgentConfig, AgentError, AgentPhase, GroundPort, LandingStage, MissionObserver, MissionReport,
    NavigationPort, ObstaclePort, PerceptionPort, Ports, SearchAgent, Sighting,
};

// ── Fakes ─────────────────────────────────────────────────────────────────────

const DT: Duration = Duration::from_millis(100);
const SEED: u64 = 42;

/// Flat-ground navigator moving in straight lines at `speed`.
struct FakeNav {
    pos:        Vec3,
    heading:    Vec3,
    dest:       Option<Vec3>,
    enabled:    bool,
    speed:      f32,
    /// `sample_navigable` finds a point.
    navigable:  bool,
    /// `set_destination` finds a path.
    reachable:  bool,
    on_surface: bool,
    /// Every `warp` target, in order.
    warps:      Vec<Vec3>,
}

impl FakeNav {
    fn at(pos: Vec3) -> Self {
        Self {
            pos,
            heading:    Vec3::FORWARD,
            dest:       None,
            enabled:    false,
            speed:      5.0,
            navigable:  true,
            reachable:  true,
            on_surface: true,
            warps:      Vec::new(),
        }
    }

    fn advance(&mut self, dt: f32) {
        if !self.enabled {
            return;
        }
        let Some(dest) = self.dest else { return };
        let to = (dest - self.pos).flat();
        let dist = to.length();
        let step = self.speed * dt;
        if dist <= step {
            self.pos = dest;
            self.dest = None;
        } else if step > 0.0 {
            self.heading = to.normalized_or_zero();
            self.pos += self.heading * step;
        }
    }
}

impl NavigationPort for FakeNav {
    fn position(&self) -> Vec3 { self.pos }
    fn forward(&self) -> Vec3 { self.heading }
    fn set_destination(&mut self, point: Vec3) -> bool {
        if self.reachable {
            self.dest = Some(point);
        }
        self.reachable
    }
    fn has_pending_path(&self) -> bool { false }
    fn has_path(&self) -> bool { self.dest.is_some() }
    fn remaining_distance(&self) -> f32 {
        self.dest.map_or(0.0, |d| self.pos.horizontal_distance(d))
    }
    fn warp(&mut self, point: Vec3) {
        self.pos = point;
        self.dest = None;
        self.warps.push(point);
    }
    fn is_on_navigable_surface(&self) -> bool { self.on_surface }
    fn sample_navigable(&self, point: Vec3, _max_distance: f32) -> Option<Vec3> {
        self.navigable.then_some(point.with_y(0.0))
    }
    fn set_enabled(&mut self, enabled: bool) { self.enabled = enabled; }
    fn is_enabled(&self) -> bool { self.enabled }
}

struct FakePerson {
    entity:   EntityId,
    profile:  PersonProfile,
    position: Vec3,
}

/// Flat ground at y = 0 with a scriptable crowd and scriptable occlusion.
#[derive(Default)]
struct FakeWorld {
    people:         Vec<FakePerson>,
    /// Every raycast reports this hit.
    ray_hit:        Option<EntityId>,
    /// Every contact query reports the first person.
    contact_always: bool,
}

impl FakeWorld {
    fn with_person(mut self, entity: u32, desc: &PersonDescriptor, position: Vec3) -> Self {
        self.people.push(FakePerson {
            entity:  EntityId(entity),
            profile: PersonProfile::from_descriptor(desc, false),
            position,
        });
        self
    }
}

impl PerceptionPort for FakeWorld {
    fn query_candidates(&self, origin: Vec3, radius: f32, _forward: Vec3, _fov: f32) -> Vec<Sighting> {
        self.people
            .iter()
            .filter(|p| origin.horizontal_distance(p.position) <= radius)
            .map(|p| Sighting {
                entity:   p.entity,
                profile:  p.profile.clone(),
                position: p.position,
                center:   p.position + Vec3::UP * 0.9,
            })
            .collect()
    }

    fn locate(&self, entity: EntityId) -> Option<Vec3> {
        self.people.iter().find(|p| p.entity == entity).map(|p| p.position)
    }
}

impl GroundPort for FakeWorld {
    fn sample_ground_height(&self, _point: Vec3) -> Option<f32> {
        Some(0.0)
    }
}

impl ObstaclePort for FakeWorld {
    fn raycast(&self, _from: Vec3, _to: Vec3) -> Option<EntityId> {
        self.ray_hit
    }

    fn person_contact(&self, center: Vec3, radius: f32) -> Option<EntityId> {
        if self.contact_always {
            return self.people.first().map(|p| p.entity);
        }
        self.people
            .iter()
            .find(|p| center.y < 1.8 && center.horizontal_distance(p.position) < radius + 0.3)
            .map(|p| p.entity)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Phase(AgentPhase),
    Complete(MissionReport),
}

/// Records phase and completion events into a shared log.
struct Recorder(Arc<Mutex<Vec<Event>>>);

impl MissionObserver for Recorder {
    fn on_phase_change(&mut self, _agent: AgentId, phase: AgentPhase) {
        self.0.lock().unwrap().push(Event::Phase(phase));
    }

    fn on_mission_complete(&mut self, report: &MissionReport) {
        self.0.lock().unwrap().push(Event::Complete(report.clone()));
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn red_jacket_blue_cap() -> PersonDescriptor {
    PersonDescriptor {
        require_jacket: true,
        jacket_color: ItemColor::Red,
        headgear_type: HeadgearType::Cap,
        headgear_color: ItemColor::Blue,
        ..Default::default()
    }
}

fn plain_clothes() -> PersonDescriptor {
    PersonDescriptor::default()
}

fn make_agent(id: u32, registry: &Arc<ClaimRegistry>) -> SearchAgent {
    make_agent_with(id, registry, AgentConfig::default())
}

fn make_agent_with(id: u32, registry: &Arc<ClaimRegistry>, config: AgentConfig) -> SearchAgent {
    SearchAgent::new(
        AgentId(id),
        config,
        red_jacket_blue_cap(),
        Vec3::new(0.0, 0.0, 10.0),
        Arc::clone(registry),
        SEED,
    )
    .unwrap()
}

fn recorder(agent: &mut SearchAgent) -> Arc<Mutex<Vec<Event>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    agent.subscribe(Box::new(Recorder(Arc::clone(&log))));
    log
}

fn phases(log: &Arc<Mutex<Vec<Event>>>) -> Vec<AgentPhase> {
    log.lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            Event::Phase(p) => Some(*p),
            Event::Complete(_) => None,
        })
        .collect()
}

/// One driver step: move the navigator, advance the clock, tick the agent.
fn step(agent: &mut SearchAgent, nav: &mut FakeNav, world: &FakeWorld, clock: &mut SimClock) -> AgentPhase {
    nav.advance(clock.dt_secs());
    clock.advance();
    agent.tick(clock.now, clock.tick_duration, &mut Ports::new(nav, world))
}

/// Step until `until` holds or `max_secs` of simulated time pass.
fn run_until(
    agent: &mut SearchAgent,
    nav: &mut FakeNav,
    world: &FakeWorld,
    clock: &mut SimClock,
    max_secs: f32,
    until: impl Fn(AgentPhase) -> bool,
) -> AgentPhase {
    let deadline = clock.now.as_secs_f32() + max_secs;
    let mut phase = agent.phase();
    while !until(phase) && clock.now.as_secs_f32() < deadline {
        phase = step(agent, nav, world, clock);
    }
    phase
}

// ── Phase events ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod phase_tests {
    use super::*;
    use sar_core::SimTime;

    #[test]
    fn setting_current_phase_emits_nothing() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let log = recorder(&mut agent);

        assert!(!agent.set_phase(AgentPhase::GoingToGps, SimTime::ZERO));
        assert!(phases(&log).is_empty());

        assert!(agent.set_phase(AgentPhase::Searching, SimTime::ZERO));
        assert!(!agent.set_phase(AgentPhase::Searching, SimTime::ZERO));
        assert_eq!(phases(&log), vec![AgentPhase::Searching]);
    }

    #[test]
    fn terminal_phase_is_final() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let log = recorder(&mut agent);

        assert!(agent.set_phase(AgentPhase::Abort, SimTime::ZERO));
        assert!(!agent.set_phase(AgentPhase::Searching, SimTime::ZERO));
        assert_eq!(agent.phase(), AgentPhase::Abort);
        assert_eq!(agent.subscriber_count(), 0);

        let events = log.lock().unwrap().clone();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[1], Event::Complete(r) if !r.success));
    }

    #[test]
    fn unsubscribe_returns_observer() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let id = agent.subscribe(Box::new(crate::NoopObserver));
        assert_eq!(agent.subscriber_count(), 1);
        assert!(agent.unsubscribe(id).is_some());
        assert!(agent.unsubscribe(id).is_none());
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(AgentConfig::default().validate().is_ok());
        assert!((AgentConfig::default().effective_clearance() - 0.015).abs() < 1e-6);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_fov = AgentConfig { fov: 0.0, ..Default::default() };
        assert!(matches!(bad_fov.validate(), Err(AgentError::Config(_))));

        let inverted = AgentConfig { min_landing_distance: 5.0, max_landing_distance: 4.0, ..Default::default() };
        assert!(inverted.validate().is_err());

        let no_attempts = AgentConfig { max_landing_attempts: 0, ..Default::default() };
        assert!(no_attempts.validate().is_err());
    }

    #[test]
    fn clearance_never_negative() {
        let cfg = AgentConfig { landing_clearance: 0.01, landing_extra_drop: 0.5, ..Default::default() };
        assert_eq!(cfg.effective_clearance(), 0.0);
    }

    #[test]
    fn unconstrained_descriptor_needs_positive_threshold() {
        let registry = Arc::new(ClaimRegistry::new());
        let cfg = AgentConfig { match_threshold: 0.0, ..Default::default() };
        let err = SearchAgent::new(AgentId(1), cfg, plain_clothes(), Vec3::ZERO, Arc::clone(&registry), SEED);
        assert!(matches!(err, Err(AgentError::UnconstrainedMatch(_))));

        let ok = SearchAgent::new(AgentId(1), AgentConfig::default(), plain_clothes(), Vec3::ZERO, registry, SEED);
        assert!(ok.is_ok());
    }
}

// ── Sensing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod sensing_tests {
    use super::*;
    use crate::sensing::{RankedCandidate, ViewCone, best_match, preference};

    fn view() -> ViewCone {
        ViewCone { origin: Vec3::ZERO, forward: Vec3::FORWARD, radius: 20.0, fov: 120.0, eye_height: 1.8 }
    }

    fn sighting(entity: u32, desc: &PersonDescriptor, position: Vec3) -> Sighting {
        Sighting {
            entity: EntityId(entity),
            profile: PersonProfile::from_descriptor(desc, false),
            position,
            center: position + Vec3::UP * 0.9,
        }
    }

    fn at_bearing(deg: f32, dist: f32) -> Vec3 {
        let r = deg.to_radians();
        Vec3::new(r.sin() * dist, 0.0, r.cos() * dist)
    }

    #[test]
    fn field_of_view_uses_half_angle() {
        let v = view();
        assert!(v.contains(at_bearing(59.0, 5.0)));
        assert!(!v.contains(at_bearing(61.0, 5.0)));
        assert!(!v.contains(at_bearing(180.0, 5.0)));
        assert!(!v.contains(at_bearing(0.0, 25.0)));
    }

    #[test]
    fn occluded_candidates_are_skipped() {
        let target = red_jacket_blue_cap();
        let s = [sighting(1, &target, Vec3::new(0.0, 0.0, 5.0))];

        let wall = FakeWorld { ray_hit: Some(EntityId::TERRAIN), ..Default::default() };
        assert!(best_match(&view(), &s, &target, 1.5, &wall).is_none());

        let self_hit = FakeWorld { ray_hit: Some(EntityId(1)), ..Default::default() };
        assert_eq!(best_match(&view(), &s, &target, 1.5, &self_hit).unwrap().entity, EntityId(1));
    }

    #[test]
    fn below_threshold_is_not_a_match() {
        let target = red_jacket_blue_cap();
        let jacket_only = PersonDescriptor { headgear_type: HeadgearType::None, ..target };
        let s = [sighting(1, &jacket_only, Vec3::new(0.0, 0.0, 5.0))];
        assert!(best_match(&view(), &s, &target, 1.5, &FakeWorld::default()).is_none());
    }

    #[test]
    fn ranking_prefers_score_then_distance_then_id() {
        let target = red_jacket_blue_cap();
        let wrong_cap_color = PersonDescriptor { headgear_color: ItemColor::Black, ..target };
        let world = FakeWorld::default();

        // Higher score wins over a nearer weaker match.
        let s = [
            sighting(1, &wrong_cap_color, Vec3::new(0.0, 0.0, 2.0)),
            sighting(2, &target, Vec3::new(0.0, 0.0, 9.0)),
        ];
        assert_eq!(best_match(&view(), &s, &target, 1.5, &world).unwrap().entity, EntityId(2));

        // Equal score: nearer wins regardless of query order.
        let s = [
            sighting(3, &target, Vec3::new(0.0, 0.0, 9.0)),
            sighting(4, &target, Vec3::new(1.0, 0.0, 4.0)),
        ];
        assert_eq!(best_match(&view(), &s, &target, 1.5, &world).unwrap().entity, EntityId(4));

        // Equal score and distance: lowest id wins.
        let s = [
            sighting(9, &target, Vec3::new(3.0, 0.0, 4.0)),
            sighting(5, &target, Vec3::new(-3.0, 0.0, 4.0)),
        ];
        assert_eq!(best_match(&view(), &s, &target, 1.5, &world).unwrap().entity, EntityId(5));
    }

    #[test]
    fn preference_is_total() {
        let a = RankedCandidate { entity: EntityId(1), score: 2.0, distance: 3.0 };
        let b = RankedCandidate { entity: EntityId(2), score: 2.0, distance: 3.0 };
        assert_eq!(preference(&a, &b), std::cmp::Ordering::Less);
        assert_eq!(preference(&b, &a), std::cmp::Ordering::Greater);
        assert_eq!(preference(&a, &a), std::cmp::Ordering::Equal);
    }
}

// ── Mission lifecycle ─────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle_tests {
    use super::*;

    #[test]
    fn full_mission_releases_claim_once() {
        let registry = Arc::new(ClaimRegistry::new());
        let world = FakeWorld::default().with_person(7, &red_jacket_blue_cap(), Vec3::new(0.0, 0.0, 16.0));
        let mut agent = make_agent(1, &registry);
        let log = recorder(&mut agent);
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 60.0, AgentPhase::is_terminal);

        assert_eq!(phase, AgentPhase::Done);
        assert_eq!(
            phases(&log),
            vec![AgentPhase::Searching, AgentPhase::Approaching, AgentPhase::Landing, AgentPhase::Done]
        );
        assert_eq!(registry.stats().granted, 1);
        assert_eq!(registry.stats().released, 1);
        assert_eq!(registry.holder(EntityId(7), clock.now), None);
        assert_eq!(agent.current_claim(), None);
        assert_eq!(agent.subscriber_count(), 0);

        let report = agent.report().unwrap();
        assert!(report.success);
        assert_eq!(report.target, Some(EntityId(7)));
        assert_eq!(report.landing_attempts, 1);
        assert!(report.distance > 10.0);

        // Landed at ground + effective clearance, beside the person.
        assert!((nav.pos.y - 0.015).abs() < 1e-4);
        assert!(nav.pos.horizontal_distance(Vec3::new(0.0, 0.0, 16.0)) > 1.3);
        assert!(nav.enabled);

        // A finished mission ignores further ticks.
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Done);
        assert_eq!(registry.stats().released, 1);
    }

    #[test]
    fn repeated_contact_aborts_after_max_attempts() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut world = FakeWorld::default().with_person(7, &red_jacket_blue_cap(), Vec3::new(0.0, 0.0, 16.0));
        world.contact_always = true;
        let mut agent = make_agent(1, &registry);
        let log = recorder(&mut agent);
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 120.0, AgentPhase::is_terminal);

        assert_eq!(phase, AgentPhase::Abort);
        assert_eq!(agent.landing_attempts(), 3);
        assert_eq!(registry.stats().released, 1);
        assert_eq!(registry.holder(EntityId(7), clock.now), None);

        let events = log.lock().unwrap().clone();
        let completions: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Complete(r) => Some(r.clone()),
                Event::Phase(_) => None,
            })
            .collect();
        assert_eq!(completions.len(), 1);
        assert!(!completions[0].success);
        assert_eq!(completions[0].landing_attempts, 3);
    }

    #[test]
    fn gps_leg_times_out_into_search() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let world = FakeWorld::default();
        let mut nav = FakeNav::at(Vec3::ZERO);
        nav.speed = 0.0;
        let mut clock = SimClock::new(DT);

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 59.0, |_| false);
        assert_eq!(phase, AgentPhase::GoingToGps);

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 2.0, |p| p == AgentPhase::Searching);
        assert_eq!(phase, AgentPhase::Searching);
        assert_eq!(agent.search_center(), Vec3::ZERO);
    }

    #[test]
    fn patrol_issues_waypoints_inside_search_disk() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let world = FakeWorld::default();
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        run_until(&mut agent, &mut nav, &world, &mut clock, 10.0, |p| p == AgentPhase::Searching);
        let center = agent.search_center();

        // Let the GPS leg's leftover path run out first.
        for _ in 0..20 {
            if nav.dest.is_none() {
                break;
            }
            step(&mut agent, &mut nav, &world, &mut clock);
        }
        assert!(nav.dest.is_none());

        for _ in 0..100 {
            step(&mut agent, &mut nav, &world, &mut clock);
            if let Some(dest) = nav.dest {
                assert!(dest.horizontal_distance(center) <= 20.0 + 1e-3);
                return;
            }
        }
        panic!("no patrol waypoint issued within 10 s");
    }

    #[test]
    fn patrol_recenters_after_max_local_waypoints() {
        let registry = Arc::new(ClaimRegistry::new());
        let config = AgentConfig { max_local_waypoints: 2, waypoint_interval_secs: 0.5, ..Default::default() };
        let mut agent = make_agent_with(1, &registry, config);
        let world = FakeWorld::default();
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        run_until(&mut agent, &mut nav, &world, &mut clock, 10.0, |p| p == AgentPhase::Searching);
        let first = agent.search_center();

        // Well inside the 30 s no-waypoint window, so only the waypoint count can move it.
        for _ in 0..250 {
            step(&mut agent, &mut nav, &world, &mut clock);
            if agent.search_center() != first {
                assert_eq!(agent.search_center(), nav.pos);
                assert!(agent.search_center().horizontal_distance(first) <= 2.0 * 20.0 + 1.0);
                return;
            }
        }
        panic!("search area never recentered");
    }

    #[test]
    fn search_recenters_when_no_waypoint_is_issued() {
        let registry = Arc::new(ClaimRegistry::new());
        // An idle distance of zero is never reached, so patrol never fires.
        let config = AgentConfig { patrol_idle_distance: 0.0, ..Default::default() };
        let mut agent = make_agent_with(1, &registry, config);
        let world = FakeWorld::default();
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        run_until(&mut agent, &mut nav, &world, &mut clock, 10.0, |p| p == AgentPhase::Searching);
        let first = agent.search_center();

        run_until(&mut agent, &mut nav, &world, &mut clock, 29.0, |_| false);
        assert_eq!(agent.search_center(), first);

        for _ in 0..30 {
            step(&mut agent, &mut nav, &world, &mut clock);
            if agent.search_center() != first {
                assert_eq!(agent.search_center(), nav.pos);
                let dest = nav.dest.expect("recenter issues a waypoint");
                assert!(dest.horizontal_distance(nav.pos) <= 20.0 + 1e-3);
                return;
            }
        }
        panic!("no forced recenter after 30 s without waypoints");
    }

    #[test]
    fn refused_patrol_waypoints_still_force_recenter() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let world = FakeWorld::default();
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        run_until(&mut agent, &mut nav, &world, &mut clock, 10.0, |p| p == AgentPhase::Searching);
        let first = agent.search_center();
        nav.reachable = false;

        // Refused waypoints neither count toward recentering nor reset the clock.
        run_until(&mut agent, &mut nav, &world, &mut clock, 29.0, |_| false);
        assert_eq!(agent.search_center(), first);

        run_until(&mut agent, &mut nav, &world, &mut clock, 2.0, |_| false);
        assert_eq!(agent.phase(), AgentPhase::Searching);
        assert_ne!(agent.search_center(), first);
        assert_eq!(agent.search_center(), nav.pos);
        assert_eq!(nav.dest, None);
    }

    #[test]
    fn gps_leg_relocates_off_surface_agent() {
        let registry = Arc::new(ClaimRegistry::new());
        let mut agent = make_agent(1, &registry);
        let world = FakeWorld::default();
        let mut nav = FakeNav::at(Vec3::new(0.0, 3.0, 0.0));
        let mut clock = SimClock::new(DT);

        // Start drops the agent onto the surface and heads for the GPS point.
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::GoingToGps);
        assert_eq!(nav.warps, vec![Vec3::ZERO]);
        assert_eq!(nav.dest, Some(Vec3::new(0.0, 0.0, 10.0)));

        // Knocked off the surface mid-leg: warped back down, path dropped.
        nav.pos = Vec3::new(2.0, 4.0, 2.0);
        nav.on_surface = false;
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::GoingToGps);
        assert_eq!(nav.warps.len(), 2);
        assert_eq!(nav.pos.y, 0.0);
        assert!(nav.pos.horizontal_distance(Vec3::new(2.0, 0.0, 2.0)) <= 0.5 + 1e-4);
        assert_eq!(nav.dest, None);

        // Back on the surface the GPS path is requested again.
        nav.on_surface = true;
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::GoingToGps);
        assert_eq!(nav.dest, Some(Vec3::new(0.0, 0.0, 10.0)));
    }

    #[test]
    fn landing_climbs_then_descends_with_navigation_off() {
        let registry = Arc::new(ClaimRegistry::new());
        let world = FakeWorld::default().with_person(7, &red_jacket_blue_cap(), Vec3::new(0.0, 0.0, 16.0));
        let mut agent = make_agent(1, &registry);
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 60.0, |p| p == AgentPhase::Landing);
        assert_eq!(phase, AgentPhase::Landing);
        assert_eq!(agent.landing_stage(), None);

        step(&mut agent, &mut nav, &world, &mut clock);
        assert_eq!(agent.landing_stage(), Some(LandingStage::Ascending { target_y: 5.0 }));
        assert!(!nav.is_enabled());

        let mut descending = false;
        for _ in 0..100 {
            step(&mut agent, &mut nav, &world, &mut clock);
            if let Some(LandingStage::Descending { target_y }) = agent.landing_stage() {
                assert!((target_y - 0.015).abs() < 1e-4);
                assert!(nav.pos.y >= 5.0 - 0.005 - 1e-4);
                assert!(!nav.is_enabled());
                descending = true;
                break;
            }
        }
        assert!(descending, "never started descending");

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 10.0, AgentPhase::is_terminal);
        assert_eq!(phase, AgentPhase::Done);
        assert_eq!(agent.landing_stage(), None);
        assert!(nav.is_enabled());
    }

    #[test]
    fn landing_retries_reposition_within_widened_ring() {
        let registry = Arc::new(ClaimRegistry::new());
        let target = Vec3::new(0.0, 0.0, 16.0);
        let mut world = FakeWorld::default().with_person(7, &red_jacket_blue_cap(), target);
        world.contact_always = true;
        let mut agent = make_agent(1, &registry);
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);

        run_until(&mut agent, &mut nav, &world, &mut clock, 60.0, |p| p == AgentPhase::Landing);
        nav.warps.clear();
        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 60.0, AgentPhase::is_terminal);
        assert_eq!(phase, AgentPhase::Abort);

        // Climb and descent warps are airborne; repositions land on the ground.
        let cfg = AgentConfig::default();
        let outer = cfg.max_landing_distance + cfg.retry_extra_distance + cfg.point_snap_radius;
        let repositions: Vec<Vec3> = nav.warps.iter().copied().filter(|w| w.y == 0.0).collect();
        assert_eq!(repositions.len(), cfg.max_landing_attempts as usize - 1);
        for p in repositions {
            let d = p.horizontal_distance(target);
            assert!(d >= cfg.min_landing_distance - 1e-3 && d <= outer + 1e-3, "retry at {d} from target");
        }
    }
}

// ── Claims & recovery ─────────────────────────────────────────────────────────

#[cfg(test)]
mod claim_tests {
    use super::*;

    /// Drive `agent` into `Searching` in an empty world.
    fn searching(registry: &Arc<ClaimRegistry>, id: u32) -> (SearchAgent, FakeNav, SimClock) {
        let mut agent = make_agent(id, registry);
        let mut nav = FakeNav::at(Vec3::ZERO);
        let mut clock = SimClock::new(DT);
        let phase = run_until(&mut agent, &mut nav, &FakeWorld::default(), &mut clock, 10.0, |p| {
            p == AgentPhase::Searching
        });
        assert_eq!(phase, AgentPhase::Searching);
        (agent, nav, clock)
    }

    #[test]
    fn designated_target_is_claimed_even_without_match() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut agent, mut nav, mut clock) = searching(&registry, 1);
        let world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));

        agent.set_designated_target(Some(EntityId(3)));
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Approaching);
        assert_eq!(agent.current_claim(), Some(EntityId(3)));
        assert_eq!(registry.holder(EntityId(3), clock.now), Some(AgentId(1)));
    }

    #[test]
    fn contention_leaves_loser_searching() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut a, mut nav_a, mut clock) = searching(&registry, 1);
        let (mut b, mut nav_b, _) = searching(&registry, 2);
        let world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));
        a.set_designated_target(Some(EntityId(3)));
        b.set_designated_target(Some(EntityId(3)));

        for _ in 0..20 {
            nav_a.advance(clock.dt_secs());
            nav_b.advance(clock.dt_secs());
            clock.advance();
            a.tick(clock.now, DT, &mut Ports::new(&mut nav_a, &world));
            b.tick(clock.now, DT, &mut Ports::new(&mut nav_b, &world));
        }

        assert_eq!(a.phase(), AgentPhase::Approaching);
        assert_eq!(b.phase(), AgentPhase::Searching);
        assert_eq!(b.current_claim(), None);
        assert_eq!(registry.holder(EntityId(3), clock.now), Some(AgentId(1)));
        assert!(registry.stats().denied >= 1);
    }

    #[test]
    fn lost_target_during_approach_releases_claim() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut agent, mut nav, mut clock) = searching(&registry, 1);
        let mut world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));
        agent.set_designated_target(Some(EntityId(3)));
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Approaching);
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Approaching);

        world.people.clear();
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Searching);
        assert_eq!(agent.current_claim(), None);
        assert_eq!(agent.current_target(), None);
        assert_eq!(registry.stats().released, 1);
        assert_eq!(registry.holder(EntityId(3), clock.now), None);
    }

    #[test]
    fn approach_times_out_after_thirty_seconds() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut agent, mut nav, mut clock) = searching(&registry, 1);
        let world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));
        agent.set_designated_target(Some(EntityId(3)));
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Approaching);
        agent.set_designated_target(None);
        nav.speed = 0.0;

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 29.0, |_| false);
        assert_eq!(phase, AgentPhase::Approaching);

        let phase = run_until(&mut agent, &mut nav, &world, &mut clock, 2.0, |p| p == AgentPhase::Searching);
        assert_eq!(phase, AgentPhase::Searching);
        assert_eq!(registry.holder(EntityId(3), clock.now), None);
        assert_eq!(registry.stats().released, 1);
    }

    #[test]
    fn unreachable_landing_point_returns_to_search() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut agent, mut nav, mut clock) = searching(&registry, 1);
        let world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));
        agent.set_designated_target(Some(EntityId(3)));
        nav.navigable = false;

        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Approaching);
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Searching);
        assert_eq!(agent.current_claim(), None);
        assert_eq!(registry.holder(EntityId(3), clock.now), None);
    }

    #[test]
    fn refused_path_to_landing_point_returns_to_search() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut agent, mut nav, mut clock) = searching(&registry, 1);
        let world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));
        agent.set_designated_target(Some(EntityId(3)));
        nav.reachable = false;

        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Approaching);
        agent.set_designated_target(None);
        assert_eq!(step(&mut agent, &mut nav, &world, &mut clock), AgentPhase::Searching);
        assert_eq!(agent.current_claim(), None);
        assert_eq!(agent.current_target(), None);
        assert_eq!(registry.holder(EntityId(3), clock.now), None);
        assert_eq!(registry.stats().released, 1);

        // Never lands where it happens to stand.
        for _ in 0..50 {
            let phase = step(&mut agent, &mut nav, &world, &mut clock);
            assert!(!matches!(phase, AgentPhase::Landing | AgentPhase::Done), "went to {phase}");
        }
        assert!(agent.report().is_none());
    }

    #[test]
    fn dropping_agent_frees_its_claim() {
        let registry = Arc::new(ClaimRegistry::new());
        let (mut agent, mut nav, mut clock) = searching(&registry, 1);
        let world = FakeWorld::default().with_person(3, &plain_clothes(), Vec3::new(30.0, 0.0, 30.0));
        agent.set_designated_target(Some(EntityId(3)));
        step(&mut agent, &mut nav, &world, &mut clock);
        assert_eq!(registry.holder(EntityId(3), clock.now), Some(AgentId(1)));

        drop(agent);
        assert_eq!(registry.holder(EntityId(3), clock.now), None);
        assert!(!registry.is_active(AgentId(1)));
    }
}

//! The per-agent mission state machine.

use std::sync::Arc;
use std::time::Duration;

use sar_claim::ClaimRegistry;
use sar_core::{AgentId, AgentRng, EntityId, SimTime, Vec3};
use sar_match::PersonDescriptor;

use crate::landing::LandingRuntime;
use crate::observer::Subscriptions;
use crate::sensing::{self, ViewCone};
use crate::{
    AgentConfig, AgentError, AgentPhase, AgentResult, MissionObserver, MissionReport, Ports,
    SubscriptionId,
};

// ── Phase runtime ─────────────────────────────────────────────────────────────

/// State that only lives as long as one phase.  `None` in
/// [`SearchAgent::runtime`] means the current phase has not run its entry
/// step yet; any phase change resets it.
#[derive(Copy, Clone, Debug)]
pub(crate) enum PhaseRuntime {
    GoingToGps { entered: SimTime },
    Searching(SearchRuntime),
    Approaching { entered: SimTime },
    Landing(LandingRuntime),
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct SearchRuntime {
    last_waypoint: SimTime,
    waypoints:     u32,
}

// ── SearchAgent ───────────────────────────────────────────────────────────────

/// One autonomous search agent and its mission.
///
/// The agent is driven by [`tick`](Self::tick); every world interaction goes
/// through the [`Ports`] passed in, and every cross-agent interaction
/// through the shared [`ClaimRegistry`].  The claim the agent holds is
/// released exactly once, when it abandons the target, when the mission
/// ends, or when the agent is dropped.
pub struct SearchAgent {
    id:                        AgentId,
    pub(crate) config:         AgentConfig,
    descriptor:                PersonDescriptor,
    gps_target:                Vec3,
    designated_target:         Option<EntityId>,
    registry:                  Arc<ClaimRegistry>,
    pub(crate) rng:            AgentRng,

    phase:                     AgentPhase,
    pub(crate) runtime:        Option<PhaseRuntime>,
    started:                   bool,
    pub(crate) current_target: Option<EntityId>,
    current_claim:             Option<EntityId>,
    search_center:             Vec3,
    pub(crate) landing_attempts: u32,

    last_position:             Option<Vec3>,
    distance:                  f32,
    report:                    Option<MissionReport>,
    subscriptions:             Subscriptions,
}

impl SearchAgent {
    /// Create an agent heading for `gps_target` to look for `descriptor`.
    ///
    /// `seed` is the fleet-wide seed; it is mixed with `id` so each agent
    /// draws an independent stream.
    pub fn new(
        id: AgentId,
        config: AgentConfig,
        descriptor: PersonDescriptor,
        gps_target: Vec3,
        registry: Arc<ClaimRegistry>,
        seed: u64,
    ) -> AgentResult<Self> {
        config.validate()?;
        if descriptor.is_unconstrained() && config.match_threshold <= 0.0 {
            return Err(AgentError::UnconstrainedMatch(config.match_threshold));
        }
        registry.register_agent(id);

        Ok(Self {
            id,
            rng: AgentRng::new(seed, id),
            config,
            descriptor,
            gps_target,
            designated_target: None,
            registry,
            phase: AgentPhase::GoingToGps,
            runtime: None,
            started: false,
            current_target: None,
            current_claim: None,
            search_center: gps_target,
            landing_attempts: 0,
            last_position: None,
            distance: 0.0,
            report: None,
            subscriptions: Subscriptions::default(),
        })
    }

    /// Chase `target` ahead of anything perception turns up.
    pub fn with_designated_target(mut self, target: EntityId) -> Self {
        self.designated_target = Some(target);
        self
    }

    pub fn set_designated_target(&mut self, target: Option<EntityId>) {
        self.designated_target = target;
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn descriptor(&self) -> &PersonDescriptor {
        &self.descriptor
    }

    /// The GPS target, snapped to the navigable surface once started.
    pub fn gps_target(&self) -> Vec3 {
        self.gps_target
    }

    pub fn designated_target(&self) -> Option<EntityId> {
        self.designated_target
    }

    pub fn current_target(&self) -> Option<EntityId> {
        self.current_target
    }

    /// The target this agent currently holds a claim on.
    pub fn current_claim(&self) -> Option<EntityId> {
        self.current_claim
    }

    pub fn search_center(&self) -> Vec3 {
        self.search_center
    }

    /// Path length travelled so far.
    pub fn distance_travelled(&self) -> f32 {
        self.distance
    }

    /// Attempts made by the current (or last) landing.
    pub fn landing_attempts(&self) -> u32 {
        self.landing_attempts
    }

    /// Set once the mission reached `Done` or `Abort`.
    pub fn report(&self) -> Option<&MissionReport> {
        self.report.as_ref()
    }

    // ── Observers ─────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, observer: Box<dyn MissionObserver>) -> SubscriptionId {
        self.subscriptions.add(observer)
    }

    /// Detach an observer, handing it back.  `None` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Box<dyn MissionObserver>> {
        self.subscriptions.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    // ── Phase control ─────────────────────────────────────────────────────

    /// Move to `next`.  Returns `false`, without emitting anything, when
    /// `next` is already the current phase or the mission has finished.
    ///
    /// Entering a terminal phase releases the held claim, emits the
    /// mission-complete event and detaches every observer.
    pub fn set_phase(&mut self, next: AgentPhase, now: SimTime) -> bool {
        if self.phase == next || self.phase.is_terminal() {
            return false;
        }
        let prev = self.phase;
        self.phase = next;
        self.runtime = None;
        tracing::info!(agent = %self.id, from = %prev, to = %next, "phase change");

        let id = self.id;
        self.subscriptions.each(|obs| obs.on_phase_change(id, next));

        if next.is_terminal() {
            self.finish(now, next == AgentPhase::Done);
        }
        true
    }

    fn finish(&mut self, now: SimTime, success: bool) {
        self.release_claim();
        let report = MissionReport {
            agent:            self.id,
            success,
            finished_at:      now,
            distance:         self.distance,
            target:           self.current_target,
            landing_attempts: self.landing_attempts,
        };
        if success {
            tracing::info!(
                agent = %self.id,
                distance = report.distance,
                attempts = report.landing_attempts,
                "mission complete"
            );
        } else {
            tracing::warn!(
                agent = %self.id,
                distance = report.distance,
                attempts = report.landing_attempts,
                "mission aborted"
            );
        }
        self.subscriptions.each(|obs| obs.on_mission_complete(&report));
        self.subscriptions.clear();
        self.report = Some(report);
    }

    // ── Claims ────────────────────────────────────────────────────────────

    /// Claim `target` and make it the current target.
    fn try_commit(&mut self, target: EntityId, now: SimTime) -> bool {
        if !self.registry.try_claim(target, self.id, now) {
            return false;
        }
        if let Some(prev) = self.current_claim.replace(target) {
            if prev != target {
                self.registry.release(prev, self.id);
            }
        }
        self.current_target = Some(target);
        true
    }

    pub(crate) fn refresh_claim(&self, now: SimTime) {
        if let Some(target) = self.current_claim {
            self.registry.refresh(target, self.id, now);
        }
    }

    pub(crate) fn release_claim(&mut self) {
        if let Some(target) = self.current_claim.take() {
            self.registry.release(target, self.id);
        }
    }

    /// Drop the current target and go back to searching.
    pub(crate) fn abandon_target(&mut self, now: SimTime) {
        self.release_claim();
        self.current_target = None;
        self.set_phase(AgentPhase::Searching, now);
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Place the agent on the navigable surface and send it toward the GPS
    /// target.  Called implicitly by the first [`tick`](Self::tick).
    pub fn start(&mut self, ports: &mut Ports<'_>) {
        if self.started {
            return;
        }
        self.started = true;

        let nav = &mut *ports.nav;
        let pos = nav.position();
        match nav.sample_navigable(pos, self.config.relocation_radius) {
            Some(p) => nav.warp(p),
            None => tracing::error!(agent = %self.id, position = %pos, "no navigable surface near start"),
        }
        match nav.sample_navigable(self.gps_target, self.config.gps_snap_radius) {
            Some(p) => self.gps_target = p,
            None => tracing::warn!(agent = %self.id, gps = %self.gps_target, "GPS target not snapped to navigable surface"),
        }
        self.search_center = self.gps_target;
        nav.set_enabled(true);
        if !nav.set_destination(self.gps_target) {
            tracing::debug!(agent = %self.id, gps = %self.gps_target, "no path to GPS target yet");
        }

        tracing::info!(
            agent = %self.id,
            gps = %self.gps_target,
            looking_for = %self.descriptor,
            "mission started"
        );
    }

    /// Advance the mission by one step.  Returns the phase after the step.
    /// Does nothing once the mission has finished.
    pub fn tick(&mut self, now: SimTime, dt: Duration, ports: &mut Ports<'_>) -> AgentPhase {
        if self.phase.is_terminal() {
            return self.phase;
        }
        if !self.started {
            self.start(ports);
        }
        self.track_position(now, ports.nav.position());

        match self.phase {
            AgentPhase::GoingToGps  => self.tick_going_to_gps(now, ports),
            AgentPhase::Searching   => self.tick_searching(now, ports),
            AgentPhase::Approaching => self.tick_approaching(now, ports),
            AgentPhase::Landing     => self.tick_landing(now, dt.as_secs_f32(), ports),
            AgentPhase::Done | AgentPhase::Abort => {}
        }
        self.phase
    }

    pub(crate) fn track_position(&mut self, now: SimTime, pos: Vec3) {
        if let Some(last) = self.last_position {
            self.distance += last.distance(pos);
        }
        self.last_position = Some(pos);
        let id = self.id;
        self.subscriptions.each(|obs| obs.on_position(id, now, pos));
    }

    // ── GoingToGps ────────────────────────────────────────────────────────

    fn tick_going_to_gps(&mut self, now: SimTime, ports: &mut Ports<'_>) {
        let entered = match self.runtime {
            Some(PhaseRuntime::GoingToGps { entered }) => entered,
            _ => {
                self.runtime = Some(PhaseRuntime::GoingToGps { entered: now });
                now
            }
        };

        let nav = &mut *ports.nav;
        let pos = nav.position();

        if now.since(entered) > self.config.gps_timeout() {
            tracing::warn!(agent = %self.id, position = %pos, "GPS leg timed out, searching from here");
            self.search_center = pos;
            self.set_phase(AgentPhase::Searching, now);
            return;
        }

        if !nav.is_on_navigable_surface() {
            if let Some(p) = nav.sample_navigable(pos, self.config.relocation_radius) {
                tracing::debug!(agent = %self.id, to = %p, "relocating onto navigable surface");
                nav.warp(p);
            }
            return;
        }

        if !nav.has_path() && !nav.has_pending_path() && !nav.set_destination(self.gps_target) {
            tracing::debug!(agent = %self.id, gps = %self.gps_target, "no path to GPS target");
            return;
        }

        if !nav.has_pending_path() && nav.remaining_distance() < self.config.gps_arrival_distance {
            tracing::info!(agent = %self.id, position = %pos, "arrived at GPS target");
            self.search_center = pos;
            self.set_phase(AgentPhase::Searching, now);
        }
    }

    // ── Searching ─────────────────────────────────────────────────────────

    fn tick_searching(&mut self, now: SimTime, ports: &mut Ports<'_>) {
        let mut rt = match self.runtime {
            Some(PhaseRuntime::Searching(rt)) => rt,
            _ => SearchRuntime { last_waypoint: now, waypoints: 0 },
        };

        if self.config.always_chase_designated {
            if let Some(designated) = self.designated_target {
                if ports.perception.locate(designated).is_some() && self.try_commit(designated, now) {
                    tracing::info!(agent = %self.id, target = %designated, "claimed designated target");
                    self.set_phase(AgentPhase::Approaching, now);
                    return;
                }
            }
        }

        let pos = ports.nav.position();
        let view = ViewCone {
            origin:     pos,
            forward:    ports.nav.forward(),
            radius:     self.config.search_radius,
            fov:        self.config.fov,
            eye_height: self.config.eye_height,
        };
        let sightings = ports.perception.query_candidates(pos, view.radius, view.forward, view.fov);
        let best = sensing::best_match(
            &view,
            &sightings,
            &self.descriptor,
            self.config.match_threshold,
            ports.obstacles,
        );
        if let Some(best) = best {
            if self.try_commit(best.entity, now) {
                tracing::info!(
                    agent = %self.id,
                    target = %best.entity,
                    score = best.score,
                    distance = best.distance,
                    "claimed matching person"
                );
                self.set_phase(AgentPhase::Approaching, now);
                return;
            }
            tracing::trace!(agent = %self.id, target = %best.entity, "best match held by another agent");
        }

        let nav = &mut *ports.nav;
        if !nav.has_pending_path()
            && nav.remaining_distance() < self.config.patrol_idle_distance
            && now.since(rt.last_waypoint) > self.config.waypoint_interval()
        {
            let candidate = self.rng.point_in_disk(self.search_center, self.config.search_radius);
            let waypoint = nav
                .sample_navigable(candidate, self.config.point_snap_radius)
                .filter(|&w| nav.set_destination(w));
            match waypoint {
                Some(waypoint) => {
                    rt.last_waypoint = now;
                    rt.waypoints += 1;
                    tracing::debug!(agent = %self.id, waypoint = %waypoint, "patrol waypoint");
                    if rt.waypoints >= self.config.max_local_waypoints {
                        rt.waypoints = 0;
                        self.search_center = pos;
                        tracing::debug!(agent = %self.id, center = %pos, "recentering search area");
                    }
                }
                None => tracing::trace!(agent = %self.id, candidate = %candidate, "patrol waypoint unreachable"),
            }
        }

        if now.since(rt.last_waypoint) > self.config.search_timeout() {
            tracing::warn!(agent = %self.id, center = %pos, "no waypoint issued in time, forcing recenter");
            self.search_center = pos;
            rt.last_waypoint = now;
            let candidate = self.rng.point_in_disk(pos, self.config.search_radius);
            let issued = nav
                .sample_navigable(candidate, self.config.point_snap_radius)
                .is_some_and(|waypoint| nav.set_destination(waypoint));
            if !issued {
                tracing::debug!(agent = %self.id, candidate = %candidate, "recenter waypoint unreachable");
            }
        }

        self.runtime = Some(PhaseRuntime::Searching(rt));
    }

    // ── Approaching ───────────────────────────────────────────────────────

    fn tick_approaching(&mut self, now: SimTime, ports: &mut Ports<'_>) {
        let entered = match self.runtime {
            Some(PhaseRuntime::Approaching { entered }) => entered,
            _ => {
                if !self.enter_approaching(now, ports) {
                    return;
                }
                now
            }
        };

        self.refresh_claim(now);

        if now.since(entered) > self.config.approach_timeout() {
            tracing::warn!(agent = %self.id, target = ?self.current_target, "approach timed out");
            self.abandon_target(now);
            return;
        }

        if self.current_target.and_then(|t| ports.perception.locate(t)).is_none() {
            tracing::warn!(agent = %self.id, target = ?self.current_target, "target lost during approach");
            self.abandon_target(now);
            return;
        }

        let nav = &*ports.nav;
        if !nav.has_pending_path() && nav.remaining_distance() <= self.config.approach_arrival_distance {
            tracing::info!(agent = %self.id, position = %nav.position(), "reached landing point");
            self.set_phase(AgentPhase::Landing, now);
        }
    }

    /// Pick a landing point beside the target and head there.  On failure
    /// the target is abandoned and `false` returned.
    fn enter_approaching(&mut self, now: SimTime, ports: &mut Ports<'_>) -> bool {
        let Some(target) = self.current_target else {
            tracing::warn!(agent = %self.id, "approaching without a target");
            self.abandon_target(now);
            return false;
        };
        let Some(target_pos) = ports.perception.locate(target) else {
            tracing::warn!(agent = %self.id, target = %target, "target vanished before approach");
            self.abandon_target(now);
            return false;
        };

        let offset = self.rng.ring_offset(
            target_pos,
            self.config.min_landing_distance,
            self.config.max_landing_distance,
        );
        let Some(point) = ports.nav.sample_navigable(offset, self.config.point_snap_radius) else {
            tracing::warn!(agent = %self.id, target = %target, "no navigable landing point near target");
            self.abandon_target(now);
            return false;
        };

        if !ports.nav.set_destination(point) {
            tracing::warn!(agent = %self.id, target = %target, point = %point, "no path to landing point");
            self.abandon_target(now);
            return false;
        }
        self.runtime = Some(PhaseRuntime::Approaching { entered: now });
        tracing::debug!(agent = %self.id, target = %target, point = %point, "approaching");
        true
    }
}

impl Drop for SearchAgent {
    fn drop(&mut self) {
        self.release_claim();
        self.registry.deactivate_agent(self.id);
    }
}

impl std::fmt::Debug for SearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchAgent")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("current_target", &self.current_target)
            .field("current_claim", &self.current_claim)
            .field("designated_target", &self.designated_target)
            .field("distance", &self.distance)
            .finish_non_exhaustive()
    }
}

//! The `Fleet` tick loop and its builder.

use std::sync::Arc;

use sar_agent::{AgentConfig, AgentPhase, Ports, SearchAgent};
use sar_claim::ClaimRegistry;
use sar_core::{AgentId, EntityId, SarError, SimClock, SimTime, Vec3};
use sar_match::PersonDescriptor;

use crate::{
    FleetConfig, FleetError, FleetObserver, FleetResult, MissionSupervisor, NoopFleetObserver,
    SimNavigator, World,
};

/// Spacing between default launch positions along +x.
const LAUNCH_SPACING: f32 = 2.0;

// ── FleetSummary ──────────────────────────────────────────────────────────────

/// Outcome of a run, or a snapshot of one in progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FleetSummary {
    pub ticks:       u64,
    pub elapsed:     SimTime,
    pub succeeded:   usize,
    pub failed:      usize,
    pub in_progress: usize,
}

impl FleetSummary {
    pub fn any_success(&self) -> bool {
        self.succeeded > 0
    }

    pub fn all_finished(&self) -> bool {
        self.in_progress == 0
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// A group of agents on one mission in one [`World`].
///
/// Agents are ticked in ascending `AgentId` order (or on Rayon's pool with
/// the `parallel` feature).  Each agent is paired with its own
/// [`SimNavigator`]; the world and the claim registry are shared.
///
/// Create via [`FleetBuilder`].
pub struct Fleet {
    pub config:     FleetConfig,
    pub clock:      SimClock,
    pub world:      World,
    pub registry:   Arc<ClaimRegistry>,
    pub supervisor: MissionSupervisor,
    agents:         Vec<SearchAgent>,
    navigators:     Vec<SimNavigator>,
}

impl Fleet {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn agents(&self) -> &[SearchAgent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&SearchAgent> {
        self.agents.get(id.index())
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut SearchAgent> {
        self.agents.get_mut(id.index())
    }

    pub fn navigator(&self, id: AgentId) -> Option<&SimNavigator> {
        self.navigators.get(id.index())
    }

    /// Agents that have not reached a terminal phase.
    pub fn active_count(&self) -> usize {
        self.agents.iter().filter(|a| !a.is_finished()).count()
    }

    /// Every agent finished, or one succeeded and the config says to stop there.
    pub fn is_finished(&self) -> bool {
        let any_done = self.agents.iter().any(|a| a.phase() == AgentPhase::Done);
        self.active_count() == 0 || (self.config.stop_on_first_success && any_done)
    }

    pub fn summary(&self) -> FleetSummary {
        let (succeeded, failed, in_progress) = self.agents.iter().fold((0, 0, 0), |(s, f, p), a| {
            match a.phase() {
                AgentPhase::Done => (s + 1, f, p),
                AgentPhase::Abort => (s, f + 1, p),
                _ => (s, f, p + 1),
            }
        });
        FleetSummary {
            ticks: self.clock.ticks,
            elapsed: self.clock.now,
            succeeded,
            failed,
            in_progress,
        }
    }

    /// Point one agent at a known person, or clear its hint with `None`.
    pub fn set_designated_target(&mut self, agent: AgentId, target: Option<EntityId>) -> FleetResult<()> {
        if let Some(entity) = target {
            if self.world.person(entity).is_none() {
                return Err(SarError::EntityNotFound(entity).into());
            }
        }
        let agent = self.agents.get_mut(agent.index()).ok_or(SarError::AgentNotFound(agent))?;
        agent.set_designated_target(target);
        Ok(())
    }

    /// Remove a person from the world mid-run.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.world.despawn(entity)
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run until [`is_finished`](Self::is_finished) or `max_mission_secs`.
    pub fn run<O: FleetObserver>(&mut self, observer: &mut O) -> FleetSummary {
        let deadline = SimTime::from_secs_f32(self.config.max_mission_secs);
        while !self.is_finished() && self.clock.now < deadline {
            self.step_observed(observer);
        }

        let summary = self.summary();
        if self.is_finished() {
            tracing::info!(
                elapsed = %summary.elapsed,
                succeeded = summary.succeeded,
                failed = summary.failed,
                "fleet finished"
            );
        } else {
            tracing::warn!(
                elapsed = %summary.elapsed,
                in_progress = summary.in_progress,
                "mission time limit reached"
            );
        }
        observer.on_fleet_end(&summary);
        summary
    }

    /// Run exactly `n` ticks, whether or not agents finish.
    pub fn run_ticks<O: FleetObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step_observed(observer);
        }
    }

    /// Advance one tick.  Returns the number of agents still active.
    pub fn step(&mut self) -> usize {
        self.step_observed(&mut NoopFleetObserver);
        self.active_count()
    }

    fn step_observed<O: FleetObserver>(&mut self, observer: &mut O) {
        self.clock.advance();
        let now = self.clock.now;
        observer.on_tick_start(now);
        self.tick_agents(now);
        observer.on_tick_end(now, self.active_count());
    }

    fn tick_agents(&mut self, now: SimTime) {
        let dt = self.clock.tick_duration;
        let dt_secs = dt.as_secs_f32();
        let world = &self.world;

        #[cfg(not(feature = "parallel"))]
        {
            for (agent, nav) in self.agents.iter_mut().zip(self.navigators.iter_mut()) {
                if agent.is_finished() {
                    continue;
                }
                nav.advance(dt_secs);
                agent.tick(now, dt, &mut Ports::new(nav, world));
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            self.agents
                .par_iter_mut()
                .zip(self.navigators.par_iter_mut())
                .filter(|(agent, _)| !agent.is_finished())
                .for_each(|(agent, nav)| {
                    nav.advance(dt_secs);
                    agent.tick(now, dt, &mut Ports::new(nav, world));
                });
        }
    }
}

impl std::fmt::Debug for Fleet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fleet")
            .field("clock", &self.clock)
            .field("agents", &self.agents.len())
            .field("world", &self.world)
            .field("registry", &self.registry)
            .finish()
    }
}

// ── FleetBuilder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Fleet`].
///
/// # Required inputs
///
/// - [`FleetConfig`] — seed, tick length, time limit, claim timeout, …
/// - [`World`] — usually already populated by a [`PersonSpawner`][crate::PersonSpawner]
/// - the mission: target descriptor and GPS point
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                        |
/// |--------------------------|------------------------------------------------|
/// | `.agents(n)`             | 1                                              |
/// | `.agent_config(c)`       | `AgentConfig::default()` for every agent       |
/// | `.agent_configs(v)`      | —  (overrides `agent_config`, length `n`)      |
/// | `.start_positions(v)`    | area center, spaced 2 units apart along +x     |
/// | `.designated_target(e)`  | none                                           |
/// | `.supervisor(s)`         | a fresh `MissionSupervisor`                    |
///
/// The designated target, if any, is handed to every agent; the claim
/// registry makes sure only one of them commits to it.
pub struct FleetBuilder {
    config:          FleetConfig,
    world:           World,
    descriptor:      PersonDescriptor,
    gps_target:      Vec3,
    agent_count:     usize,
    agent_config:    AgentConfig,
    agent_configs:   Option<Vec<AgentConfig>>,
    start_positions: Option<Vec<Vec3>>,
    designated:      Option<EntityId>,
    supervisor:      Option<MissionSupervisor>,
}

impl FleetBuilder {
    pub fn new(config: FleetConfig, world: World, descriptor: PersonDescriptor, gps_target: Vec3) -> Self {
        Self {
            config,
            world,
            descriptor,
            gps_target,
            agent_count:     1,
            agent_config:    AgentConfig::default(),
            agent_configs:   None,
            start_positions: None,
            designated:      None,
            supervisor:      None,
        }
    }

    pub fn agents(mut self, n: usize) -> Self {
        self.agent_count = n;
        self
    }

    /// Tunables shared by every agent.
    pub fn agent_config(mut self, config: AgentConfig) -> Self {
        self.agent_config = config;
        self
    }

    /// Per-agent tunables (must be length `n`).
    pub fn agent_configs(mut self, configs: Vec<AgentConfig>) -> Self {
        self.agent_configs = Some(configs);
        self
    }

    /// Per-agent launch positions (must be length `n`).
    pub fn start_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.start_positions = Some(positions);
        self
    }

    pub fn designated_target(mut self, target: Option<EntityId>) -> Self {
        self.designated = target;
        self
    }

    /// Report into an existing supervisor instead of a fresh one.
    pub fn supervisor(mut self, supervisor: MissionSupervisor) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    /// Validate inputs, create the claim registry and agents, and return a
    /// ready-to-run [`Fleet`].
    pub fn build(self) -> FleetResult<Fleet> {
        self.config.validate()?;
        let n = self.agent_count;
        if n == 0 {
            return Err(FleetError::Config("a fleet needs at least one agent".into()));
        }

        // ── Validate and resolve optional inputs ──────────────────────────
        let configs = match self.agent_configs {
            Some(c) if c.len() != n => {
                return Err(FleetError::CountMismatch { expected: n, got: c.len(), what: "agent configs" });
            }
            Some(c) => c,
            None => vec![self.agent_config; n],
        };

        let positions = match self.start_positions {
            Some(p) if p.len() != n => {
                return Err(FleetError::CountMismatch { expected: n, got: p.len(), what: "start positions" });
            }
            Some(p) => p,
            None => {
                let origin = self.world.area().center();
                (0..n)
                    .map(|i| origin + Vec3::new(i as f32 * LAUNCH_SPACING, 0.0, 0.0))
                    .collect()
            }
        };

        if let Some(target) = self.designated {
            if self.world.person(target).is_none() {
                return Err(SarError::EntityNotFound(target).into());
            }
        }

        // ── Shared state ──────────────────────────────────────────────────
        let registry = Arc::new(ClaimRegistry::with_default_timeout(self.config.claim_timeout())?);
        let supervisor = self.supervisor.unwrap_or_default();

        // ── Agents and their navigators ───────────────────────────────────
        let mut agents = Vec::with_capacity(n);
        let mut navigators = Vec::with_capacity(n);
        for (i, (agent_config, start)) in configs.into_iter().zip(positions).enumerate() {
            let id = AgentId::try_from(i)
                .map_err(|_| FleetError::Config(format!("agent index {i} does not fit an AgentId")))?;
            let mut agent = SearchAgent::new(
                id,
                agent_config,
                self.descriptor,
                self.gps_target,
                Arc::clone(&registry),
                self.config.seed,
            )?;
            if let Some(target) = self.designated {
                agent = agent.with_designated_target(target);
            }
            supervisor.track(&mut agent);

            agents.push(agent);
            navigators.push(SimNavigator::new(Arc::clone(self.world.area()), start, self.config.nav_speed));
        }

        tracing::info!(
            agents = n,
            gps = %self.gps_target,
            looking_for = %self.descriptor,
            designated = ?self.designated,
            "fleet ready"
        );

        Ok(Fleet {
            clock: SimClock::new(self.config.tick_duration()),
            config: self.config,
            world: self.world,
            registry,
            supervisor,
            agents,
            navigators,
        })
    }
}

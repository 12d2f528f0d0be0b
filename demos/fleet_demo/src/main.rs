//! fleet_demo — a small search mission for the rust_sar fleet.
//!
//! Three agents launch from the middle of a 60 m field, fly to a GPS hint
//! and look for one person in a crowd of 30.  Pass a JSON file to override
//! any part of the scenario:
//!
//! ```text
//! cargo run -p fleet_demo -- scenario.json
//! RUST_LOG=sar_agent=debug cargo run -p fleet_demo
//! ```

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use sar_agent::AgentConfig;
use sar_core::{AgentId, SimRng, SimTime, Vec3};
use sar_match::{HeadgearType, ItemColor, PersonDescriptor};
use sar_sim::{
    FleetBuilder, FleetConfig, FleetObserver, FleetSummary, NavArea, PersonSpawner, World,
};

// ── Scenario ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct Scenario {
    fleet:        FleetConfig,
    agent:        AgentConfig,
    target:       PersonDescriptor,
    gps:          Vec3,
    agents:       usize,
    crowd:        usize,
    crowd_radius: f32,
    area_radius:  f32,
    /// Pillars as `[x, z, radius, height]`.
    obstacles:    Vec<[f32; 4]>,
    /// Hand the spawned target to the fleet as a designated target.
    designate:    bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            fleet:        FleetConfig::default(),
            agent:        AgentConfig::default(),
            target:       PersonDescriptor {
                require_jacket: true,
                jacket_color:   ItemColor::Orange,
                headgear_type:  HeadgearType::ConstructionHelmet,
                headgear_color: ItemColor::Yellow,
                ..Default::default()
            },
            gps:          Vec3::new(0.0, 0.0, 25.0),
            agents:       3,
            crowd:        30,
            crowd_radius: 15.0,
            area_radius:  60.0,
            obstacles:    vec![[6.0, 20.0, 1.0, 4.0], [-8.0, 28.0, 1.5, 6.0]],
            designate:    false,
        }
    }
}

fn load_scenario(path: Option<&Path>) -> Result<Scenario> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

// ── Progress observer ─────────────────────────────────────────────────────────

/// Logs a heartbeat every `every` ticks.
struct Heartbeat {
    every: u64,
    ticks: u64,
}

impl FleetObserver for Heartbeat {
    fn on_tick_end(&mut self, now: SimTime, active: usize) {
        self.ticks += 1;
        if self.ticks % self.every == 0 {
            tracing::info!(%now, active, "heartbeat");
        }
    }

    fn on_fleet_end(&mut self, summary: &FleetSummary) {
        tracing::info!(ticks = summary.ticks, "run ended");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let arg = std::env::args().nth(1);
    let scenario = load_scenario(arg.as_deref().map(Path::new))?;

    println!("=== fleet_demo — rust_sar search fleet ===");
    println!(
        "Agents: {}  |  Crowd: {}  |  Seed: {}",
        scenario.agents, scenario.crowd, scenario.fleet.seed
    );
    println!("Looking for: {}", scenario.target.to_human_text());
    println!();

    // 1. Field and crowd.
    let area = scenario
        .obstacles
        .iter()
        .fold(NavArea::new(Vec3::ZERO, scenario.area_radius), |area, &[x, z, r, h]| {
            area.with_obstacle(Vec3::new(x, 0.0, z), r, h)
        });
    let mut world = World::new(area);
    let mut rng = SimRng::new(scenario.fleet.seed);
    let spawn = PersonSpawner::exhaustive(scenario.crowd, scenario.gps, scenario.crowd_radius)
        .spawn(&mut world, &mut rng, Some(&scenario.target))?;
    println!("Spawned {} people", spawn.people.len());
    if let Some(target) = spawn.designated {
        if let Some(person) = world.person(target) {
            println!("Target {target} stands at {}", person.position);
        }
    }
    println!();

    // 2. Fleet.
    let designated = if scenario.designate { spawn.designated } else { None };
    let mut fleet = FleetBuilder::new(scenario.fleet.clone(), world, scenario.target, scenario.gps)
        .agents(scenario.agents)
        .agent_config(scenario.agent.clone())
        .designated_target(designated)
        .build()?;

    // 3. Run.
    let mut heartbeat = Heartbeat { every: 100, ticks: 0 };
    let t0 = Instant::now();
    let summary = fleet.run(&mut heartbeat);
    let wall = t0.elapsed();

    // 4. Report.
    println!();
    println!(
        "Mission ended at {} after {} ticks ({:.3} s wall clock)",
        summary.elapsed,
        summary.ticks,
        wall.as_secs_f64()
    );
    println!(
        "  succeeded: {}  failed: {}  in progress: {}",
        summary.succeeded, summary.failed, summary.in_progress
    );
    let stats = fleet.registry.stats();
    println!(
        "  claims: {} granted, {} denied, {} evicted, {} released",
        stats.granted, stats.denied, stats.evicted, stats.released
    );
    println!();

    println!("{:<12} {:<34} {:>10} {:<14}", "Agent", "Status", "Distance", "Target");
    println!("{}", "-".repeat(72));
    for i in 0..fleet.agents().len() {
        let id = AgentId::try_from(i)?;
        let record = fleet.supervisor.record(id);
        let distance = fleet.agent(id).map_or(0.0, |a| a.distance_travelled());
        let target = record
            .and_then(|r| r.target)
            .map_or_else(|| "-".to_string(), |t| t.to_string());
        println!(
            "{:<12} {:<34} {:>10.1} {:<14}",
            id.to_string(),
            fleet.supervisor.status_line(id),
            distance,
            target
        );
    }

    Ok(())
}

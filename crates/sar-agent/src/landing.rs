//! Landing retry protocol.
//!
//! ```text
//! attempt n (1..=max_landing_attempts):
//!   Ascending  → climb to max(y, pre_landing_height) at ascend_speed
//!   Descending → sink at descend_speed to ground + effective clearance + pivot_to_bottom
//!                person contact on the way down → attempt fails
//!   failed, attempts left  → reposition to a wider ring offset, attempt n + 1
//!   failed, none left      → Abort
//!   touched down cleanly   → Done
//! ```
//!
//! Path following is disabled for the whole protocol; vertical motion is
//! applied with `warp`.  The claim is refreshed on every step.

use sar_core::{SimTime, Vec3};

use crate::agent::PhaseRuntime;
use crate::{AgentPhase, Ports, SearchAgent};

/// Tolerance on reaching the pre-landing altitude.
const ALTITUDE_EPSILON: f32 = 0.005;

/// Where the current landing attempt is.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LandingStage {
    Ascending { target_y: f32 },
    Descending { target_y: f32 },
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct LandingRuntime {
    attempt: u32,
    stage:   LandingStage,
}

impl SearchAgent {
    /// Stage of the landing in progress, if the agent is landing.
    pub fn landing_stage(&self) -> Option<LandingStage> {
        match self.runtime {
            Some(PhaseRuntime::Landing(rt)) => Some(rt.stage),
            _ => None,
        }
    }

    pub(crate) fn tick_landing(&mut self, now: SimTime, dt: f32, ports: &mut Ports<'_>) {
        let mut rt = match self.runtime {
            Some(PhaseRuntime::Landing(rt)) => rt,
            _ => {
                if self.current_target.is_none() {
                    tracing::warn!(agent = %self.id(), "landing without a target");
                    self.abandon_target(now);
                    return;
                }
                ports.nav.set_enabled(false);
                self.landing_attempts = 0;
                self.begin_attempt(ports.nav.position())
            }
        };

        self.refresh_claim(now);

        let Some(target_pos) = self.current_target.and_then(|t| ports.perception.locate(t)) else {
            tracing::warn!(agent = %self.id(), target = ?self.current_target, "target lost during landing");
            ports.nav.set_enabled(true);
            self.abandon_target(now);
            return;
        };

        let pos = ports.nav.position();
        match rt.stage {
            LandingStage::Ascending { target_y } => {
                if pos.y < target_y - ALTITUDE_EPSILON {
                    let step = (self.config.ascend_speed * dt).min(target_y - pos.y);
                    ports.nav.warp(pos + Vec3::UP * step);
                } else {
                    match ports.ground.sample_ground_height(pos) {
                        Some(ground) => {
                            let floor = ground + self.config.effective_clearance() + self.config.pivot_to_bottom;
                            rt.stage = LandingStage::Descending { target_y: floor };
                            tracing::debug!(agent = %self.id(), ground, floor, "descending");
                        }
                        None => {
                            tracing::warn!(agent = %self.id(), position = %pos, "no ground below landing point");
                            match self.fail_attempt(rt, target_pos, now, ports) {
                                Some(next) => rt = next,
                                None => return,
                            }
                        }
                    }
                }
            }
            LandingStage::Descending { target_y } => {
                let new_y = (pos.y - self.config.descend_speed * dt).max(target_y);
                let landed_at = pos.with_y(new_y);
                ports.nav.warp(landed_at);

                if let Some(person) = ports.obstacles.person_contact(landed_at, self.config.body_radius) {
                    tracing::warn!(
                        agent = %self.id(),
                        person = %person,
                        attempt = rt.attempt,
                        "person contact during descent"
                    );
                    match self.fail_attempt(rt, target_pos, now, ports) {
                        Some(next) => rt = next,
                        None => return,
                    }
                } else if new_y <= target_y {
                    ports.nav.set_enabled(true);
                    self.track_position(now, landed_at);
                    tracing::info!(agent = %self.id(), position = %landed_at, attempt = rt.attempt, "landed");
                    self.set_phase(AgentPhase::Done, now);
                    return;
                }
            }
        }

        self.runtime = Some(PhaseRuntime::Landing(rt));
    }

    fn begin_attempt(&mut self, pos: Vec3) -> LandingRuntime {
        self.landing_attempts += 1;
        let target_y = pos.y.max(self.config.pre_landing_height);
        tracing::info!(
            agent = %self.id(),
            attempt = self.landing_attempts,
            max = self.config.max_landing_attempts,
            "landing attempt"
        );
        LandingRuntime {
            attempt: self.landing_attempts,
            stage:   LandingStage::Ascending { target_y },
        }
    }

    /// Close a failed attempt: reposition and start the next one, or abort
    /// when none are left.
    fn fail_attempt(
        &mut self,
        rt: LandingRuntime,
        target_pos: Vec3,
        now: SimTime,
        ports: &mut Ports<'_>,
    ) -> Option<LandingRuntime> {
        if rt.attempt >= self.config.max_landing_attempts {
            ports.nav.set_enabled(true);
            self.track_position(now, ports.nav.position());
            tracing::warn!(agent = %self.id(), attempts = rt.attempt, "landing attempts exhausted");
            self.set_phase(AgentPhase::Abort, now);
            return None;
        }

        let offset = self.rng.ring_offset(
            target_pos,
            self.config.min_landing_distance,
            self.config.max_landing_distance + self.config.retry_extra_distance,
        );
        match ports.nav.sample_navigable(offset, self.config.point_snap_radius) {
            Some(point) => {
                tracing::debug!(agent = %self.id(), to = %point, "repositioning for retry");
                ports.nav.warp(point);
            }
            None => tracing::debug!(agent = %self.id(), "no reposition point, retrying in place"),
        }
        self.refresh_claim(now);
        Some(self.begin_attempt(ports.nav.position()))
    }
}

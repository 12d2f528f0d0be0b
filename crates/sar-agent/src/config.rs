//! Agent tunables.

use std::time::Duration;

use sar_match::DEFAULT_MATCH_THRESHOLD;

use crate::{AgentError, AgentResult};

/// Every tunable of a [`SearchAgent`][crate::SearchAgent].
///
/// Distances are scene units (metres), speeds units per second, angles
/// degrees and durations seconds.  `Default` reproduces the field-tested
/// values; with the `serde` feature, missing keys in a config file fall
/// back to those defaults.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    // ── Perception ────────────────────────────────────────────────────────
    /// Radius of perception queries and of the patrol disk.
    pub search_radius: f32,
    /// Full horizontal field of view; candidates must lie within `fov / 2`
    /// of the heading.
    pub fov: f32,
    /// Height of the line-of-sight ray origin above the agent's position.
    pub eye_height: f32,
    /// Minimum score for a perceived person to count as the target.
    pub match_threshold: f32,
    /// Chase the designated target (if any) before scanning for matches.
    pub always_chase_designated: bool,

    // ── Transit & patrol ──────────────────────────────────────────────────
    /// GPS leg counts as arrived below this remaining distance.
    pub gps_arrival_distance: f32,
    /// Give up on the GPS leg and start searching after this long.
    pub gps_timeout_secs: f32,
    /// Snap radius for projecting the GPS target onto the navigable surface.
    pub gps_snap_radius: f32,
    /// Snap radius used when the agent itself is off the navigable surface.
    pub relocation_radius: f32,
    /// Agent counts as idle on patrol below this remaining distance.
    pub patrol_idle_distance: f32,
    /// Minimum time between patrol waypoints.
    pub waypoint_interval_secs: f32,
    /// Force a recenter when no waypoint was issued for this long.
    pub search_timeout_secs: f32,
    /// Recenter the patrol disk after this many waypoints.
    pub max_local_waypoints: u32,
    /// Snap radius for patrol, approach and landing points.
    pub point_snap_radius: f32,

    // ── Approach ──────────────────────────────────────────────────────────
    pub min_landing_distance: f32,
    pub max_landing_distance: f32,
    /// Approach counts as arrived at or below this remaining distance.
    pub approach_arrival_distance: f32,
    /// Release the claim and resume searching after this long.
    pub approach_timeout_secs: f32,

    // ── Landing ───────────────────────────────────────────────────────────
    /// Altitude every landing attempt climbs to before descending.
    pub pre_landing_height: f32,
    pub ascend_speed: f32,
    pub descend_speed: f32,
    pub max_landing_attempts: u32,
    /// Gap left between the agent's underside and the ground.
    pub landing_clearance: f32,
    /// Subtracted from `landing_clearance` (never below zero).
    pub landing_extra_drop: f32,
    /// Distance from the agent's reference point down to its underside.
    pub pivot_to_bottom: f32,
    /// Horizontal radius used for person-contact checks while descending.
    pub body_radius: f32,
    /// Extra distance allowed for the reposition offset between attempts.
    pub retry_extra_distance: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            search_radius:             20.0,
            fov:                       120.0,
            eye_height:                1.8,
            match_threshold:           DEFAULT_MATCH_THRESHOLD,
            always_chase_designated:   true,

            gps_arrival_distance:      1.5,
            gps_timeout_secs:          60.0,
            gps_snap_radius:           1_000.0,
            relocation_radius:         10.0,
            patrol_idle_distance:      0.8,
            waypoint_interval_secs:    3.0,
            search_timeout_secs:       30.0,
            max_local_waypoints:       10,
            point_snap_radius:         2.0,

            min_landing_distance:      2.0,
            max_landing_distance:      4.0,
            approach_arrival_distance: 0.6,
            approach_timeout_secs:     30.0,

            pre_landing_height:        5.0,
            ascend_speed:              4.0,
            descend_speed:             2.5,
            max_landing_attempts:      3,
            landing_clearance:         0.02,
            landing_extra_drop:        0.005,
            pivot_to_bottom:           0.0,
            body_radius:               0.3,
            retry_extra_distance:      1.5,
        }
    }
}

impl AgentConfig {
    /// `max(0, landing_clearance - landing_extra_drop)`.
    #[inline]
    pub fn effective_clearance(&self) -> f32 {
        (self.landing_clearance - self.landing_extra_drop).max(0.0)
    }

    pub fn gps_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.gps_timeout_secs)
    }

    pub fn waypoint_interval(&self) -> Duration {
        Duration::from_secs_f32(self.waypoint_interval_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.search_timeout_secs)
    }

    pub fn approach_timeout(&self) -> Duration {
        Duration::from_secs_f32(self.approach_timeout_secs)
    }

    /// Reject values the state machine cannot run with.
    pub fn validate(&self) -> AgentResult<()> {
        fn positive(name: &str, v: f32) -> AgentResult<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(AgentError::Config(format!("{name} must be positive, got {v}")))
            }
        }
        fn non_negative(name: &str, v: f32) -> AgentResult<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(AgentError::Config(format!("{name} must be non-negative, got {v}")))
            }
        }

        positive("search_radius", self.search_radius)?;
        if !(self.fov > 0.0 && self.fov <= 360.0) {
            return Err(AgentError::Config(format!("fov must be in (0, 360], got {}", self.fov)));
        }
        non_negative("eye_height", self.eye_height)?;
        if !self.match_threshold.is_finite() {
            return Err(AgentError::Config("match_threshold must be finite".into()));
        }

        positive("gps_arrival_distance", self.gps_arrival_distance)?;
        positive("gps_timeout_secs", self.gps_timeout_secs)?;
        non_negative("gps_snap_radius", self.gps_snap_radius)?;
        non_negative("relocation_radius", self.relocation_radius)?;
        non_negative("patrol_idle_distance", self.patrol_idle_distance)?;
        non_negative("waypoint_interval_secs", self.waypoint_interval_secs)?;
        positive("search_timeout_secs", self.search_timeout_secs)?;
        if self.max_local_waypoints == 0 {
            return Err(AgentError::Config("max_local_waypoints must be at least 1".into()));
        }
        non_negative("point_snap_radius", self.point_snap_radius)?;

        non_negative("min_landing_distance", self.min_landing_distance)?;
        if self.max_landing_distance < self.min_landing_distance {
            return Err(AgentError::Config(format!(
                "max_landing_distance ({}) < min_landing_distance ({})",
                self.max_landing_distance, self.min_landing_distance
            )));
        }
        non_negative("approach_arrival_distance", self.approach_arrival_distance)?;
        positive("approach_timeout_secs", self.approach_timeout_secs)?;

        positive("ascend_speed", self.ascend_speed)?;
        positive("descend_speed", self.descend_speed)?;
        if self.max_landing_attempts == 0 {
            return Err(AgentError::Config("max_landing_attempts must be at least 1".into()));
        }
        non_negative("landing_clearance", self.landing_clearance)?;
        non_negative("landing_extra_drop", self.landing_extra_drop)?;
        non_negative("pivot_to_bottom", self.pivot_to_bottom)?;
        non_negative("body_radius", self.body_radius)?;
        non_negative("retry_extra_distance", self.retry_extra_distance)?;
        Ok(())
    }
}

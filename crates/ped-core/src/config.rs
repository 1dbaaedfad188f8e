//! Scene-wide configuration.
//!
//! Typically built in code by the driver, or loaded from JSON with the
//! `serde` feature enabled.  Per-agent tuning (force weights, max speed) is
//! not here; it lives with the agent in `ped-agent`.

use crate::{CoreError, CoreResult};

/// Parameters shared by every agent in a scene.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SceneConfig {
    /// Master seed.  Per-agent RNGs are derived from it, so the same seed and
    /// the same insertion order always reproduce the same run.
    pub seed: u64,

    /// Agents farther apart than this (metres) do not repel each other.
    pub interaction_radius: f64,

    /// Obstacles farther than this (metres) exert no force.
    pub obstacle_threshold: f64,

    /// Lower clamp for distances in the repulsion terms, so coincident
    /// positions produce a large but finite force.
    pub min_distance: f64,

    /// Velocity decay rate (1/s) applied to agents with no active waypoint.
    pub rest_damping: f64,

    /// Rate (1/s) at which velocity toward a nearby obstacle is cancelled.
    pub obstacle_brake: f64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed:               0,
            interaction_radius: 3.0,
            obstacle_threshold: 1.5,
            min_distance:       0.1,
            rest_damping:       0.5,
            obstacle_brake:     5.0,
        }
    }
}

impl SceneConfig {
    /// Default configuration with a specific seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    /// Check every field is usable.  Called by the scene constructor.
    pub fn validate(&self) -> CoreResult<()> {
        CoreError::check_positive("interaction_radius", self.interaction_radius)?;
        CoreError::check_positive("obstacle_threshold", self.obstacle_threshold)?;
        CoreError::check_positive("min_distance", self.min_distance)?;
        CoreError::check_finite("rest_damping", self.rest_damping)?;
        CoreError::check_finite("obstacle_brake", self.obstacle_brake)?;
        if self.rest_damping < 0.0 || self.obstacle_brake < 0.0 {
            return Err(CoreError::Config(
                "rest_damping and obstacle_brake must not be negative".into(),
            ));
        }
        if self.min_distance >= self.interaction_radius.min(self.obstacle_threshold) {
            return Err(CoreError::Config(format!(
                "min_distance {} must be below interaction_radius and obstacle_threshold",
                self.min_distance
            )));
        }
        Ok(())
    }
}

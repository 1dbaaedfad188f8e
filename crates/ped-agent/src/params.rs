//! Per-agent tuning.

use ped_core::{CoreError, CoreResult};

/// What an agent does after capturing the last waypoint of its route.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WaypointBehavior {
    /// Traverse the route once, then drift to rest.
    #[default]
    Once,
    /// Loop back to the first waypoint.
    Repeat,
    /// Loop, visiting the waypoints in a freshly shuffled order each lap.
    RepeatRandom,
}

impl WaypointBehavior {
    /// `true` for the looping variants.
    #[inline]
    pub fn loops(self) -> bool {
        !matches!(self, WaypointBehavior::Once)
    }
}

/// Multipliers for the three force terms.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ForceWeights {
    /// Pull toward the current waypoint.
    pub goal: f64,
    /// Repulsion from nearby agents.
    pub social: f64,
    /// Repulsion from nearby walls.
    pub obstacle: f64,
}

impl Default for ForceWeights {
    fn default() -> Self {
        Self { goal: 1.0, social: 2.1, obstacle: 10.0 }
    }
}

impl ForceWeights {
    pub fn validate(&self) -> CoreResult<()> {
        for (what, w) in [("goal weight", self.goal), ("social weight", self.social), ("obstacle weight", self.obstacle)] {
            CoreError::check_finite(what, w)?;
            if w < 0.0 {
                return Err(CoreError::Config(format!("{what} must not be negative, got {w}")));
            }
        }
        Ok(())
    }
}

/// Everything tunable about one agent's motion.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentParams {
    pub weights: ForceWeights,
    /// Speed cap in metres per second.
    pub max_speed: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        // Mean free walking speed of adult pedestrians.
        Self { weights: ForceWeights::default(), max_speed: 1.34 }
    }
}

impl AgentParams {
    pub fn validate(&self) -> CoreResult<()> {
        self.weights.validate()?;
        CoreError::check_positive("max_speed", self.max_speed)?;
        Ok(())
    }
}

//! Fluent builder for constructing an `Agent` in one step.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ped_agent::{AgentBuilder, WaypointBehavior};
//!
//! let agent = AgentBuilder::new(Vector3::planar(-90.0, 3.0))
//!     .waypoint(exit.clone())
//!     .behavior(WaypointBehavior::Once)
//!     .social_weight(10.0)
//!     .build()?;
//! scene.add_agent(agent)?;
//! ```

use std::sync::Arc;

use ped_core::Vector3;
use ped_spatial::Waypoint;

use crate::{Agent, AgentParams, AgentResult, ForceWeights, WaypointBehavior};

/// Fluent builder for [`Agent`].
///
/// Nothing is validated until [`build`](Self::build), which reports the
/// first invalid value.
pub struct AgentBuilder {
    position: Vector3,
    velocity: Vector3,
    waypoints: Vec<Arc<Waypoint>>,
    behavior: WaypointBehavior,
    params: AgentParams,
}

impl AgentBuilder {
    /// Start an agent at `position` with default parameters.
    pub fn new(position: Vector3) -> Self {
        Self {
            position,
            velocity: Vector3::ZERO,
            waypoints: Vec::new(),
            behavior: WaypointBehavior::default(),
            params: AgentParams::default(),
        }
    }

    pub fn velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Append one waypoint to the route.
    pub fn waypoint(mut self, waypoint: Arc<Waypoint>) -> Self {
        self.waypoints.push(waypoint);
        self
    }

    /// Append several waypoints, in order.
    pub fn waypoints(mut self, waypoints: impl IntoIterator<Item = Arc<Waypoint>>) -> Self {
        self.waypoints.extend(waypoints);
        self
    }

    pub fn behavior(mut self, behavior: WaypointBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn params(mut self, params: AgentParams) -> Self {
        self.params = params;
        self
    }

    pub fn weights(mut self, weights: ForceWeights) -> Self {
        self.params.weights = weights;
        self
    }

    pub fn goal_weight(mut self, w: f64) -> Self {
        self.params.weights.goal = w;
        self
    }

    pub fn social_weight(mut self, w: f64) -> Self {
        self.params.weights.social = w;
        self
    }

    pub fn obstacle_weight(mut self, w: f64) -> Self {
        self.params.weights.obstacle = w;
        self
    }

    pub fn max_speed(mut self, max_speed: f64) -> Self {
        self.params.max_speed = max_speed;
        self
    }

    /// Validate and construct the agent.
    pub fn build(self) -> AgentResult<Agent> {
        let mut agent = Agent::new(self.position)?;
        agent.set_velocity(self.velocity)?;
        agent.set_params(self.params)?;
        agent.set_waypoint_behavior(self.behavior);
        for w in self.waypoints {
            agent.add_waypoint(w);
        }
        Ok(agent)
    }
}

//! The social-force step: force terms, integration, and waypoint capture.
//!
//! All three terms act in the ground plane.
//!
//! | Term      | Direction                         | Magnitude                               |
//! |-----------|-----------------------------------|-----------------------------------------|
//! | goal      | toward current waypoint centre    | `goal`                                  |
//! | social    | away from each neighbour          | `social · (1/max(d, d_min) − 1/R)`      |
//! | obstacle  | away from the nearest wall point  | `obstacle · (1/max(d, d_min) − 1/T)`    |
//!
//! `R` is the interaction radius and `T` the obstacle threshold; both terms
//! fall to zero at their cutoff.  The obstacle term also carries an approach
//! brake that cancels velocity into the wall at `obstacle_brake` per second.

use ped_core::{AgentId, SceneConfig, Vector3};
use ped_spatial::{Elevation, NeighborIndex, ObstacleSet};

use crate::{Agent, AgentStore, RouteProgress};

/// Golden angle in radians.  Spreads tie-break directions for coincident
/// agent pairs around the circle.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

// ── Inputs and outputs ────────────────────────────────────────────────────────

/// Read-only view of the world shared by every agent during the plan phase.
pub struct StepContext<'a> {
    pub dt: f64,
    pub config: &'a SceneConfig,
    /// Pre-tick agent state.
    pub agents: &'a AgentStore,
    /// Built from the same pre-tick positions as `agents`.
    pub index: &'a dyn NeighborIndex,
    pub obstacles: &'a ObstacleSet,
    pub elevation: Option<&'a Elevation>,
}

/// Force contributions acting on one agent, already weighted.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Forces {
    pub goal: Vector3,
    pub social: Vector3,
    pub obstacle: Vector3,
}

impl Forces {
    #[inline]
    pub fn total(&self) -> Vector3 {
        self.goal + self.social + self.obstacle
    }
}

/// Waypoint transition produced by a capture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteEvent {
    /// Moved on to the next waypoint of the lap.
    Advanced,
    /// Finished a lap of a looping route and restarted it.
    Wrapped,
    /// Finished a `Once` route.
    Exhausted,
}

/// The planned new state of one agent.  Committed with [`Agent::apply`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentUpdate {
    pub position: Vector3,
    pub velocity: Vector3,
    pub progress: RouteProgress,
    pub event: Option<RouteEvent>,
}

// ── Step ──────────────────────────────────────────────────────────────────────

impl Agent {
    /// Plan this agent's next state from the pre-tick world.
    ///
    /// `scratch` is a reusable neighbour buffer; its contents on return are
    /// unspecified.
    pub fn plan_step(&self, ctx: &StepContext<'_>, scratch: &mut Vec<AgentId>) -> AgentUpdate {
        let dt = ctx.dt;
        let forces = self.forces(ctx, scratch);

        let mut velocity = (self.velocity + forces.total() * dt).clamp_length(self.params.max_speed);
        if self.progress.index().is_none() {
            velocity = velocity * (1.0 - (ctx.config.rest_damping * dt).min(1.0));
        }
        let mut position = self.position + velocity * dt;

        if let Some((_, wall)) = ctx.obstacles.first_crossing(self.position, position) {
            let n = wall.segment().normal();
            let slide = velocity - n * velocity.dot(n);
            let candidate = self.position + slide * dt;
            if ctx.obstacles.first_crossing(self.position, candidate).is_none() {
                velocity = slide;
                position = candidate;
            } else {
                velocity = Vector3::ZERO;
                position = self.position;
            }
        }

        if let Some(elevation) = ctx.elevation {
            position.z = elevation.height(position.x, position.y);
            velocity.z = 0.0;
        }

        if !position.is_finite() || !velocity.is_finite() {
            position = self.position;
            velocity = Vector3::ZERO;
        }

        let mut progress = self.progress;
        let mut event = None;
        if self.current_waypoint().is_some_and(|w| w.reached(position)) {
            if let Some((next, e)) = self.progress.advance(self.behavior, self.order.len()) {
                progress = next;
                event = Some(e);
            }
        }

        AgentUpdate { position, velocity, progress, event }
    }

    /// Weighted force terms at the agent's current position.
    pub fn forces(&self, ctx: &StepContext<'_>, scratch: &mut Vec<AgentId>) -> Forces {
        Forces {
            goal:     self.goal_force(),
            social:   self.social_force(ctx, scratch),
            obstacle: self.obstacle_force(ctx),
        }
    }

    fn goal_force(&self) -> Vector3 {
        match self.current_waypoint() {
            Some(w) => w.direction_from(self.position) * self.params.weights.goal,
            None => Vector3::ZERO,
        }
    }

    fn social_force(&self, ctx: &StepContext<'_>, scratch: &mut Vec<AgentId>) -> Vector3 {
        let weight = self.params.weights.social;
        if weight == 0.0 {
            return Vector3::ZERO;
        }
        let radius = ctx.config.interaction_radius;
        let min_d = ctx.config.min_distance;

        scratch.clear();
        ctx.index.within(self.position, radius, scratch);

        let mut total = Vector3::ZERO;
        for &other_id in scratch.iter() {
            if other_id == self.id {
                continue;
            }
            let Some(other) = ctx.agents.get(other_id) else {
                continue;
            };
            let d = self.position.horizontal_distance(other.position);
            if d >= radius {
                continue;
            }
            let mut away = (self.position - other.position).horizontal().normalized();
            if away == Vector3::ZERO {
                away = separation_direction(self.id, other_id);
            }
            total += away * (weight * (1.0 / d.max(min_d) - 1.0 / radius));
        }
        total
    }

    fn obstacle_force(&self, ctx: &StepContext<'_>) -> Vector3 {
        let weight = self.params.weights.obstacle;
        if weight == 0.0 {
            return Vector3::ZERO;
        }
        let threshold = ctx.config.obstacle_threshold;
        let min_d = ctx.config.min_distance;
        let brake = ctx.config.obstacle_brake.min(1.0 / ctx.dt);
        let velocity = self.velocity.horizontal();

        let mut total = Vector3::ZERO;
        for (_, wall) in ctx.obstacles.near(self.position, threshold) {
            let nearest = wall.closest_point(self.position);
            let d = nearest.horizontal_distance(self.position);
            if d >= threshold {
                continue;
            }
            let mut n = (self.position - nearest).horizontal().normalized();
            if n == Vector3::ZERO {
                // Standing on the wall: push out on the side we came from.
                n = wall.segment().normal();
                if n.dot(velocity) > 0.0 {
                    n = -n;
                }
            }
            total += n * (weight * (1.0 / d.max(min_d) - 1.0 / threshold));

            let vn = velocity.dot(n);
            if vn < 0.0 {
                total += n * (-vn * brake);
            }
        }
        total
    }
}

/// Unit push direction for `me` when it sits exactly on top of `other`.
///
/// Both agents of a pair derive the same axis from their ordered ids and take
/// opposite ends of it, so they separate instead of staying stacked.
fn separation_direction(me: AgentId, other: AgentId) -> Vector3 {
    let (lo, hi) = if me < other { (me, other) } else { (other, me) };
    let theta = GOLDEN_ANGLE * (lo.0 as f64 * 31.0 + hi.0 as f64);
    let axis = Vector3::planar(theta.cos(), theta.sin());
    if me == lo { -axis } else { axis }
}

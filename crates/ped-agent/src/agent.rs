//! Agent state and the waypoint progression state machine.

use std::sync::Arc;

use ped_core::{AgentId, AgentRng, CoreError, Vector3};
use ped_spatial::Waypoint;

use crate::{AgentParams, AgentResult, AgentUpdate, ForceWeights, RouteEvent, WaypointBehavior};

// ── RouteProgress ─────────────────────────────────────────────────────────────

/// Where an agent is along its waypoint route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RouteProgress {
    /// No waypoints assigned.  The agent has no goal force.
    Idle,
    /// Steering toward the `n`-th waypoint of the current visiting order.
    Heading(usize),
    /// A `Once` route has been fully consumed.
    Exhausted,
}

impl RouteProgress {
    /// Index into the visiting order, `None` when there is no active target.
    #[inline]
    pub fn index(self) -> Option<usize> {
        match self {
            RouteProgress::Heading(i) => Some(i),
            RouteProgress::Idle | RouteProgress::Exhausted => None,
        }
    }

    /// The state after capturing the current waypoint of a `len`-long route.
    ///
    /// Returns `None` when there is nothing to capture.
    pub fn advance(self, behavior: WaypointBehavior, len: usize) -> Option<(RouteProgress, RouteEvent)> {
        let RouteProgress::Heading(i) = self else {
            return None;
        };
        if i + 1 < len {
            return Some((RouteProgress::Heading(i + 1), RouteEvent::Advanced));
        }
        Some(match behavior {
            WaypointBehavior::Once => (RouteProgress::Exhausted, RouteEvent::Exhausted),
            WaypointBehavior::Repeat | WaypointBehavior::RepeatRandom => {
                (RouteProgress::Heading(0), RouteEvent::Wrapped)
            }
        })
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One pedestrian.
///
/// Build with [`Agent::new`] or [`AgentBuilder`](crate::AgentBuilder), then
/// move it into a scene.  Until then its id is [`AgentId::INVALID`] and it has
/// no RNG; the scene assigns both on insertion.
#[derive(Clone, Debug)]
pub struct Agent {
    pub(crate) id: AgentId,
    pub(crate) position: Vector3,
    pub(crate) velocity: Vector3,
    pub(crate) route: Vec<Arc<Waypoint>>,
    /// Visiting order: `route[order[i]]` is the `i`-th waypoint of a lap.
    pub(crate) order: Vec<usize>,
    pub(crate) progress: RouteProgress,
    pub(crate) behavior: WaypointBehavior,
    pub(crate) params: AgentParams,
    pub(crate) rng: Option<AgentRng>,
}

impl Agent {
    /// Agent at rest at `position` with default parameters and no route.
    pub fn new(position: Vector3) -> AgentResult<Self> {
        check_vector("agent position", position)?;
        Ok(Self {
            id: AgentId::INVALID,
            position,
            velocity: Vector3::ZERO,
            route: Vec::new(),
            order: Vec::new(),
            progress: RouteProgress::Idle,
            behavior: WaypointBehavior::Once,
            params: AgentParams::default(),
            rng: None,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    #[inline]
    pub fn behavior(&self) -> WaypointBehavior {
        self.behavior
    }

    #[inline]
    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    #[inline]
    pub fn progress(&self) -> RouteProgress {
        self.progress
    }

    /// Position in the current visiting order, `None` if idle or exhausted.
    #[inline]
    pub fn waypoint_index(&self) -> Option<usize> {
        self.progress.index()
    }

    /// Waypoints in insertion order.
    pub fn waypoints(&self) -> &[Arc<Waypoint>] {
        &self.route
    }

    /// Waypoints in the order the current lap visits them.
    pub fn visiting_order(&self) -> impl Iterator<Item = &Arc<Waypoint>> + '_ {
        self.order.iter().map(|&i| &self.route[i])
    }

    /// The waypoint currently steered toward.
    pub fn current_waypoint(&self) -> Option<&Arc<Waypoint>> {
        self.progress.index().map(|i| &self.route[self.order[i]])
    }

    /// `true` once a `Once` route has been fully consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.progress == RouteProgress::Exhausted
    }

    // ── Setters ───────────────────────────────────────────────────────────

    pub fn set_position(&mut self, position: Vector3) -> AgentResult<()> {
        self.position = check_vector("agent position", position)?;
        Ok(())
    }

    pub fn set_velocity(&mut self, velocity: Vector3) -> AgentResult<()> {
        self.velocity = check_vector("agent velocity", velocity)?;
        Ok(())
    }

    /// Append a waypoint to the route.
    ///
    /// An idle or exhausted agent starts heading for it immediately.
    pub fn add_waypoint(&mut self, waypoint: Arc<Waypoint>) {
        self.order.push(self.route.len());
        self.route.push(waypoint);
        if matches!(self.progress, RouteProgress::Idle | RouteProgress::Exhausted) {
            self.progress = RouteProgress::Heading(self.order.len() - 1);
        }
    }

    pub fn set_waypoint_behavior(&mut self, behavior: WaypointBehavior) {
        self.behavior = behavior;
    }

    pub fn set_params(&mut self, params: AgentParams) -> AgentResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    pub fn set_weights(&mut self, weights: ForceWeights) -> AgentResult<()> {
        self.set_params(AgentParams { weights, ..self.params })
    }

    pub fn set_goal_weight(&mut self, w: f64) -> AgentResult<()> {
        self.set_weights(ForceWeights { goal: w, ..self.params.weights })
    }

    pub fn set_social_weight(&mut self, w: f64) -> AgentResult<()> {
        self.set_weights(ForceWeights { social: w, ..self.params.weights })
    }

    pub fn set_obstacle_weight(&mut self, w: f64) -> AgentResult<()> {
        self.set_weights(ForceWeights { obstacle: w, ..self.params.weights })
    }

    pub fn set_max_speed(&mut self, max_speed: f64) -> AgentResult<()> {
        self.set_params(AgentParams { max_speed, ..self.params })
    }

    // ── Scene hooks ───────────────────────────────────────────────────────

    /// Give the agent its handle and RNG.  Called once by the store.
    pub(crate) fn attach(&mut self, id: AgentId, scene_seed: u64) {
        self.id = id;
        self.rng = Some(AgentRng::new(scene_seed, id));
    }

    /// Forget the scene-assigned handle when the agent is handed back.
    pub(crate) fn detach(&mut self) {
        self.id = AgentId::INVALID;
        self.rng = None;
    }

    /// Commit a planned update.
    ///
    /// A `RepeatRandom` agent that just wrapped draws a new visiting order
    /// for the next lap.  The new lap never starts on the waypoint that
    /// closed the previous one.
    pub fn apply(&mut self, update: AgentUpdate) {
        if update.event == Some(RouteEvent::Wrapped) && self.behavior == WaypointBehavior::RepeatRandom {
            let captured = self.progress.index().and_then(|i| self.order.get(i).copied());
            if let Some(rng) = self.rng.as_mut() {
                rng.shuffle(&mut self.order);
                let last = self.order.len().saturating_sub(1);
                if last > 0 && self.order.first().copied() == captured {
                    self.order.swap(0, last);
                }
            }
        }
        self.position = update.position;
        self.velocity = update.velocity;
        self.progress = update.progress;
    }
}

fn check_vector(what: &'static str, v: Vector3) -> AgentResult<Vector3> {
    for c in v.to_array() {
        CoreError::check_finite(what, c)?;
    }
    Ok(v)
}

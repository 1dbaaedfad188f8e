//! The `Scene` aggregate and its tick loop.

use std::sync::Arc;

use ped_agent::{Agent, AgentStore, AgentUpdate, RouteEvent, StepContext};
use ped_core::{AgentId, ObstacleId, SceneConfig, SimClock, Tick, Vector3};
use ped_spatial::{Elevation, NeighborIndex, Obstacle, ObstacleSet, TreeIndex, Waypoint};
use tracing::{debug, info, warn};

use crate::{AgentRecord, OutputWriter, SceneError, SceneResult, TickReport, TickSnapshot, WriterError};

// ── Scene ─────────────────────────────────────────────────────────────────────

/// Everything in one simulated world, plus the tick loop that moves it.
///
/// `advance(dt)` runs three phases:
///
/// 1. **Index**: rebuild the neighbour index from current positions.
/// 2. **Plan** (optionally parallel with the `parallel` feature): every agent
///    computes its next state against the pre-tick snapshot.
/// 3. **Commit** (sequential, ascending `AgentId`): updates are written back,
///    `RepeatRandom` routes reshuffle, and the snapshot is published.
///
/// Entities are moved in and addressed by handle.  Removal hands them back.
pub struct Scene<I: NeighborIndex = TreeIndex> {
    config:       SceneConfig,
    clock:        SimClock,
    agents:       AgentStore,
    obstacles:    ObstacleSet,
    waypoints:    Vec<Arc<Waypoint>>,
    elevation:    Option<Elevation>,
    index:        I,
    /// Set whenever positions or membership change after the last rebuild.
    index_stale:  bool,
    writer:       Option<Box<dyn OutputWriter>>,
    output_error: Option<WriterError>,
    /// Reused `(id, position)` buffer for index rebuilds.
    positions:    Vec<(AgentId, Vector3)>,
}

impl Scene<TreeIndex> {
    /// Empty scene with the default R-tree neighbour index.
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        Self::with_index(config, TreeIndex::new())
    }
}

impl<I: NeighborIndex> Scene<I> {
    /// Empty scene using a caller-supplied neighbour index.
    pub fn with_index(config: SceneConfig, index: I) -> SceneResult<Self> {
        config.validate()?;
        Ok(Self {
            agents:       AgentStore::new(config.seed),
            config,
            clock:        SimClock::new(),
            obstacles:    ObstacleSet::new(),
            waypoints:    Vec::new(),
            elevation:    None,
            index,
            index_stale:  true,
            writer:       None,
            output_error: None,
            positions:    Vec::new(),
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Ticks completed.
    pub fn tick(&self) -> Tick {
        self.clock.current_tick
    }

    /// Simulated seconds elapsed.
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed_secs
    }

    // ── Obstacles ─────────────────────────────────────────────────────────

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = self.obstacles.insert(obstacle);
        if let (Some(writer), Some(o)) = (self.writer.as_mut(), self.obstacles.get(id)) {
            writer.draw_obstacle(id, o);
        }
        id
    }

    pub fn remove_obstacle(&mut self, id: ObstacleId) -> SceneResult<Obstacle> {
        let obstacle = self.obstacles.remove(id).ok_or(SceneError::UnknownObstacle(id))?;
        if let Some(writer) = self.writer.as_mut() {
            writer.erase_obstacle(id);
        }
        Ok(obstacle)
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id)
    }

    /// Live obstacles in ascending handle order.
    pub fn obstacles(&self) -> impl Iterator<Item = (ObstacleId, &Obstacle)> + '_ {
        self.obstacles.iter()
    }

    pub fn drain_obstacles(&mut self) -> Vec<(ObstacleId, Obstacle)> {
        let drained = self.obstacles.drain();
        if let Some(writer) = self.writer.as_mut() {
            for (id, _) in &drained {
                writer.erase_obstacle(*id);
            }
        }
        drained
    }

    // ── Waypoints ─────────────────────────────────────────────────────────

    /// Register a waypoint.  Agents may only reference waypoints obtained
    /// from this call on the same scene.
    pub fn add_waypoint(&mut self, waypoint: Waypoint) -> Arc<Waypoint> {
        let waypoint = Arc::new(waypoint);
        if let Some(writer) = self.writer.as_mut() {
            writer.draw_waypoint(&waypoint);
        }
        self.waypoints.push(Arc::clone(&waypoint));
        waypoint
    }

    pub fn waypoints(&self) -> &[Arc<Waypoint>] {
        &self.waypoints
    }

    fn check_registered(&self, waypoint: &Arc<Waypoint>) -> SceneResult<()> {
        if self.waypoints.iter().any(|w| Arc::ptr_eq(w, waypoint)) {
            Ok(())
        } else {
            let c = waypoint.center();
            Err(SceneError::UnregisteredWaypoint { x: c.x, y: c.y })
        }
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Move an agent into the scene and return its handle.
    ///
    /// Fails if the agent's route references a waypoint this scene did not
    /// register.  With elevation attached the agent is placed on the ground.
    pub fn add_agent(&mut self, mut agent: Agent) -> SceneResult<AgentId> {
        for w in agent.waypoints() {
            self.check_registered(w)?;
        }
        if let Some(e) = &self.elevation {
            let p = agent.position();
            agent.set_position(p.with_z(e.height(p.x, p.y)))?;
        }
        self.index_stale = true;
        Ok(self.agents.insert(agent))
    }

    /// Append a registered waypoint to a live agent's route.
    pub fn assign_waypoint(&mut self, id: AgentId, waypoint: &Arc<Waypoint>) -> SceneResult<()> {
        self.check_registered(waypoint)?;
        let agent = self.agents.get_mut(id).ok_or(SceneError::UnknownAgent(id))?;
        agent.add_waypoint(Arc::clone(waypoint));
        Ok(())
    }

    /// Take an agent out of the scene.  Its handle is retired.
    pub fn remove_agent(&mut self, id: AgentId) -> SceneResult<Agent> {
        let agent = self.agents.remove(id).ok_or(SceneError::UnknownAgent(id))?;
        self.index_stale = true;
        Ok(agent)
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Live agents in ascending handle order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.agents.iter()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn drain_agents(&mut self) -> Vec<Agent> {
        self.index_stale = true;
        self.agents.drain()
    }

    // ── Elevation ─────────────────────────────────────────────────────────

    /// Attach a raster, returning the previous one.  Existing agents snap to
    /// the new ground on the next tick.
    pub fn set_elevation(&mut self, elevation: Elevation) -> Option<Elevation> {
        self.elevation.replace(elevation)
    }

    pub fn elevation(&self) -> Option<&Elevation> {
        self.elevation.as_ref()
    }

    pub fn clear_elevation(&mut self) -> Option<Elevation> {
        self.elevation.take()
    }

    /// Terrain height at `(x, y)`.
    pub fn ground_height(&self, x: f64, y: f64) -> SceneResult<f64> {
        self.elevation
            .as_ref()
            .map(|e| e.height(x, y))
            .ok_or(SceneError::NoElevation)
    }

    // ── Output ────────────────────────────────────────────────────────────

    /// Attach a writer, returning the previous one.  The new writer is sent
    /// every current obstacle and waypoint.
    pub fn set_output_writer(&mut self, mut writer: Box<dyn OutputWriter>) -> Option<Box<dyn OutputWriter>> {
        for (id, o) in self.obstacles.iter() {
            writer.draw_obstacle(id, o);
        }
        for w in &self.waypoints {
            writer.draw_waypoint(w);
        }
        info!(
            obstacles = self.obstacles.len(),
            waypoints = self.waypoints.len(),
            "output writer attached"
        );
        self.writer.replace(writer)
    }

    pub fn output_writer_mut(&mut self) -> Option<&mut (dyn OutputWriter + 'static)> {
        self.writer.as_deref_mut()
    }

    pub fn take_output_writer(&mut self) -> Option<Box<dyn OutputWriter>> {
        self.writer.take()
    }

    /// The most recent publish error, cleared by this call.
    pub fn take_output_error(&mut self) -> Option<WriterError> {
        self.output_error.take()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Agents within horizontal `radius` of `point`, ascending.
    pub fn neighbors(&mut self, point: Vector3, radius: f64) -> Vec<AgentId> {
        self.refresh_index();
        let mut out = Vec::new();
        self.index.within(point, radius, &mut out);
        out.sort_unstable();
        out
    }

    /// Current state of every agent.
    pub fn snapshot(&self) -> TickSnapshot {
        TickSnapshot {
            tick:   self.clock.current_tick,
            time:   self.clock.elapsed_secs,
            agents: self
                .agents
                .iter()
                .map(|a| AgentRecord { id: a.id(), position: a.position(), velocity: a.velocity() })
                .collect(),
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the world by `dt` seconds.
    ///
    /// Publishing failures do not fail the tick: they are logged, recorded in
    /// the report, and kept for [`take_output_error`](Self::take_output_error).
    pub fn advance(&mut self, dt: f64) -> SceneResult<TickReport> {
        if !(dt.is_finite() && dt > 0.0) {
            warn!(dt, "rejected time step");
            return Err(SceneError::InvalidTimeStep(dt));
        }

        // ── Phase 1: index ────────────────────────────────────────────────
        self.index_stale = true;
        self.refresh_index();

        // ── Phase 2: plan ─────────────────────────────────────────────────
        let updates = self.plan(dt);

        // ── Phase 3: commit ───────────────────────────────────────────────
        let mut report = TickReport { agents: updates.len(), ..TickReport::default() };
        for (id, update) in updates {
            match update.event {
                Some(RouteEvent::Exhausted) => {
                    report.captured.push(id);
                    report.exhausted.push(id);
                }
                Some(_) => report.captured.push(id),
                None => {}
            }
            if let Some(agent) = self.agents.get_mut(id) {
                agent.apply(update);
            }
        }
        self.index_stale = true;
        self.clock.advance(dt);
        report.tick = self.clock.current_tick;

        if self.writer.is_some() {
            let snapshot = self.snapshot();
            if let Some(writer) = self.writer.as_mut() {
                if let Err(e) = writer.publish(&snapshot) {
                    warn!(tick = report.tick.0, error = %e, "publish failed");
                    report.output_fault = Some(e.to_string());
                    self.output_error = Some(e);
                }
            }
        }

        debug!(
            tick = report.tick.0,
            agents = report.agents,
            captured = report.captured.len(),
            exhausted = report.exhausted.len(),
            "tick complete"
        );
        Ok(report)
    }

    fn refresh_index(&mut self) {
        if self.index_stale {
            self.agents.positions_into(&mut self.positions);
            self.index.rebuild(&self.positions);
            self.index_stale = false;
        }
    }

    /// Plan every agent against the current (pre-tick) state, in ascending
    /// handle order.  With the `parallel` feature this runs on Rayon.
    fn plan(&self, dt: f64) -> Vec<(AgentId, AgentUpdate)> {
        let ctx = StepContext {
            dt,
            config:    &self.config,
            agents:    &self.agents,
            index:     &self.index,
            obstacles: &self.obstacles,
            elevation: self.elevation.as_ref(),
        };

        #[cfg(not(feature = "parallel"))]
        {
            let mut scratch = Vec::new();
            self.agents
                .iter()
                .map(|a| (a.id(), a.plan_step(&ctx, &mut scratch)))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            let agents: Vec<&Agent> = self.agents.iter().collect();
            agents
                .par_iter()
                .map_init(Vec::new, |scratch, a| (a.id(), a.plan_step(&ctx, scratch)))
                .collect()
        }
    }
}

impl<I: NeighborIndex> Drop for Scene<I> {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.finish() {
                warn!(error = %e, "output writer did not finish cleanly");
            }
        }
    }
}

//! Output capability attached to a scene.
//!
//! The scene knows nothing about transports.  It hands static geometry to the
//! writer as it is added, then one [`TickSnapshot`] per `advance`.  Drawing
//! directives and cameras come straight from the driver.

use std::error::Error;

use ped_core::{AgentId, ObstacleId, Segment, Tick, Vector3};
use ped_spatial::{Obstacle, Waypoint};

/// Boxed error returned by writer operations.  Writers own their failure
/// types; the scene only records and reports them.
pub type WriterError = Box<dyn Error + Send + Sync + 'static>;

/// A decorative primitive for the viewer.  Not part of the simulation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Vector3),
    Segment(Segment),
    Circle { center: Vector3, radius: f64 },
}

/// Post-commit state of one agent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AgentRecord {
    pub id:       AgentId,
    pub position: Vector3,
    pub velocity: Vector3,
}

/// Everything a writer needs to render one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickSnapshot {
    /// Ticks completed so far.
    pub tick: Tick,
    /// Simulated seconds elapsed.
    pub time: f64,
    /// Ascending by id.
    pub agents: Vec<AgentRecord>,
}

/// Sink for per-tick scene state.
///
/// Only [`publish`](Self::publish) is mandatory.  Everything else defaults to
/// a no-op so in-memory or headless writers stay small.
///
/// # Example — tick counter
///
/// ```rust,ignore
/// struct Counter(u64);
///
/// impl OutputWriter for Counter {
///     fn publish(&mut self, _snapshot: &TickSnapshot) -> Result<(), WriterError> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait OutputWriter: Send {
    fn set_scenario_name(&mut self, _name: &str) {}

    /// Queue a one-shot drawing directive, sent with the next frame.
    fn draw_point(&mut self, _shape: Shape, _label: &str) {}

    /// Register a named viewpoint.
    fn set_camera(&mut self, _position: Vector3, _direction: Vector3, _label: &str) {}

    /// Called by the scene for every obstacle, on add and on attach.
    fn draw_obstacle(&mut self, _id: ObstacleId, _obstacle: &Obstacle) {}

    /// Called by the scene when an obstacle is removed or drained.
    fn erase_obstacle(&mut self, _id: ObstacleId) {}

    /// Called by the scene for every waypoint, on add and on attach.
    fn draw_waypoint(&mut self, _waypoint: &Waypoint) {}

    /// Deliver one tick.  An error is non-fatal to the scene; it is reported
    /// in the tick report and the writer is called again next tick.
    fn publish(&mut self, snapshot: &TickSnapshot) -> Result<(), WriterError>;

    /// Flush and release the transport.
    fn finish(&mut self) -> Result<(), WriterError> {
        Ok(())
    }
}

/// An [`OutputWriter`] that discards everything.
pub struct NoopWriter;

impl OutputWriter for NoopWriter {
    fn publish(&mut self, _snapshot: &TickSnapshot) -> Result<(), WriterError> {
        Ok(())
    }
}

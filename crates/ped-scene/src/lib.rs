//! `ped-scene` — the scene aggregate and tick loop for the pedsim crowd engine.
//!
//! # Tick loop
//!
//! ```text
//! scene.advance(dt):
//!   ① Validate  — dt must be finite and > 0.
//!   ② Index     — rebuild NeighborIndex from current agent positions.
//!   ③ Plan      — Agent::plan_step for every agent against the pre-tick
//!                 snapshot (parallel with the `parallel` feature).
//!   ④ Commit    — Agent::apply in ascending AgentId order; RepeatRandom
//!                 routes reshuffle here.
//!   ⑤ Publish   — OutputWriter::publish(post-commit snapshot); failures are
//!                 reported, never fatal.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the plan phase on Rayon's thread pool.            |
//! | `serde`    | Serde derives on configs and parameter types.          |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ped_agent::AgentBuilder;
//! use ped_core::{SceneConfig, Vector3};
//! use ped_scene::{NoopWriter, Scene};
//! use ped_spatial::{Obstacle, Waypoint};
//!
//! let mut scene = Scene::new(SceneConfig::with_seed(42))?;
//! scene.add_obstacle(Obstacle::new(-10.0, -5.0, 10.0, -5.0)?);
//! let exit = scene.add_waypoint(Waypoint::new(20.0, 0.0, 2.0)?);
//! scene.add_agent(AgentBuilder::new(Vector3::ZERO).waypoint(exit).build()?)?;
//! scene.set_output_writer(Box::new(NoopWriter));
//! for _ in 0..100 {
//!     scene.advance(0.4)?;
//! }
//! ```

pub mod error;
pub mod report;
pub mod scene;
pub mod writer;

#[cfg(test)]
mod tests;

pub use error::{SceneError, SceneResult};
pub use report::TickReport;
pub use scene::Scene;
pub use writer::{AgentRecord, NoopWriter, OutputWriter, Shape, TickSnapshot, WriterError};

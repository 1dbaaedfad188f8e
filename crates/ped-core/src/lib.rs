//! `ped-core` — foundational types for the pedsim crowd engine.
//!
//! This crate is a dependency of every other `ped-*` crate.  It has no
//! `ped-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `ObstacleId`                               |
//! | [`vector`]      | `Vector3` arithmetic                                  |
//! | [`geometry`]    | `Segment` — closest point, normals, intersection      |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (scenario-level)     |
//! | [`config`]      | `SceneConfig`                                         |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod rng;
pub mod time;
pub mod vector;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SceneConfig;
pub use error::{CoreError, CoreResult};
pub use geometry::Segment;
pub use ids::{AgentId, ObstacleId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, Tick};
pub use vector::Vector3;

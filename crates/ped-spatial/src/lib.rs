//! `ped-spatial` — static world geometry and neighbour queries.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`elevation`] | `Elevation` heightmap — bilinear height, gradient         |
//! | [`obstacle`]  | `Obstacle` wall segment, `ObstacleSet` (R-tree lookup)    |
//! | [`waypoint`]  | `Waypoint` goal centre + capture radius                   |
//! | [`index`]     | `NeighborIndex` trait, `TreeIndex` (R-tree)               |
//! | [`grid`]      | `GridIndex` uniform hash grid                             |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | `GridIndex` buckets use `FxHashMap` instead of `HashMap`.  |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public value types.   |

pub mod elevation;
pub mod error;
pub mod grid;
pub mod index;
pub mod obstacle;
pub mod waypoint;

#[cfg(test)]
mod tests;

pub use elevation::Elevation;
pub use error::{SpatialError, SpatialResult};
pub use grid::GridIndex;
pub use index::{NeighborIndex, TreeIndex};
pub use obstacle::{Obstacle, ObstacleSet};
pub use waypoint::Waypoint;

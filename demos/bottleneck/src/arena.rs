//! Static geometry of the bottleneck scenario.
//!
//! ```text
//!  (-125, 70) ┌──────────────────────────────────────────────┐ (125, 70)
//!             │    ╲                                    ╱    │
//!             │      ╲                              ╱        │
//!             │  start ╲  (-30, 2) ─────── (30, 2) ╱   exit  │
//!             │  block  ╱ (-30,-2) ─────── (30,-2) ╲  (100,0)│
//!             │      ╱                              ╲        │
//!             │    ╱                                    ╲    │
//! (-125, -70) └──────────────────────────────────────────────┘ (125, -70)
//! ```

use std::sync::Arc;

use anyhow::Result;

use ped_core::Vector3;
use ped_scene::{Scene, Shape};
use ped_spatial::{Elevation, Obstacle, Waypoint};

/// Half-width of the corridor through the bottleneck.
const HALF_WIDTH: f64 = 2.0;

/// Terrain raster covers the arena at 1 m resolution.
const TERRAIN_ORIGIN: (f64, f64) = (-125.0, -75.0);
const TERRAIN_ROWS:   usize = 151;
const TERRAIN_COLS:   usize = 251;

/// Wall segments as `(x1, y1, x2, y2)`.
const WALLS: [(f64, f64, f64, f64); 10] = [
    // outer boundary
    (-125.0, 70.0, 125.0, 70.0),
    (-125.0, -70.0, 125.0, -70.0),
    (-125.0, 70.0, -125.0, -70.0),
    (125.0, 70.0, 125.0, -70.0),
    // corridor
    (-30.0, HALF_WIDTH, 30.0, HALF_WIDTH),
    (-30.0, -HALF_WIDTH, 30.0, -HALF_WIDTH),
    // funnel
    (-30.0, -HALF_WIDTH, -100.0, -70.0),
    (-30.0, HALF_WIDTH, -100.0, 70.0),
    (30.0, -HALF_WIDTH, 100.0, -70.0),
    (30.0, HALF_WIDTH, 100.0, 70.0),
];

/// Add the walls and the exit waypoint to `scene`.  Returns the exit.
pub fn build(scene: &mut Scene) -> Result<Arc<Waypoint>> {
    for &(x1, y1, x2, y2) in &WALLS {
        scene.add_obstacle(Obstacle::new(x1, y1, x2, y2)?);
    }
    Ok(scene.add_waypoint(Waypoint::new(100.0, 0.0, 24.0)?))
}

/// Rolling hills, lower along the corridor axis.
pub fn terrain() -> Result<Elevation> {
    let (ox, oy) = TERRAIN_ORIGIN;
    let raster = Elevation::from_fn(TERRAIN_ROWS, TERRAIN_COLS, |row, col| {
        let x = ox + col as f64;
        let y = oy + row as f64;
        let hills = 1.5 * (x / 23.0).sin() * (y / 17.0).cos();
        let valley = 0.0004 * y * y;
        hills + valley
    })?;
    Ok(raster.with_meta(ox, oy, 1.0)?)
}

/// A row of trees south of the corridor, planted on the terrain.
pub fn trees(scene: &Scene) -> Result<Vec<Shape>> {
    (-20..=20)
        .step_by(10)
        .map(|x| {
            let (x, y) = (f64::from(x), -10.0);
            Ok(Shape::Point(Vector3::new(x, y, scene.ground_height(x, y)?)))
        })
        .collect()
}

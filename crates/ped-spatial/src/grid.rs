//! Uniform hash-grid neighbour index.
//!
//! Agents are bucketed by the square cell containing them.  A radius query
//! visits the `(2k+1)²` cells around the centre, where `k = ceil(r / cell)`,
//! and filters by exact distance.  With the cell size equal to the interaction
//! radius that is the classic 3×3 neighbourhood.  When that window holds more
//! cells than are occupied, the query walks the occupied buckets instead.

#[cfg(not(feature = "fx-hash"))]
use std::collections::HashMap;

#[cfg(feature = "fx-hash")]
use rustc_hash::FxHashMap as HashMap;

use ped_core::{AgentId, CoreError, Vector3};

use crate::{NeighborIndex, SpatialResult};

type CellKey = (i64, i64);

/// Hash grid with a fixed cell size.
pub struct GridIndex {
    cell_size: f64,
    cells: HashMap<CellKey, Vec<(AgentId, [f64; 2])>>,
    count: usize,
}

impl GridIndex {
    /// Grid with square cells of `cell_size` metres.
    pub fn new(cell_size: f64) -> SpatialResult<Self> {
        CoreError::check_positive("grid cell_size", cell_size)?;
        Ok(Self { cell_size, cells: HashMap::default(), count: 0 })
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Number of non-empty cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    fn key(&self, x: f64, y: f64) -> CellKey {
        ((x / self.cell_size).floor() as i64, (y / self.cell_size).floor() as i64)
    }
}

impl NeighborIndex for GridIndex {
    fn rebuild(&mut self, points: &[(AgentId, Vector3)]) {
        // Keep bucket allocations from the previous tick.
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        for &(id, p) in points {
            let key = self.key(p.x, p.y);
            self.cells.entry(key).or_default().push((id, [p.x, p.y]));
        }
        self.cells.retain(|_, bucket| !bucket.is_empty());
        self.count = points.len();
    }

    fn within(&self, center: Vector3, radius: f64, out: &mut Vec<AgentId>) {
        if !(radius >= 0.0) || !center.is_finite() {
            return;
        }
        let r2 = radius * radius;
        let mut collect = |bucket: &[(AgentId, [f64; 2])]| {
            out.extend(bucket.iter().filter_map(|&(id, [x, y])| {
                let dx = x - center.x;
                let dy = y - center.y;
                (dx * dx + dy * dy <= r2).then_some(id)
            }));
        };

        // A window wider than the occupied cell count costs more than
        // walking every bucket.
        let span = (radius / self.cell_size).ceil();
        let window = 2.0 * span + 1.0;
        if !(window * window <= self.cells.len() as f64) {
            for bucket in self.cells.values() {
                collect(bucket);
            }
            return;
        }

        let span = span as i64;
        let (cx, cy) = self.key(center.x, center.y);
        for gx in cx.saturating_sub(span)..=cx.saturating_add(span) {
            for gy in cy.saturating_sub(span)..=cy.saturating_add(span) {
                if let Some(bucket) = self.cells.get(&(gx, gy)) {
                    collect(bucket);
                }
            }
        }
    }

    fn len(&self) -> usize {
        self.count
    }
}

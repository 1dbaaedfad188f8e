//! Terrain heightmap.
//!
//! # Raster layout
//!
//! Heights are stored row-major.  Sample `(row, col)` sits at world position
//!
//! ```text
//! x = origin_x + col * cell_size
//! y = origin_y + row * cell_size
//! ```
//!
//! so row 0 lies along `y = origin_y`.  North-up rasters (ESRI ASCII and
//! friends) must have their rows reversed before [`Elevation::from_rows`].
//!
//! Queries between samples are bilinearly interpolated.  Queries outside the
//! sampled rectangle return `outside_height` (0 by default) and a zero
//! gradient instead of failing, so agents wandering off the map keep moving.

use ped_core::{CoreError, Vector3};

use crate::{SpatialError, SpatialResult};

/// A regular grid of terrain heights.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Elevation {
    origin_x: f64,
    origin_y: f64,
    cell_size: f64,
    rows: usize,
    cols: usize,
    heights: Vec<f64>,
    outside_height: f64,
}

impl Elevation {
    /// Build from a list of rows.  Every row must have the same length and
    /// every sample must be finite.
    ///
    /// The raster starts anchored at the origin with 1 m cells; call
    /// [`set_meta`](Self::set_meta) to position it.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> SpatialResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || cols == 0 {
            return Err(SpatialError::EmptyRaster);
        }
        let mut heights = Vec::with_capacity(rows.len() * cols);
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(SpatialError::RaggedRaster { row: r, got: row.len(), expected: cols });
            }
            for (c, &h) in row.iter().enumerate() {
                if !h.is_finite() {
                    return Err(SpatialError::NonFiniteSample { row: r, col: c });
                }
                heights.push(h);
            }
        }
        Ok(Self {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: 1.0,
            rows: rows.len(),
            cols,
            heights,
            outside_height: 0.0,
        })
    }

    /// Build a `rows × cols` raster by evaluating `f(row, col)`.
    pub fn from_fn(
        rows: usize,
        cols: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> SpatialResult<Self> {
        let data = (0..rows)
            .map(|r| (0..cols).map(|c| f(r, c)).collect())
            .collect();
        Self::from_rows(data)
    }

    /// Set the world position of sample `(0, 0)` and the cell size in metres.
    pub fn set_meta(&mut self, origin_x: f64, origin_y: f64, cell_size: f64) -> SpatialResult<()> {
        self.origin_x = CoreError::check_finite("elevation origin_x", origin_x)?;
        self.origin_y = CoreError::check_finite("elevation origin_y", origin_y)?;
        self.cell_size = CoreError::check_positive("elevation cell_size", cell_size)?;
        Ok(())
    }

    /// Builder-style [`set_meta`](Self::set_meta).
    pub fn with_meta(mut self, origin_x: f64, origin_y: f64, cell_size: f64) -> SpatialResult<Self> {
        self.set_meta(origin_x, origin_y, cell_size)?;
        Ok(self)
    }

    /// Height reported for positions outside the raster.
    pub fn with_outside_height(mut self, height: f64) -> SpatialResult<Self> {
        self.outside_height = CoreError::check_finite("outside_height", height)?;
        Ok(self)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.origin_x, self.origin_y)
    }

    /// Raw sample, `None` if out of range.
    pub fn sample(&self, row: usize, col: usize) -> Option<f64> {
        (row < self.rows && col < self.cols).then(|| self.heights[row * self.cols + col])
    }

    /// `true` if `(x, y)` lies inside the sampled rectangle.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.cell_coords(x, y).is_some()
    }

    /// Interpolated terrain height at `(x, y)`.
    pub fn height(&self, x: f64, y: f64) -> f64 {
        match self.cell_coords(x, y) {
            None => self.outside_height,
            Some(cell) => {
                let [h00, h10, h01, h11] = self.corners(&cell);
                let (tx, ty) = (cell.tx, cell.ty);
                let bottom = h00 + (h10 - h00) * tx;
                let top = h01 + (h11 - h01) * tx;
                bottom + (top - bottom) * ty
            }
        }
    }

    /// Slope `(∂h/∂x, ∂h/∂y, 0)` of the interpolated surface at `(x, y)`.
    ///
    /// Zero outside the raster.
    pub fn gradient(&self, x: f64, y: f64) -> Vector3 {
        match self.cell_coords(x, y) {
            None => Vector3::ZERO,
            Some(cell) => {
                let [h00, h10, h01, h11] = self.corners(&cell);
                let (tx, ty) = (cell.tx, cell.ty);
                let dx = if self.cols > 1 {
                    ((h10 - h00) * (1.0 - ty) + (h11 - h01) * ty) / self.cell_size
                } else {
                    0.0
                };
                let dy = if self.rows > 1 {
                    ((h01 - h00) * (1.0 - tx) + (h11 - h10) * tx) / self.cell_size
                } else {
                    0.0
                };
                Vector3::planar(dx, dy)
            }
        }
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    fn cell_coords(&self, x: f64, y: f64) -> Option<CellCoords> {
        let fx = (x - self.origin_x) / self.cell_size;
        let fy = (y - self.origin_y) / self.cell_size;
        let max_x = (self.cols - 1) as f64;
        let max_y = (self.rows - 1) as f64;
        // Written so NaN falls through to `None`.
        if !(fx >= 0.0 && fx <= max_x && fy >= 0.0 && fy <= max_y) {
            return None;
        }
        let col = (fx.floor() as usize).min(self.cols.saturating_sub(2));
        let row = (fy.floor() as usize).min(self.rows.saturating_sub(2));
        Some(CellCoords { row, col, tx: fx - col as f64, ty: fy - row as f64 })
    }

    /// `[h(r, c), h(r, c+1), h(r+1, c), h(r+1, c+1)]`, repeating edge samples
    /// for single-row or single-column rasters.
    fn corners(&self, cell: &CellCoords) -> [f64; 4] {
        let c1 = (cell.col + 1).min(self.cols - 1);
        let r1 = (cell.row + 1).min(self.rows - 1);
        let at = |r: usize, c: usize| self.heights[r * self.cols + c];
        [at(cell.row, cell.col), at(cell.row, c1), at(r1, cell.col), at(r1, c1)]
    }
}

struct CellCoords {
    row: usize,
    col: usize,
    tx: f64,
    ty: f64,
}

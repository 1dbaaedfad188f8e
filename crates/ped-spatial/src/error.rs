//! Spatial-subsystem error type.

use thiserror::Error;

use ped_core::CoreError;

/// Errors produced by `ped-spatial` constructors.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("elevation raster is empty")]
    EmptyRaster,

    #[error("elevation row {row} has {got} samples, expected {expected}")]
    RaggedRaster { row: usize, got: usize, expected: usize },

    #[error("elevation sample at row {row}, column {col} is not finite")]
    NonFiniteSample { row: usize, col: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

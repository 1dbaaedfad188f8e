use ped_agent::AgentError;
use ped_core::{AgentId, CoreError, ObstacleId};
use ped_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("time step must be finite and positive, got {0}")]
    InvalidTimeStep(f64),

    #[error("waypoint at ({x}, {y}) is not registered with this scene")]
    UnregisteredWaypoint { x: f64, y: f64 },

    #[error("no elevation raster is attached to the scene")]
    NoElevation,

    #[error("unknown {0}")]
    UnknownAgent(AgentId),

    #[error("unknown {0}")]
    UnknownObstacle(ObstacleId),

    #[error("scene configuration error: {0}")]
    Config(#[from] CoreError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type SceneResult<T> = Result<T, SceneError>;

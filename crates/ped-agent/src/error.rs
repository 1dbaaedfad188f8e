use ped_core::{AgentId, CoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid agent parameter: {0}")]
    InvalidParameter(#[from] CoreError),

    #[error("{0} not found")]
    NotFound(AgentId),
}

pub type AgentResult<T> = Result<T, AgentError>;

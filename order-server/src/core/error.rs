//! Server lifecycle errors

use crate::engine::EngineError;
use thiserror::Error;

/// Errors raised while starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, ServerError>;

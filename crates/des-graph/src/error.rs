//! Graph loading error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("unknown dynamics [{0}]")]
    UnknownDynamics(String),

    #[error("child index [{index}] >= size of the children list ({len})")]
    ChildIndex { index: usize, len: usize },

    #[error("port index [{0}] too big")]
    PortIndex(usize),

    #[error("malformed graph description: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;

//! Overall high-level error type for the driver
use crate::eval::error::RuntimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("unknown scenario {0}")]
    UnknownScenario(String),
    #[error("{remaining} objects survived shutdown")]
    Leak { remaining: usize },
    #[error("workload expected {expected} live objects but found {actual}")]
    Unexpected { expected: usize, actual: usize },
}

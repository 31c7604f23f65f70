//! Runtime errors
use thiserror::Error;

use super::memory::{array::AllocError, object::ObjectKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocError),
    #[error("reference to an object that is not live in this runtime")]
    DeadReference,
    #[error("index {index} out of range for array of size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("expected {expected} received {actual}")]
    WrongKind {
        expected: ObjectKind,
        actual: ObjectKind,
    },
    #[error("string contains an interior NUL byte")]
    InvalidString,
    #[error("cannot {op} {left} and {right}")]
    Unsupported {
        op: &'static str,
        left: ObjectKind,
        right: ObjectKind,
    },
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    pub fn test_messages() {
        assert_eq!(
            RuntimeError::WrongKind {
                expected: ObjectKind::Array,
                actual: ObjectKind::Integer
            }
            .to_string(),
            "expected array received integer"
        );
        assert_eq!(
            RuntimeError::from(AllocError::OOM).to_string(),
            "allocation error: out of memory"
        );
        assert_eq!(
            RuntimeError::Unsupported {
                op: "add",
                left: ObjectKind::String,
                right: ObjectKind::Float
            }
            .to_string(),
            "cannot add string and float"
        );
    }
}

use std::fmt;
use thiserror::Error;

/// Which side of a comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSide {
    Old,
    New,
}

impl fmt::Display for SnapshotSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotSide::Old => f.write_str("old"),
            SnapshotSide::New => f.write_str("new"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DiffError {
    #[error("The {side} snapshot contains no public types")]
    EmptySnapshot { side: SnapshotSide },

    #[error("Invalid filter pattern '{pattern}': {reason}")]
    InvalidFilter { pattern: String, reason: String },

    #[error("Comparison was cancelled")]
    Cancelled,
}

impl DiffError {
    /// True for errors caused by caller-supplied filter input.
    pub fn is_input_error(&self) -> bool {
        matches!(self, DiffError::InvalidFilter { .. })
    }
}

pub type Result<T> = std::result::Result<T, DiffError>;

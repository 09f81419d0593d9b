//! Error types for the simulator.

use thiserror::Error;

use crate::translation::{FrameNumber, PageNumber};

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Error, Debug)]
pub enum SimError {
    /// Page number outside the configured page table
    #[error("page {page:#x} is outside the page table ({count} pages)")]
    PageOutOfRange { page: PageNumber, count: usize },

    /// Frame number outside the configured frame store
    #[error("frame {frame:#x} is outside RAM ({count} frames)")]
    FrameOutOfRange { frame: FrameNumber, count: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown command \"{0}\"")]
    UnknownCommand(String),

    #[error("{0} requires a hexadecimal address")]
    MissingOperand(String),

    #[error("invalid hexadecimal address: {0}")]
    InvalidAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Page table and RAM disagree about a mapping
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl SimError {
    /// Errors that reject one command line without ending the run
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SimError::Io(_) | SimError::InvalidConfig(_))
    }
}

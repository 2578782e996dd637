//! Error types for the generation pipeline

use thiserror::Error;

/// Errors raised by the generator library
///
/// Configuration and allocation problems are detected before any stage
/// task is dispatched. Once a pipeline run has started, the only failures
/// left are sink I/O errors and a stage thread disappearing after a panic.
#[derive(Debug, Error)]
pub enum FastaError {
    /// Invalid alphabet, pool size or line geometry
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The buffer pool could not reserve its memory
    #[error("Failed to allocate buffer pool: {slots} slots totalling {bytes} bytes")]
    Allocation { slots: usize, bytes: usize },

    /// Writing to the output sink failed
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),

    /// A pipeline stage stopped receiving work
    #[error("Pipeline stage disconnected: {0}")]
    StageDisconnected(&'static str),
}

impl FastaError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        FastaError::Configuration(msg.into())
    }

    /// Whether this error was raised before the pipeline started
    pub fn is_configuration(&self) -> bool {
        matches!(self, FastaError::Configuration(_))
    }
}

/// Result alias for library operations
pub type FastaResult<T> = std::result::Result<T, FastaError>;

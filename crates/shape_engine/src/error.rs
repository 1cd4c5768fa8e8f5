//! Engine error types

use thiserror::Error;

use crate::render::RenderError;

/// Errors raised by geometry, collider and shape operations
///
/// All failures are synchronous and surface to the immediate caller.
#[derive(Error, Debug)]
pub enum EngineError {
    /// An argument violated a constructor or transform precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was called before the object was ready for it
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// The graphics backend failed while creating or drawing a shape
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

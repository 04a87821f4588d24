//! Structured error types for the render context.
//!
//! The teacher declares `thiserror` as a dependency but never actually
//! derives an error enum with it (`effect.rs`, now removed, hand-rolled
//! `Display`/`Error` impls instead). This module wires `thiserror` in for
//! real.

use thiserror::Error;

/// Errors a [`crate::context::RenderContext`] can return from frame
/// lifecycle, draw recording, or backend resource operations.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("a frame is already active; call flush() before beginning another")]
    FrameAlreadyActive,

    #[error("no frame is active; call begin_frame() first")]
    NoActiveFrame,

    #[error("timed out waiting for a ring buffer slot to free up")]
    RingBufferTimeout,

    #[error("CPU triangulation failed for path {path_id}")]
    TriangulationFailed { path_id: u64 },

    #[error("shader compilation failed for pipeline program {program_key}")]
    ShaderCompilationFailed { program_key: &'static str },

    #[error("render backend error: {0}")]
    BackendError(String),

    #[error("invalid render target dimensions: {width}x{height}")]
    InvalidTargetDimensions { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, RenderError>;

//! Mesh extraction errors.

use std::collections::TryReserveError;

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("side length must be at least 1")]
    ZeroSideLength,

    /// A buffer would need `i32::MAX` bytes or more.
    #[error("{buffer} buffer would need {bytes} bytes, limit is {limit}", limit = i32::MAX)]
    TooLarge { buffer: &'static str, bytes: u64 },

    #[error("vertex buffer holds {actual} vertices, expected {expected}")]
    VertexBufferLength { expected: usize, actual: usize },

    #[error("index buffer holds {actual} indices, expected {expected}")]
    IndexBufferLength { expected: usize, actual: usize },

    #[error("failed to allocate mesh scratch storage: {0}")]
    Allocation(#[from] TryReserveError),
}

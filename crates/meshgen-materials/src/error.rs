//! Gradient and texture errors.

use std::collections::TryReserveError;

/// A gradient key list that cannot be sampled.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradientError {
    #[error("a color gradient needs at least one key")]
    Empty,

    #[error("key {index} has time {time}, expected a value in [0, 1]")]
    TimeOutOfRange { index: usize, time: f64 },
}

/// Errors from texture extraction.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("texture side length must be at least 1")]
    ZeroSideLength,

    #[error("texel buffer holds {actual} texels, expected {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("texture of {width}x{height} texels is too large to address")]
    TooLarge { width: u32, height: u32 },

    #[error("failed to allocate texel storage: {0}")]
    Allocation(#[from] TryReserveError),
}

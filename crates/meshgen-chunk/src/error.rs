//! Session errors and their coarse classification.

use std::fmt;

use meshgen_config::ConfigError;
use meshgen_materials::{GradientError, TextureError};
use meshgen_mesh::MeshError;
use meshgen_terrain::ParameterError;

/// Broad category of a [`ChunkError`], for hosts that map errors to status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid dimensions or parameters. Fix the input and retry.
    Configuration,
    /// Buffer sizes or call order do not match the session's expectations.
    Contract,
    /// The engine could not allocate working memory.
    Resource,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Contract => "contract",
            ErrorKind::Resource => "resource",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`crate::ChunkGenerator`].
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error("side length must be at least 1")]
    ZeroSideLength,

    #[error("height scale must be between 0 and f32::MAX, got {0}")]
    InvalidHeightScale(f64),

    #[error("invalid noise or bias parameters: {0}")]
    Parameter(#[from] ParameterError),

    #[error("invalid color gradient: {0}")]
    Gradient(#[from] GradientError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Dimensions changed since the geometry descriptor was last queried.
    #[error("geometry descriptor is stale, query it again after changing dimensions")]
    StaleDescriptor,

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

impl ChunkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChunkError::ZeroSideLength
            | ChunkError::InvalidHeightScale(_)
            | ChunkError::Parameter(_)
            | ChunkError::Gradient(_)
            | ChunkError::Config(_) => ErrorKind::Configuration,
            ChunkError::StaleDescriptor => ErrorKind::Contract,
            ChunkError::Mesh(err) => match err {
                MeshError::Allocation(_) => ErrorKind::Resource,
                MeshError::VertexBufferLength { .. } | MeshError::IndexBufferLength { .. } => {
                    ErrorKind::Contract
                }
                MeshError::ZeroSideLength | MeshError::TooLarge { .. } => {
                    ErrorKind::Configuration
                }
            },
            ChunkError::Texture(err) => match err {
                TextureError::Allocation(_) => ErrorKind::Resource,
                TextureError::BufferLength { .. } => ErrorKind::Contract,
                TextureError::ZeroDimension { .. }
                | TextureError::ZeroSideLength
                | TextureError::TooLarge { .. } => ErrorKind::Configuration,
            },
        }
    }
}

//! Terrain chunk generation sessions.
//!
//! A [`ChunkGenerator`] owns the noise, bias, gradient and dimensions for one
//! logical chunk producer. Callers query buffer sizes, allocate, and then fill
//! the buffers as often as they like with a moving world offset.

mod error;
mod generator;

pub use error::{ChunkError, ErrorKind};
pub use generator::{ChunkGenerator, SessionState};

pub use glam::DVec3;
pub use meshgen_materials::{BlendMode, ColorGradient, ColorKey, Rgba8, TextureImage};
pub use meshgen_mesh::{GeometryDescriptor, GridMesh, TerrainVertex};
pub use meshgen_terrain::{
    BiasParameters, HeightField, HeightFieldSampler, NoiseBasis, NoiseParameters,
};

//! Deterministic terrain height synthesis: fractal noise, bias remapping, and the
//! shared height-field sampler consumed by mesh and texture extraction.

mod bias;
mod error;
mod height_field;
mod noise_field;
mod seed;

pub use bias::{BiasCurve, BiasParameters};
pub use error::ParameterError;
pub use height_field::{HeightField, HeightFieldSampler};
pub use noise_field::{MAX_OCTAVES, NoiseBasis, NoiseField, NoiseParameters};
pub use seed::{OCTAVE_OFFSET_RANGE, OctaveSeeds};

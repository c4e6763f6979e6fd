//! The chunk generation session.

use std::fmt;
use std::time::Instant;

use glam::DVec3;
use meshgen_config::Config;
use meshgen_materials::{ColorGradient, Rgba8, TextureError, TextureImage, fill_texture};
use meshgen_mesh::{GeometryDescriptor, GridMesh, TerrainVertex, extract_grid_mesh};
use meshgen_terrain::{
    BiasCurve, BiasParameters, HeightFieldSampler, NoiseField, NoiseParameters,
};
use tracing::{debug, info};

use crate::error::ChunkError;

/// Where a session is in the describe/fill protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Dimensions were set or changed; the geometry descriptor must be queried.
    Configured,
    /// The descriptor for the current dimensions has been handed out.
    Ready,
    /// At least one fill has completed for the current dimensions.
    Filled,
}

/// One terrain chunk producer.
///
/// Not internally synchronized: mutators and fills take `&mut self`, so a
/// session is driven by one owner at a time. Independent sessions share no
/// state and may run on separate threads.
pub struct ChunkGenerator {
    side_length: u32,
    texture_size: Option<(u32, u32)>,
    noise: NoiseParameters,
    bias: BiasParameters,
    gradient: ColorGradient,
    sampler: HeightFieldSampler,
    state: SessionState,
}

impl ChunkGenerator {
    /// Create a session with default noise, bias and the terrain gradient.
    ///
    /// # Errors
    ///
    /// [`ChunkError::ZeroSideLength`] or [`ChunkError::InvalidHeightScale`].
    pub fn create(side_length: u32, height_scale: f64) -> Result<Self, ChunkError> {
        validate_side_length(side_length)?;
        validate_height_scale(height_scale)?;

        let noise = NoiseField::new(NoiseParameters::default())?;
        let bias = BiasCurve::new(BiasParameters::default())?;
        let generator = Self {
            side_length,
            texture_size: None,
            noise: noise.params().clone(),
            bias: bias.params().clone(),
            gradient: ColorGradient::default(),
            sampler: HeightFieldSampler::new(noise, bias, height_scale),
            state: SessionState::Configured,
        };
        info!(side_length, height_scale, "chunk generator created");
        Ok(generator)
    }

    /// Create a session from a loaded [`Config`].
    ///
    /// # Errors
    ///
    /// Any validation error from the individual setters.
    pub fn from_config(config: &Config) -> Result<Self, ChunkError> {
        let mut generator = Self::create(config.chunk.side_length, config.chunk.height_scale)?;
        generator.set_noise(config.noise.clone(), config.bias.clone())?;
        generator.set_gradient(config.gradient.to_gradient()?);
        if let Some([width, height]) = config.chunk.texture_size {
            generator.set_texture_size(width, height)?;
        }
        Ok(generator)
    }

    /// Change the side length and height scale.
    ///
    /// A new side length invalidates the geometry descriptor; the next
    /// [`fill`](Self::fill) fails with [`ChunkError::StaleDescriptor`] until
    /// [`describe_geometry`](Self::describe_geometry) is called again.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create). The session is unchanged on error.
    pub fn set_dimensions(&mut self, side_length: u32, height_scale: f64) -> Result<(), ChunkError> {
        validate_side_length(side_length)?;
        validate_height_scale(height_scale)?;

        if side_length != self.side_length {
            debug!(from = self.side_length, to = side_length, "side length changed");
            self.side_length = side_length;
            self.state = SessionState::Configured;
        }
        self.sampler.set_height_scale(height_scale);
        Ok(())
    }

    /// Fix the texture resolution. Until this is called the texture is
    /// `(N+1) × (N+1)` and follows the side length.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Texture`] if either dimension is zero.
    pub fn set_texture_size(&mut self, width: u32, height: u32) -> Result<(), ChunkError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroDimension { width, height }.into());
        }
        self.texture_size = Some((width, height));
        Ok(())
    }

    /// Replace the noise and bias parameters. Out-of-range values are clamped.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Parameter`] for a non-positive scale or non-finite input.
    /// The previous parameters stay in effect on error.
    pub fn set_noise(
        &mut self,
        noise: NoiseParameters,
        bias: BiasParameters,
    ) -> Result<(), ChunkError> {
        let field = NoiseField::new(noise)?;
        let curve = BiasCurve::new(bias)?;

        self.noise = field.params().clone();
        self.bias = curve.params().clone();
        let mut sampler = HeightFieldSampler::new(field, curve, self.sampler.height_scale());
        sampler.set_offset(self.sampler.offset());
        self.sampler = sampler;
        debug!(seed = self.noise.seed, octaves = self.noise.octaves, "noise updated");
        Ok(())
    }

    pub fn set_gradient(&mut self, gradient: ColorGradient) {
        self.gradient = gradient;
    }

    /// Buffer counts for the current side length. Marks the session ready to fill.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Mesh`] if a buffer would reach `i32::MAX` bytes.
    pub fn describe_geometry(&mut self) -> Result<GeometryDescriptor, ChunkError> {
        let desc = GeometryDescriptor::for_side_length(self.side_length)?;
        if self.state == SessionState::Configured {
            self.state = SessionState::Ready;
        }
        Ok(desc)
    }

    /// Texture `(width, height)` expected by [`fill`](Self::fill).
    pub fn describe_texture(&self) -> (u32, u32) {
        self.texture_size.unwrap_or_else(|| {
            let edge = self.side_length.saturating_add(1);
            (edge, edge)
        })
    }

    /// Fill caller-owned mesh and texture buffers for the chunk at `offset`.
    ///
    /// `offset.x` and `offset.z` translate the sampling domain; `offset.y`
    /// lifts every vertex and leaves the texture unchanged.
    /// Buffer lengths must equal the descriptor counts and `width * height`
    /// texels. All lengths are checked before anything is written.
    ///
    /// # Errors
    ///
    /// [`ChunkError::StaleDescriptor`] when dimensions changed since the last
    /// [`describe_geometry`](Self::describe_geometry); otherwise any mesh or
    /// texture error.
    pub fn fill(
        &mut self,
        vertices: &mut [TerrainVertex],
        indices: &mut [u32],
        texels: &mut [Rgba8],
        offset: DVec3,
    ) -> Result<(), ChunkError> {
        if self.state == SessionState::Configured {
            return Err(ChunkError::StaleDescriptor);
        }
        self.check_texel_len(texels.len())?;

        let start = Instant::now();
        self.sampler.set_offset(offset);
        extract_grid_mesh(
            &self.sampler,
            self.side_length,
            offset.y,
            vertices,
            indices,
        )?;
        let (width, height) = self.describe_texture();
        fill_texture(
            &self.sampler,
            &self.gradient,
            self.side_length,
            width,
            height,
            texels,
        )?;
        self.state = SessionState::Filled;

        debug!(
            side_length = self.side_length,
            ?offset,
            elapsed_us = start.elapsed().as_micros() as u64,
            "chunk filled"
        );
        Ok(())
    }

    /// Fill only the texture. Does not require a geometry descriptor.
    ///
    /// # Errors
    ///
    /// [`ChunkError::Texture`] for a wrong-length buffer.
    pub fn fill_texture(&mut self, texels: &mut [Rgba8], offset: DVec3) -> Result<(), ChunkError> {
        self.check_texel_len(texels.len())?;
        self.sampler.set_offset(offset);
        let (width, height) = self.describe_texture();
        fill_texture(
            &self.sampler,
            &self.gradient,
            self.side_length,
            width,
            height,
            texels,
        )?;
        Ok(())
    }

    /// Generate the mesh into freshly allocated buffers.
    ///
    /// # Errors
    ///
    /// See [`GridMesh::generate`].
    pub fn generate_mesh(&mut self, offset: DVec3) -> Result<GridMesh, ChunkError> {
        self.sampler.set_offset(offset);
        Ok(GridMesh::generate(
            &self.sampler,
            self.side_length,
            offset.y,
        )?)
    }

    /// Generate the texture into a freshly allocated image.
    ///
    /// # Errors
    ///
    /// See [`TextureImage::generate`].
    pub fn generate_texture(&mut self, offset: DVec3) -> Result<TextureImage, ChunkError> {
        self.sampler.set_offset(offset);
        let (width, height) = self.describe_texture();
        Ok(TextureImage::generate(
            &self.sampler,
            &self.gradient,
            self.side_length,
            width,
            height,
        )?)
    }

    /// End the session. Dropping the generator has the same effect.
    pub fn destroy(self) {
        info!(side_length = self.side_length, "chunk generator destroyed");
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn side_length(&self) -> u32 {
        self.side_length
    }

    pub fn height_scale(&self) -> f64 {
        self.sampler.height_scale()
    }

    /// Sanitized noise parameters in effect.
    pub fn noise_parameters(&self) -> &NoiseParameters {
        &self.noise
    }

    /// Sanitized bias parameters in effect.
    pub fn bias_parameters(&self) -> &BiasParameters {
        &self.bias
    }

    pub fn gradient(&self) -> &ColorGradient {
        &self.gradient
    }

    /// The shared height sampler, positioned at the offset of the last fill.
    pub fn sampler(&self) -> &HeightFieldSampler {
        &self.sampler
    }

    fn check_texel_len(&self, actual: usize) -> Result<(), ChunkError> {
        let (width, height) = self.describe_texture();
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or(TextureError::TooLarge { width, height })?;
        if actual != expected {
            return Err(TextureError::BufferLength { expected, actual }.into());
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkGenerator")
            .field("side_length", &self.side_length)
            .field("height_scale", &self.sampler.height_scale())
            .field("texture_size", &self.describe_texture())
            .field("noise", &self.noise)
            .field("bias", &self.bias)
            .field("gradient_keys", &self.gradient.keys().len())
            .field("state", &self.state)
            .finish()
    }
}

fn validate_side_length(side_length: u32) -> Result<(), ChunkError> {
    if side_length == 0 {
        return Err(ChunkError::ZeroSideLength);
    }
    Ok(())
}

fn validate_height_scale(height_scale: f64) -> Result<(), ChunkError> {
    if !(0.0..=f64::from(f32::MAX)).contains(&height_scale) {
        return Err(ChunkError::InvalidHeightScale(height_scale));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use meshgen_materials::{BlendMode, ColorKey};
    use meshgen_terrain::HeightField;

    fn buffers(generator: &mut ChunkGenerator) -> (Vec<TerrainVertex>, Vec<u32>, Vec<Rgba8>) {
        let desc = generator.describe_geometry().unwrap();
        let (w, h) = generator.describe_texture();
        (
            vec![TerrainVertex::default(); desc.vertex_count],
            vec![0; desc.index_count()],
            vec![Rgba8::default(); (w * h) as usize],
        )
    }

    #[test]
    fn test_create_validates_inputs() {
        assert!(matches!(ChunkGenerator::create(0, 10.0), Err(ChunkError::ZeroSideLength)));
        for bad in [f64::NAN, f64::INFINITY, -1.0, 1e160, f64::MAX] {
            let err = ChunkGenerator::create(4, bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
        }
        let mut tallest = ChunkGenerator::create(2, f64::from(f32::MAX)).unwrap();
        let mesh = tallest.generate_mesh(DVec3::ZERO).unwrap();
        for v in &mesh.vertices {
            let n = glam::Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-5, "normal {n:?}");
        }
        assert!(tallest.set_dimensions(2, 1e200).is_err());
        let generator = ChunkGenerator::create(4, 10.0).unwrap();
        assert_eq!(generator.state(), SessionState::Configured);
    }

    #[test]
    fn test_fill_before_describe_is_stale() {
        let mut generator = ChunkGenerator::create(2, 1.0).unwrap();
        let mut v = vec![TerrainVertex::default(); 9];
        let mut i = vec![0; 24];
        let mut t = vec![Rgba8::default(); 9];
        let err = generator.fill(&mut v, &mut i, &mut t, DVec3::ZERO).unwrap_err();
        assert!(matches!(err, ChunkError::StaleDescriptor));
        assert_eq!(err.kind(), ErrorKind::Contract);
    }

    #[test]
    fn test_state_machine() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        let (mut v, mut i, mut t) = buffers(&mut generator);
        assert_eq!(generator.state(), SessionState::Ready);

        generator.fill(&mut v, &mut i, &mut t, DVec3::ZERO).unwrap();
        assert_eq!(generator.state(), SessionState::Filled);
        generator.fill(&mut v, &mut i, &mut t, DVec3::X).unwrap();
        assert_eq!(generator.state(), SessionState::Filled);

        // Height-only change keeps the descriptor valid.
        generator.set_dimensions(4, 20.0).unwrap();
        assert_eq!(generator.state(), SessionState::Filled);

        generator.set_dimensions(8, 20.0).unwrap();
        assert_eq!(generator.state(), SessionState::Configured);
        assert!(matches!(
            generator.fill(&mut v, &mut i, &mut t, DVec3::ZERO),
            Err(ChunkError::StaleDescriptor)
        ));

        let (mut v, mut i, mut t) = buffers(&mut generator);
        generator.fill(&mut v, &mut i, &mut t, DVec3::ZERO).unwrap();
        assert_eq!(v.len(), 81);
    }

    #[test]
    fn test_invalid_dimensions_leave_session_unchanged() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        generator.describe_geometry().unwrap();
        assert!(generator.set_dimensions(0, 10.0).is_err());
        assert!(generator.set_dimensions(6, f64::NAN).is_err());
        assert_eq!(generator.side_length(), 4);
        assert_eq!(generator.height_scale(), 10.0);
        assert_eq!(generator.state(), SessionState::Ready);
    }

    #[test]
    fn test_texture_size_follows_side_length_until_set() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        assert_eq!(generator.describe_texture(), (5, 5));
        generator.set_dimensions(10, 10.0).unwrap();
        assert_eq!(generator.describe_texture(), (11, 11));
        generator.set_texture_size(64, 32).unwrap();
        generator.set_dimensions(3, 10.0).unwrap();
        assert_eq!(generator.describe_texture(), (64, 32));
        assert!(generator.set_texture_size(0, 32).is_err());
        assert_eq!(generator.describe_texture(), (64, 32));
    }

    #[test]
    fn test_set_noise_rejects_bad_scale_and_keeps_previous() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        let before = generator.noise_parameters().clone();
        let err = generator
            .set_noise(
                NoiseParameters {
                    scale: 0.0,
                    ..Default::default()
                },
                BiasParameters::default(),
            )
            .unwrap_err();
        assert!(matches!(err, ChunkError::Parameter(_)));
        assert_eq!(generator.noise_parameters(), &before);
    }

    #[test]
    fn test_set_noise_clamps() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        generator
            .set_noise(
                NoiseParameters {
                    octaves: 20,
                    lacunarity: 0.2,
                    ..Default::default()
                },
                BiasParameters {
                    gain: 2.0,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(generator.noise_parameters().octaves, 8);
        assert_eq!(generator.noise_parameters().lacunarity, 1.0);
        assert_eq!(generator.bias_parameters().gain, 1.0);
    }

    #[test]
    fn test_set_noise_takes_effect_on_next_fill() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        let (mut v, mut i, mut t) = buffers(&mut generator);
        generator.fill(&mut v, &mut i, &mut t, DVec3::ZERO).unwrap();
        let first = v.clone();

        generator
            .set_noise(NoiseParameters::with_seed(99), BiasParameters::default())
            .unwrap();
        generator.fill(&mut v, &mut i, &mut t, DVec3::ZERO).unwrap();
        assert_ne!(first, v);
    }

    #[test]
    fn test_gradient_applies_to_texture() {
        let mut generator = ChunkGenerator::create(2, 1.0).unwrap();
        let red = Rgba8::rgb(255, 0, 0);
        generator.set_gradient(
            ColorGradient::new(vec![ColorKey::new(red, 0.5)], BlendMode::Stepped).unwrap(),
        );
        let mut texels = vec![Rgba8::default(); 9];
        generator.fill_texture(&mut texels, DVec3::ZERO).unwrap();
        assert!(texels.iter().all(|&c| c == red));
    }

    #[test]
    fn test_fill_texture_checks_length() {
        let mut generator = ChunkGenerator::create(2, 1.0).unwrap();
        let mut texels = vec![Rgba8::default(); 8];
        let err = generator.fill_texture(&mut texels, DVec3::ZERO).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Contract);
    }

    #[test]
    fn test_wrong_texture_length_blocks_mesh_write() {
        let mut generator = ChunkGenerator::create(2, 1.0).unwrap();
        let (mut v, mut i, _) = buffers(&mut generator);
        let sentinel = TerrainVertex {
            uv: [7.0, 7.0],
            ..Default::default()
        };
        v.fill(sentinel);
        let mut short = vec![Rgba8::default(); 8];
        assert!(generator.fill(&mut v, &mut i, &mut short, DVec3::ZERO).is_err());
        assert!(v.iter().all(|x| *x == sentinel));
        assert!(i.iter().all(|&x| x == 0));
    }

    #[test]
    fn test_owned_generation_matches_fill() {
        let mut generator = ChunkGenerator::create(6, 25.0).unwrap();
        let offset = DVec3::new(12.0, 0.0, -6.0);
        let (mut v, mut i, mut t) = buffers(&mut generator);
        generator.fill(&mut v, &mut i, &mut t, offset).unwrap();

        let mesh = generator.generate_mesh(offset).unwrap();
        let image = generator.generate_texture(offset).unwrap();
        assert_eq!(mesh.vertices, v);
        assert_eq!(mesh.indices, i);
        assert_eq!(image.texels, t);
    }

    #[test]
    fn test_sampler_tracks_last_offset() {
        let mut generator = ChunkGenerator::create(4, 10.0).unwrap();
        let (mut v, mut i, mut t) = buffers(&mut generator);
        let offset = DVec3::new(3.0, 5.0, 7.0);
        generator.fill(&mut v, &mut i, &mut t, offset).unwrap();
        assert_eq!(generator.sampler().offset(), offset);
        let h = generator.sampler().height(-2.0, -2.0);
        assert_eq!(v[0].position[1], (5.0 + h) as f32);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.chunk.side_length = 8;
        config.chunk.texture_size = Some([16, 16]);
        config.noise.seed = 5;
        config.gradient.linear = false;

        let generator = ChunkGenerator::from_config(&config).unwrap();
        assert_eq!(generator.side_length(), 8);
        assert_eq!(generator.describe_texture(), (16, 16));
        assert_eq!(generator.noise_parameters().seed, 5);
        assert_eq!(generator.gradient().mode(), BlendMode::Stepped);
    }

    #[test]
    fn test_from_config_rejects_empty_gradient() {
        let mut config = Config::default();
        config.gradient.keys.clear();
        let err = ChunkGenerator::from_config(&config).unwrap_err();
        assert!(matches!(err, ChunkError::Config(_)));
    }

    #[test]
    fn test_debug_output() {
        let generator = ChunkGenerator::create(3, 2.0).unwrap();
        let text = format!("{generator:?}");
        assert!(text.contains("side_length: 3"));
        assert!(text.contains("Configured"));
    }
}

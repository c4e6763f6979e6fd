//! Color texture extraction from a height field.
//!
//! Texels cover the same `[-N/2, N/2]²` domain as the chunk mesh. Row 0 is the
//! minimum-z edge (uv `v = 0`), so rows run bottom-to-top in image terms.

use meshgen_terrain::HeightField;
use tracing::trace;

use crate::color::Rgba8;
use crate::error::TextureError;
use crate::gradient::ColorGradient;

/// Chunk-local `(x, z)` sampled by texel `(x, y)` of a `width × height` texture
/// over a chunk of side `side_length`. Texel centers are used.
pub fn texel_world_position(
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    side_length: u32,
) -> (f64, f64) {
    let n = f64::from(side_length);
    let half = n * 0.5;
    let wx = -half + (f64::from(x) + 0.5) / f64::from(width) * n;
    let wz = -half + (f64::from(y) + 0.5) / f64::from(height) * n;
    (wx, wz)
}

/// Number of texels in a `width × height` texture.
///
/// # Errors
///
/// Fails on a zero dimension or when the count overflows `usize`.
pub(crate) fn texel_count(width: u32, height: u32) -> Result<usize, TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimension { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(TextureError::TooLarge { width, height })
}

/// Paint `field` through `gradient` into a caller-owned texel buffer.
///
/// `texels` must hold exactly `width * height` entries in row-major order
/// (`y * width + x`). Nothing is written when validation fails.
///
/// # Errors
///
/// Returns [`TextureError`] for zero dimensions, a zero side length, or a
/// buffer of the wrong length.
pub fn fill_texture<H: HeightField + ?Sized>(
    field: &H,
    gradient: &ColorGradient,
    side_length: u32,
    width: u32,
    height: u32,
    texels: &mut [Rgba8],
) -> Result<(), TextureError> {
    if side_length == 0 {
        return Err(TextureError::ZeroSideLength);
    }
    let expected = texel_count(width, height)?;
    if texels.len() != expected {
        return Err(TextureError::BufferLength {
            expected,
            actual: texels.len(),
        });
    }

    for (y, row) in (0..height).zip(texels.chunks_exact_mut(width as usize)) {
        for (x, texel) in (0..width).zip(row.iter_mut()) {
            let (wx, wz) = texel_world_position(x, y, width, height, side_length);
            *texel = gradient.sample(field.normalized(wx, wz));
        }
    }

    trace!(width, height, side_length, "texture filled");
    Ok(())
}

/// An owned RGBA texture.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    /// Row-major texels, row 0 at minimum z.
    pub texels: Vec<Rgba8>,
}

impl TextureImage {
    /// Allocate and fill a texture.
    ///
    /// # Errors
    ///
    /// See [`fill_texture`]; also fails if storage cannot be reserved.
    pub fn generate<H: HeightField + ?Sized>(
        field: &H,
        gradient: &ColorGradient,
        side_length: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, TextureError> {
        let count = texel_count(width, height)?;
        let mut texels = Vec::new();
        texels.try_reserve_exact(count)?;
        texels.resize(count, Rgba8::default());
        fill_texture(field, gradient, side_length, width, height, &mut texels)?;
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    pub fn texel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Raw RGBA bytes in buffer order.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// RGBA bytes with rows reversed, top row first, as image encoders expect.
    pub fn to_top_down_bytes(&self) -> Vec<u8> {
        let stride = self.width as usize * 4;
        self.as_bytes()
            .chunks_exact(stride)
            .rev()
            .flat_map(|row| row.iter().copied())
            .collect()
    }
}

//! Terrain coloring: RGBA texels, height-keyed color gradients, and the texture
//! extractor that paints a height field through a gradient.

mod color;
mod error;
mod gradient;
mod texture;

pub use color::Rgba8;
pub use error::{GradientError, TextureError};
pub use gradient::{BlendMode, ColorGradient, ColorKey};
pub use texture::{TextureImage, fill_texture, texel_world_position};

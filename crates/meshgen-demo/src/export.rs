//! Writes a filled chunk to disk: raw vertex and index buffers plus a PNG.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use meshgen_chunk::{ChunkError, Rgba8, TerrainVertex, TextureImage};

pub const VERTICES_FILE: &str = "vertices.bin";
pub const INDICES_FILE: &str = "indices.bin";
pub const TEXTURE_FILE: &str = "texture.png";

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to encode {path}: {source}")]
    Png {
        path: PathBuf,
        source: png::EncodingError,
    },
}

/// Write the three chunk files into `dir`, creating it if needed.
/// Returns the paths written.
pub fn write_chunk(
    dir: &Path,
    vertices: &[TerrainVertex],
    indices: &[u32],
    texels: &[Rgba8],
    width: u32,
    height: u32,
) -> Result<Vec<PathBuf>, DemoError> {
    fs::create_dir_all(dir).map_err(|source| DemoError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let vertex_path = dir.join(VERTICES_FILE);
    write_bytes(&vertex_path, bytemuck::cast_slice(vertices))?;
    let index_path = dir.join(INDICES_FILE);
    write_bytes(&index_path, bytemuck::cast_slice(indices))?;

    let texture_path = dir.join(TEXTURE_FILE);
    let image = TextureImage {
        width,
        height,
        texels: texels.to_vec(),
    };
    write_png(&texture_path, &image)?;

    Ok(vec![vertex_path, index_path, texture_path])
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), DemoError> {
    fs::write(path, bytes).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_png(path: &Path, image: &TextureImage) -> Result<(), DemoError> {
    let file = File::create(path).map_err(|source| DemoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let encode_err = |source: png::EncodingError| DemoError::Png {
        path: path.to_path_buf(),
        source,
    };

    let mut encoder = png::Encoder::new(BufWriter::new(file), image.width, image.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(encode_err)?;
    writer
        .write_image_data(&image.to_top_down_bytes())
        .map_err(encode_err)?;
    writer.finish().map_err(encode_err)
}

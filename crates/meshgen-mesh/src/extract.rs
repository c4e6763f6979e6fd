//! Height-field to grid-mesh extraction.
//!
//! Grid point `(i, j)` (i along x, j along z) sits at chunk-local
//! `(i - N/2, base_height + height, j - N/2)` and is stored at index
//! `j * (N + 1) + i`.

use glam::DVec3;
use meshgen_terrain::HeightField;
use tracing::trace;

use crate::descriptor::GeometryDescriptor;
use crate::error::MeshError;
use crate::vertex::TerrainVertex;

/// Buffer index of grid point `(i, j)` in a chunk of side `side_length`.
#[inline]
pub fn vertex_index(i: u32, j: u32, side_length: u32) -> u32 {
    j * (side_length + 1) + i
}

/// Fill caller-owned vertex and index buffers for a chunk of side `side_length`.
///
/// `base_height` lifts every vertex without changing normals or tangents.
/// Both buffers must match the [`GeometryDescriptor`] counts exactly. On any
/// error neither buffer is written.
///
/// # Errors
///
/// Returns [`MeshError`] for an invalid side length, mismatched buffer lengths,
/// or a failed scratch allocation.
pub fn extract_grid_mesh<H: HeightField + ?Sized>(
    field: &H,
    side_length: u32,
    base_height: f64,
    vertices: &mut [TerrainVertex],
    indices: &mut [u32],
) -> Result<(), MeshError> {
    let desc = GeometryDescriptor::for_side_length(side_length)?;
    if vertices.len() != desc.vertex_count {
        return Err(MeshError::VertexBufferLength {
            expected: desc.vertex_count,
            actual: vertices.len(),
        });
    }
    if indices.len() != desc.index_count() {
        return Err(MeshError::IndexBufferLength {
            expected: desc.index_count(),
            actual: indices.len(),
        });
    }

    let heights = sample_heights(field, side_length, desc.vertex_count)?;
    write_vertices(&heights, side_length, base_height, vertices);
    write_indices(side_length, indices);

    trace!(side_length, vertices = desc.vertex_count, "grid mesh extracted");
    Ok(())
}

fn sample_heights<H: HeightField + ?Sized>(
    field: &H,
    side_length: u32,
    count: usize,
) -> Result<Vec<f64>, MeshError> {
    let mut heights = Vec::new();
    heights.try_reserve_exact(count)?;
    let half = f64::from(side_length) * 0.5;
    for j in 0..=side_length {
        let z = f64::from(j) - half;
        for i in 0..=side_length {
            heights.push(field.height(f64::from(i) - half, z));
        }
    }
    Ok(heights)
}

fn write_vertices(
    heights: &[f64],
    side_length: u32,
    base_height: f64,
    vertices: &mut [TerrainVertex],
) {
    let n = side_length as usize;
    let row = n + 1;
    let half = f64::from(side_length) * 0.5;
    let nf = f64::from(side_length);
    let h = |i: usize, j: usize| heights[j * row + i];

    for j in 0..=n {
        for i in 0..=n {
            // Central differences inside, one-sided on the border (grid spacing 1).
            let (il, ir) = (i.saturating_sub(1), (i + 1).min(n));
            let (jl, jr) = (j.saturating_sub(1), (j + 1).min(n));
            let dhdx = (h(ir, j) - h(il, j)) / (ir - il) as f64;
            let dhdz = (h(i, jr) - h(i, jl)) / (jr - jl) as f64;

            let along_x = DVec3::new(1.0, dhdx, 0.0);
            let along_z = DVec3::new(0.0, dhdz, 1.0);
            let normal = along_z.cross(along_x).normalize_or(DVec3::Y);

            let tangent = (along_x - normal * normal.dot(along_x)).normalize_or(DVec3::X);
            let handedness = if normal.cross(tangent).dot(along_z) >= 0.0 {
                1.0
            } else {
                -1.0
            };

            let (fi, fj) = (i as f64, j as f64);
            vertices[j * row + i] = TerrainVertex {
                position: [
                    (fi - half) as f32,
                    (base_height + h(i, j)) as f32,
                    (fj - half) as f32,
                ],
                normal: normal.as_vec3().to_array(),
                tangent: [
                    tangent.x as f32,
                    tangent.y as f32,
                    tangent.z as f32,
                    handedness,
                ],
                uv: [(fi / nf) as f32, (fj / nf) as f32],
            };
        }
    }
}

fn write_indices(side_length: u32, indices: &mut [u32]) {
    let mut quads = indices.chunks_exact_mut(6);
    for j in 0..side_length {
        for i in 0..side_length {
            let a = vertex_index(i, j, side_length);
            let b = vertex_index(i, j + 1, side_length);
            let c = vertex_index(i + 1, j, side_length);
            let d = vertex_index(i + 1, j + 1, side_length);
            if let Some(quad) = quads.next() {
                quad.copy_from_slice(&[a, b, c, d, c, b]);
            }
        }
    }
}

/// A chunk mesh in owned buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct GridMesh {
    pub side_length: u32,
    pub vertices: Vec<TerrainVertex>,
    pub indices: Vec<u32>,
}

impl GridMesh {
    /// Allocate buffers from the descriptor and extract into them.
    ///
    /// # Errors
    ///
    /// See [`extract_grid_mesh`].
    pub fn generate<H: HeightField + ?Sized>(
        field: &H,
        side_length: u32,
        base_height: f64,
    ) -> Result<Self, MeshError> {
        let desc = GeometryDescriptor::for_side_length(side_length)?;
        let mut vertices = Vec::new();
        vertices.try_reserve_exact(desc.vertex_count)?;
        vertices.resize(desc.vertex_count, TerrainVertex::default());
        let mut indices = Vec::new();
        indices.try_reserve_exact(desc.index_count())?;
        indices.resize(desc.index_count(), 0);

        extract_grid_mesh(field, side_length, base_height, &mut vertices, &mut indices)?;
        Ok(Self {
            side_length,
            vertices,
            indices,
        })
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

//! Buffer sizing for a square chunk grid.

use crate::error::MeshError;
use crate::vertex::TerrainVertex;

const BYTE_LIMIT: u64 = i32::MAX as u64;

/// Element counts for a chunk of side length `N`.
///
/// - vertices: `(N+1)²`
/// - edges: `2N + 3N²` (grid lines plus one diagonal per cell)
/// - faces: `2N²` triangles, `6N²` indices
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeometryDescriptor {
    pub side_length: u32,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub face_count: usize,
}

impl GeometryDescriptor {
    /// Compute the counts for `side_length`, rejecting grids whose vertex, edge
    /// or face buffers would reach `i32::MAX` bytes.
    ///
    /// # Errors
    ///
    /// [`MeshError::ZeroSideLength`] or [`MeshError::TooLarge`].
    pub fn for_side_length(side_length: u32) -> Result<Self, MeshError> {
        if side_length == 0 {
            return Err(MeshError::ZeroSideLength);
        }
        let n = u64::from(side_length);
        let n_sq = n.saturating_mul(n);
        let vertices = (n + 1).saturating_mul(n + 1);
        let edges = n_sq.saturating_mul(3).saturating_add(2 * n);
        let faces = n_sq.saturating_mul(2);

        check_bytes("vertex", vertices, TerrainVertex::STRIDE as u64)?;
        check_bytes("edge", edges, 2 * 4)?;
        check_bytes("face", faces, 3 * 4)?;

        // All three are below i32::MAX, so they fit in usize on every target.
        Ok(Self {
            side_length,
            vertex_count: vertices as usize,
            edge_count: edges as usize,
            face_count: faces as usize,
        })
    }

    /// Entries in the triangle-list index buffer.
    pub fn index_count(&self) -> usize {
        self.face_count * 3
    }

    pub fn vertex_bytes(&self) -> usize {
        self.vertex_count * TerrainVertex::STRIDE
    }

    pub fn index_bytes(&self) -> usize {
        self.index_count() * std::mem::size_of::<u32>()
    }
}

fn check_bytes(buffer: &'static str, count: u64, element_size: u64) -> Result<(), MeshError> {
    let bytes = count.saturating_mul(element_size);
    if bytes >= BYTE_LIMIT {
        return Err(MeshError::TooLarge { buffer, bytes });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_for_small_grids() {
        for n in 1..=64u32 {
            let d = GeometryDescriptor::for_side_length(n).unwrap();
            let n = n as usize;
            assert_eq!(d.vertex_count, (n + 1) * (n + 1));
            assert_eq!(d.index_count(), n * n * 6);
            assert_eq!(d.face_count * 3, n * n * 6);
            assert_eq!(d.edge_count, 2 * n + 3 * n * n);
        }
    }

    #[test]
    fn test_two_by_two() {
        let d = GeometryDescriptor::for_side_length(2).unwrap();
        assert_eq!(d.vertex_count, 9);
        assert_eq!(d.edge_count, 16);
        assert_eq!(d.face_count, 8);
        assert_eq!(d.index_count(), 24);
        assert_eq!(d.vertex_bytes(), 9 * 48);
        assert_eq!(d.index_bytes(), 24 * 4);
    }

    #[test]
    fn test_zero_rejected() {
        assert!(matches!(
            GeometryDescriptor::for_side_length(0),
            Err(MeshError::ZeroSideLength)
        ));
    }

    #[test]
    fn test_oversized_vertex_buffer_rejected() {
        // (N+1)² * 48 reaches i32::MAX at N = 6688.
        assert!(GeometryDescriptor::for_side_length(6687).is_ok());
        assert!(GeometryDescriptor::for_side_length(6688).is_err());
        match GeometryDescriptor::for_side_length(7000) {
            Err(MeshError::TooLarge { buffer, bytes }) => {
                assert_eq!(buffer, "vertex");
                assert!(bytes >= i32::MAX as u64);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
        assert!(GeometryDescriptor::for_side_length(u32::MAX).is_err());
    }
}

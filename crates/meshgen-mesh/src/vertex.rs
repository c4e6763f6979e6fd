//! Host-facing vertex layout.

/// One terrain vertex, 48 bytes, no padding.
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..24]` normal `[f32; 3]`, unit length
///   - `[24..40]` tangent `[f32; 4]`, `w` is the bitangent sign
///   - `[40..48]` uv `[f32; 2]` in `[0, 1]`
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 4],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 48]);

impl TerrainVertex {
    /// Size of one vertex in bytes.
    pub const STRIDE: usize = std::mem::size_of::<Self>();
}

//! C ABI for terrain chunk generation.
//!
//! Sessions live in a process-wide registry keyed by non-zero `u64` handles.
//! Every buffer crosses the boundary as a pointer plus an element count, and the
//! count must equal what the session expects. Calls never unwind into the host:
//! panics are caught and reported as [`MeshgenStatus::Panic`]. On any failure
//! the message is available from [`meshgen_last_error_message`] on the same
//! thread.
//!
//! Typical host sequence:
//!
//! 1. `meshgen_create_chunk_generator`
//! 2. `meshgen_set_noise`, `meshgen_set_color_gradient` (optional)
//! 3. `meshgen_describe_geometry` and `meshgen_describe_texture`, then allocate
//! 4. `meshgen_fill_chunk` once per frame with the current world offset
//! 5. `meshgen_destroy_chunk_generator`

mod registry;
mod status;

use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};

use meshgen_chunk::{
    BiasParameters, BlendMode, ColorGradient, ColorKey, DVec3, NoiseBasis, NoiseParameters, Rgba8,
    TerrainVertex,
};
use tracing::warn;

use crate::registry::{insert, remove, with_generator};
use crate::status::{FfiError, clear_last_error, last_error_ptr, set_last_error};

pub use crate::status::{MeshgenStatus, last_error_message};

/// Opaque session identifier. Zero is never a valid handle.
pub type MeshgenHandle = u64;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshgenVec2 {
    pub x: f64,
    pub y: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshgenVec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeshgenColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
    /// Normalized height in `[0, 1]`.
    pub time: f64,
}

/// Element counts reported by [`meshgen_describe_geometry`].
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshgenGeometry {
    pub vertex_count: u64,
    pub edge_count: u64,
    pub face_count: u64,
    /// `face_count * 3`, the length of the index buffer.
    pub index_count: u64,
}

impl From<MeshgenVec3> for DVec3 {
    fn from(v: MeshgenVec3) -> Self {
        DVec3::new(v.x, v.y, v.z)
    }
}

/// Run a boundary call: catch panics, record the error message, map to a status.
fn guard(call: impl FnOnce() -> Result<(), FfiError>) -> MeshgenStatus {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => {
            clear_last_error();
            MeshgenStatus::Ok
        }
        Ok(Err(err)) => {
            let status = err.status();
            warn!(?status, "{err}");
            set_last_error(&err.to_string());
            status
        }
        Err(_) => {
            set_last_error("internal panic while generating terrain");
            MeshgenStatus::Panic
        }
    }
}

/// Borrow a caller-owned buffer as a slice.
///
/// # Safety
///
/// `ptr` must be valid for reads and writes of `len` elements of `T` for the
/// duration of the call, and must not alias any other buffer passed alongside.
unsafe fn buffer_mut<'a, T>(
    ptr: *mut T,
    len: usize,
    name: &'static str,
) -> Result<&'a mut [T], FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer(name));
    }
    if !ptr.is_aligned() {
        return Err(FfiError::Misaligned(name));
    }
    // SAFETY: non-null and aligned; validity for `len` elements is the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

/// Borrow a caller-owned read-only array.
///
/// # Safety
///
/// `ptr` must be valid for reads of `len` elements of `T` for the duration of
/// the call.
unsafe fn buffer<'a, T>(ptr: *const T, len: usize, name: &'static str) -> Result<&'a [T], FfiError> {
    if ptr.is_null() {
        return Err(FfiError::NullPointer(name));
    }
    if !ptr.is_aligned() {
        return Err(FfiError::Misaligned(name));
    }
    // SAFETY: non-null and aligned; validity for `len` elements is the caller's contract.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

unsafe fn out_param<'a, T>(ptr: *mut T, name: &'static str) -> Result<&'a mut T, FfiError> {
    if !ptr.is_aligned() {
        return Err(FfiError::Misaligned(name));
    }
    // SAFETY: aligned; a non-null pointer to writable `T` is the caller's contract.
    unsafe { ptr.as_mut() }.ok_or(FfiError::NullPointer(name))
}

/// Create a session. Returns `0` on failure.
#[unsafe(no_mangle)]
pub extern "C" fn meshgen_create_chunk_generator(
    side_length: u32,
    height_scale: f64,
) -> MeshgenHandle {
    let mut handle = 0;
    guard(|| {
        let generator = meshgen_chunk::ChunkGenerator::create(side_length, height_scale)?;
        handle = insert(generator);
        Ok(())
    });
    handle
}

/// Change the side length and height scale. A new side length requires a
/// fresh [`meshgen_describe_geometry`] before the next fill.
#[unsafe(no_mangle)]
pub extern "C" fn meshgen_set_dimensions(
    handle: MeshgenHandle,
    side_length: u32,
    height_scale: f64,
) -> MeshgenStatus {
    guard(|| with_generator(handle, |g| g.set_dimensions(side_length, height_scale)))
}

/// Fix the texture resolution independently of the side length.
#[unsafe(no_mangle)]
pub extern "C" fn meshgen_set_texture_size(
    handle: MeshgenHandle,
    width: u32,
    height: u32,
) -> MeshgenStatus {
    guard(|| with_generator(handle, |g| g.set_texture_size(width, height)))
}

/// Replace noise and bias parameters. The noise basis and warp set through
/// [`meshgen_set_noise_basis`] are kept.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn meshgen_set_noise(
    handle: MeshgenHandle,
    seed: u32,
    octaves: u32,
    scale: f64,
    persistence: f64,
    lacunarity: f64,
    displacement: f64,
    bias_gain: f64,
    bias_from: MeshgenVec2,
    bias_to: MeshgenVec2,
    bias_control: f64,
) -> MeshgenStatus {
    guard(|| {
        with_generator(handle, |g| {
            let current = g.noise_parameters();
            let noise = NoiseParameters {
                seed,
                octaves,
                scale,
                persistence,
                lacunarity,
                warp: current.warp,
                basis: current.basis,
            };
            let bias = BiasParameters {
                from: [bias_from.x, bias_from.y],
                to: [bias_to.x, bias_to.y],
                gain: bias_gain,
                control: bias_control,
                displacement,
            };
            g.set_noise(noise, bias)
        })
    })
}

/// Select the noise basis (`0` flat, `1` Perlin, `2` Simplex, `3` Worley) and
/// domain-warp strength. Unknown basis values are a configuration error.
#[unsafe(no_mangle)]
pub extern "C" fn meshgen_set_noise_basis(
    handle: MeshgenHandle,
    basis: i32,
    warp: f64,
) -> MeshgenStatus {
    guard(|| {
        let basis = match basis {
            0 => NoiseBasis::Flat,
            1 => NoiseBasis::Perlin,
            2 => NoiseBasis::Simplex,
            3 => NoiseBasis::Worley,
            other => {
                return Err(FfiError::InvalidBasis(other));
            }
        };
        with_generator(handle, |g| {
            let noise = NoiseParameters {
                basis,
                warp,
                ..g.noise_parameters().clone()
            };
            let bias = g.bias_parameters().clone();
            g.set_noise(noise, bias)
        })
    })
}

/// Replace the color gradient.
///
/// # Safety
///
/// `keys` must point to `key_count` readable [`MeshgenColorKey`] values.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn meshgen_set_color_gradient(
    handle: MeshgenHandle,
    keys: *const MeshgenColorKey,
    key_count: usize,
    linear_blend: bool,
) -> MeshgenStatus {
    guard(|| {
        // SAFETY: forwarded caller contract.
        let keys = unsafe { buffer(keys, key_count, "keys") }?;
        let keys = keys
            .iter()
            .map(|k| ColorKey::new(Rgba8::new(k.r, k.g, k.b, k.a), k.time))
            .collect();
        let mode = if linear_blend {
            BlendMode::Linear
        } else {
            BlendMode::Stepped
        };
        let gradient = ColorGradient::new(keys, mode).map_err(meshgen_chunk::ChunkError::from)?;
        with_generator(handle, |g| {
            g.set_gradient(gradient);
            Ok(())
        })
    })
}

/// Report buffer counts for the current side length.
///
/// # Safety
///
/// `out` must point to a writable [`MeshgenGeometry`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn meshgen_describe_geometry(
    handle: MeshgenHandle,
    out: *mut MeshgenGeometry,
) -> MeshgenStatus {
    guard(|| {
        // SAFETY: forwarded caller contract.
        let out = unsafe { out_param(out, "out") }?;
        let desc = with_generator(handle, |g| g.describe_geometry())?;
        *out = MeshgenGeometry {
            vertex_count: desc.vertex_count as u64,
            edge_count: desc.edge_count as u64,
            face_count: desc.face_count as u64,
            index_count: desc.index_count() as u64,
        };
        Ok(())
    })
}

/// Report the texture size expected by the fill calls.
///
/// # Safety
///
/// `out_width` and `out_height` must point to writable `u32`s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn meshgen_describe_texture(
    handle: MeshgenHandle,
    out_width: *mut u32,
    out_height: *mut u32,
) -> MeshgenStatus {
    guard(|| {
        // SAFETY: forwarded caller contract.
        let out_width = unsafe { out_param(out_width, "out_width") }?;
        // SAFETY: forwarded caller contract.
        let out_height = unsafe { out_param(out_height, "out_height") }?;
        let (width, height) = with_generator(handle, |g| Ok(g.describe_texture()))?;
        *out_width = width;
        *out_height = height;
        Ok(())
    })
}

/// Fill caller-owned vertex, index and texel buffers for the chunk at `offset`.
///
/// Vertices use the 48-byte [`TerrainVertex`] layout; texels are RGBA8,
/// row 0 at minimum z.
///
/// # Safety
///
/// Each pointer must be valid for writes of its paired count, and the three
/// buffers must not overlap.
#[unsafe(no_mangle)]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn meshgen_fill_chunk(
    handle: MeshgenHandle,
    vertices: *mut TerrainVertex,
    vertex_count: usize,
    indices: *mut u32,
    index_count: usize,
    texels: *mut Rgba8,
    texel_count: usize,
    offset: MeshgenVec3,
) -> MeshgenStatus {
    guard(|| {
        // SAFETY: forwarded caller contract.
        let vertices = unsafe { buffer_mut(vertices, vertex_count, "vertices") }?;
        // SAFETY: forwarded caller contract.
        let indices = unsafe { buffer_mut(indices, index_count, "indices") }?;
        // SAFETY: forwarded caller contract.
        let texels = unsafe { buffer_mut(texels, texel_count, "texels") }?;
        with_generator(handle, |g| g.fill(vertices, indices, texels, offset.into()))
    })
}

/// Fill only the texture buffer.
///
/// # Safety
///
/// `texels` must be valid for writes of `texel_count` RGBA8 texels.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn meshgen_fill_texture(
    handle: MeshgenHandle,
    texels: *mut Rgba8,
    texel_count: usize,
    offset: MeshgenVec3,
) -> MeshgenStatus {
    guard(|| {
        // SAFETY: forwarded caller contract.
        let texels = unsafe { buffer_mut(texels, texel_count, "texels") }?;
        with_generator(handle, |g| g.fill_texture(texels, offset.into()))
    })
}

/// Destroy a session. Destroying an unknown handle reports `InvalidHandle`.
#[unsafe(no_mangle)]
pub extern "C" fn meshgen_destroy_chunk_generator(handle: MeshgenHandle) -> MeshgenStatus {
    guard(|| remove(handle))
}

/// Message for the last failed call on this thread, or an empty string.
///
/// The pointer stays valid until the next `meshgen_*` call on the same thread.
#[unsafe(no_mangle)]
pub extern "C" fn meshgen_last_error_message() -> *const c_char {
    last_error_ptr()
}

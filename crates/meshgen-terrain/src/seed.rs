//! Deterministic per-octave seed derivation.
//!
//! Every random quantity used by the noise field is drawn from a ChaCha8 stream
//! seeded by the user seed, so identical parameters produce bit-identical
//! terrain on every platform and in every process.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::noise_field::MAX_OCTAVES;

/// Half-open range each octave offset component is drawn from.
pub const OCTAVE_OFFSET_RANGE: (f64, f64) = (-100_000.0, 100_000.0);

/// Seed material for one noise field.
#[derive(Clone, Debug, PartialEq)]
pub struct OctaveSeeds {
    /// Seed handed to the gradient-noise basis.
    pub basis_seed: u32,
    /// Sampling offset per octave, always [`MAX_OCTAVES`] long.
    pub octave_offsets: Vec<DVec2>,
    /// Offsets for the two domain-warp lookups (x and z).
    pub warp_offsets: [DVec2; 2],
}

impl OctaveSeeds {
    /// Derive the seed material for `seed`.
    ///
    /// Offsets are drawn for all octaves regardless of how many are active, so
    /// raising the octave count never reshuffles the lower octaves.
    pub fn derive(seed: u32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));
        let basis_seed = rng.random::<u32>();
        let octave_offsets = (0..MAX_OCTAVES).map(|_| draw_offset(&mut rng)).collect();
        let warp_offsets = [draw_offset(&mut rng), draw_offset(&mut rng)];
        Self {
            basis_seed,
            octave_offsets,
            warp_offsets,
        }
    }
}

fn draw_offset(rng: &mut ChaCha8Rng) -> DVec2 {
    let (lo, hi) = OCTAVE_OFFSET_RANGE;
    DVec2::new(rng.random_range(lo..hi), rng.random_range(lo..hi))
}

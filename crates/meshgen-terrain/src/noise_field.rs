//! Multi-octave fractal noise over the horizontal plane.
//!
//! Each octave samples a gradient-noise basis at `coord / scale * lacunarity^i`
//! plus a seeded offset, remaps it from `[-1, 1]` to `[0, 1]`, and weights it by
//! `persistence^i`. The weighted sum is divided by the amplitude sum, so the
//! field is bounded to `[0, 1]` for every parameter set.

use noise::core::worley::{ReturnType, distance_functions, worley_2d};
use noise::permutationtable::PermutationTable;
use noise::{NoiseFn, Perlin, Simplex};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ParameterError, ensure_finite};
use crate::seed::OctaveSeeds;

/// Highest octave count a field accepts; larger requests are clamped.
pub const MAX_OCTAVES: u32 = 8;

/// The single-octave noise function the fractal sum is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseBasis {
    /// Constant zero field. Produces a flat plane.
    Flat,
    /// Classic Perlin gradient noise.
    #[default]
    Perlin,
    /// OpenSimplex-style gradient noise.
    Simplex,
    /// Cellular (Worley) noise, cell-value mode.
    Worley,
}

/// Configuration for multi-octave fractal noise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParameters {
    /// Seed for every random quantity in the field.
    pub seed: u32,
    /// Number of octaves, clamped to `0..=MAX_OCTAVES`. Zero yields a flat field.
    pub octaves: u32,
    /// World units per noise unit at the first octave. Must be positive.
    pub scale: f64,
    /// Amplitude multiplier between successive octaves, clamped to `[0, 1]`.
    pub persistence: f64,
    /// Frequency multiplier between successive octaves, clamped to `>= 1`.
    pub lacunarity: f64,
    /// Domain-warp strength in noise units. Values `<= 0` disable warping.
    pub warp: f64,
    /// Single-octave basis function.
    pub basis: NoiseBasis,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 3,
            scale: 50.0,
            persistence: 0.5,
            lacunarity: 2.0,
            warp: 0.0,
            basis: NoiseBasis::Perlin,
        }
    }
}

impl NoiseParameters {
    /// Creates parameters with the given seed and defaults for everything else.
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// A constant-zero configuration.
    pub fn flat() -> Self {
        Self {
            basis: NoiseBasis::Flat,
            ..Default::default()
        }
    }

    /// Returns a copy with every clampable field brought into range.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::NonPositiveScale`] for `scale <= 0` and
    /// [`ParameterError::NonFinite`] for NaN or infinite inputs. These cannot be
    /// clamped meaningfully.
    pub fn sanitized(&self) -> Result<Self, ParameterError> {
        let scale = ensure_finite("scale", self.scale)?;
        if scale <= 0.0 {
            return Err(ParameterError::NonPositiveScale(scale));
        }
        let persistence = ensure_finite("persistence", self.persistence)?;
        let lacunarity = ensure_finite("lacunarity", self.lacunarity)?;
        let warp = ensure_finite("warp", self.warp)?;

        let mut out = self.clone();
        if self.octaves > MAX_OCTAVES {
            warn!(requested = self.octaves, "octave count clamped to {MAX_OCTAVES}");
            out.octaves = MAX_OCTAVES;
        }
        if !(0.0..=1.0).contains(&persistence) {
            warn!(requested = persistence, "persistence clamped to [0, 1]");
            out.persistence = persistence.clamp(0.0, 1.0);
        }
        if lacunarity < 1.0 {
            warn!(requested = lacunarity, "lacunarity clamped to 1");
            out.lacunarity = 1.0;
        }
        out.warp = warp.max(0.0);
        Ok(out)
    }
}

// Worley goes through the core function: the `noise::Worley` wrapper holds an
// `Rc` and would make the field `!Send`.
enum Basis {
    Flat,
    Perlin(Perlin),
    Simplex(Simplex),
    Worley(PermutationTable),
}

impl Basis {
    fn new(kind: NoiseBasis, seed: u32) -> Self {
        match kind {
            NoiseBasis::Flat => Basis::Flat,
            NoiseBasis::Perlin => Basis::Perlin(Perlin::new(seed)),
            NoiseBasis::Simplex => Basis::Simplex(Simplex::new(seed)),
            NoiseBasis::Worley => Basis::Worley(PermutationTable::new(seed)),
        }
    }

    #[inline]
    fn get(&self, point: [f64; 2]) -> f64 {
        match self {
            Basis::Flat => 0.0,
            Basis::Perlin(n) => n.get(point),
            Basis::Simplex(n) => n.get(point),
            Basis::Worley(table) => worley_2d(
                table,
                distance_functions::euclidean,
                ReturnType::Value,
                point.into(),
            ),
        }
    }
}

/// Deterministic 2D fractal noise field with output in `[0, 1]`.
pub struct NoiseField {
    basis: Basis,
    params: NoiseParameters,
    seeds: OctaveSeeds,
    frequencies: Vec<f64>,
    amplitudes: Vec<f64>,
    amplitude_sum: f64,
}

impl NoiseField {
    /// Build a field from (sanitized) parameters.
    ///
    /// # Errors
    ///
    /// Propagates [`NoiseParameters::sanitized`] failures.
    pub fn new(params: NoiseParameters) -> Result<Self, ParameterError> {
        let params = params.sanitized()?;
        let seeds = OctaveSeeds::derive(params.seed);
        // libm keeps the per-octave weights identical across platforms.
        let frequencies: Vec<f64> = (0..params.octaves)
            .map(|i| libm::pow(params.lacunarity, f64::from(i)))
            .collect();
        let amplitudes: Vec<f64> = (0..params.octaves)
            .map(|i| libm::pow(params.persistence, f64::from(i)))
            .collect();
        let amplitude_sum = amplitudes.iter().sum();

        Ok(Self {
            basis: Basis::new(params.basis, seeds.basis_seed),
            params,
            seeds,
            frequencies,
            amplitudes,
            amplitude_sum,
        })
    }

    /// Sample the field at a world-space column.
    ///
    /// Pure and deterministic. Returns `0.0` for a flat basis or zero octaves.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        if matches!(self.basis, Basis::Flat) || self.amplitude_sum <= 0.0 {
            return 0.0;
        }

        let inv_scale = 1.0 / self.params.scale;
        let warp = self.params.warp;
        let [warp_x, warp_z] = self.seeds.warp_offsets;

        let mut total = 0.0;
        for (i, (&frequency, &amplitude)) in
            self.frequencies.iter().zip(&self.amplitudes).enumerate()
        {
            let offset = self.seeds.octave_offsets[i];
            let mut sx = x * inv_scale * frequency + offset.x;
            let mut sz = z * inv_scale * frequency + offset.y;
            if warp > 0.0 {
                sx += warp * self.basis.get([warp_x.x + sx, warp_x.y + sz]);
                sz += warp * self.basis.get([warp_z.x + sx, warp_z.y + sz]);
            }
            let unit = ((self.basis.get([sx, sz]) + 1.0) * 0.5).clamp(0.0, 1.0);
            total += unit * amplitude;
        }

        total / self.amplitude_sum
    }

    /// Sum of all octave amplitudes (the normalization divisor).
    pub fn amplitude_sum(&self) -> f64 {
        self.amplitude_sum
    }

    /// The sanitized parameters this field was built from.
    pub fn params(&self) -> &NoiseParameters {
        &self.params
    }
}

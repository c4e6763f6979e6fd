//! The single height evaluation path shared by mesh and texture extraction.

use glam::DVec3;

use crate::bias::BiasCurve;
use crate::noise_field::NoiseField;

/// A horizontal-plane elevation function.
///
/// Coordinates are chunk-local; implementors apply their own world offset.
pub trait HeightField {
    /// Elevation in world units at the chunk-local column `(x, z)`.
    fn height(&self, x: f64, z: f64) -> f64;

    /// Elevation normalized to `[0, 1]`, independent of any height scale.
    fn normalized(&self, x: f64, z: f64) -> f64;
}

/// Noise, bias and height scale composed into one sampler.
///
/// `height(x, z) = height_scale * bias(noise(x + offset.x, z + offset.z))`.
pub struct HeightFieldSampler {
    noise: NoiseField,
    bias: BiasCurve,
    height_scale: f64,
    offset: DVec3,
}

impl HeightFieldSampler {
    /// Compose a sampler with a zero world offset.
    pub fn new(noise: NoiseField, bias: BiasCurve, height_scale: f64) -> Self {
        Self {
            noise,
            bias,
            height_scale,
            offset: DVec3::ZERO,
        }
    }

    /// Translate the sampling domain. Only `x` and `z` are used.
    pub fn set_offset(&mut self, offset: DVec3) {
        self.offset = offset;
    }

    pub fn offset(&self) -> DVec3 {
        self.offset
    }

    pub fn height_scale(&self) -> f64 {
        self.height_scale
    }

    pub fn set_height_scale(&mut self, height_scale: f64) {
        self.height_scale = height_scale;
    }
}

impl HeightField for HeightFieldSampler {
    #[inline]
    fn height(&self, x: f64, z: f64) -> f64 {
        self.height_scale * self.normalized(x, z)
    }

    #[inline]
    fn normalized(&self, x: f64, z: f64) -> f64 {
        let n = self.noise.sample(x + self.offset.x, z + self.offset.z);
        self.bias.bias(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BiasParameters, NoiseParameters};

    fn sampler(seed: u32, height_scale: f64) -> HeightFieldSampler {
        HeightFieldSampler::new(
            NoiseField::new(NoiseParameters::with_seed(seed)).unwrap(),
            BiasCurve::new(BiasParameters::default()).unwrap(),
            height_scale,
        )
    }

    #[test]
    fn test_sampler_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HeightFieldSampler>();
    }

    #[test]
    fn test_height_within_scale() {
        let s = sampler(11, 50.0);
        for i in 0..400 {
            let (x, z) = (i as f64 * 1.7, i as f64 * -2.3);
            let h = s.height(x, z);
            assert!((0.0..=50.0).contains(&h), "height {h} outside [0, 50]");
        }
    }

    #[test]
    fn test_height_is_scaled_normalized() {
        let s = sampler(4, 20.0);
        let (x, z) = (13.5, -7.25);
        assert_eq!(s.height(x, z), 20.0 * s.normalized(x, z));
    }

    #[test]
    fn test_offset_shifts_sampling_domain() {
        let base = sampler(9, 10.0);
        let mut shifted = sampler(9, 10.0);
        shifted.set_offset(DVec3::new(32.0, 1000.0, -16.0));
        for i in 0..20 {
            let x = i as f64;
            assert_eq!(
                shifted.height(x, 3.0).to_bits(),
                base.height(x + 32.0, 3.0 - 16.0).to_bits()
            );
        }
    }

    #[test]
    fn test_adjacent_chunks_share_edge() {
        let n = 16.0;
        let mut left = sampler(21, 30.0);
        let mut right = sampler(21, 30.0);
        left.set_offset(DVec3::ZERO);
        right.set_offset(DVec3::new(n, 0.0, 0.0));
        for j in 0..=16 {
            let z = j as f64 - n / 2.0;
            assert_eq!(
                left.height(n / 2.0, z).to_bits(),
                right.height(-n / 2.0, z).to_bits(),
                "edge mismatch at z={z}"
            );
        }
    }

    #[test]
    fn test_continuity_bounded_by_step() {
        let s = sampler(3, 40.0);
        let step = 0.001;
        for i in 0..2000 {
            let x = i as f64 * 0.05;
            let dh = (s.height(x + step, 2.0) - s.height(x, 2.0)).abs();
            assert!(dh < 1.0, "jump of {dh} over {step} at x={x}");
        }
    }
}

//! Color gradients keyed by normalized height.

use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::error::GradientError;

/// A color pinned to a normalized height.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorKey {
    pub color: Rgba8,
    /// Position in `[0, 1]`.
    pub time: f64,
}

impl ColorKey {
    pub const fn new(color: Rgba8, time: f64) -> Self {
        Self { color, time }
    }
}

/// How colors between keys are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlendMode {
    /// Hold each key's color until the next key.
    Stepped,
    /// Interpolate channels between bracketing keys.
    #[default]
    Linear,
}

/// An ordered, non-empty list of color keys.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorGradient {
    keys: Vec<ColorKey>,
    mode: BlendMode,
}

impl ColorGradient {
    /// Build a gradient, sorting keys by time. Keys with equal times keep
    /// their input order.
    ///
    /// # Errors
    ///
    /// Returns [`GradientError::Empty`] for no keys and
    /// [`GradientError::TimeOutOfRange`] for a time outside `[0, 1]` or NaN.
    pub fn new(mut keys: Vec<ColorKey>, mode: BlendMode) -> Result<Self, GradientError> {
        if keys.is_empty() {
            return Err(GradientError::Empty);
        }
        if let Some((index, key)) = keys
            .iter()
            .enumerate()
            .find(|(_, k)| !(0.0..=1.0).contains(&k.time))
        {
            return Err(GradientError::TimeOutOfRange {
                index,
                time: key.time,
            });
        }
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { keys, mode })
    }

    /// Gradient from black at 0 to white at 1.
    pub fn grayscale() -> Self {
        Self {
            keys: vec![
                ColorKey::new(Rgba8::BLACK, 0.0),
                ColorKey::new(Rgba8::WHITE, 1.0),
            ],
            mode: BlendMode::Linear,
        }
    }

    /// Water, beach, grass, rock and snow bands.
    pub fn terrain() -> Self {
        Self {
            keys: vec![
                ColorKey::new(Rgba8::rgb(0, 0, 128), 0.0),
                ColorKey::new(Rgba8::rgb(30, 80, 200), 0.3),
                ColorKey::new(Rgba8::rgb(220, 200, 130), 0.34),
                ColorKey::new(Rgba8::rgb(30, 160, 30), 0.38),
                ColorKey::new(Rgba8::rgb(110, 120, 50), 0.55),
                ColorKey::new(Rgba8::rgb(150, 70, 70), 0.75),
                ColorKey::new(Rgba8::rgb(150, 150, 150), 0.8),
                ColorKey::new(Rgba8::rgb(255, 255, 255), 1.0),
            ],
            mode: BlendMode::Linear,
        }
    }

    pub fn keys(&self) -> &[ColorKey] {
        &self.keys
    }

    pub fn mode(&self) -> BlendMode {
        self.mode
    }

    /// Color at normalized height `t`. NaN samples as `0`.
    pub fn sample(&self, t: f64) -> Rgba8 {
        let t = if t.is_nan() { 0.0 } else { t };
        // Index of the first key strictly above `t`.
        let above = self.keys.partition_point(|k| k.time <= t);

        match self.mode {
            BlendMode::Stepped => self.keys[above.saturating_sub(1)].color,
            BlendMode::Linear => {
                let (first, last) = (&self.keys[0], &self.keys[self.keys.len() - 1]);
                if t <= first.time {
                    return first.color;
                }
                if t >= last.time {
                    return last.color;
                }
                let (k0, k1) = (&self.keys[above - 1], &self.keys[above]);
                let w = (t - k0.time) / (k1.time - k0.time);
                k0.color.lerp(k1.color, w)
            }
        }
    }
}

impl Default for ColorGradient {
    fn default() -> Self {
        Self::terrain()
    }
}

//! Height remapping through a two-point cubic Bezier curve.
//!
//! The curve runs `(0,0) -> from -> to -> (1,1)`. Outside `[from.x, to.x]` it is
//! piecewise linear; between the control points it follows a cubic Bezier whose
//! handles lean toward the corner where the two linear pieces would meet, pulled
//! in by `control`. The curved result is then blended with the identity by
//! `gain` and shifted by `displacement`.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ParameterError, ensure_finite};

const EPSILON: f64 = 1e-9;
const BISECTION_STEPS: u32 = 48;

/// User-facing bias configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasParameters {
    /// Lower control point in normalized `[0,1]²` space.
    pub from: [f64; 2],
    /// Upper control point in normalized `[0,1]²` space.
    pub to: [f64; 2],
    /// Blend toward identity: `0` is the pure curve, `1` is linear.
    pub gain: f64,
    /// How far the Bezier handles reach toward the corner, `[0,1]`.
    pub control: f64,
    /// Additive shift after blending. The result is clamped to `[0,1]`.
    pub displacement: f64,
}

impl Default for BiasParameters {
    fn default() -> Self {
        Self {
            from: [0.4, 0.1],
            to: [0.75, 0.45],
            gain: 0.3,
            control: 0.5,
            displacement: 0.0,
        }
    }
}

impl BiasParameters {
    /// Parameters that leave heights unchanged.
    pub fn identity() -> Self {
        Self {
            gain: 1.0,
            ..Default::default()
        }
    }
}

/// A sanitized, ready-to-evaluate bias curve.
#[derive(Clone, Debug, PartialEq)]
pub struct BiasCurve {
    params: BiasParameters,
    from: DVec2,
    to: DVec2,
    ctrl1: DVec2,
    ctrl2: DVec2,
}

impl BiasCurve {
    /// Build a curve, clamping control points and scalars into range.
    ///
    /// Points are clamped to the unit square and swapped if out of x-order; `to.y`
    /// is raised to `from.y` so the curve never descends.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::NonFinite`] if any input is NaN or infinite.
    pub fn new(params: BiasParameters) -> Result<Self, ParameterError> {
        let mut from = DVec2::new(
            ensure_finite("bias_from.x", params.from[0])?,
            ensure_finite("bias_from.y", params.from[1])?,
        );
        let mut to = DVec2::new(
            ensure_finite("bias_to.x", params.to[0])?,
            ensure_finite("bias_to.y", params.to[1])?,
        );
        let gain = ensure_finite("bias_gain", params.gain)?;
        let control = ensure_finite("bias_control", params.control)?;
        let displacement = ensure_finite("displacement", params.displacement)?;

        let unit = |p: DVec2| p.clamp(DVec2::ZERO, DVec2::ONE);
        if unit(from) != from || unit(to) != to {
            warn!(?from, ?to, "bias control points clamped to the unit square");
            from = unit(from);
            to = unit(to);
        }
        if from.x > to.x {
            std::mem::swap(&mut from, &mut to);
        }
        to.y = to.y.max(from.y);
        if !(0.0..=1.0).contains(&gain) {
            warn!(requested = gain, "bias gain clamped to [0, 1]");
        }
        if !(0.0..=1.0).contains(&control) {
            warn!(requested = control, "bias control clamped to [0, 1]");
        }
        let gain = gain.clamp(0.0, 1.0);
        let control = control.clamp(0.0, 1.0);

        let corner = corner_point(from, to).clamp(from, to);
        let ctrl1 = from.lerp(corner, control);
        let ctrl2 = to.lerp(corner, control);

        Ok(Self {
            params: BiasParameters {
                from: from.to_array(),
                to: to.to_array(),
                gain,
                control,
                displacement,
            },
            from,
            to,
            ctrl1,
            ctrl2,
        })
    }

    /// The sanitized parameters.
    pub fn params(&self) -> &BiasParameters {
        &self.params
    }

    /// Remap a normalized height. Output is in `[0,1]` and non-decreasing in `t`.
    pub fn bias(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let curved = self.curve(t);
        let gain = self.params.gain;
        let blended = gain * t + (1.0 - gain) * curved;
        (blended + self.params.displacement).clamp(0.0, 1.0)
    }

    fn curve(&self, t: f64) -> f64 {
        let (from, to) = (self.from, self.to);
        if t <= from.x {
            return if from.x > EPSILON { t * from.y / from.x } else { from.y };
        }
        if t >= to.x {
            let run = 1.0 - to.x;
            return if run > EPSILON {
                to.y + (t - to.x) * (1.0 - to.y) / run
            } else {
                1.0
            };
        }

        // x(s) is non-decreasing because the handles sit inside the from/to box.
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if self.point(mid).x < t {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        self.point(0.5 * (lo + hi)).y
    }

    fn point(&self, s: f64) -> DVec2 {
        let u = 1.0 - s;
        self.from * (u * u * u)
            + self.ctrl1 * (3.0 * u * u * s)
            + self.ctrl2 * (3.0 * u * s * s)
            + self.to * (s * s * s)
    }
}

/// Intersection of the line through the origin and `from` with the line through
/// `to` and `(1,1)`. Falls back to the midpoint when the lines are parallel.
fn corner_point(from: DVec2, to: DVec2) -> DVec2 {
    let d2 = DVec2::ONE - to;
    let denom = from.perp_dot(d2);
    if denom.abs() < EPSILON {
        return (from + to) * 0.5;
    }
    let a = to.perp_dot(d2) / denom;
    from * a
}

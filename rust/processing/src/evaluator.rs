// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spline curve evaluation
//!
//! Spline entities are sampled through the [`CurveEvaluator`] trait so the
//! importer does not depend on one NURBS implementation.
//! [`DeBoorEvaluator`] is the built-in one.

use cad_rings_core::SplineEntity;
use nalgebra::{Point3, Vector4};

use crate::error::{Error, Result};

/// NURBS curve definition handed to a [`CurveEvaluator`]
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurve {
    pub degree: usize,
    pub control_points: Vec<Point3<f64>>,
    pub knots: Vec<f64>,
    /// One weight per control point
    pub weights: Vec<f64>,
}

impl NurbsCurve {
    /// Non-rational curve: every weight is 1
    pub fn new(degree: usize, control_points: Vec<Point3<f64>>, knots: Vec<f64>) -> Self {
        let weights = vec![1.0; control_points.len()];
        Self {
            degree,
            control_points,
            knots,
            weights,
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = weights;
        self
    }
}

impl From<&SplineEntity> for NurbsCurve {
    fn from(spline: &SplineEntity) -> Self {
        Self {
            degree: spline.degree,
            control_points: spline.control_points.clone(),
            knots: spline.knots.clone(),
            weights: spline.effective_weights(),
        }
    }
}

/// Upper bound on the sample intervals of one evaluated spline
pub const MAX_SPLINE_SAMPLES: usize = 1_000_000;

/// Samples a NURBS curve into an ordered point list
pub trait CurveEvaluator: Send + Sync {
    /// Evaluate the curve at parameters spaced by `delta` (a fraction of the
    /// parameter domain, `0 < delta <= 1`)
    fn evaluate(&self, curve: &NurbsCurve, delta: f64) -> Result<Vec<Point3<f64>>>;
}

/// Rational de Boor evaluation in homogeneous coordinates
///
/// Samples `floor(1 / delta) + 1` parameters evenly over the valid domain
/// `[knots[degree], knots[len - degree - 1]]`, both ends included.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeBoorEvaluator;

impl DeBoorEvaluator {
    fn validate(curve: &NurbsCurve, delta: f64) -> Result<()> {
        let p = curve.degree;
        let n = curve.control_points.len();

        if p == 0 {
            return Err(Error::curve("degree must be at least 1"));
        }
        if n < p + 1 {
            return Err(Error::curve(format!(
                "degree {} needs at least {} control points, got {}",
                p,
                p + 1,
                n
            )));
        }
        if curve.knots.len() != n + p + 1 {
            return Err(Error::curve(format!(
                "expected {} knots for {} control points of degree {}, got {}",
                n + p + 1,
                n,
                p,
                curve.knots.len()
            )));
        }
        if curve.weights.len() != n {
            return Err(Error::curve(format!(
                "expected {} weights, got {}",
                n,
                curve.weights.len()
            )));
        }
        if curve.knots.iter().any(|k| !k.is_finite())
            || curve.knots.windows(2).any(|w| w[1] < w[0])
        {
            return Err(Error::curve("knot vector must be finite and non-decreasing"));
        }
        if curve.weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err(Error::curve("weights must be finite and positive"));
        }
        if curve
            .control_points
            .iter()
            .any(|c| !c.x.is_finite() || !c.y.is_finite() || !c.z.is_finite())
        {
            return Err(Error::curve("control points must be finite"));
        }
        if !(delta > 0.0 && delta <= 1.0) {
            return Err(Error::curve(format!("sampling delta must be in (0, 1], got {}", delta)));
        }
        if (1.0 / delta).floor() > MAX_SPLINE_SAMPLES as f64 {
            return Err(Error::curve(format!(
                "sampling delta {} needs more than {} samples",
                delta, MAX_SPLINE_SAMPLES
            )));
        }
        if curve.knots[n] <= curve.knots[p] {
            return Err(Error::curve("knot vector has an empty parameter domain"));
        }
        Ok(())
    }

    /// Knot span index `k` with `knots[k] <= t < knots[k + 1]`, clamped to
    /// the last span at the end of the domain
    fn find_span(knots: &[f64], degree: usize, count: usize, t: f64) -> usize {
        let last = count - 1;
        if t >= knots[last + 1] {
            return last;
        }
        let mut span = degree;
        while span < last && knots[span + 1] <= t {
            span += 1;
        }
        span
    }

    fn point_at(curve: &NurbsCurve, homogeneous: &[Vector4<f64>], t: f64) -> Point3<f64> {
        let p = curve.degree;
        let knots = &curve.knots;
        let k = Self::find_span(knots, p, homogeneous.len(), t);

        let mut d: Vec<Vector4<f64>> = homogeneous[k - p..=k].to_vec();
        for r in 1..=p {
            for j in (r..=p).rev() {
                let i = j + k - p;
                let denom = knots[i + p + 1 - r] - knots[i];
                let alpha = if denom == 0.0 {
                    0.0
                } else {
                    (t - knots[i]) / denom
                };
                d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
            }
        }

        let pw = d[p];
        Point3::new(pw.x / pw.w, pw.y / pw.w, pw.z / pw.w)
    }
}

impl CurveEvaluator for DeBoorEvaluator {
    fn evaluate(&self, curve: &NurbsCurve, delta: f64) -> Result<Vec<Point3<f64>>> {
        Self::validate(curve, delta)?;

        let homogeneous: Vec<Vector4<f64>> = curve
            .control_points
            .iter()
            .zip(&curve.weights)
            .map(|(c, &w)| Vector4::new(c.x * w, c.y * w, c.z * w, w))
            .collect();

        let p = curve.degree;
        let start = curve.knots[p];
        let end = curve.knots[curve.knots.len() - p - 1];
        let samples = (1.0 / delta).floor() as usize + 1;

        let mut points = Vec::with_capacity(samples);
        for i in 0..samples {
            let t = if i == samples - 1 {
                end
            } else {
                start + (end - start) * (i as f64 / (samples - 1) as f64)
            };
            points.push(Self::point_at(curve, &homogeneous, t));
        }

        Ok(points)
    }
}

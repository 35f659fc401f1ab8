// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circular arc tessellation
//!
//! Arcs are sampled with a fixed maximum angular step. Polyline bulges
//! (tan of a quarter of the included angle, positive = counter-clockwise)
//! are resolved to a center, radius and angle pair first and then sampled
//! the same way.

use std::f64::consts::TAU;

use nalgebra::{Point2, Vector2};

use crate::error::{Error, Result};

/// Upper bound on the increments of a single tessellated arc
pub const MAX_ARC_SEGMENTS: usize = 1_000_000;

/// Sample a circular arc counter-clockwise from `start_angle` to `end_angle`
///
/// Angles are in radians. If `end_angle` is below `start_angle` the sweep
/// is taken modulo a full turn. The sweep is split into `ceil(sweep / step)`
/// equal increments, so the result always holds at least two points and its
/// first and last points sit exactly at the requested angles. Steps that
/// would need more than [`MAX_ARC_SEGMENTS`] increments are rejected.
pub fn arc_points(
    start_angle: f64,
    end_angle: f64,
    radius: f64,
    center: Point2<f64>,
    degrees_per_segment: f64,
) -> Result<Vec<Point2<f64>>> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::invalid(format!("arc radius must be positive, got {}", radius)));
    }
    if !start_angle.is_finite() || !end_angle.is_finite() {
        return Err(Error::invalid("arc angles must be finite"));
    }
    if !center.x.is_finite() || !center.y.is_finite() {
        return Err(Error::invalid("arc center must be finite"));
    }
    if !degrees_per_segment.is_finite() || degrees_per_segment <= 0.0 {
        return Err(Error::invalid(format!(
            "angular step must be positive, got {}",
            degrees_per_segment
        )));
    }

    let mut sweep = end_angle - start_angle;
    if sweep < 0.0 {
        sweep = sweep.rem_euclid(TAU);
    }
    if sweep == 0.0 {
        return Err(Error::invalid("arc start and end angles coincide"));
    }

    let segments = (sweep / degrees_per_segment.to_radians()).ceil().max(1.0);
    if segments > MAX_ARC_SEGMENTS as f64 {
        return Err(Error::invalid(format!(
            "angular step {} splits the arc into more than {} segments",
            degrees_per_segment, MAX_ARC_SEGMENTS
        )));
    }
    let num_segments = segments as usize;
    let mut points = Vec::with_capacity(num_segments + 1);

    for i in 0..=num_segments {
        let angle = if i == num_segments {
            end_angle
        } else {
            start_angle + sweep * (i as f64 / num_segments as f64)
        };
        points.push(Point2::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ));
    }

    Ok(points)
}

/// Circle arc between two polyline vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcParams {
    pub center: Point2<f64>,
    pub radius: f64,
    /// Angle of the first vertex around the center (radians)
    pub start_angle: f64,
    /// Angle of the second vertex around the center (radians)
    pub end_angle: f64,
    /// Travel from first to second vertex is clockwise (negative bulge)
    pub clockwise: bool,
}

impl ArcParams {
    /// Included angle of the arc in radians, in (0, 2π)
    pub fn sweep(&self) -> f64 {
        let (from, to) = if self.clockwise {
            (self.end_angle, self.start_angle)
        } else {
            (self.start_angle, self.end_angle)
        };
        let mut sweep = to - from;
        while sweep <= 0.0 {
            sweep += TAU;
        }
        sweep
    }

    /// Sample the arc in travel order, from the first vertex to the second
    pub fn points(&self, degrees_per_segment: f64) -> Result<Vec<Point2<f64>>> {
        if self.clockwise {
            let mut points = arc_points(
                self.end_angle,
                self.start_angle,
                self.radius,
                self.center,
                degrees_per_segment,
            )?;
            points.reverse();
            Ok(points)
        } else {
            arc_points(
                self.start_angle,
                self.end_angle,
                self.radius,
                self.center,
                degrees_per_segment,
            )
        }
    }
}

/// Resolve the arc encoded by a bulge between `p1` and `p2`
///
/// Included angle is `4·atan(|bulge|)`; with chord `c` the sagitta is
/// `|bulge|·c/2` and the radius `((c/2)² + s²) / 2s`. The center lies on the
/// chord's perpendicular bisector, `r - s` away from the chord midpoint on
/// the side opposite the bulge.
pub fn bulge_arc(p1: Point2<f64>, p2: Point2<f64>, bulge: f64) -> Result<ArcParams> {
    if !bulge.is_finite() {
        return Err(Error::invalid(format!("bulge must be finite, got {}", bulge)));
    }
    if bulge == 0.0 {
        return Err(Error::invalid("zero bulge describes a straight segment"));
    }
    if !p1.x.is_finite() || !p1.y.is_finite() || !p2.x.is_finite() || !p2.y.is_finite() {
        return Err(Error::invalid("bulge endpoints must be finite"));
    }

    let chord = p2 - p1;
    let chord_len = chord.norm();
    if chord_len == 0.0 {
        return Err(Error::invalid(format!(
            "bulge {} between coincident vertices ({}, {})",
            bulge, p1.x, p1.y
        )));
    }

    let half_chord = chord_len / 2.0;
    let sagitta = bulge.abs() * half_chord;
    let radius = (half_chord * half_chord + sagitta * sagitta) / (2.0 * sagitta);

    let midpoint = p1 + chord / 2.0;
    let left = Vector2::new(-chord.y, chord.x) / chord_len;
    let offset = radius - sagitta;

    // Counter-clockwise travel bulges to the right, so its center is on the left
    let center = if bulge > 0.0 {
        midpoint + left * offset
    } else {
        midpoint - left * offset
    };

    Ok(ArcParams {
        center,
        radius,
        start_angle: (p1.y - center.y).atan2(p1.x - center.x),
        end_angle: (p2.y - center.y).atan2(p2.x - center.x),
        clockwise: bulge < 0.0,
    })
}

/// Interior sample points of a bulge arc, in `p1 → p2` order
///
/// The two vertices themselves are excluded since the polyline already
/// holds them. A bulge of exactly 0 is a straight segment and yields no
/// points.
pub fn bulge_points(
    p1: Point2<f64>,
    p2: Point2<f64>,
    bulge: f64,
    degrees_per_segment: f64,
) -> Result<Vec<Point2<f64>>> {
    if bulge == 0.0 {
        return Ok(Vec::new());
    }

    let points = bulge_arc(p1, p2, bulge)?.points(degrees_per_segment)?;
    Ok(points[1..points.len() - 1].to_vec())
}

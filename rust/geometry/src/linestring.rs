// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line strings, rings, polygons and the working geometry collection

use cad_rings_core::DrawingUnit;
use nalgebra::Point2;

use crate::contour::{
    compute_signed_area, is_simple_ring, ring_winding, simplify_ring, Bounds, Winding,
};
use crate::error::{Error, Result};

#[inline]
fn is_finite(p: &Point2<f64>) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Ordered sequence of at least two points
///
/// Open unless the first and last point are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct LineString {
    points: Vec<Point2<f64>>,
}

impl LineString {
    /// Create a line string, rejecting short, non-finite or zero-length input
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::invalid(format!(
                "line string needs at least 2 points, got {}",
                points.len()
            )));
        }
        if let Some(p) = points.iter().find(|p| !is_finite(p)) {
            return Err(Error::invalid(format!(
                "non-finite coordinate ({}, {})",
                p.x, p.y
            )));
        }
        if points.len() == 2 && points[0] == points[1] {
            return Err(Error::invalid("zero-length line string"));
        }
        Ok(Self { points })
    }

    /// Convenience constructor from coordinate pairs
    pub fn from_coords(coords: &[(f64, f64)]) -> Result<Self> {
        Self::new(coords.iter().map(|&(x, y)| Point2::new(x, y)).collect())
    }

    /// Create a closed line string, appending the first point if needed
    pub fn closed(mut points: Vec<Point2<f64>>) -> Result<Self> {
        if let (Some(&first), Some(last)) = (points.first(), points.last()) {
            if first != *last {
                points.push(first);
            }
        }
        let line = Self::new(points)?;
        if line.points.len() < 4 {
            return Err(Error::invalid(format!(
                "closed line string needs at least 3 distinct points, got {}",
                line.points.len() - 1
            )));
        }
        Ok(line)
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn into_points(self) -> Vec<Point2<f64>> {
        self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn start(&self) -> Point2<f64> {
        self.points[0]
    }

    pub fn end(&self) -> Point2<f64> {
        self.points[self.points.len() - 1]
    }

    pub fn is_closed(&self) -> bool {
        self.start() == self.end()
    }

    pub fn bounds(&self) -> Bounds {
        // Never empty: construction guarantees at least two points
        let mut bounds = Bounds::from_point(self.points[0]);
        for p in &self.points[1..] {
            bounds.expand(p);
        }
        bounds
    }

    /// Replace the first point, leaving the interior untouched
    pub(crate) fn set_start(&mut self, p: Point2<f64>) {
        self.points[0] = p;
    }

    /// Replace the last point, leaving the interior untouched
    pub(crate) fn set_end(&mut self, p: Point2<f64>) {
        let last = self.points.len() - 1;
        self.points[last] = p;
    }
}

/// Closed, simple point loop
///
/// Built only from closed line strings that pass the self-intersection test.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    points: Vec<Point2<f64>>,
}

impl Ring {
    /// Validate a closed contour as a ring
    pub fn new(points: Vec<Point2<f64>>) -> Result<Self> {
        if !points.iter().all(is_finite) {
            return Err(Error::invalid("ring has non-finite coordinates"));
        }
        if !is_simple_ring(&points) {
            return Err(Error::invalid(
                "ring must be closed, have 3 distinct vertices and not self-intersect",
            ));
        }
        Ok(Self { points })
    }

    /// Wrap a contour the caller has already checked with `is_simple_ring`
    pub(crate) fn from_simple(points: Vec<Point2<f64>>) -> Self {
        debug_assert!(is_simple_ring(&points));
        Self { points }
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn signed_area(&self) -> f64 {
        compute_signed_area(&self.points)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn is_ccw(&self) -> bool {
        ring_winding(&self.points) == Winding::CounterClockwise
    }

    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::from_point(self.points[0]);
        for p in &self.points[1..] {
            bounds.expand(p);
        }
        bounds
    }

    /// Zero-tolerance simplification: drops duplicate and collinear vertices
    pub fn simplified(&self) -> Ring {
        Ring {
            points: simplify_ring(&self.points),
        }
    }

    /// The ring as a closed line string
    pub fn to_line_string(&self) -> LineString {
        LineString {
            points: self.points.clone(),
        }
    }
}

/// Exterior ring with zero or more holes
///
/// The exterior runs counter-clockwise, holes run clockwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub interiors: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            interiors: Vec::new(),
        }
    }

    /// Enclosed area: exterior minus holes
    pub fn area(&self) -> f64 {
        self.exterior.area() - self.interiors.iter().map(Ring::area).sum::<f64>()
    }

    pub fn simplified(&self) -> Polygon {
        Polygon {
            exterior: self.exterior.simplified(),
            interiors: self.interiors.iter().map(Ring::simplified).collect(),
        }
    }
}

/// Ordered working set of line strings for one pipeline run
///
/// Insertion order is stable and is the tie-break order of endpoint
/// coercion: an earlier line string always wins over a later one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryCollection {
    lines: Vec<LineString>,
    unit: Option<DrawingUnit>,
}

impl GeometryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: Vec<LineString>) -> Self {
        Self { lines, unit: None }
    }

    pub fn with_unit(mut self, unit: Option<DrawingUnit>) -> Self {
        self.unit = unit;
        self
    }

    pub fn push(&mut self, line: LineString) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[LineString] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<LineString> {
        self.lines
    }

    pub(crate) fn lines_mut(&mut self) -> &mut [LineString] {
        &mut self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineString> {
        self.lines.iter()
    }

    pub fn unit(&self) -> Option<DrawingUnit> {
        self.unit
    }

    /// Envelope of every line string, `None` for an empty collection
    pub fn bounds(&self) -> Option<Bounds> {
        let mut iter = self.lines.iter();
        let mut bounds = iter.next()?.bounds();
        for line in iter {
            bounds.merge(&line.bounds());
        }
        Some(bounds)
    }
}

impl<'a> IntoIterator for &'a GeometryCollection {
    type Item = &'a LineString;
    type IntoIter = std::slice::Iter<'a, LineString>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

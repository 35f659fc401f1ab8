// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D contour predicates
//!
//! Orientation, area, containment, self-intersection and zero-tolerance
//! simplification for point contours. Contours may be passed open or closed
//! (last point repeating the first); every predicate accepts both unless
//! stated otherwise.
//!
//! All tests are exact floating point comparisons. Snapping near-equal
//! coordinates is the job of endpoint coercion, not of these predicates.

use nalgebra::Point2;
use rustc_hash::FxHashSet;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Bounds {
    pub fn from_point(p: Point2<f64>) -> Self {
        Self { min: p, max: p }
    }

    /// Grow to include `p`
    pub fn expand(&mut self, p: &Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grow to include another box
    pub fn merge(&mut self, other: &Bounds) {
        self.expand(&other.min);
        self.expand(&other.max);
    }

    /// Check if `other` lies within this box (boundary inclusive)
    pub fn contains(&self, other: &Bounds) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    pub fn area(&self) -> f64 {
        (self.max.x - self.min.x) * (self.max.y - self.min.y)
    }
}

/// Winding of a closed contour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
    /// Zero area and no turn at the extreme vertex (spikes, doubled edges)
    Degenerate,
}

/// Hashable identity of an exact coordinate
///
/// `-0.0` and `0.0` compare equal, so both map to the same key.
#[inline]
pub(crate) fn point_key(p: &Point2<f64>) -> (u64, u64) {
    #[inline]
    fn bits(v: f64) -> u64 {
        if v == 0.0 {
            0
        } else {
            v.to_bits()
        }
    }
    (bits(p.x), bits(p.y))
}

/// Twice the signed area of triangle (a, b, c); positive when c is left of a→b
#[inline]
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Compute the signed area of a 2D contour
/// Positive = counter-clockwise, Negative = clockwise
pub fn compute_signed_area(contour: &[Point2<f64>]) -> f64 {
    if contour.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = contour.len();

    for i in 0..n {
        let j = (i + 1) % n;
        area += contour[i].x * contour[j].y;
        area -= contour[j].x * contour[i].y;
    }

    area * 0.5
}

/// Number of vertices ignoring the closing duplicate
#[inline]
fn open_len(contour: &[Point2<f64>]) -> usize {
    if contour.len() > 1 && contour.first() == contour.last() {
        contour.len() - 1
    } else {
        contour.len()
    }
}

/// Winding of a contour, decided at its lowest (then leftmost) vertex
///
/// The turn at an extreme vertex is reliable even for self-intersecting
/// contours whose signed area cancels out (a figure eight has zero area
/// but its two traversal directions still get opposite windings). When
/// the extreme vertex has no turn the signed area decides.
pub fn ring_winding(contour: &[Point2<f64>]) -> Winding {
    let n = open_len(contour);
    if n < 3 {
        return Winding::Degenerate;
    }
    let pts = &contour[..n];

    let mut pivot = 0;
    for (i, p) in pts.iter().enumerate().skip(1) {
        let best = &pts[pivot];
        if p.y < best.y || (p.y == best.y && p.x < best.x) {
            pivot = i;
        }
    }

    let apex = pts[pivot];
    let prev = (1..n)
        .map(|k| pts[(pivot + n - k) % n])
        .find(|p| *p != apex);
    let next = (1..n).map(|k| pts[(pivot + k) % n]).find(|p| *p != apex);

    let turn = match (prev, next) {
        (Some(prev), Some(next)) => orient2d(&prev, &apex, &next),
        _ => 0.0,
    };

    if turn > 0.0 {
        return Winding::CounterClockwise;
    }
    if turn < 0.0 {
        return Winding::Clockwise;
    }

    let area = compute_signed_area(pts);
    if area > 0.0 {
        Winding::CounterClockwise
    } else if area < 0.0 {
        Winding::Clockwise
    } else {
        Winding::Degenerate
    }
}

/// Check if a point is inside a contour using ray casting
pub fn point_in_contour(point: &Point2<f64>, contour: &[Point2<f64>]) -> bool {
    if contour.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = contour.len();

    let mut j = n - 1;
    for i in 0..n {
        let pi = &contour[i];
        let pj = &contour[j];

        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Compute bounding box of a contour
pub fn contour_bounds(contour: &[Point2<f64>]) -> Option<Bounds> {
    let (first, rest) = contour.split_first()?;
    let mut bounds = Bounds::from_point(*first);
    for p in rest {
        bounds.expand(p);
    }
    Some(bounds)
}

#[inline]
fn on_segment(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Whether closed segments p1-p2 and q1-q2 share at least one point
pub fn segments_intersect(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    q1: &Point2<f64>,
    q2: &Point2<f64>,
) -> bool {
    if p1.x.max(p2.x) < q1.x.min(q2.x)
        || q1.x.max(q2.x) < p1.x.min(p2.x)
        || p1.y.max(p2.y) < q1.y.min(q2.y)
        || q1.y.max(q2.y) < p1.y.min(p2.y)
    {
        return false;
    }

    let d1 = orient2d(q1, q2, p1);
    let d2 = orient2d(q1, q2, p2);
    let d3 = orient2d(p1, p2, q1);
    let d4 = orient2d(p1, p2, q2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Check that a closed contour is a simple ring
///
/// Requires first == last, at least 3 distinct vertices, no vertex visited
/// twice, no two non-adjacent segments touching and no adjacent segments
/// folding back over each other.
pub fn is_simple_ring(ring: &[Point2<f64>]) -> bool {
    if ring.len() < 4 || ring.first() != ring.last() {
        return false;
    }
    let n = ring.len() - 1;

    let mut seen = FxHashSet::default();
    if !ring[..n].iter().all(|p| seen.insert(point_key(p))) {
        return false;
    }

    // Sweep along x: only segments whose x ranges overlap are compared
    let min_x = |i: usize| ring[i].x.min(ring[i + 1].x);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| min_x(a).total_cmp(&min_x(b)));

    for (k, &first) in order.iter().enumerate() {
        let max_x = ring[first].x.max(ring[first + 1].x);
        for &second in &order[k + 1..] {
            if min_x(second) > max_x {
                break;
            }
            let (i, j) = (first.min(second), first.max(second));
            let (a1, a2) = (&ring[i], &ring[i + 1]);
            let (b1, b2) = (&ring[j], &ring[j + 1]);

            if j == i + 1 || (i == 0 && j == n - 1) {
                // Adjacent segments share exactly one vertex; they may only
                // overlap by folding back along the same line.
                let (shared, p, q) = if j == i + 1 { (a2, a1, b2) } else { (a1, a2, b1) };
                if orient2d(shared, p, q) == 0.0 && (p - shared).dot(&(q - shared)) > 0.0 {
                    return false;
                }
            } else if segments_intersect(a1, a2, b1, b2) {
                return false;
            }
        }
    }

    true
}

/// Remove duplicate and exactly collinear vertices from a closed ring
///
/// The first vertex is always kept, so the ring's start point and shape do
/// not change. Returns the input unchanged if simplification would leave
/// fewer than three distinct vertices.
pub fn simplify_ring(ring: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out: Vec<Point2<f64>> = Vec::with_capacity(ring.len());

    for &p in ring {
        if out.last() == Some(&p) {
            continue;
        }
        while out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            // b is redundant when it lies on the segment a-p
            if orient2d(&a, &b, &p) == 0.0 && (b - a).dot(&(p - b)) >= 0.0 {
                out.pop();
            } else {
                break;
            }
        }
        out.push(p);
    }

    if out.len() < 4 {
        return ring.to_vec();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Epsilon for floating point comparisons in tests
    const EPSILON_2D: f64 = 1e-9;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn unit_square_ccw() -> Vec<Point2<f64>> {
        pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)])
    }

    #[test]
    fn test_compute_signed_area_ccw() {
        let area = compute_signed_area(&unit_square_ccw());
        assert!((area - 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_compute_signed_area_cw() {
        let contour = pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        let area = compute_signed_area(&contour);
        assert!((area + 1.0).abs() < EPSILON_2D);
    }

    #[test]
    fn test_ring_winding() {
        let ccw = unit_square_ccw();
        assert_eq!(ring_winding(&ccw), Winding::CounterClockwise);

        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        assert_eq!(ring_winding(&cw), Winding::Clockwise);

        let spike = pts(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert_eq!(ring_winding(&spike), Winding::Degenerate);
    }

    #[test]
    fn test_figure_eight_directions_disagree() {
        let eight = pts(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert_eq!(compute_signed_area(&eight), 0.0);

        let reversed: Vec<_> = eight.iter().rev().cloned().collect();
        assert_ne!(ring_winding(&eight), ring_winding(&reversed));
        assert_ne!(ring_winding(&eight), Winding::Degenerate);
    }

    #[test]
    fn test_point_in_contour() {
        let square = unit_square_ccw();
        assert!(point_in_contour(&Point2::new(0.5, 0.5), &square));
        assert!(!point_in_contour(&Point2::new(1.5, 0.5), &square));
        assert!(!point_in_contour(&Point2::new(-0.5, 0.5), &square));
    }

    #[test]
    fn test_segments_intersect() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(2.0, 2.0);
        let c = Point2::new(0.0, 2.0);
        let d = Point2::new(2.0, 0.0);
        assert!(segments_intersect(&a, &b, &c, &d));

        // Touching at an endpoint
        assert!(segments_intersect(&a, &b, &b, &Point2::new(3.0, 0.0)));

        // Parallel, disjoint
        assert!(!segments_intersect(
            &a,
            &d,
            &Point2::new(0.0, 1.0),
            &Point2::new(2.0, 1.0)
        ));

        // Collinear, overlapping
        assert!(segments_intersect(
            &a,
            &d,
            &Point2::new(1.0, 0.0),
            &Point2::new(3.0, 0.0)
        ));
    }

    #[test]
    fn test_is_simple_ring() {
        assert!(is_simple_ring(&unit_square_ccw()));

        let eight = pts(&[(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)]);
        assert!(!is_simple_ring(&eight));

        // Open contour
        assert!(!is_simple_ring(&unit_square_ccw()[..4]));

        // Visits (1, 0) twice
        let pinched = pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 0.0),
        ]);
        assert!(!is_simple_ring(&pinched));

        // Folds back along its first edge
        let folded = pts(&[(0.0, 0.0), (2.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(!is_simple_ring(&folded));
    }

    #[test]
    fn test_is_simple_ring_finely_sampled() {
        let n = 3600;
        let mut circle: Vec<Point2<f64>> = (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * i as f64 / n as f64;
                Point2::new(10.0 * t.cos(), 10.0 * t.sin())
            })
            .collect();
        circle.push(circle[0]);
        assert!(is_simple_ring(&circle));

        // Swapping two neighbours deep in the ring makes their chords cross
        circle.swap(1800, 1801);
        assert!(!is_simple_ring(&circle));
    }

    #[test]
    fn test_simplify_ring() {
        let ring = pts(&[
            (0.0, 0.0),
            (0.5, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (1.0, 1.0),
            (0.0, 1.0),
            (0.0, 0.5),
            (0.0, 0.0),
        ]);
        let simplified = simplify_ring(&ring);
        assert_eq!(simplified, unit_square_ccw());
    }

    #[test]
    fn test_simplify_ring_keeps_start_point() {
        // Start point sits mid-edge and is collinear with its neighbours
        let ring = pts(&[(0.5, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0), (0.5, 0.0)]);
        let simplified = simplify_ring(&ring);
        assert_eq!(simplified.first(), Some(&Point2::new(0.5, 0.0)));
        assert_eq!(simplified.len(), 6);
    }

    #[test]
    fn test_contour_bounds() {
        let bounds = contour_bounds(&unit_square_ccw()).unwrap();
        assert_eq!(bounds.min, Point2::new(0.0, 0.0));
        assert_eq!(bounds.max, Point2::new(1.0, 1.0));
        assert!(contour_bounds(&[]).is_none());
    }

    #[test]
    fn test_bounds_contain_and_area() {
        let a = Bounds {
            min: Point2::new(0.0, 0.0),
            max: Point2::new(4.0, 4.0),
        };
        let b = Bounds {
            min: Point2::new(1.0, 1.0),
            max: Point2::new(2.0, 2.0),
        };
        let c = Bounds {
            min: Point2::new(5.0, 5.0),
            max: Point2::new(6.0, 6.0),
        };
        assert!(a.contains(&b));
        assert!(!b.contains(&a));
        assert!(!a.contains(&c));
        assert_eq!(a.area(), 16.0);
    }

    #[test]
    fn test_point_key_signed_zero() {
        assert_eq!(point_key(&Point2::new(0.0, -0.0)), point_key(&Point2::new(-0.0, 0.0)));
        assert_ne!(point_key(&Point2::new(1.0, 0.0)), point_key(&Point2::new(0.0, 1.0)));
    }
}

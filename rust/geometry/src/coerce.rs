// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Endpoint coercion ("zipping")
//!
//! Drafting tools leave segment endpoints that should meet a hair apart.
//! Coercion snaps such endpoints together so the polygon extractor sees a
//! connected graph. Only the first and last point of a line string are ever
//! touched.
//!
//! The scan is a single ordered pass: for every pair `i < j` the endpoints
//! of `i` (as they are at that point of the scan) are copied onto `j`. An
//! earlier line string therefore always wins, and a snap made for one pair
//! is visible to every later pair. Results depend on input order.

use nalgebra::Point2;

use crate::linestring::{GeometryCollection, LineString};

/// Coercion distance used by [`crate::polygonize_lines`]
pub const DEFAULT_COERCION_DISTANCE: f64 = 1e-8;

#[derive(Clone, Copy)]
enum End {
    Start,
    End,
}

/// Snap near-coincident endpoints, returning the adjusted line strings
///
/// Endpoints at distance `d` with `0 < d < tolerance` are made identical;
/// exactly coincident endpoints and those at or beyond the tolerance are
/// left alone. Length and order of the output match the input.
pub fn coerce_line_ends(lines: &[LineString], tolerance: f64) -> Vec<LineString> {
    coerce_line_ends_with_report(lines, tolerance).0
}

/// Like [`coerce_line_ends`], also returning the number of snaps applied
pub fn coerce_line_ends_with_report(
    lines: &[LineString],
    tolerance: f64,
) -> (Vec<LineString>, usize) {
    let mut lines = lines.to_vec();
    let snapped = coerce_in_place(&mut lines, tolerance);
    (lines, snapped)
}

impl GeometryCollection {
    /// Coerce endpoints of the collection's line strings in place
    ///
    /// Returns the number of snaps applied.
    pub fn coerce_line_ends(&mut self, tolerance: f64) -> usize {
        coerce_in_place(self.lines_mut(), tolerance)
    }
}

#[inline]
fn within(a: &Point2<f64>, b: &Point2<f64>, tolerance: f64) -> bool {
    let d = (a - b).norm();
    d > 0.0 && d < tolerance
}

fn coerce_in_place(lines: &mut [LineString], tolerance: f64) -> usize {
    let mut snapped = 0;

    for i in 0..lines.len() {
        let (head, tail) = lines.split_at_mut(i + 1);
        let line_i = &head[i];
        let (i_start, i_end) = (line_i.start(), line_i.end());

        for line_j in tail.iter_mut() {
            let (j_start, j_end) = (line_j.start(), line_j.end());

            // Decisions use j's endpoints from before this pair; for a
            // shared target the later combination overrides the earlier.
            let checks = [
                (i_start, j_start, End::Start),
                (i_start, j_end, End::End),
                (i_end, j_start, End::Start),
                (i_end, j_end, End::End),
            ];

            let mut new_start = None;
            let mut new_end = None;
            for (source, target, end) in checks {
                if within(&source, &target, tolerance) {
                    match end {
                        End::Start => new_start = Some(source),
                        End::End => new_end = Some(source),
                    }
                    snapped += 1;
                }
            }

            if let Some(p) = new_start {
                line_j.set_start(p);
            }
            if let Some(p) = new_end {
                line_j.set_end(p);
            }
        }
    }

    if snapped > 0 {
        tracing::info!(snapped, tolerance, "Zipped line string endpoints");
    } else {
        tracing::debug!(lines = lines.len(), tolerance, "No endpoints within coercion distance");
    }

    snapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::from_coords(coords).unwrap()
    }

    #[test]
    fn test_snaps_within_tolerance() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0 + 1e-9, 0.0), (1.0, 1.0)]),
        ];
        let (out, snapped) = coerce_line_ends_with_report(&lines, 1e-6);

        assert_eq!(snapped, 1);
        assert_eq!(out[1].start(), out[0].end());
        assert_eq!(out[1].end(), Point2::new(1.0, 1.0));
        // Earlier line strings are never moved
        assert_eq!(out[0], lines[0]);
    }

    #[test]
    fn test_exact_and_far_endpoints_unchanged() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 1.0)]),
            line(&[(1.0, 1.0 + 1e-3), (0.0, 1.0)]),
        ];
        let (out, snapped) = coerce_line_ends_with_report(&lines, 1e-6);

        assert_eq!(snapped, 0);
        assert_eq!(out, lines);
    }

    #[test]
    fn test_distance_equal_to_tolerance_unchanged() {
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 0.5), (2.0, 0.0)]),
        ];
        let out = coerce_line_ends(&lines, 0.5);
        assert_eq!(out, lines);
    }

    #[test]
    fn test_applying_twice_equals_once() {
        let eps = 1e-9;
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, eps), (1.0, 1.0)]),
            line(&[(1.0 - eps, 1.0), (0.0, 1.0)]),
            line(&[(0.0, 1.0 + eps), (0.0, eps)]),
        ];
        let once = coerce_line_ends(&lines, 1e-6);
        let twice = coerce_line_ends(&once, 1e-6);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_earlier_line_wins_and_chains() {
        // Line 1 snaps to line 0, then line 2 snaps to the moved line 1
        let lines = vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0 + 4e-7, 0.0), (2.0, 0.0)]),
            line(&[(2.0 + 4e-7, 0.0), (3.0, 0.0)]),
        ];
        let out = coerce_line_ends(&lines, 1e-6);
        assert_eq!(out[1].start(), Point2::new(1.0, 0.0));
        assert_eq!(out[2].start(), Point2::new(2.0, 0.0));

        // Reversed order: the moving endpoint belongs to the other line
        let reversed: Vec<_> = lines.iter().rev().cloned().collect();
        let out = coerce_line_ends(&reversed, 1e-6);
        assert_eq!(out[1].end(), Point2::new(2.0 + 4e-7, 0.0));
        assert_eq!(out[2].end(), Point2::new(1.0 + 4e-7, 0.0));
    }

    #[test]
    fn test_later_combination_overrides() {
        // j's start is close to both of i's endpoints; end-i wins over start-i
        let lines = vec![
            line(&[(0.0, 0.0), (0.0, 2e-7), (0.0, 4e-7)]),
            line(&[(0.0, 2e-7 + 1e-9), (5.0, 5.0)]),
        ];
        let (out, snapped) = coerce_line_ends_with_report(&lines, 1e-6);
        assert_eq!(snapped, 2);
        assert_eq!(out[1].start(), Point2::new(0.0, 4e-7));
    }

    #[test]
    fn test_closed_line_stays_closed() {
        let lines = vec![
            line(&[(0.0, 0.0), (-1.0, 0.0)]),
            LineString::closed(vec![
                Point2::new(1e-9, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
            ])
            .unwrap(),
        ];
        let out = coerce_line_ends(&lines, 1e-6);
        assert!(out[1].is_closed());
        assert_eq!(out[1].start(), Point2::new(0.0, 0.0));
        assert_eq!(out[1].num_points(), 4);
    }

    #[test]
    fn test_collection_in_place_keeps_unit() {
        let mut collection = GeometryCollection::from_lines(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 1e-9), (1.0, 1.0)]),
        ])
        .with_unit(Some(cad_rings_core::DrawingUnit::Meters));

        assert_eq!(collection.coerce_line_ends(1e-6), 1);
        assert_eq!(collection.lines()[1].start(), Point2::new(1.0, 0.0));
        assert_eq!(collection.unit(), Some(cad_rings_core::DrawingUnit::Meters));
    }
}

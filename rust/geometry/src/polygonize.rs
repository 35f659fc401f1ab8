// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon extraction from a set of line strings
//!
//! The line strings are read as a planar graph: nodes are exact endpoint
//! coordinates, every line string is one edge and a closed line string is a
//! self-loop. Line strings are never split at crossings, so only endpoints
//! connect.
//!
//! Extraction runs in rounds until the graph is stable:
//!
//! 1. **Dangles**: edges hanging off a degree-1 node are removed, cascading
//!    until no such node remains
//! 2. **Faces**: half-edges around each node are sorted by outgoing angle and
//!    linked into face cycles; bounded faces come out counter-clockwise
//! 3. **Cuts**: edges with the same face on both sides are removed
//!
//! Counter-clockwise faces become shells (or invalid rings when they
//! self-intersect), simple clockwise faces become holes of the smallest
//! shell that contains them.

use nalgebra::Point2;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::coerce::{coerce_line_ends, DEFAULT_COERCION_DISTANCE};
use crate::contour::{
    contour_bounds, is_simple_ring, point_in_contour, point_key, ring_winding, Bounds, Winding,
};
use crate::error::{Error, Result};
use crate::linestring::{LineString, Polygon, Ring};

/// Options for [`polygonize`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonizeOptions {
    /// Drop duplicate and exactly collinear ring vertices
    pub simplify: bool,
}

impl Default for PolygonizeOptions {
    fn default() -> Self {
        Self { simplify: true }
    }
}

/// Everything [`polygonize`] found in a set of line strings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygonization {
    /// Valid polygons, exteriors counter-clockwise and holes clockwise
    pub polygons: Vec<Polygon>,
    /// Input line strings attached to the rest of the graph at one end only
    pub dangles: Vec<LineString>,
    /// Input line strings with the same face on both sides
    pub cuts: Vec<LineString>,
    /// Closed face boundaries that are degenerate or self-intersecting
    pub invalid_rings: Vec<LineString>,
}

impl Polygonization {
    /// Exterior rings of the extracted polygons
    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons.iter().map(|p| &p.exterior)
    }

    pub fn ring_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Extract polygons, dangles, cuts and invalid rings from line strings
///
/// Returns [`Error::EmptyGeometry`] for an empty input. Outputs keep input
/// order: polygons by the first line string on their boundary, the other
/// lists by line string index.
pub fn polygonize(lines: &[LineString], options: &PolygonizeOptions) -> Result<Polygonization> {
    if lines.is_empty() {
        return Err(Error::EmptyGeometry("no line strings to polygonize".to_string()));
    }

    let mut graph = PlanarGraph::build(lines);
    let mut dangles = Vec::new();
    let mut cuts = Vec::new();

    let faces = loop {
        dangles.extend(graph.prune_dangles());
        let faces = graph.trace_faces();
        let found = graph.cut_edges(&faces);
        if found.is_empty() {
            break faces;
        }
        for &edge in &found {
            graph.edges[edge].alive = false;
        }
        cuts.extend(found);
    };

    let mut shells: Vec<Vec<Point2<f64>>> = Vec::new();
    let mut holes: Vec<Vec<Point2<f64>>> = Vec::new();
    let mut invalid_rings = Vec::new();
    let mut reported: FxHashSet<Vec<usize>> = FxHashSet::default();

    for face in &faces.cycles {
        let ring = graph.face_ring(face);
        let winding = if ring.len() < 4 {
            Winding::Degenerate
        } else {
            ring_winding(&ring)
        };

        match winding {
            Winding::CounterClockwise if is_simple_ring(&ring) => {
                shells.push(ring);
                continue;
            }
            Winding::Clockwise => {
                // Outer boundaries of components land here too; a pinched
                // one is not a usable hole and is not reported either.
                if is_simple_ring(&ring) {
                    holes.push(ring);
                }
                continue;
            }
            Winding::CounterClockwise | Winding::Degenerate => {}
        }

        // Both sides of a degenerate face trace the same edges
        let mut edge_set: Vec<usize> = face.iter().map(|h| h / 2).collect();
        edge_set.sort_unstable();
        edge_set.dedup();
        if reported.insert(edge_set) {
            invalid_rings.push(LineString::new(ring)?);
        }
    }

    let mut polygons = assign_holes(shells, holes);
    if options.simplify {
        polygons = polygons.iter().map(Polygon::simplified).collect();
    }

    dangles.sort_unstable();
    cuts.sort_unstable();
    let result = Polygonization {
        polygons,
        dangles: dangles.into_iter().map(|e| graph.source_line(e)).collect(),
        cuts: cuts.into_iter().map(|e| graph.source_line(e)).collect(),
        invalid_rings,
    };

    tracing::debug!(
        lines = lines.len(),
        polygons = result.polygons.len(),
        dangles = result.dangles.len(),
        cuts = result.cuts.len(),
        invalid_rings = result.invalid_rings.len(),
        "Polygonized line strings"
    );

    Ok(result)
}

/// Options for [`polygonize_lines`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SanitizeOptions {
    /// Snap near-coincident endpoints before extraction
    pub coerce_ends: bool,
    /// Maximum distance an endpoint is moved by coercion
    pub coercion_distance: f64,
    /// Simplify the resulting polygons
    pub simplify: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            coerce_ends: true,
            coercion_distance: DEFAULT_COERCION_DISTANCE,
            simplify: true,
        }
    }
}

/// Optionally coerce endpoints, then extract polygons
///
/// Convenience wrapper returning only the polygons.
pub fn polygonize_lines(lines: &[LineString], options: &SanitizeOptions) -> Result<Vec<Polygon>> {
    let polygonize_options = PolygonizeOptions {
        simplify: options.simplify,
    };
    let result = if options.coerce_ends {
        let coerced = coerce_line_ends(lines, options.coercion_distance);
        polygonize(&coerced, &polygonize_options)?
    } else {
        polygonize(lines, &polygonize_options)?
    };
    Ok(result.polygons)
}

/// Give each hole to the smallest valid shell containing it
///
/// Containment is an envelope test followed by point-in-polygon on a hole
/// vertex the shell does not share. Holes contained by no shell are the
/// outer boundaries of connected components and are discarded.
fn assign_holes(shells: Vec<Vec<Point2<f64>>>, holes: Vec<Vec<Point2<f64>>>) -> Vec<Polygon> {
    let mut polygons: Vec<Polygon> = shells
        .into_iter()
        .map(|shell| Polygon::new(Ring::from_simple(shell)))
        .collect();

    let shell_data: Vec<(Bounds, FxHashSet<(u64, u64)>)> = polygons
        .iter()
        .map(|polygon| {
            let exterior = &polygon.exterior;
            (exterior.bounds(), exterior.points().iter().map(point_key).collect())
        })
        .collect();

    for hole in holes {
        let Some(hole_bounds) = contour_bounds(&hole) else {
            continue;
        };

        let mut best: Option<(usize, f64)> = None;
        for (i, (bounds, vertices)) in shell_data.iter().enumerate() {
            if !bounds.contains(&hole_bounds) {
                continue;
            }
            let Some(probe) = hole.iter().find(|p| !vertices.contains(&point_key(p))) else {
                continue;
            };
            if !point_in_contour(probe, polygons[i].exterior.points()) {
                continue;
            }
            let area = bounds.area();
            if best.map_or(true, |(_, best_area)| area < best_area) {
                best = Some((i, area));
            }
        }

        if let Some((i, _)) = best {
            polygons[i].interiors.push(Ring::from_simple(hole));
        }
    }

    polygons
}

/// One input line string as a graph edge
#[derive(Debug)]
struct GraphEdge {
    /// Index into the input line strings
    source: usize,
    /// Points with consecutive duplicates collapsed, at least two long
    path: Vec<Point2<f64>>,
    from: usize,
    to: usize,
    alive: bool,
}

/// Face cycles of the live graph
///
/// Half-edge `2e` runs along edge `e` from its first point, `2e + 1` runs
/// back from its last point.
struct Faces {
    cycles: Vec<Vec<usize>>,
    face_of: Vec<usize>,
}

const NO_FACE: usize = usize::MAX;

struct PlanarGraph<'a> {
    lines: &'a [LineString],
    node_count: usize,
    edges: Vec<GraphEdge>,
    /// Outgoing angle of every half-edge
    angles: Vec<f64>,
}

impl<'a> PlanarGraph<'a> {
    fn build(lines: &'a [LineString]) -> Self {
        let mut node_index: FxHashMap<(u64, u64), usize> = FxHashMap::default();
        let mut edges = Vec::with_capacity(lines.len());
        let mut angles = Vec::with_capacity(lines.len() * 2);

        for (source, line) in lines.iter().enumerate() {
            let mut path: Vec<Point2<f64>> = Vec::with_capacity(line.num_points());
            for p in line.points() {
                if path.last() != Some(p) {
                    path.push(*p);
                }
            }
            if path.len() < 2 {
                tracing::debug!(line = source, "Ignoring line string without extent");
                continue;
            }

            let mut node_of = |p: &Point2<f64>| {
                let next = node_index.len();
                *node_index.entry(point_key(p)).or_insert(next)
            };
            let from = node_of(&path[0]);
            let to = node_of(&path[path.len() - 1]);

            let n = path.len();
            let forward = path[1] - path[0];
            let backward = path[n - 2] - path[n - 1];
            angles.push(forward.y.atan2(forward.x));
            angles.push(backward.y.atan2(backward.x));

            edges.push(GraphEdge {
                source,
                path,
                from,
                to,
                alive: true,
            });
        }

        Self {
            lines,
            node_count: node_index.len(),
            edges,
            angles,
        }
    }

    #[inline]
    fn origin(&self, half_edge: usize) -> usize {
        let edge = &self.edges[half_edge / 2];
        if half_edge % 2 == 0 {
            edge.from
        } else {
            edge.to
        }
    }

    fn source_line(&self, edge: usize) -> LineString {
        self.lines[self.edges[edge].source].clone()
    }

    /// Remove dangling edges, returning their indices in removal order
    fn prune_dangles(&mut self) -> Vec<usize> {
        let mut degree = vec![0usize; self.node_count];
        let mut incident: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); self.node_count];

        for (e, edge) in self.edges.iter().enumerate().filter(|(_, edge)| edge.alive) {
            degree[edge.from] += 1;
            degree[edge.to] += 1;
            incident[edge.from].push(e);
            if edge.to != edge.from {
                incident[edge.to].push(e);
            }
        }

        let mut stack: Vec<usize> = (0..self.node_count).filter(|&n| degree[n] == 1).collect();
        let mut removed = Vec::new();

        while let Some(node) = stack.pop() {
            if degree[node] != 1 {
                continue;
            }
            let Some(e) = incident[node].iter().copied().find(|&e| self.edges[e].alive) else {
                continue;
            };

            // A self-loop adds 2 to its node's degree, so this is never one
            let edge = &mut self.edges[e];
            edge.alive = false;
            let (from, to) = (edge.from, edge.to);
            degree[from] -= 1;
            degree[to] -= 1;
            removed.push(e);

            let other = if from == node { to } else { from };
            if degree[other] == 1 {
                stack.push(other);
            }
        }

        removed
    }

    /// Link live half-edges into face cycles
    fn trace_faces(&self) -> Faces {
        let half_edge_count = self.edges.len() * 2;
        let mut outgoing: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); self.node_count];

        for (e, edge) in self.edges.iter().enumerate().filter(|(_, edge)| edge.alive) {
            outgoing[edge.from].push(2 * e);
            outgoing[edge.to].push(2 * e + 1);
        }

        let mut position = vec![0usize; half_edge_count];
        for list in &mut outgoing {
            list.sort_by(|&a, &b| {
                self.angles[a]
                    .total_cmp(&self.angles[b])
                    .then(a.cmp(&b))
            });
            for (i, &h) in list.iter().enumerate() {
                position[h] = i;
            }
        }

        // Arriving along h, leave along the clockwise neighbour of h's twin
        let next = |h: usize| {
            let twin = h ^ 1;
            let list = &outgoing[self.origin(twin)];
            list[(position[twin] + list.len() - 1) % list.len()]
        };

        let mut face_of = vec![NO_FACE; half_edge_count];
        let mut cycles = Vec::new();

        for start in 0..half_edge_count {
            if !self.edges[start / 2].alive || face_of[start] != NO_FACE {
                continue;
            }
            let id = cycles.len();
            let mut cycle = Vec::new();
            let mut h = start;
            loop {
                face_of[h] = id;
                cycle.push(h);
                h = next(h);
                if h == start {
                    break;
                }
            }
            cycles.push(cycle);
        }

        Faces { cycles, face_of }
    }

    /// Live edges with the same face on both sides
    fn cut_edges(&self, faces: &Faces) -> Vec<usize> {
        (0..self.edges.len())
            .filter(|&e| {
                self.edges[e].alive && faces.face_of[2 * e] == faces.face_of[2 * e + 1]
            })
            .collect()
    }

    /// Closed point ring along a face cycle
    fn face_ring(&self, cycle: &[usize]) -> Vec<Point2<f64>> {
        let mut ring: Vec<Point2<f64>> = Vec::new();
        for &h in cycle {
            let path = &self.edges[h / 2].path;
            // The first point repeats the previous half-edge's last point
            let skip = usize::from(!ring.is_empty());
            if h % 2 == 0 {
                ring.extend(path.iter().skip(skip));
            } else {
                ring.extend(path.iter().rev().skip(skip));
            }
        }
        ring
    }
}

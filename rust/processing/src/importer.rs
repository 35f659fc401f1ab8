// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Curve importer: drawing entities to line strings
//!
//! Each entity is converted independently (in parallel) and the results are
//! gathered in entity order, so the collection order always matches the
//! drawing. A bad entity is counted and logged, never fatal.

use std::fmt;

use cad_rings_core::{ArcEntity, Drawing, Entity, PolylineEntity, SplineEntity};
use cad_rings_geometry::{arc_points, bulge_points, GeometryCollection, LineString, Point2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::evaluator::{CurveEvaluator, DeBoorEvaluator, NurbsCurve};

/// Tessellation settings for the importer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Maximum angular step when sampling arcs and bulges (degrees)
    pub degrees_per_segment: f64,
    /// Spline sampling step as a fraction of the parameter domain
    pub spline_delta: f64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            degrees_per_segment: 1.0,
            spline_delta: 0.1,
        }
    }
}

/// Per-kind entity counts of one import
///
/// `dropped` entities are also counted under their kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub lines: usize,
    pub arcs: usize,
    pub polylines: usize,
    pub splines: usize,
    /// Entities with no curve conversion
    pub skipped: usize,
    /// Supported entities whose geometry was degenerate
    pub dropped: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} polylines, {} splines, {} lines, {} arcs. Could not process {} entities.",
            self.polylines, self.splines, self.lines, self.arcs, self.skipped
        )
    }
}

/// Line strings of a drawing plus what the import counted
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedDrawing {
    pub geometry: GeometryCollection,
    pub summary: ImportSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurveKind {
    Line,
    Arc,
    Polyline,
    Spline,
}

enum Conversion {
    Converted(CurveKind, LineString),
    Dropped(CurveKind),
    Skipped,
}

/// Converts drawing entities into a [`GeometryCollection`]
pub struct CurveImporter<E: CurveEvaluator = DeBoorEvaluator> {
    evaluator: E,
    options: ImportOptions,
}

impl CurveImporter<DeBoorEvaluator> {
    /// Importer with the built-in spline evaluator
    pub fn new(options: ImportOptions) -> Self {
        Self::with_evaluator(DeBoorEvaluator, options)
    }
}

impl Default for CurveImporter<DeBoorEvaluator> {
    fn default() -> Self {
        Self::new(ImportOptions::default())
    }
}

impl<E: CurveEvaluator> CurveImporter<E> {
    pub fn with_evaluator(evaluator: E, options: ImportOptions) -> Self {
        Self { evaluator, options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Convert every entity of the drawing
    pub fn import(&self, drawing: &Drawing) -> ImportedDrawing {
        let conversions: Vec<Conversion> = drawing
            .entities
            .par_iter()
            .enumerate()
            .map(|(index, entity)| self.convert(index, entity))
            .collect();

        let mut summary = ImportSummary::default();
        let unit = drawing.unit().unwrap_or_else(|error| {
            tracing::warn!(%error, "Ignoring drawing unit");
            None
        });
        let mut geometry = GeometryCollection::new().with_unit(unit);

        for conversion in conversions {
            match conversion {
                Conversion::Converted(kind, line) => {
                    summary.count(kind);
                    geometry.push(line);
                }
                Conversion::Dropped(kind) => {
                    summary.count(kind);
                    summary.dropped += 1;
                }
                Conversion::Skipped => summary.skipped += 1,
            }
        }

        tracing::info!(
            line_strings = geometry.len(),
            dropped = summary.dropped,
            unit = geometry.unit().map(|u| u.symbol()),
            "{}",
            summary
        );

        ImportedDrawing { geometry, summary }
    }

    fn convert(&self, index: usize, entity: &Entity) -> Conversion {
        let kind = match entity {
            Entity::Line(_) => CurveKind::Line,
            Entity::Arc(_) => CurveKind::Arc,
            Entity::Polyline(_) => CurveKind::Polyline,
            Entity::Spline(_) => CurveKind::Spline,
            Entity::Unsupported { .. } => {
                tracing::warn!(index, entity = entity.type_name(), "Skipping unsupported entity");
                return Conversion::Skipped;
            }
        };

        match self.convert_entity(entity) {
            Ok(line) => Conversion::Converted(kind, line),
            Err(Error::Core(cad_rings_core::Error::UnsupportedEntity(reason))) => {
                tracing::warn!(index, entity = entity.type_name(), %reason, "Skipping unsupported entity");
                Conversion::Skipped
            }
            Err(error) => {
                tracing::warn!(index, entity = entity.type_name(), %error, "Dropping degenerate entity");
                Conversion::Dropped(kind)
            }
        }
    }

    fn convert_entity(&self, entity: &Entity) -> Result<LineString> {
        match entity {
            Entity::Line(line) => Ok(LineString::new(vec![line.start, line.end])?),
            Entity::Arc(arc) => self.convert_arc(arc),
            Entity::Polyline(polyline) => self.convert_polyline(polyline),
            Entity::Spline(spline) => self.convert_spline(spline),
            Entity::Unsupported { kind } => {
                Err(cad_rings_core::Error::UnsupportedEntity(kind.clone()).into())
            }
        }
    }

    fn convert_arc(&self, arc: &ArcEntity) -> Result<LineString> {
        let points = arc_points(
            arc.start_angle.to_radians(),
            arc.end_angle.to_radians(),
            arc.radius,
            arc.center,
            self.options.degrees_per_segment,
        )?;
        Ok(LineString::new(points)?)
    }

    fn convert_polyline(&self, polyline: &PolylineEntity) -> Result<LineString> {
        if !polyline.kind.is_2d() {
            return Err(cad_rings_core::Error::UnsupportedEntity(format!(
                "{} is not a 2D polyline",
                polyline.kind.as_str()
            ))
            .into());
        }

        let vertices = &polyline.vertices;
        let mut points: Vec<Point2<f64>> = Vec::with_capacity(vertices.len());

        for (i, vertex) in vertices.iter().enumerate() {
            points.push(vertex.location);
            if vertex.bulge == 0.0 {
                continue;
            }

            // The last vertex only arcs back to the first on a closed polyline
            let next = match vertices.get(i + 1) {
                Some(next) => next,
                None if polyline.closed => &vertices[0],
                None => continue,
            };
            // A bulge on a zero-length segment has no arc
            if next.location == vertex.location {
                continue;
            }

            points.extend(bulge_points(
                vertex.location,
                next.location,
                vertex.bulge,
                self.options.degrees_per_segment,
            )?);
        }

        if polyline.closed {
            Ok(LineString::closed(points)?)
        } else {
            Ok(LineString::new(points)?)
        }
    }

    fn convert_spline(&self, spline: &SplineEntity) -> Result<LineString> {
        if !spline.planar {
            return Err(cad_rings_core::Error::UnsupportedEntity(
                "SPLINE is not planar".to_string(),
            )
            .into());
        }

        let points = self
            .evaluator
            .evaluate(&NurbsCurve::from(spline), self.options.spline_delta)?;
        Ok(LineString::new(
            points.iter().map(|p| Point2::new(p.x, p.y)).collect(),
        )?)
    }
}

impl ImportSummary {
    fn count(&mut self, kind: CurveKind) {
        match kind {
            CurveKind::Line => self.lines += 1,
            CurveKind::Arc => self.arcs += 1,
            CurveKind::Polyline => self.polylines += 1,
            CurveKind::Spline => self.splines += 1,
        }
    }
}

/// Import a drawing with the given options and the built-in evaluator
pub fn import_drawing(drawing: &Drawing, options: ImportOptions) -> ImportedDrawing {
    CurveImporter::new(options).import(drawing)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed drawing entities
//!
//! The entity stream is what a drawing decoder hands over: one record per
//! modelspace entity, already reduced to coordinates, radii, angles, bulges
//! and spline control data. Entity kinds form a closed set with an
//! `Unsupported` catch-all so every consumer matches exhaustively.

use nalgebra::{Point2, Point3};

use crate::error::Result;
use crate::units::DrawingUnit;

/// Straight line segment
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineEntity {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

/// Circular arc, angles in degrees measured counter-clockwise from +X
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcEntity {
    pub center: Point2<f64>,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

/// Polyline vertex with the bulge of the segment that starts at it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolylineVertex {
    pub location: Point2<f64>,
    /// tan(included angle / 4); positive arcs run counter-clockwise, 0 is straight
    #[cfg_attr(feature = "serde", serde(default))]
    pub bulge: f64,
}

impl PolylineVertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            location: Point2::new(x, y),
            bulge: 0.0,
        }
    }

    pub fn with_bulge(x: f64, y: f64, bulge: f64) -> Self {
        Self {
            location: Point2::new(x, y),
            bulge,
        }
    }
}

/// Polyline flavour reported by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolylineKind {
    /// LWPOLYLINE
    Lightweight,
    /// POLYLINE in 2D mode
    Polyline2d,
    Polyline3d,
    PolyfaceMesh,
    PolygonMesh,
}

impl PolylineKind {
    /// Whether this flavour describes a planar 2D outline
    pub fn is_2d(&self) -> bool {
        matches!(self, PolylineKind::Lightweight | PolylineKind::Polyline2d)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolylineKind::Lightweight => "LWPOLYLINE",
            PolylineKind::Polyline2d => "POLYLINE(2D)",
            PolylineKind::Polyline3d => "POLYLINE(3D)",
            PolylineKind::PolyfaceMesh => "POLYLINE(POLYFACE)",
            PolylineKind::PolygonMesh => "POLYLINE(MESH)",
        }
    }
}

/// Polyline or lightweight polyline
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolylineEntity {
    pub kind: PolylineKind,
    pub vertices: Vec<PolylineVertex>,
    pub closed: bool,
}

impl PolylineEntity {
    /// Lightweight polyline from its vertices
    pub fn lightweight(vertices: Vec<PolylineVertex>, closed: bool) -> Self {
        Self {
            kind: PolylineKind::Lightweight,
            vertices,
            closed,
        }
    }
}

/// B-spline / NURBS curve as stored in the drawing
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplineEntity {
    pub degree: usize,
    pub control_points: Vec<Point3<f64>>,
    pub knots: Vec<f64>,
    /// One weight per control point; empty means every weight is 1
    #[cfg_attr(feature = "serde", serde(default))]
    pub weights: Vec<f64>,
    /// Planar flag from the spline header
    pub planar: bool,
}

impl SplineEntity {
    /// Weights to evaluate with, one per control point
    ///
    /// Falls back to unit weights unless the stored weights match the
    /// control point count.
    pub fn effective_weights(&self) -> Vec<f64> {
        if self.weights.len() == self.control_points.len() {
            self.weights.clone()
        } else {
            vec![1.0; self.control_points.len()]
        }
    }
}

/// One entity of the drawing's modelspace
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Entity {
    Line(LineEntity),
    Arc(ArcEntity),
    Polyline(PolylineEntity),
    Spline(SplineEntity),
    /// Any entity type with no curve conversion (CIRCLE, ELLIPSE, TEXT, ...)
    Unsupported { kind: String },
}

impl Entity {
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Entity::Line(LineEntity {
            start: Point2::new(x1, y1),
            end: Point2::new(x2, y2),
        })
    }

    pub fn arc(cx: f64, cy: f64, radius: f64, start_angle: f64, end_angle: f64) -> Self {
        Entity::Arc(ArcEntity {
            center: Point2::new(cx, cy),
            radius,
            start_angle,
            end_angle,
        })
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        Entity::Unsupported { kind: kind.into() }
    }

    /// Type name used in logs and reports
    pub fn type_name(&self) -> &str {
        match self {
            Entity::Line(_) => "LINE",
            Entity::Arc(_) => "ARC",
            Entity::Polyline(p) => p.kind.as_str(),
            Entity::Spline(_) => "SPLINE",
            Entity::Unsupported { kind } => kind,
        }
    }
}

/// Decoded drawing: header unit code plus the modelspace entity stream
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Drawing {
    /// Raw `$INSUNITS` header value, if the header carries one
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit_code: Option<i64>,
    pub entities: Vec<Entity>,
}

impl Drawing {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            unit_code: None,
            entities,
        }
    }

    pub fn with_unit_code(mut self, code: i64) -> Self {
        self.unit_code = Some(code);
        self
    }

    /// Drawing unit from the header code
    ///
    /// `Ok(None)` when the header has no code or declares the drawing
    /// unitless; an unrecognized code is an error.
    pub fn unit(&self) -> Result<Option<DrawingUnit>> {
        self.unit_code
            .map(DrawingUnit::from_code)
            .transpose()
            .map(Option::flatten)
    }
}

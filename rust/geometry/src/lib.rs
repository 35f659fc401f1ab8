// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CAD-Rings Geometry
//!
//! Turns tessellated CAD line work into closed polygon rings: arc and bulge
//! tessellation, endpoint coercion and planar polygon extraction, with
//! nalgebra for point math.

pub mod arc;
pub mod coerce;
pub mod contour;
pub mod error;
pub mod linestring;
pub mod polygonize;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2};

pub use arc::{arc_points, bulge_arc, bulge_points, ArcParams, MAX_ARC_SEGMENTS};
pub use coerce::{coerce_line_ends, coerce_line_ends_with_report, DEFAULT_COERCION_DISTANCE};
pub use contour::{Bounds, Winding};
pub use error::{Error, Result};
pub use linestring::{GeometryCollection, LineString, Polygon, Ring};
pub use polygonize::{
    polygonize, polygonize_lines, PolygonizeOptions, Polygonization, SanitizeOptions,
};

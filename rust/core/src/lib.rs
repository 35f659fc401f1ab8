// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # CAD-Rings Core
//!
//! Data model for the entity stream handed over by a CAD drawing decoder.
//!
//! ## Overview
//!
//! - **Entities**: a closed [`Entity`] enum with one variant per curve kind
//!   (line, arc, polyline, spline) and an `Unsupported` catch-all
//! - **Drawing**: the entity stream plus the optional `$INSUNITS` header code
//! - **Units**: mapping of header codes onto [`DrawingUnit`]
//!
//! ## Quick Start
//!
//! ```rust
//! use cad_rings_core::{Drawing, DrawingUnit, Entity};
//!
//! let drawing = Drawing::new(vec![
//!     Entity::line(0.0, 0.0, 1.0, 0.0),
//!     Entity::arc(0.0, 0.0, 1.0, 0.0, 90.0),
//! ])
//! .with_unit_code(4);
//!
//! assert_eq!(drawing.unit(), Ok(Some(DrawingUnit::Millimeters)));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for entities and drawings

pub mod entity;
pub mod error;
pub mod units;

pub use entity::{
    ArcEntity, Drawing, Entity, LineEntity, PolylineEntity, PolylineKind, PolylineVertex,
    SplineEntity,
};
pub use error::{Error, Result};
pub use units::DrawingUnit;

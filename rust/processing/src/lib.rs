// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing processing shared by embedding applications
//!
//! Imports the curve entities of a decoded drawing as line strings and runs
//! them through ring extraction, retrying with endpoint coercion when the
//! raw line work does not close.
//!
//! ```rust
//! use cad_rings_core::{Drawing, Entity, PolylineEntity, PolylineVertex};
//! use cad_rings_processing::{process_drawing, PipelineConfig};
//!
//! let square = PolylineEntity::lightweight(
//!     vec![
//!         PolylineVertex::new(0.0, 0.0),
//!         PolylineVertex::new(4.0, 0.0),
//!         PolylineVertex::new(4.0, 4.0),
//!         PolylineVertex::new(0.0, 4.0),
//!     ],
//!     true,
//! );
//! let drawing = Drawing::new(vec![Entity::Polyline(square)]);
//!
//! let processed = process_drawing(&drawing, &PipelineConfig::default()).unwrap();
//! assert_eq!(processed.outcome.ring_count(), 1);
//! ```

pub mod error;
pub mod evaluator;
pub mod importer;
pub mod pipeline;

pub use error::{Error, Result};
pub use evaluator::{CurveEvaluator, DeBoorEvaluator, NurbsCurve};
pub use importer::{import_drawing, CurveImporter, ImportOptions, ImportSummary, ImportedDrawing};
pub use pipeline::{
    process_drawing, Pipeline, PipelineConfig, PipelineOutcome, PipelineReport, PipelineState,
    ProcessedDrawing,
};

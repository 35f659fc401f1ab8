// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring extraction pipeline with retry-on-coercion
//!
//! Extraction is first attempted on the line strings as imported. When no
//! ring comes out, endpoint coercion is applied once and extraction runs
//! again. The steps form an explicit state machine:
//!
//! ```text
//! Initial ──force_coercion──────────────────────────▶ CoercedRetry
//!    │                                                    │
//!    ▼                                                    ▼
//! ExtractedNoCoercion ──no rings, retry enabled──▶ CoercedRetry ──▶ Done
//!    │
//!    └──rings found / retry disabled──────────────────────────────▶ Done
//! ```

use std::str::FromStr;

use cad_rings_core::Drawing;
use cad_rings_geometry::{polygonize, GeometryCollection, Polygon, PolygonizeOptions, Polygonization};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::importer::{CurveImporter, ImportOptions, ImportSummary};

/// Pipeline settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Endpoints closer than this are snapped together on retry
    pub coercion_tolerance: f64,
    /// Coerce before the first extraction
    pub force_coercion: bool,
    /// Coerce and extract again when the first extraction finds no ring
    pub retry_with_coercion: bool,
    /// Drop collinear ring vertices
    pub simplify: bool,
    /// Arc and bulge sampling step (degrees)
    pub degrees_per_segment: f64,
    /// Spline sampling step as a fraction of the parameter domain
    pub spline_delta: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            coercion_tolerance: 1e-6,
            force_coercion: false,
            retry_with_coercion: true,
            simplify: true,
            degrees_per_segment: 1.0,
            spline_delta: 0.1,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from `CAD_RINGS_*` environment variables
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str, default| parse_or(lookup(key), default);
        let flag = |key: &str, default| parse_flag(lookup(key), default);

        Self {
            coercion_tolerance: read("CAD_RINGS_COERCION_TOLERANCE", defaults.coercion_tolerance),
            force_coercion: flag("CAD_RINGS_FORCE_COERCION", defaults.force_coercion),
            retry_with_coercion: flag("CAD_RINGS_RETRY_WITH_COERCION", defaults.retry_with_coercion),
            simplify: flag("CAD_RINGS_SIMPLIFY", defaults.simplify),
            degrees_per_segment: read("CAD_RINGS_DEGREES_PER_SEGMENT", defaults.degrees_per_segment),
            spline_delta: read("CAD_RINGS_SPLINE_DELTA", defaults.spline_delta),
        }
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            degrees_per_segment: self.degrees_per_segment,
            spline_delta: self.spline_delta,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}

/// Where a [`Pipeline`] is in its run
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineState {
    Initial,
    /// First extraction ran on the uncoerced line strings
    ExtractedNoCoercion(Polygonization),
    /// Coercion and a fresh extraction are next
    CoercedRetry,
    Done(Polygonization),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Initial => "initial",
            PipelineState::ExtractedNoCoercion(_) => "extracted_no_coercion",
            PipelineState::CoercedRetry => "coerced_retry",
            PipelineState::Done(_) => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, PipelineState::Done(_))
    }
}

/// Result of a finished pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub polygonization: Polygonization,
    /// Line strings as last extracted (coerced if coercion ran)
    pub geometry: GeometryCollection,
    pub coercion_applied: bool,
    /// Endpoint snaps made by coercion
    pub snapped_points: usize,
}

impl PipelineOutcome {
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygonization.polygons
    }

    pub fn ring_count(&self) -> usize {
        self.polygonization.ring_count()
    }

    pub fn report(&self) -> PipelineReport {
        let polygons = self.polygons();
        let total_area: f64 = polygons.iter().map(Polygon::area).sum();
        let unit = self.geometry.unit();
        PipelineReport {
            polygons: polygons.len(),
            holes: polygons.iter().map(|p| p.interiors.len()).sum(),
            dangles: self.polygonization.dangles.len(),
            cuts: self.polygonization.cuts.len(),
            invalid_rings: self.polygonization.invalid_rings.len(),
            coercion_applied: self.coercion_applied,
            snapped_points: self.snapped_points,
            total_area,
            total_area_m2: unit.map(|u| total_area * u.meters_per_unit().powi(2)),
            unit: unit.map(|u| u.symbol().to_string()),
            import: None,
        }
    }
}

/// Serializable summary of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub polygons: usize,
    pub holes: usize,
    pub dangles: usize,
    pub cuts: usize,
    pub invalid_rings: usize,
    pub coercion_applied: bool,
    pub snapped_points: usize,
    /// Sum of polygon areas in drawing units squared
    pub total_area: f64,
    /// Total area in square meters, when the drawing declares a unit
    pub total_area_m2: Option<f64>,
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportSummary>,
}

impl PipelineReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives one [`GeometryCollection`] through extraction and retry
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    collection: GeometryCollection,
    state: PipelineState,
    coerced: bool,
    snapped: usize,
}

impl Pipeline {
    pub fn new(collection: GeometryCollection, config: PipelineConfig) -> Self {
        Self {
            config,
            collection,
            state: PipelineState::Initial,
            coerced: false,
            snapped: 0,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn collection(&self) -> &GeometryCollection {
        &self.collection
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn coercion_applied(&self) -> bool {
        self.coerced
    }

    /// Advance by one transition; `Done` stays `Done`
    ///
    /// Extraction of an empty collection fails with `EmptyGeometry` and
    /// leaves the pipeline where it was.
    pub fn step(&mut self) -> Result<&PipelineState> {
        let next = match std::mem::replace(&mut self.state, PipelineState::Initial) {
            PipelineState::Initial if self.config.force_coercion => PipelineState::CoercedRetry,
            PipelineState::Initial => PipelineState::ExtractedNoCoercion(self.extract()?),
            PipelineState::ExtractedNoCoercion(result) => {
                if !result.is_empty() || self.coerced || !self.config.retry_with_coercion {
                    PipelineState::Done(result)
                } else {
                    tracing::debug!("No rings without coercion, retrying with coerced endpoints");
                    PipelineState::CoercedRetry
                }
            }
            PipelineState::CoercedRetry => {
                self.coerce();
                match self.extract() {
                    Ok(result) => PipelineState::Done(result),
                    Err(error) => {
                        self.state = PipelineState::CoercedRetry;
                        return Err(error);
                    }
                }
            }
            done @ PipelineState::Done(_) => done,
        };

        tracing::debug!(state = next.name(), "Pipeline step");
        self.state = next;
        Ok(&self.state)
    }

    /// Step until `Done` and return the outcome
    ///
    /// Finding no polygon is reported in the outcome, not as an error.
    pub fn run(mut self) -> Result<PipelineOutcome> {
        loop {
            if let PipelineState::Done(polygonization) = self.state {
                if polygonization.is_empty() {
                    tracing::error!(
                        line_strings = self.collection.len(),
                        coercion_applied = self.coerced,
                        "No polygons could be formed"
                    );
                } else {
                    tracing::info!(
                        polygons = polygonization.ring_count(),
                        coercion_applied = self.coerced,
                        snapped_points = self.snapped,
                        "Ring extraction complete"
                    );
                }

                return Ok(PipelineOutcome {
                    polygonization,
                    geometry: self.collection,
                    coercion_applied: self.coerced,
                    snapped_points: self.snapped,
                });
            }
            self.step()?;
        }
    }

    /// Coerce endpoints once per run
    fn coerce(&mut self) {
        if self.coerced {
            return;
        }
        self.snapped = self.collection.coerce_line_ends(self.config.coercion_tolerance);
        self.coerced = true;
    }

    fn extract(&self) -> Result<Polygonization> {
        let options = PolygonizeOptions {
            simplify: self.config.simplify,
        };
        Ok(polygonize(self.collection.lines(), &options)?)
    }
}

/// Import plus pipeline result for one drawing
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDrawing {
    pub summary: ImportSummary,
    pub outcome: PipelineOutcome,
}

impl ProcessedDrawing {
    pub fn report(&self) -> PipelineReport {
        let unit = self.outcome.geometry.unit();
        let total_area: f64 = self.outcome.polygons().iter().map(Polygon::area).sum();
        PipelineReport {
            import: Some(self.summary),
            ..self.outcome.report()
        }
    }
}

/// Import a drawing's curves and extract its rings
pub fn process_drawing(drawing: &Drawing, config: &PipelineConfig) -> Result<ProcessedDrawing> {
    let imported = CurveImporter::new(config.import_options()).import(drawing);
    let outcome = Pipeline::new(imported.geometry, *config).run()?;
    Ok(ProcessedDrawing {
        summary: imported.summary,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cad_rings_core::DrawingUnit;
    use cad_rings_geometry::{Error as GeometryError, LineString};

    fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::from_coords(coords).unwrap()
    }

    fn square() -> GeometryCollection {
        GeometryCollection::from_lines(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 1.0)]),
            line(&[(1.0, 1.0), (0.0, 1.0)]),
            line(&[(0.0, 1.0), (0.0, 0.0)]),
        ])
    }

    fn broken_square() -> GeometryCollection {
        GeometryCollection::from_lines(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(1.0, 0.0), (1.0, 1.0)]),
            line(&[(1.0, 1.0), (0.0, 1.0)]),
            line(&[(0.0, 1.0), (0.0, 1e-9)]),
        ])
    }

    #[test]
    fn test_initial_extracts_without_coercion() {
        let mut pipeline = Pipeline::new(square(), PipelineConfig::default());
        let state = pipeline.step().unwrap();
        assert!(matches!(state, PipelineState::ExtractedNoCoercion(r) if r.ring_count() == 1));
        assert!(!pipeline.coercion_applied());
    }

    #[test]
    fn test_initial_with_force_goes_to_retry() {
        let config = PipelineConfig {
            force_coercion: true,
            ..Default::default()
        };
        let mut pipeline = Pipeline::new(square(), config);
        assert_eq!(pipeline.step().unwrap(), &PipelineState::CoercedRetry);
    }

    #[test]
    fn test_rings_found_goes_to_done() {
        let mut pipeline = Pipeline::new(square(), PipelineConfig::default());
        pipeline.step().unwrap();
        assert!(pipeline.step().unwrap().is_done());

        // Done is terminal
        assert!(pipeline.step().unwrap().is_done());
    }

    #[test]
    fn test_no_rings_goes_to_retry() {
        let mut pipeline = Pipeline::new(broken_square(), PipelineConfig::default());
        pipeline.step().unwrap();
        assert_eq!(pipeline.step().unwrap(), &PipelineState::CoercedRetry);

        let state = pipeline.step().unwrap();
        assert!(matches!(state, PipelineState::Done(r) if r.ring_count() == 1));
        assert!(pipeline.coercion_applied());
    }

    #[test]
    fn test_no_rings_without_retry_goes_to_done() {
        let config = PipelineConfig {
            retry_with_coercion: false,
            ..Default::default()
        };
        let outcome = Pipeline::new(broken_square(), config).run().unwrap();
        assert_eq!(outcome.ring_count(), 0);
        assert!(!outcome.coercion_applied);
    }

    #[test]
    fn test_forced_coercion_runs_once() {
        let config = PipelineConfig {
            force_coercion: true,
            ..Default::default()
        };
        let outcome = Pipeline::new(broken_square(), config).run().unwrap();
        assert_eq!(outcome.ring_count(), 1);
        assert!(outcome.coercion_applied);
        assert_eq!(outcome.snapped_points, 1);
    }

    #[test]
    fn test_nothing_found_is_not_an_error() {
        let lines = GeometryCollection::from_lines(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(5.0, 5.0), (6.0, 5.0)]),
        ]);
        let outcome = Pipeline::new(lines, PipelineConfig::default()).run().unwrap();
        assert_eq!(outcome.ring_count(), 0);
        assert!(outcome.coercion_applied);
        assert_eq!(outcome.polygonization.dangles.len(), 2);
    }

    #[test]
    fn test_empty_collection_is_error() {
        let mut pipeline = Pipeline::new(GeometryCollection::new(), PipelineConfig::default());
        assert!(matches!(
            pipeline.step(),
            Err(crate::Error::Geometry(GeometryError::EmptyGeometry(_)))
        ));
        assert_eq!(pipeline.state(), &PipelineState::Initial);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = PipelineConfig::from_lookup(|key| match key {
            "CAD_RINGS_COERCION_TOLERANCE" => Some("1e-3".to_string()),
            "CAD_RINGS_FORCE_COERCION" => Some("true".to_string()),
            "CAD_RINGS_SIMPLIFY" => Some("0".to_string()),
            "CAD_RINGS_SPLINE_DELTA" => Some("not a number".to_string()),
            _ => None,
        });

        assert_eq!(config.coercion_tolerance, 1e-3);
        assert!(config.force_coercion);
        assert!(config.retry_with_coercion);
        assert!(!config.simplify);
        assert_eq!(config.spline_delta, 0.1);
        assert_eq!(config.degrees_per_segment, 1.0);
    }

    #[test]
    fn test_report_json() {
        let outcome = Pipeline::new(square(), PipelineConfig::default()).run().unwrap();
        let report = outcome.report();
        assert_eq!(report.polygons, 1);
        assert_eq!(report.total_area, 1.0);

        let json = report.to_json().unwrap();
        let parsed: PipelineReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(!json.contains("import"));
        assert_eq!(report.total_area_m2, None);
    }

    #[test]
    fn test_report_area_in_square_meters() {
        let lines = square().into_lines();
        let collection =
            GeometryCollection::from_lines(lines).with_unit(Some(DrawingUnit::Centimeters));
        let report = Pipeline::new(collection, PipelineConfig::default())
            .run()
            .unwrap()
            .report();

        assert_eq!(report.unit.as_deref(), Some("cm"));
        assert_eq!(report.total_area, 1.0);
        assert_relative_eq!(report.total_area_m2.unwrap(), 1e-4, max_relative = 1e-12);
    }
}

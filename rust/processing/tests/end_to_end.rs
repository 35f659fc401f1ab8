// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing in, rings out: import and pipeline together.

use approx::assert_relative_eq;
use cad_rings_core::{Drawing, DrawingUnit, Entity, PolylineEntity, PolylineVertex};
use cad_rings_geometry::{polygonize, GeometryCollection, PolygonizeOptions};
use cad_rings_processing::{process_drawing, CurveImporter, PipelineConfig, PipelineReport};
use std::f64::consts::PI;

/// 4 x 2 rectangle whose top edge bulges out into a half circle
fn bulged_slot() -> PolylineEntity {
    PolylineEntity::lightweight(
        vec![
            PolylineVertex::new(0.0, 0.0),
            PolylineVertex::new(4.0, 0.0),
            PolylineVertex::with_bulge(4.0, 2.0, 1.0),
            PolylineVertex::new(0.0, 2.0),
        ],
        true,
    )
}

#[test]
fn test_bulged_polyline_and_line() {
    let drawing = Drawing::new(vec![
        Entity::Polyline(bulged_slot()),
        Entity::line(10.0, 0.0, 12.0, 0.0),
    ]);

    let imported = CurveImporter::default().import(&drawing);
    let summary = imported.summary;
    assert_eq!(summary.polylines, 1);
    assert_eq!(summary.lines, 1);
    assert_eq!(summary.arcs, 0);
    assert_eq!(summary.splines, 0);
    assert_eq!(summary.skipped, 0);

    // The polyline ring alone
    let ring_only = &imported.geometry.lines()[..1];
    let result = polygonize(ring_only, &PolygonizeOptions::default()).unwrap();
    assert_eq!(result.ring_count(), 1);

    let ring = result.rings().next().unwrap();
    assert!(ring.is_ccw());
    // Rectangle plus a half disc of radius 2, up to chord error of the 1 degree sampling
    assert_relative_eq!(ring.area(), 8.0 + PI * 2.0, epsilon = 1e-3);
}

#[test]
fn test_process_drawing_reports_dangles() {
    let drawing = Drawing::new(vec![
        Entity::Polyline(bulged_slot()),
        Entity::line(10.0, 0.0, 12.0, 0.0),
    ])
    .with_unit_code(4);

    let processed = process_drawing(&drawing, &PipelineConfig::default()).unwrap();
    let outcome = &processed.outcome;

    assert_eq!(outcome.ring_count(), 1);
    assert_eq!(outcome.polygonization.dangles.len(), 1);
    assert!(!outcome.coercion_applied);
    assert_eq!(outcome.geometry.unit(), Some(DrawingUnit::Millimeters));
}

#[test]
fn test_gapped_lines_close_after_retry() {
    let gap = 1e-8;
    let drawing = Drawing::new(vec![
        Entity::line(0.0, 0.0, 5.0, 0.0),
        Entity::line(5.0, 0.0, 5.0, 3.0),
        Entity::line(5.0 - gap, 3.0, 0.0, 3.0),
        Entity::line(0.0, 3.0, 0.0, gap),
    ]);

    let processed = process_drawing(&drawing, &PipelineConfig::default()).unwrap();
    let outcome = &processed.outcome;
    assert_eq!(outcome.ring_count(), 1);
    assert!(outcome.coercion_applied);
    assert_eq!(outcome.snapped_points, 2);
    assert_relative_eq!(outcome.polygons()[0].area(), 15.0, epsilon = 1e-6);

    let without_retry = PipelineConfig {
        retry_with_coercion: false,
        ..Default::default()
    };
    let processed = process_drawing(&drawing, &without_retry).unwrap();
    assert_eq!(processed.outcome.ring_count(), 0);
    assert_eq!(processed.outcome.polygonization.dangles.len(), 4);
}

#[test]
fn test_room_with_column_hole() {
    let mut lines = GeometryCollection::new();
    let room = [(0.0, 0.0), (6.0, 0.0), (6.0, 4.0), (0.0, 4.0), (0.0, 0.0)];
    let column = [(2.0, 1.0), (3.0, 1.0), (3.0, 2.0), (2.0, 2.0), (2.0, 1.0)];
    for w in room.windows(2).chain(column.windows(2)) {
        lines.push(cad_rings_geometry::LineString::from_coords(w).unwrap());
    }

    let result = polygonize(lines.lines(), &PolygonizeOptions::default()).unwrap();
    assert_eq!(result.ring_count(), 2);
    assert_eq!(result.polygons[0].interiors.len(), 1);
    assert_relative_eq!(result.polygons[0].area(), 23.0);
}

#[test]
fn test_drawing_from_json() {
    let json = r#"{
        "unit_code": 6,
        "entities": [
            {"Polyline": {
                "kind": "Lightweight",
                "vertices": [
                    {"location": [0.0, 0.0]},
                    {"location": [2.0, 0.0]},
                    {"location": [2.0, 2.0], "bulge": 0.0},
                    {"location": [0.0, 2.0]}
                ],
                "closed": true
            }},
            {"Arc": {"center": [10.0, 10.0], "radius": 1.0, "start_angle": 0.0, "end_angle": 90.0}},
            {"Unsupported": {"kind": "TEXT"}}
        ]
    }"#;

    let drawing: Drawing = serde_json::from_str(json).unwrap();
    let processed = process_drawing(&drawing, &PipelineConfig::default()).unwrap();

    let report = processed.report();
    assert_eq!(report.polygons, 1);
    assert_eq!(report.dangles, 1);
    assert_eq!(report.unit.as_deref(), Some("m"));
    assert_relative_eq!(report.total_area, 4.0);
    assert_eq!(report.total_area_m2, Some(4.0));

    let import = report.import.unwrap();
    assert_eq!(import.polylines, 1);
    assert_eq!(import.arcs, 1);
    assert_eq!(import.skipped, 1);

    let parsed: PipelineReport = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(parsed, report);
}

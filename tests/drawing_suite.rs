use std::path::Path;

use archdraw::config::{Config, DrawingOptions, ElevationOptions};
use archdraw::dump::write_geometry_dump;
use archdraw::render::{elevation, floor_plan, section};
use archdraw::validate::{PanelClass, Policy, ValidationOptions, enforce};
use archdraw::{
    BuildingGeometry, Orientation, SectionCut, ViewRequest, geometry_fingerprint, normalize,
    parse_building_spec, render_all, render_view, resolve_floor_count,
};

fn load_fixture(name: &str) -> BuildingGeometry {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    let raw = parse_building_spec(&input).expect("fixture parse failed");
    normalize(&raw)
}

fn expecting(rooms: usize) -> DrawingOptions {
    DrawingOptions {
        expected_room_count: rooms,
        ..DrawingOptions::default()
    }
}

#[test]
fn two_room_plan_end_to_end() {
    let geometry = load_fixture("two_room.json");
    let svg = floor_plan::generate(&geometry, 0, &expecting(2)).expect("plan should render");

    assert_eq!(svg.matches("class=\"room-fill\"").count(), 2);
    assert!(svg.contains("data-room=\"Living Room\""));
    assert!(svg.contains("data-room=\"Kitchen\""));
    assert!(svg.contains(">Living Room</text>"));
    assert!(svg.contains(">Kitchen</text>"));
    assert_eq!(svg.matches("20.0 m²").count(), 2);
    assert!(svg.contains("class=\"wall-exterior\""));
    assert!(svg.contains("Two Room Cottage"));

    let mut config = Config::default();
    config.plan.expected_room_count = 2;
    let view = render_view(&geometry, ViewRequest::FloorPlan(0), &config).unwrap();
    assert!(view.validation.valid);
    assert!(view.validation.errors.is_empty());
    assert_eq!(view.validation.metrics.actual_room_count, 2);
    assert!(view.validation.metrics.has_interior_walls);
}

#[test]
fn hard_gates_fire_before_any_drawing() {
    let mut geometry = load_fixture("two_room.json");

    let err = floor_plan::generate(&geometry, 5, &expecting(2)).unwrap_err();
    assert_eq!(err.code(), "MISSING_FLOOR_DATA");
    assert!(err.is_recoverable());

    let kitchen = geometry.floors.get_mut(&0).unwrap().rooms.pop().unwrap();
    let err = floor_plan::generate(&geometry, 0, &expecting(2)).unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_ROOMS_FOR_INTERIOR_WALLS");

    let floor = geometry.floors.get_mut(&0).unwrap();
    floor.rooms.clear();
    let err = floor_plan::generate(&geometry, 0, &expecting(3)).unwrap_err();
    assert_eq!(err.code(), "EMPTY_ROOM_GEOMETRY");
    let detail = err.gate_detail().unwrap();
    assert_eq!(detail.expected_room_count, 3);
    assert_eq!(detail.actual_room_count, 0);

    geometry.floors.get_mut(&0).unwrap().rooms.push(kitchen);
    assert!(floor_plan::generate(&geometry, 0, &DrawingOptions::default()).is_ok());
}

#[test]
fn declared_empty_upper_floor_reports_empty_rooms() {
    let raw = parse_building_spec(
        r#"{
            "populatedGeometry": {
                "floors": [
                    {"rooms": [
                        {"name": "Hall", "polygon": [[0,0],[5,0],[5,4],[0,4]]},
                        {"name": "Study", "polygon": [[5,0],[10,0],[10,4],[5,4]]}
                    ]},
                    {"rooms": []}
                ]
            }
        }"#,
    )
    .unwrap();
    let geometry = normalize(&raw);
    assert_eq!(resolve_floor_count(&geometry), 2);
    assert!(geometry.floor(1).is_some());
    assert!(ViewRequest::full_set(&geometry).contains(&ViewRequest::FloorPlan(1)));

    let err = floor_plan::generate(&geometry, 1, &expecting(2)).unwrap_err();
    assert_eq!(err.code(), "EMPTY_ROOM_GEOMETRY");
    let detail = err.gate_detail().unwrap();
    assert_eq!(detail.actual_room_count, 0);

    assert!(floor_plan::generate(&geometry, 0, &expecting(2)).is_ok());
}

#[test]
fn generation_is_byte_identical_across_calls() {
    let geometry = load_fixture("two_storey.json");
    let options = expecting(3);
    assert_eq!(
        floor_plan::generate(&geometry, 0, &options).unwrap(),
        floor_plan::generate(&geometry, 0, &options).unwrap()
    );
    let elevation_options = ElevationOptions::default();
    assert_eq!(
        elevation::generate(&geometry, Orientation::West, &elevation_options).unwrap(),
        elevation::generate(&geometry, Orientation::West, &elevation_options).unwrap()
    );
    assert_eq!(
        section::generate(&geometry, SectionCut::Longitudinal, &elevation_options).unwrap(),
        section::generate(&geometry, SectionCut::Longitudinal, &elevation_options).unwrap()
    );
}

#[test]
fn plan_and_elevation_agree_on_floor_count() {
    let geometry = load_fixture("two_storey.json");
    assert_eq!(resolve_floor_count(&geometry), 2);

    let plan = floor_plan::generate(&geometry, 1, &expecting(2)).unwrap();
    let north = elevation::generate(&geometry, Orientation::North, &ElevationOptions::default()).unwrap();
    let cut = section::generate(&geometry, SectionCut::Transverse, &ElevationOptions::default()).unwrap();
    for svg in [&plan, &north, &cut] {
        assert!(svg.contains("data-floor-count=\"2\""));
    }
    assert!(plan.contains("First Floor Plan"));
}

#[test]
fn north_elevation_uses_explicit_facade_openings() {
    let geometry = load_fixture("two_storey.json");
    let svg = elevation::generate(&geometry, Orientation::North, &ElevationOptions::default()).unwrap();

    assert_eq!(svg.matches("class=\"door\"").count(), 1);
    assert_eq!(svg.matches("class=\"window\"").count(), 2);
    assert_eq!(svg.matches("class=\"level-marker\"").count(), 3);
    assert!(svg.contains("+0.00"));
    assert!(svg.contains("+3.00"));
    assert!(svg.contains("Ridge +"));
    assert!(svg.contains("url(#pattern-brick)"));
    assert!(svg.contains("url(#pattern-slate)"));
    assert!(svg.contains("North Elevation"));
}

#[test]
fn semantic_rooms_are_packed_and_drawn() {
    let geometry = load_fixture("semantic_rooms.json");
    assert_eq!(geometry.rooms().count(), 3);
    assert!(geometry.footprint().is_some());

    let svg = floor_plan::generate(&geometry, 0, &expecting(3)).unwrap();
    assert_eq!(svg.matches("class=\"room-fill\"").count(), 3);
    assert!(svg.contains("class=\"wall-interior\""));
}

#[test]
fn json5_legacy_walls_carry_their_doors() {
    let geometry = load_fixture("legacy.json5");
    let floor = geometry.floor(0).unwrap();
    assert_eq!(floor.rooms.len(), 2);
    assert_eq!(floor.walls.len(), 1);
    assert_eq!(floor.walls[0].openings.len(), 1);
    assert!((floor.walls[0].openings[0].position - 2.5).abs() < 1e-9);

    let svg = floor_plan::generate(&geometry, 0, &expecting(2)).unwrap();
    assert!(svg.contains("class=\"door-swing\""));
    assert!(svg.contains("class=\"door-leaf\""));
    assert!(svg.contains("Legacy Studio"));
}

#[test]
fn invalid_paths_fall_back_or_abort_by_panel() {
    let geometry = load_fixture("two_room.json");
    let svg = elevation::generate(&geometry, Orientation::South, &ElevationOptions::default()).unwrap();
    let broken = svg.replacen(
        "</svg>",
        "<path class=\"facade\" d=\"undefined L 10 10\"/></svg>",
        1,
    );

    let repaired = enforce(broken.clone(), &ValidationOptions::new(PanelClass::Elevation)).unwrap();
    assert!(repaired.result.valid);
    assert!(repaired.svg.contains("class=\"fallback\""));
    assert!(!repaired.svg.contains("undefined"));
    assert!(repaired.result.warnings.iter().any(|w| w.contains("fallback")));

    let strict = ValidationOptions::new(PanelClass::Elevation).with_policy(Policy::Abort);
    let err = enforce(broken, &strict).unwrap_err();
    assert_eq!(err.code(), "SVG_VALIDATION_FAILED");
}

#[test]
fn full_view_set_renders_in_order_with_one_fingerprint() {
    let geometry = load_fixture("two_storey.json");
    let requests = ViewRequest::full_set(&geometry);
    assert_eq!(requests.len(), 8);

    let mut config = Config::default();
    config.plan.expected_room_count = 2;
    let results = render_all(&geometry, &requests, &config);
    let fingerprint = geometry_fingerprint(&geometry);
    for (request, result) in requests.iter().zip(&results) {
        let view = result.as_ref().expect("every view should render");
        assert_eq!(view.request, *request);
        assert_eq!(view.fingerprint, fingerprint);
        assert!(view.svg.starts_with("<svg"));
    }

    let again = render_all(&geometry, &requests, &config);
    for (a, b) in results.iter().zip(&again) {
        assert_eq!(a.as_ref().unwrap().svg, b.as_ref().unwrap().svg);
    }
}

#[test]
fn geometry_dump_reports_resolved_values() {
    let geometry = load_fixture("two_storey.json");
    let path = std::env::temp_dir().join(format!("archdraw-dump-{}.json", std::process::id()));
    write_geometry_dump(&path, &geometry).unwrap();
    let dumped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(dumped["floorCount"], 2);
    assert_eq!(dumped["floorHeights"], serde_json::json!([3.0, 2.8]));
    assert_eq!(dumped["fingerprint"], geometry_fingerprint(&geometry));
}

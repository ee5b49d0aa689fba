use archdraw::config::{Config, DrawingOptions, ElevationOptions};
use archdraw::ir::Orientation;
use archdraw::normalize::{normalize, parse_building_spec};
use archdraw::render::{elevation, floor_plan};
use archdraw::views::{ViewRequest, render_all};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};
use std::hint::black_box;

/// Room program with no coordinates, spread over `floors` storeys, so the
/// packer and the derived walls do all the work.
fn room_program(rooms: usize, floors: usize) -> Value {
    const TYPES: [&str; 6] = ["living", "kitchen", "bedroom", "bathroom", "study", "dining"];
    let list: Vec<Value> = (0..rooms)
        .map(|n| {
            json!({
                "name": format!("Room {}", n + 1),
                "type": TYPES[n % TYPES.len()],
                "area": 8.0 + (n % 5) as f64 * 3.5,
                "floor": n % floors.max(1),
            })
        })
        .collect();
    json!({ "name": "Bench House", "roofType": "hip", "rooms": list })
}

fn fixture(name: &str) -> &'static str {
    match name {
        "two_room" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/two_room.json"
        )),
        "two_storey" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/two_storey.json"
        )),
        "legacy" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/legacy.json5"
        )),
        _ => panic!("unknown fixture {name}"),
    }
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    for name in ["two_room", "two_storey", "legacy"] {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, input| {
            b.iter(|| {
                let raw = parse_building_spec(black_box(input)).expect("parse failed");
                black_box(normalize(&raw).floors.len());
            });
        });
    }
    for rooms in [12usize, 48, 120] {
        let raw = room_program(rooms, 2);
        group.bench_with_input(
            BenchmarkId::new("packed_program", rooms),
            &raw,
            |b, raw| {
                b.iter(|| black_box(normalize(black_box(raw)).floors.len()));
            },
        );
    }
    group.finish();
}

fn bench_floor_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("floor_plan");
    let options = DrawingOptions::default();
    for rooms in [4usize, 16, 64] {
        let geometry = normalize(&room_program(rooms, 1));
        group.bench_with_input(BenchmarkId::from_parameter(rooms), &geometry, |b, geometry| {
            b.iter(|| {
                let svg = floor_plan::generate(black_box(geometry), 0, &options).expect("render failed");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_elevation(c: &mut Criterion) {
    let mut group = c.benchmark_group("elevation");
    let options = ElevationOptions::default();
    let raw = parse_building_spec(fixture("two_storey")).expect("parse failed");
    let geometry = normalize(&raw);
    for side in Orientation::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(side.label()),
            &geometry,
            |b, geometry| {
                b.iter(|| {
                    let svg = elevation::generate(black_box(geometry), side, &options)
                        .expect("render failed");
                    black_box(svg.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_view_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_set");
    let config = Config::default();
    for floors in [1usize, 3, 6] {
        let geometry = normalize(&room_program(floors * 6, floors));
        let requests = ViewRequest::full_set(&geometry);
        group.bench_with_input(BenchmarkId::from_parameter(floors), &geometry, |b, geometry| {
            b.iter(|| black_box(render_all(black_box(geometry), &requests, &config).len()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_floor_plan,
    bench_elevation,
    bench_view_set
);
criterion_main!(benches);

//! Wall resolution for a floor: explicit walls first, then an exterior
//! perimeter and interior partitions derived from the room outlines when the
//! upstream data carried none.

use std::collections::BTreeSet;

use crate::geometry::{Point, Rect, segment_frame};
use crate::ir::{BuildingGeometry, FloorPlan, Orientation, Room, Wall, WallKind};

const COORD_TOLERANCE: f64 = 1e-3;

/// Walls to draw for `floor`. Explicit walls keep their indices so
/// floor-level openings still resolve; derived walls are appended.
pub fn resolve_walls(geometry: &BuildingGeometry, floor: &FloorPlan) -> Vec<Wall> {
    let mut walls = floor.walls.clone();
    let has_exterior = walls.iter().any(Wall::is_exterior);
    let has_interior = walls.iter().any(|w| !w.is_exterior());
    let footprint = geometry.footprint();

    if !has_exterior {
        if let Some(footprint) = footprint {
            let derived = perimeter_walls(footprint, geometry.dimensions.wall_thickness);
            tracing::debug!(count = derived.len(), "derived exterior walls from footprint");
            walls.extend(derived);
        }
    }
    if !has_interior {
        let derived = partition_walls(
            &floor.rooms,
            footprint,
            geometry.dimensions.interior_wall_thickness,
            geometry.dimensions.wall_thickness,
        );
        if !derived.is_empty() {
            tracing::debug!(count = derived.len(), "derived interior walls from room edges");
        }
        walls.extend(derived);
    }
    walls
}

/// Four walls centred on the footprint edges, each extended by half the
/// thickness so the corners close. Facades follow the sheet: top is north.
pub fn perimeter_walls(footprint: Rect, thickness: f64) -> Vec<Wall> {
    let [nw, ne, se, sw] = footprint.corners();
    let sides = [
        (nw, ne, Orientation::North),
        (ne, se, Orientation::East),
        (se, sw, Orientation::South),
        (sw, nw, Orientation::West),
    ];
    sides
        .into_iter()
        .filter_map(|(start, end, facade)| {
            let (dir, _, _) = segment_frame(start, end)?;
            let extend = dir.scale(thickness / 2.0);
            let mut wall = Wall::new(start.sub(extend), end.add(extend), thickness, WallKind::Exterior);
            wall.facade = Some(facade);
            Some(wall)
        })
        .collect()
}

/// One interior wall per distinct room edge that does not lie on the
/// footprint boundary. Edges shared by two rooms are emitted once. Edges
/// within `exterior_thickness` of the footprint run along the exterior wall
/// and count as boundary.
pub fn partition_walls(
    rooms: &[Room],
    footprint: Option<Rect>,
    thickness: f64,
    exterior_thickness: f64,
) -> Vec<Wall> {
    let band = exterior_thickness.max(0.0) + COORD_TOLERANCE;
    if rooms.len() < 2 {
        return Vec::new();
    }
    let mut seen = BTreeSet::new();
    let mut walls = Vec::new();
    for room in rooms {
        let outline = room.outline();
        for (i, a) in outline.iter().enumerate() {
            let b = outline[(i + 1) % outline.len()];
            if segment_frame(*a, b).is_none() {
                continue;
            }
            if footprint.is_some_and(|fp| on_boundary(*a, b, fp, band)) {
                continue;
            }
            if !seen.insert(edge_key(*a, b)) {
                continue;
            }
            walls.push(Wall::new(*a, b, thickness, WallKind::Interior));
        }
    }
    walls
}

fn on_boundary(a: Point, b: Point, fp: Rect, band: f64) -> bool {
    let near = |u: f64, v: f64| (u - v).abs() <= band;
    (near(a.x, fp.x) && near(b.x, fp.x))
        || (near(a.x, fp.max_x()) && near(b.x, fp.max_x()))
        || (near(a.y, fp.y) && near(b.y, fp.y))
        || (near(a.y, fp.max_y()) && near(b.y, fp.max_y()))
}

type EdgeKey = ((i64, i64), (i64, i64));

fn edge_key(a: Point, b: Point) -> EdgeKey {
    let quantize = |p: Point| {
        (
            (p.x / COORD_TOLERANCE).round() as i64,
            (p.y / COORD_TOLERANCE).round() as i64,
        )
    };
    let (qa, qb) = (quantize(a), quantize(b));
    if qa <= qb { (qa, qb) } else { (qb, qa) }
}

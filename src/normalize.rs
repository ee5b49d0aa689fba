//! Reconciles heterogeneous upstream building descriptions into one
//! [`BuildingGeometry`]. Missing optional data lowers fidelity; it never
//! produces an error.

use std::collections::BTreeMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::geometry::{self, Point, Rect};
use crate::ir::{
    BuildingGeometry, DEFAULT_INTERIOR_WALL_THICKNESS, DEFAULT_ROOF_PITCH, DEFAULT_WALL_THICKNESS,
    Dimensions, Envelope, FacadeOpening, FloorIndex, FloorPlan, Material, Metadata, Opening,
    OpeningKind, Orientation, RoofType, Room, RoomShape, Wall, WallKind,
};
use crate::pack::{self, RoomFootprint};

/// Storey height assumed when only the total height is known.
pub const TYPICAL_FLOOR_HEIGHT: f64 = 2.7;

/// Upper bound on the resolved storey count.
pub const MAX_FLOORS: u32 = 200;

const DEFAULT_ROOM_SIDE: f64 = 3.0;
const MIN_PACKING_WIDTH: f64 = 6.0;

static FLOOR_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(-?\d+)").unwrap());

/// Parses upstream text as strict JSON, falling back to JSON5 for the
/// trailing commas and comments generators tend to emit.
pub fn parse_building_spec(input: &str) -> Result<Value> {
    match serde_json::from_str::<Value>(input) {
        Ok(value) => Ok(value),
        Err(strict) => json5::from_str::<Value>(input).map_err(|lenient| {
            anyhow::anyhow!("building spec is neither JSON ({strict}) nor JSON5 ({lenient})")
        }),
    }
}

/// Resolves the storey count with a strict priority cascade: explicit count,
/// explicit per-floor array length, highest room floor index + 1, floor
/// heights length, then `round(height / 2.7)`, never less than one.
///
/// Every renderer goes through this function so plan, elevation and section
/// views of one building always agree. The result never exceeds
/// [`MAX_FLOORS`].
pub fn resolve_floor_count(geometry: &BuildingGeometry) -> u32 {
    let count = cascade_floor_count(geometry);
    if count > u64::from(MAX_FLOORS) {
        tracing::warn!(resolved = count, max = MAX_FLOORS, "clamping implausible floor count");
        return MAX_FLOORS;
    }
    count as u32
}

fn cascade_floor_count(geometry: &BuildingGeometry) -> u64 {
    if let Some(count) = geometry.dimensions.floor_count.filter(|c| *c > 0) {
        return u64::from(count);
    }
    if let Some(declared) = geometry.declared_floors.filter(|c| *c > 0) {
        return declared as u64;
    }
    if let Some(max_index) = geometry.rooms().map(|room| room.floor_index).max() {
        return u64::from(max_index) + 1;
    }
    if !geometry.dimensions.floor_heights.is_empty() {
        return geometry.dimensions.floor_heights.len() as u64;
    }
    match geometry.dimensions.height {
        Some(height) if height.is_finite() && height > 0.0 => {
            ((height / TYPICAL_FLOOR_HEIGHT).round() as u64).max(1)
        }
        _ => 1,
    }
}

/// Height of each storey, `floor_count` entries long. Explicit heights win,
/// then an even split of the total height, then the typical storey height.
pub fn resolve_floor_heights(geometry: &BuildingGeometry) -> Vec<f64> {
    let count = resolve_floor_count(geometry) as usize;
    let dims = &geometry.dimensions;
    let even = dims
        .height
        .filter(|h| h.is_finite() && *h > 0.0)
        .map(|h| h / count as f64)
        .unwrap_or(TYPICAL_FLOOR_HEIGHT);
    (0..count)
        .map(|idx| {
            dims.floor_heights
                .get(idx)
                .copied()
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(even)
        })
        .collect()
}

struct ExtractContext {
    building_width: Option<f64>,
    wall_thickness: f64,
    interior_wall_thickness: f64,
}

struct ExtractedFloors {
    floors: BTreeMap<FloorIndex, FloorPlan>,
    declared_floors: Option<usize>,
    packed_extent: Option<(f64, f64)>,
}

const GEOMETRY_KEYS: [&str; 3] = ["populatedGeometry", "populated_geometry", "geometry"];

type Extractor = fn(&Value, &ExtractContext) -> Option<ExtractedFloors>;

/// Tried in order; the first strategy that yields geometry wins.
const EXTRACTORS: &[(&str, Extractor)] = &[
    ("populated-geometry", extract_populated_geometry),
    ("nested-container", extract_nested_container),
    ("legacy-geometry", extract_legacy_geometry),
    ("semantic-rooms", extract_semantic_rooms),
    ("packed-geometry", extract_packed_geometry),
];

pub fn normalize(raw: &Value) -> BuildingGeometry {
    let mut dimensions = read_dimensions(raw);
    let ctx = ExtractContext {
        building_width: dimensions.width,
        wall_thickness: dimensions.wall_thickness,
        interior_wall_thickness: dimensions.interior_wall_thickness,
    };

    let mut declared_floors = top_level_floor_array(raw).map(|floors| floors.len());
    let mut floors = BTreeMap::new();
    for (name, extractor) in EXTRACTORS {
        if let Some(extracted) = extractor(raw, &ctx) {
            tracing::debug!(
                strategy = *name,
                floors = extracted.floors.len(),
                "extracted floor geometry"
            );
            declared_floors = declared_floors.or(extracted.declared_floors);
            if let Some((width, depth)) = extracted.packed_extent {
                dimensions.width.get_or_insert(width);
                dimensions.depth.get_or_insert(depth);
            }
            floors = extracted.floors;
            break;
        }
    }
    if floors.is_empty() {
        tracing::warn!("no room or wall geometry found in building spec");
    }

    BuildingGeometry {
        floors,
        dimensions,
        materials: read_materials(raw),
        envelope: read_envelope(raw),
        metadata: read_metadata(raw),
        declared_floors,
    }
}

fn extract_populated_geometry(raw: &Value, ctx: &ExtractContext) -> Option<ExtractedFloors> {
    GEOMETRY_KEYS
        .iter()
        .filter_map(|key| raw.get(*key))
        .find_map(|container| parse_container(container, ctx, true))
}

fn extract_nested_container(raw: &Value, ctx: &ExtractContext) -> Option<ExtractedFloors> {
    const PARENTS: [&str; 5] = ["buildingGeometry", "building", "design", "model", "geometry"];
    PARENTS
        .iter()
        .filter_map(|key| raw.get(*key))
        .filter_map(|parent| field(parent, &["geometry", "floorGeometry"]))
        .find_map(|container| parse_container(container, ctx, false))
}

fn extract_legacy_geometry(raw: &Value, ctx: &ExtractContext) -> Option<ExtractedFloors> {
    parse_container(raw, ctx, true)
}

fn extract_semantic_rooms(raw: &Value, ctx: &ExtractContext) -> Option<ExtractedFloors> {
    let rooms = field(raw, &["rooms", "roomProgram", "spaces"])
        .or_else(|| raw.get("program").and_then(|p| field(p, &["rooms", "spaces"])))
        .and_then(Value::as_array)?;
    if rooms.is_empty() {
        return None;
    }
    let mut by_floor: BTreeMap<FloorIndex, Vec<&Value>> = BTreeMap::new();
    for room in rooms {
        by_floor.entry(read_floor_index(room).unwrap_or(0)).or_default().push(room);
    }
    let width = packing_width(ctx, rooms.iter());
    let mut floors = BTreeMap::new();
    let mut max_depth: f64 = 0.0;
    for (index, values) in by_floor {
        let mut floor = FloorPlan::default();
        let footprints: Vec<(RoomFootprint, String)> = values
            .iter()
            .enumerate()
            .map(|(n, value)| (read_footprint(value, n), read_room_type(value)))
            .collect();
        max_depth = max_depth.max(place_footprints(&mut floor, footprints, index, width, ctx, 0.0));
        floors.insert(index, floor);
    }
    Some(ExtractedFloors {
        floors,
        declared_floors: None,
        packed_extent: Some((width, max_depth + ctx.wall_thickness)),
    })
}

/// Geometry containers whose rooms carry no coordinates at all. Earlier
/// strategies skip them in favour of better data; here they are packed
/// rather than lost.
fn extract_packed_geometry(raw: &Value, ctx: &ExtractContext) -> Option<ExtractedFloors> {
    GEOMETRY_KEYS
        .iter()
        .filter_map(|key| raw.get(*key))
        .chain(std::iter::once(raw))
        .find_map(|container| parse_container(container, ctx, false))
}

fn parse_container(
    container: &Value,
    ctx: &ExtractContext,
    require_coordinates: bool,
) -> Option<ExtractedFloors> {
    if !container.is_object() {
        return None;
    }
    let mut floors: BTreeMap<FloorIndex, FloorPlan> = BTreeMap::new();
    let mut declared_floors = None;
    let mut packed_extent = None;
    let width = packing_width(ctx, std::iter::empty());

    if let Some(array) = field(container, &["floors", "floorPlans", "levels"]).and_then(Value::as_array) {
        declared_floors = Some(array.len());
        for (position, floor_value) in array.iter().enumerate() {
            let index = read_number(floor_value, &["index", "floorIndex", "level", "floor"])
                .filter(|n| *n >= 0.0)
                .map(|n| n as FloorIndex)
                .unwrap_or(position as FloorIndex);
            let (floor, extent) = parse_floor(floor_value, index, width, ctx);
            packed_extent = merge_extent(packed_extent, extent);
            floors.insert(index, floor);
        }
    } else if let Some(map) = field(container, &["floors", "floorPlans", "levels"]).and_then(Value::as_object) {
        let mut keyed: Vec<(FloorIndex, &Value)> = map
            .iter()
            .filter_map(|(key, value)| parse_floor_key(key).map(|idx| (idx, value)))
            .collect();
        keyed.sort_by_key(|(idx, _)| *idx);
        declared_floors = Some(keyed.len());
        for (index, floor_value) in keyed {
            let (floor, extent) = parse_floor(floor_value, index, width, ctx);
            packed_extent = merge_extent(packed_extent, extent);
            floors.insert(index, floor);
        }
    } else if field(container, &["rooms", "walls"]).is_some() {
        floors = split_flat_floors(container, width, ctx, &mut packed_extent);
    } else {
        return None;
    }

    // Declared floors stay even when empty so the plan gates can classify
    // them; only a container with no content anywhere is skipped.
    if floors
        .values()
        .all(|floor| floor.rooms.is_empty() && floor.walls.is_empty())
    {
        return None;
    }
    if require_coordinates && packed_extent.is_some() {
        let any_walls = floors.values().any(|floor| !floor.walls.is_empty());
        if !any_walls && !has_coordinates(container) {
            return None;
        }
    }
    Some(ExtractedFloors {
        floors,
        declared_floors,
        packed_extent: packed_extent.map(|(_, depth)| (width, depth + ctx.wall_thickness)),
    })
}

fn merge_extent(current: Option<(f64, f64)>, next: Option<(f64, f64)>) -> Option<(f64, f64)> {
    match (current, next) {
        (Some(a), Some(b)) => Some((a.0.max(b.0), a.1.max(b.1))),
        (a, b) => a.or(b),
    }
}

fn has_coordinates(container: &Value) -> bool {
    fn room_placed(room: &Value) -> bool {
        room_polygon(room).is_some() || room_rect(room).is_some()
    }
    let direct = field(container, &["rooms"])
        .and_then(Value::as_array)
        .map(|rooms| rooms.iter().any(room_placed))
        .unwrap_or(false);
    let nested = field(container, &["floors", "floorPlans", "levels"])
        .map(|floors| {
            let values: Vec<&Value> = match floors {
                Value::Array(items) => items.iter().collect(),
                Value::Object(map) => map.values().collect(),
                _ => Vec::new(),
            };
            values.iter().any(|floor| {
                field(floor, &["rooms", "spaces"])
                    .and_then(Value::as_array)
                    .map(|rooms| rooms.iter().any(room_placed))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false);
    direct || nested
}

/// Groups a flat `rooms`/`walls`/`openings` container by each entry's floor.
fn split_flat_floors(
    container: &Value,
    width: f64,
    ctx: &ExtractContext,
    packed_extent: &mut Option<(f64, f64)>,
) -> BTreeMap<FloorIndex, FloorPlan> {
    let mut grouped: BTreeMap<FloorIndex, serde_json::Map<String, Value>> = BTreeMap::new();
    for key in ["rooms", "walls", "openings"] {
        let Some(items) = container.get(key).and_then(Value::as_array) else {
            continue;
        };
        for item in items {
            let index = read_floor_index(item).unwrap_or(0);
            let entry = grouped.entry(index).or_default();
            let list = entry
                .entry(key.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = list {
                list.push(item.clone());
            }
        }
    }
    let mut floors = BTreeMap::new();
    for (index, map) in grouped {
        let (floor, extent) = parse_floor(&Value::Object(map), index, width, ctx);
        *packed_extent = merge_extent(*packed_extent, extent);
        floors.insert(index, floor);
    }
    floors
}

fn parse_floor(
    value: &Value,
    index: FloorIndex,
    width: f64,
    ctx: &ExtractContext,
) -> (FloorPlan, Option<(f64, f64)>) {
    let mut floor = FloorPlan::default();
    let mut unplaced = Vec::new();
    if let Some(rooms) = field(value, &["rooms", "spaces"]).and_then(Value::as_array) {
        for (n, room_value) in rooms.iter().enumerate() {
            let name = read_room_name(room_value, n);
            let room_type = read_room_type(room_value);
            let declared_area = read_number(room_value, &["area", "areaM2", "area_m2"]);
            let shape = room_polygon(room_value)
                .map(RoomShape::Polygon)
                .or_else(|| room_rect(room_value).map(RoomShape::Rect));
            match shape {
                Some(shape) => floor.rooms.push(Room {
                    name,
                    room_type,
                    shape,
                    area: declared_area,
                    floor_index: index,
                }),
                None => unplaced.push((read_footprint(room_value, n), room_type)),
            }
        }
    }

    if let Some(walls) = field(value, &["walls", "wallSegments"]).and_then(Value::as_array) {
        for wall_value in walls {
            if let Some(wall) = read_wall(wall_value, ctx) {
                floor.walls.push(wall);
            }
        }
    }

    let mut floor_openings: Vec<&Value> = Vec::new();
    for key in ["openings", "doors", "windows"] {
        if let Some(items) = value.get(key).and_then(Value::as_array) {
            floor_openings.extend(items.iter());
        }
    }
    for opening_value in floor_openings {
        match resolve_floor_opening(opening_value, &floor.walls) {
            Some(opening) => floor.openings.push(opening),
            None => tracing::warn!(floor = index, "dropping opening without a resolvable wall"),
        }
    }

    if unplaced.is_empty() {
        return (floor, None);
    }
    let offset = floor
        .rooms
        .iter()
        .filter_map(Room::bbox)
        .map(|b| b.max_y() + ctx.interior_wall_thickness - ctx.wall_thickness)
        .fold(0.0, f64::max);
    let depth = place_footprints(&mut floor, unplaced, index, width, ctx, offset);
    (floor, Some((width, depth)))
}

/// Packs footprint-only rooms into `floor`, shifted down by `offset`.
/// Returns the lowest packed edge.
fn place_footprints(
    floor: &mut FloorPlan,
    footprints: Vec<(RoomFootprint, String)>,
    index: FloorIndex,
    width: f64,
    ctx: &ExtractContext,
    offset: f64,
) -> f64 {
    let (footprints, types): (Vec<RoomFootprint>, Vec<String>) = footprints.into_iter().unzip();
    let placed = pack::pack(
        &footprints,
        width,
        ctx.wall_thickness,
        ctx.interior_wall_thickness,
    );
    let mut max_y: f64 = 0.0;
    for (positioned, room_type) in placed.into_iter().zip(types) {
        let rect = Rect::new(
            positioned.rect.x,
            positioned.rect.y + offset,
            positioned.rect.width,
            positioned.rect.length,
        );
        max_y = max_y.max(rect.max_y());
        floor.rooms.push(Room {
            name: positioned.name,
            room_type,
            shape: RoomShape::Rect(rect),
            area: None,
            floor_index: index,
        });
    }
    max_y
}

fn packing_width<'a>(ctx: &ExtractContext, rooms: impl Iterator<Item = &'a Value>) -> f64 {
    if let Some(width) = ctx.building_width.filter(|w| w.is_finite() && *w > 0.0) {
        return width;
    }
    let total_area: f64 = rooms
        .enumerate()
        .map(|(n, room)| {
            let fp = read_footprint(room, n);
            fp.width * fp.length
        })
        .sum();
    (total_area.sqrt() * 1.2).max(MIN_PACKING_WIDTH)
}

fn top_level_floor_array(raw: &Value) -> Option<&Vec<Value>> {
    field(raw, &["floors", "floorPlans", "levels"]).and_then(Value::as_array)
}

fn read_dimensions(raw: &Value) -> Dimensions {
    let dims = raw.get("dimensions").filter(|d| d.is_object());
    let lookup = |keys: &[&str]| -> Option<f64> {
        dims.and_then(|d| read_number(d, keys))
            .or_else(|| read_number(raw, keys))
            .filter(|n| n.is_finite())
    };
    let count_keys = ["floorCount", "floor_count", "numberOfFloors", "storeys", "stories"];
    let floor_count = lookup(&count_keys)
        .or_else(|| {
            dims.and_then(|d| d.get("floors"))
                .or_else(|| raw.get("floors"))
                .and_then(Value::as_f64)
        })
        .filter(|n| *n >= 1.0)
        .map(|n| n.round() as u32);
    let floor_heights = dims
        .and_then(|d| field(d, &["floorHeights", "floor_heights", "storeyHeights"]))
        .or_else(|| field(raw, &["floorHeights", "floor_heights", "storeyHeights"]))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(as_number).collect())
        .unwrap_or_default();
    Dimensions {
        width: lookup(&["width", "buildingWidth", "footprintWidth"]).filter(|n| *n > 0.0),
        depth: lookup(&["depth", "length", "buildingDepth", "footprintDepth"]).filter(|n| *n > 0.0),
        height: lookup(&["height", "totalHeight", "buildingHeight"]).filter(|n| *n > 0.0),
        wall_thickness: lookup(&["wallThickness", "exteriorWallThickness", "wall_thickness"])
            .filter(|n| *n > 0.0)
            .unwrap_or(DEFAULT_WALL_THICKNESS),
        interior_wall_thickness: lookup(&["interiorWallThickness", "interior_wall_thickness"])
            .filter(|n| *n > 0.0)
            .unwrap_or(DEFAULT_INTERIOR_WALL_THICKNESS),
        floor_count,
        floor_heights,
    }
}

fn read_materials(raw: &Value) -> Vec<Material> {
    let Some(items) = field(raw, &["materials", "materialPalette"]).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(Material {
                name: name.clone(),
                color: None,
                application: None,
            }),
            Value::Object(_) => Some(Material {
                name: read_text(item, &["name", "material", "type"])?.to_string(),
                color: read_text(item, &["color", "hexColor", "hex", "colour"]).map(str::to_string),
                application: read_text(item, &["application", "use", "location", "applies_to"])
                    .map(str::to_string),
            }),
            _ => None,
        })
        .collect()
}

fn read_envelope(raw: &Value) -> Envelope {
    let roof = raw.get("roof");
    let roof_type = read_text(raw, &["roofType", "roof_type"])
        .or_else(|| roof.and_then(|r| read_text(r, &["type", "shape", "form"])))
        .or_else(|| roof.and_then(Value::as_str))
        .and_then(RoofType::from_token)
        .unwrap_or_default();
    let roof_pitch = read_number(raw, &["roofPitch", "roof_pitch"])
        .or_else(|| roof.and_then(|r| read_number(r, &["pitch", "angle"])))
        .filter(|p| p.is_finite() && *p > 0.0 && *p < 80.0)
        .unwrap_or(DEFAULT_ROOF_PITCH);
    let style = read_text(raw, &["style", "architecturalStyle", "styleName"]).map(str::to_string);

    let mut facades = BTreeMap::new();
    if let Some(map) = field(raw, &["facades", "elevations"]).and_then(Value::as_object) {
        for (key, items) in map {
            let Some(orientation) = Orientation::from_token(key) else {
                continue;
            };
            let Some(items) = items.as_array() else {
                continue;
            };
            let openings: Vec<FacadeOpening> = items.iter().filter_map(read_facade_opening).collect();
            facades.insert(orientation, openings);
        }
    }

    Envelope {
        roof_type,
        roof_pitch,
        style,
        facades,
    }
}

fn read_facade_opening(value: &Value) -> Option<FacadeOpening> {
    let kind = read_text(value, &["type", "kind"]).and_then(OpeningKind::from_token)?;
    let (default_width, default_height) = default_opening_size(kind);
    Some(FacadeOpening {
        kind,
        x: read_number(value, &["x", "offset", "position"])?,
        width: positive_or(read_number(value, &["width", "widthM", "width_m"]), default_width),
        height: positive_or(read_number(value, &["height", "heightM", "height_m"]), default_height),
        sill_height: read_number(value, &["sillHeight", "sill_height_m", "sill"]),
        floor: read_floor_index(value).unwrap_or(0),
    })
}

fn read_metadata(raw: &Value) -> Metadata {
    let meta = raw.get("metadata");
    Metadata {
        name: read_text(raw, &["name", "projectName", "title"])
            .or_else(|| meta.and_then(|m| read_text(m, &["name", "projectName", "title"])))
            .map(str::to_string),
        north_direction: read_number(raw, &["northDirection", "north_direction", "northAngle"])
            .or_else(|| meta.and_then(|m| read_number(m, &["northDirection", "north_direction"])))
            .filter(|n| n.is_finite())
            .unwrap_or(0.0),
    }
}

fn read_room_name(value: &Value, n: usize) -> String {
    read_text(value, &["name", "label", "id"])
        .map(str::to_string)
        .unwrap_or_else(|| format!("Room {}", n + 1))
}

fn read_room_type(value: &Value) -> String {
    read_text(value, &["type", "roomType", "function", "use"])
        .unwrap_or_default()
        .to_string()
}

fn read_footprint(value: &Value, n: usize) -> RoomFootprint {
    let dims = value.get("dimensions").unwrap_or(value);
    let width = read_number(dims, &["width", "widthM", "width_m"]).filter(|w| *w > 0.0);
    let length =
        read_number(dims, &["length", "depth", "lengthM", "length_m"]).filter(|l| *l > 0.0);
    let area = read_number(value, &["area", "areaM2", "area_m2"]).filter(|a| *a > 0.0);
    let (width, length) = match (width, length, area) {
        (Some(w), Some(l), _) => (w, l),
        (Some(w), None, Some(a)) => (w, a / w),
        (None, Some(l), Some(a)) => (a / l, l),
        (None, None, Some(a)) => (a.sqrt(), a.sqrt()),
        (Some(w), None, None) => (w, w),
        (None, Some(l), None) => (l, l),
        (None, None, None) => (DEFAULT_ROOM_SIDE, DEFAULT_ROOM_SIDE),
    };
    RoomFootprint {
        name: read_room_name(value, n),
        width,
        length,
    }
}

fn room_polygon(value: &Value) -> Option<Vec<Point>> {
    let items = field(value, &["polygon", "points", "vertices", "boundary"])?.as_array()?;
    let mut points: Vec<Point> = items.iter().filter_map(read_point).collect();
    if points.len() > 3 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 || geometry::polygon_area(&points) <= geometry::EPSILON {
        return None;
    }
    Some(points)
}

fn room_rect(value: &Value) -> Option<Rect> {
    let origin = field(value, &["position", "origin"]).and_then(read_point);
    let x = read_number(value, &["x"]).or(origin.map(|p| p.x))?;
    let y = read_number(value, &["y"]).or(origin.map(|p| p.y))?;
    let width = read_number(value, &["width", "widthM"])?;
    let length = read_number(value, &["length", "depth", "lengthM"])?;
    let rect = Rect::new(x, y, width, length);
    (width > 0.0 && length > 0.0 && [x, y, width, length].iter().all(|n| n.is_finite()))
        .then_some(rect)
}

fn read_wall(value: &Value, ctx: &ExtractContext) -> Option<Wall> {
    let start = field(value, &["start", "from", "p1"])
        .and_then(read_point)
        .or_else(|| Some(Point::new(read_number(value, &["x1"])?, read_number(value, &["y1"])?)))?;
    let end = field(value, &["end", "to", "p2"])
        .and_then(read_point)
        .or_else(|| Some(Point::new(read_number(value, &["x2"])?, read_number(value, &["y2"])?)))?;
    if !start.is_finite() || !end.is_finite() || start.distance(end) < geometry::EPSILON {
        tracing::debug!("skipping zero-length or non-finite wall");
        return None;
    }

    let facade = read_text(value, &["facade", "orientation", "side"]).and_then(Orientation::from_token);
    let kind = read_wall_kind(value, facade.is_some());
    let default_thickness = match kind {
        WallKind::Exterior => ctx.wall_thickness,
        WallKind::Interior => ctx.interior_wall_thickness,
    };
    let thickness = positive_or(
        read_number(value, &["thickness", "thicknessM", "thickness_m"]),
        default_thickness,
    );

    let mut wall = Wall::new(start, end, thickness, kind);
    wall.id = read_text(value, &["id", "wallId"]).map(str::to_string);
    wall.facade = facade;
    let length = wall.length();
    if let Some(items) = value.get("openings").and_then(Value::as_array) {
        wall.openings = items
            .iter()
            .filter_map(|item| read_opening(item, Some(length)))
            .collect();
    }
    Some(wall)
}

fn read_wall_kind(value: &Value, has_facade: bool) -> WallKind {
    if let Some(flag) = field(value, &["isExterior", "is_exterior", "exterior"]).and_then(Value::as_bool) {
        return if flag {
            WallKind::Exterior
        } else {
            WallKind::Interior
        };
    }
    match read_text(value, &["type", "kind"]).map(str::to_ascii_lowercase) {
        Some(kind) if kind.contains("ext") || kind.contains("outer") => WallKind::Exterior,
        Some(kind) if kind.contains("int") || kind.contains("partition") => WallKind::Interior,
        _ if has_facade => WallKind::Exterior,
        _ => WallKind::Interior,
    }
}

fn default_opening_size(kind: OpeningKind) -> (f64, f64) {
    match kind {
        OpeningKind::Door => (0.9, 2.1),
        OpeningKind::Window => (1.2, 1.2),
    }
}

/// Reads an opening. `wall_length` converts a normalized `positionAlongWall`
/// into a distance and centres openings that carry no position at all.
fn read_opening(value: &Value, wall_length: Option<f64>) -> Option<Opening> {
    let kind = read_text(value, &["type", "kind"]).and_then(OpeningKind::from_token)?;
    let (default_width, default_height) = default_opening_size(kind);
    let distance = read_number(value, &["position", "offset", "distance"]);
    let normalized = read_number(value, &["positionAlongWall", "position_along_wall", "t"]);
    let position = match (distance, normalized, wall_length) {
        (Some(d), _, _) => d,
        (None, Some(t), Some(len)) => t.clamp(0.0, 1.0) * len,
        (None, None, Some(len)) => len / 2.0,
        _ => 0.0,
    };
    Some(Opening {
        kind,
        position,
        width: positive_or(read_number(value, &["width", "widthM", "width_m"]), default_width),
        height: positive_or(read_number(value, &["height", "heightM", "height_m"]), default_height),
        sill_height: read_number(value, &["sillHeight", "sill_height_m", "sill"])
            .or(matches!(kind, OpeningKind::Window).then_some(0.9)),
        wall: None,
        room: read_text(value, &["room", "roomName", "serves"]).map(str::to_string),
    })
}

fn resolve_floor_opening(value: &Value, walls: &[Wall]) -> Option<Opening> {
    let by_id = read_text(value, &["wallId", "wall_id", "wall"]).and_then(|id| {
        walls
            .iter()
            .position(|wall| wall.id.as_deref() == Some(id))
    });
    let by_index = read_number(value, &["wallIndex", "wall_index", "wall"])
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
        .filter(|idx| *idx < walls.len());
    let wall_index = by_id.or(by_index)?;
    let mut opening = read_opening(value, Some(walls[wall_index].length()))?;
    opening.wall = Some(wall_index);
    Some(opening)
}

fn read_floor_index(value: &Value) -> Option<FloorIndex> {
    let raw = field(value, &["floorIndex", "floor_index", "floor", "level"])?;
    match raw {
        Value::Number(n) => n.as_f64().filter(|n| *n >= 0.0).map(|n| n as FloorIndex),
        Value::String(s) => parse_floor_key(s),
        _ => None,
    }
}

fn parse_floor_key(key: &str) -> Option<FloorIndex> {
    let lower = key.trim().to_ascii_lowercase();
    let named = [
        ("ground", 0),
        ("gf", 0),
        ("first", 1),
        ("second", 2),
        ("third", 3),
        ("fourth", 4),
    ];
    if let Some((_, idx)) = named.iter().find(|(name, _)| lower.starts_with(name)) {
        return Some(*idx);
    }
    FLOOR_DIGITS_RE
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .filter(|n| *n >= 0)
        .map(|n| n as FloorIndex)
}

fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

fn field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|v| !v.is_null())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('m').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn read_number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(as_number)
}

fn read_text<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn read_point(value: &Value) -> Option<Point> {
    let point = match value {
        Value::Array(items) if items.len() >= 2 => {
            Point::new(as_number(&items[0])?, as_number(&items[1])?)
        }
        Value::Object(_) => Point::new(read_number(value, &["x"])?, read_number(value, &["y"])?),
        _ => return None,
    };
    point.is_finite().then_some(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn floor_count_cascade_respects_priority() {
        let explicit = normalize(&json!({"floorCount": 3, "floors": [{}, {}], "height": 20.0}));
        assert_eq!(resolve_floor_count(&explicit), 3);

        let array = normalize(&json!({"floors": [
            {"rooms": [{"name": "A", "polygon": [[0,0],[4,0],[4,4],[0,4]]}]},
            {"rooms": [{"name": "B", "polygon": [[0,0],[4,0],[4,4],[0,4]]}]}
        ]}));
        assert_eq!(resolve_floor_count(&array), 2);

        let rooms = normalize(&json!({"rooms": [
            {"name": "Living", "area": 20},
            {"name": "Bedroom", "area": 12, "floor": 2}
        ]}));
        assert_eq!(resolve_floor_count(&rooms), 3);

        let heights = normalize(&json!({"dimensions": {"floorHeights": [3.0, 2.8]}}));
        assert_eq!(resolve_floor_count(&heights), 2);

        let height = normalize(&json!({"dimensions": {"height": 8.2}}));
        assert_eq!(resolve_floor_count(&height), 3);

        let nothing = normalize(&json!({}));
        assert_eq!(resolve_floor_count(&nothing), 1);
    }

    #[test]
    fn populated_geometry_wins_over_semantic_rooms() {
        let raw = json!({
            "geometry": {"rooms": [
                {"name": "Living Room", "polygon": [[0,0],[5,0],[5,4],[0,4]]}
            ]},
            "rooms": [{"name": "Decoy", "area": 9}]
        });
        let geometry = normalize(&raw);
        let floor = geometry.floor(0).unwrap();
        assert_eq!(floor.rooms.len(), 1);
        assert_eq!(floor.rooms[0].name, "Living Room");
        assert!(matches!(floor.rooms[0].shape, RoomShape::Polygon(_)));
    }

    #[test]
    fn nested_container_is_used_when_no_top_level_geometry() {
        let raw = json!({
            "design": {"geometry": {"floors": {"ground": {"rooms": [
                {"name": "Kitchen", "x": 0, "y": 0, "width": 4, "length": 3}
            ]}}}}
        });
        let geometry = normalize(&raw);
        let room = &geometry.floor(0).unwrap().rooms[0];
        assert_eq!(room.shape, RoomShape::Rect(Rect::new(0.0, 0.0, 4.0, 3.0)));
        assert_eq!(geometry.declared_floors, Some(1));
    }

    #[test]
    fn semantic_rooms_are_packed() {
        let raw = json!({
            "dimensions": {"width": 10.0, "wallThickness": 0.3},
            "rooms": [
                {"name": "Living", "width": 5, "length": 4},
                {"name": "Kitchen", "width": 4, "length": 3},
                {"name": "Bedroom", "area": 16}
            ]
        });
        let geometry = normalize(&raw);
        let rooms = &geometry.floor(0).unwrap().rooms;
        assert_eq!(rooms.len(), 3);
        let rects: Vec<Rect> = rooms.iter().filter_map(Room::bbox).collect();
        assert_eq!(rects[0].x, 0.3);
        assert!(rects[2].y > rects[0].y);
        assert!(geometry.dimensions.depth.is_some());
    }

    #[test]
    fn walls_and_openings_are_read() {
        let raw = json!({
            "geometry": {
                "walls": [
                    {"id": "w1", "start": {"x": 0, "y": 0}, "end": {"x": 6, "y": 0}, "facade": "S",
                     "openings": [{"type": "window", "positionAlongWall": 0.5, "width": 1.2}]},
                    {"start": [0, 0], "end": [0, 0]}
                ],
                "openings": [{"type": "entrance", "wallId": "w1", "position": 1.0}]
            }
        });
        let geometry = normalize(&raw);
        let floor = geometry.floor(0).unwrap();
        assert_eq!(floor.walls.len(), 1);
        let wall = &floor.walls[0];
        assert_eq!(wall.kind, WallKind::Exterior);
        assert_eq!(wall.facade, Some(Orientation::South));
        assert!((wall.openings[0].position - 3.0).abs() < 1e-9);
        assert_eq!(floor.openings[0].kind, OpeningKind::Door);
        assert_eq!(floor.openings[0].wall, Some(0));
    }

    #[test]
    fn json5_input_is_accepted() {
        let value = parse_building_spec("{ rooms: [ {name: 'Hall', area: 6,}, ], }").unwrap();
        assert_eq!(value["rooms"][0]["name"], "Hall");
        assert!(parse_building_spec("not a building").is_err());
    }

    #[test]
    fn implausible_floor_counts_are_clamped() {
        let tall = normalize(&json!({"dimensions": {"height": 1e13}}));
        assert_eq!(resolve_floor_count(&tall), MAX_FLOORS);
        assert_eq!(resolve_floor_heights(&tall).len(), MAX_FLOORS as usize);

        let declared = normalize(&json!({"floorCount": 5e12}));
        assert_eq!(resolve_floor_count(&declared), MAX_FLOORS);

        let sane = normalize(&json!({"floorCount": 4}));
        assert_eq!(resolve_floor_count(&sane), 4);
    }

    #[test]
    fn empty_declared_floor_is_kept() {
        let raw = json!({"populatedGeometry": {"floors": [
            {"rooms": [
                {"name": "A", "polygon": [[0,0],[4,0],[4,4],[0,4]]},
                {"name": "B", "polygon": [[4,0],[8,0],[8,4],[4,4]]}
            ]},
            {"rooms": []}
        ]}});
        let geometry = normalize(&raw);
        assert_eq!(resolve_floor_count(&geometry), 2);
        assert!(geometry.floor(1).is_some_and(|floor| floor.rooms.is_empty()));
    }

    #[test]
    fn uncoordinated_rooms_in_a_geometry_container_are_packed() {
        let raw = json!({"geometry": {"rooms": [
            {"name": "Hall", "area": 9},
            {"name": "Kitchen", "area": 12}
        ]}});
        let geometry = normalize(&raw);
        let rooms = &geometry.floor(0).unwrap().rooms;
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].name, "Hall");
        assert!(rooms.iter().all(|room| matches!(room.shape, RoomShape::Rect(_))));
        assert!(geometry.footprint().is_some());
    }

    #[test]
    fn floor_heights_fill_missing_entries() {
        let geometry = normalize(&json!({"floorCount": 3, "floorHeights": [3.0], "height": 9.0}));
        assert_eq!(resolve_floor_heights(&geometry), vec![3.0, 3.0, 3.0]);
    }
}

//! Canonical building geometry. Built once per request by the normalizer and
//! read-only afterwards; every renderer borrows it immutably.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{self, Point, Rect};

pub type FloorIndex = u32;

pub const DEFAULT_WALL_THICKNESS: f64 = 0.3;
pub const DEFAULT_INTERIOR_WALL_THICKNESS: f64 = 0.1;
pub const DEFAULT_ROOF_PITCH: f64 = 35.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildingGeometry {
    pub floors: BTreeMap<FloorIndex, FloorPlan>,
    pub dimensions: Dimensions,
    pub materials: Vec<Material>,
    pub envelope: Envelope,
    pub metadata: Metadata,
    /// Length of the explicit per-floor array the geometry was read from.
    pub declared_floors: Option<usize>,
}

impl BuildingGeometry {
    pub fn floor(&self, index: FloorIndex) -> Option<&FloorPlan> {
        self.floors.get(&index)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.floors.values().flat_map(|floor| floor.rooms.iter())
    }

    /// Footprint of the building in plan: the declared width and depth when both
    /// are known, otherwise the bounding box of every room and wall.
    pub fn footprint(&self) -> Option<Rect> {
        if let (Some(width), Some(depth)) = (self.dimensions.width, self.dimensions.depth) {
            if width > 0.0 && depth > 0.0 {
                return Some(Rect::new(0.0, 0.0, width, depth));
            }
        }
        let mut points = Vec::new();
        for floor in self.floors.values() {
            for room in &floor.rooms {
                points.extend(room.outline());
            }
            for wall in &floor.walls {
                points.push(wall.start);
                points.push(wall.end);
            }
        }
        geometry::bounds(&points).filter(|r| r.width > 0.0 && r.length > 0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dimensions {
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub height: Option<f64>,
    pub wall_thickness: f64,
    pub interior_wall_thickness: f64,
    pub floor_count: Option<u32>,
    pub floor_heights: Vec<f64>,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: None,
            depth: None,
            height: None,
            wall_thickness: DEFAULT_WALL_THICKNESS,
            interior_wall_thickness: DEFAULT_INTERIOR_WALL_THICKNESS,
            floor_count: None,
            floor_heights: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub application: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloorPlan {
    pub rooms: Vec<Room>,
    pub walls: Vec<Wall>,
    /// Floor-level openings; `Opening::wall` points into `walls`.
    pub openings: Vec<Opening>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomShape {
    Polygon(Vec<Point>),
    Rect(Rect),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub name: String,
    /// Free-form semantic type from upstream, canonicalized at lookup time.
    #[serde(default)]
    pub room_type: String,
    pub shape: RoomShape,
    #[serde(default)]
    pub area: Option<f64>,
    #[serde(default)]
    pub floor_index: FloorIndex,
}

impl Room {
    pub fn outline(&self) -> Vec<Point> {
        match &self.shape {
            RoomShape::Polygon(points) => points.clone(),
            RoomShape::Rect(rect) => rect.corners().to_vec(),
        }
    }

    pub fn bbox(&self) -> Option<Rect> {
        match &self.shape {
            RoomShape::Polygon(points) => geometry::bounds(points),
            RoomShape::Rect(rect) => Some(*rect),
        }
    }

    /// Declared area when positive, otherwise computed from the shape.
    pub fn area(&self) -> f64 {
        if let Some(area) = self.area.filter(|a| a.is_finite() && *a > 0.0) {
            return area;
        }
        match &self.shape {
            RoomShape::Polygon(points) => geometry::polygon_area(points),
            RoomShape::Rect(rect) => rect.area(),
        }
    }

    pub fn label_anchor(&self) -> Option<Point> {
        match &self.shape {
            RoomShape::Polygon(points) => geometry::polygon_centroid(points),
            RoomShape::Rect(rect) => Some(rect.center()),
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        match &self.shape {
            RoomShape::Polygon(points) => geometry::point_in_polygon(p, points),
            RoomShape::Rect(rect) => rect.contains(p),
        }
    }

    /// Semantic type used for catalog lookups; the name stands in when
    /// upstream did not supply a type.
    pub fn semantic_type(&self) -> &str {
        if self.room_type.trim().is_empty() {
            &self.name
        } else {
            &self.room_type
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WallKind {
    Exterior,
    Interior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wall {
    #[serde(default)]
    pub id: Option<String>,
    pub start: Point,
    pub end: Point,
    pub thickness: f64,
    pub kind: WallKind,
    #[serde(default)]
    pub facade: Option<Orientation>,
    #[serde(default)]
    pub openings: Vec<Opening>,
}

impl Wall {
    pub fn new(start: Point, end: Point, thickness: f64, kind: WallKind) -> Self {
        Self {
            id: None,
            start,
            end,
            thickness,
            kind,
            facade: None,
            openings: Vec::new(),
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn is_exterior(&self) -> bool {
        self.kind == WallKind::Exterior
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl OpeningKind {
    /// `entrance`, `patio`, `french` and `sliding` openings are drawn as doors.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "door" | "entrance" | "patio" | "french" | "sliding" | "front_door" | "front-door" => {
                Some(Self::Door)
            }
            "window" | "win" | "glazing" => Some(Self::Window),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub kind: OpeningKind,
    /// Distance from the wall start; clamped to the wall length when drawn.
    pub position: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub sill_height: Option<f64>,
    #[serde(default)]
    pub wall: Option<usize>,
    /// Room the opening serves, used for the door swing lookup.
    #[serde(default)]
    pub room: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    North,
    East,
    South,
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [Self::North, Self::East, Self::South, Self::West];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "n" | "north" | "front" => Some(Self::North),
            "e" | "east" | "right" => Some(Self::East),
            "s" | "south" | "rear" | "back" => Some(Self::South),
            "w" | "west" | "left" => Some(Self::West),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::North => "North",
            Self::East => "East",
            Self::South => "South",
            Self::West => "West",
        }
    }

    /// North and south facades span the building width, east and west its depth.
    pub fn spans_width(self) -> bool {
        matches!(self, Self::North | Self::South)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoofType {
    #[default]
    Gable,
    Hip,
    Flat,
    Mansard,
}

impl RoofType {
    pub fn from_token(token: &str) -> Option<Self> {
        let lower = token.trim().to_ascii_lowercase();
        if lower.contains("mansard") {
            Some(Self::Mansard)
        } else if lower.contains("hip") {
            Some(Self::Hip)
        } else if lower.contains("flat") || lower.contains("parapet") {
            Some(Self::Flat)
        } else if lower.contains("gable") || lower.contains("pitched") {
            Some(Self::Gable)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Envelope {
    pub roof_type: RoofType,
    /// Roof pitch in degrees.
    pub roof_pitch: f64,
    pub style: Option<String>,
    pub facades: BTreeMap<Orientation, Vec<FacadeOpening>>,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            roof_type: RoofType::Gable,
            roof_pitch: DEFAULT_ROOF_PITCH,
            style: None,
            facades: BTreeMap::new(),
        }
    }
}

/// Opening placed on a facade, `x` measured from the facade's left edge as
/// seen by a viewer standing outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacadeOpening {
    pub kind: OpeningKind,
    pub x: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub sill_height: Option<f64>,
    #[serde(default)]
    pub floor: FloorIndex,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metadata {
    pub name: Option<String>,
    /// Rotation of north in degrees, clockwise from the top of the sheet.
    pub north_direction: f64,
}

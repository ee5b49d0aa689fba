//! Fixed lookup tables keyed by canonical categories: room kinds drive the
//! furniture catalog, fill colours and door swings; material categories drive
//! facade hatching; window styles drive mullion counts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ir::Material;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoomKind {
    Living,
    Kitchen,
    Dining,
    Bedroom,
    Bathroom,
    Wc,
    Utility,
    Office,
    Hall,
    Corridor,
    Storage,
    Garage,
    Other,
}

const EXACT_ROOM_NAMES: &[(&str, RoomKind)] = &[
    ("living", RoomKind::Living),
    ("living room", RoomKind::Living),
    ("lounge", RoomKind::Living),
    ("kitchen", RoomKind::Kitchen),
    ("dining", RoomKind::Dining),
    ("dining room", RoomKind::Dining),
    ("bedroom", RoomKind::Bedroom),
    ("bathroom", RoomKind::Bathroom),
    ("wc", RoomKind::Wc),
    ("toilet", RoomKind::Wc),
    ("utility", RoomKind::Utility),
    ("office", RoomKind::Office),
    ("study", RoomKind::Office),
    ("hall", RoomKind::Hall),
    ("hallway", RoomKind::Hall),
    ("corridor", RoomKind::Corridor),
    ("storage", RoomKind::Storage),
    ("garage", RoomKind::Garage),
];

// Order matters: the first keyword contained in the type wins.
const ROOM_KEYWORDS: &[(&str, RoomKind)] = &[
    ("ensuite", RoomKind::Bathroom),
    ("en-suite", RoomKind::Bathroom),
    ("en suite", RoomKind::Bathroom),
    ("bath", RoomKind::Bathroom),
    ("shower", RoomKind::Bathroom),
    ("toilet", RoomKind::Wc),
    ("cloak", RoomKind::Wc),
    ("powder", RoomKind::Wc),
    ("utility", RoomKind::Utility),
    ("laundry", RoomKind::Utility),
    ("kitchen", RoomKind::Kitchen),
    ("dining", RoomKind::Dining),
    ("living", RoomKind::Living),
    ("lounge", RoomKind::Living),
    ("family", RoomKind::Living),
    ("sitting", RoomKind::Living),
    ("bed", RoomKind::Bedroom),
    ("nursery", RoomKind::Bedroom),
    ("office", RoomKind::Office),
    ("study", RoomKind::Office),
    ("hall", RoomKind::Hall),
    ("landing", RoomKind::Hall),
    ("entrance", RoomKind::Hall),
    ("foyer", RoomKind::Hall),
    ("corridor", RoomKind::Corridor),
    ("passage", RoomKind::Corridor),
    ("store", RoomKind::Storage),
    ("storage", RoomKind::Storage),
    ("pantry", RoomKind::Storage),
    ("garage", RoomKind::Garage),
];

impl RoomKind {
    /// Exact match on the normalized type, then the first contained keyword,
    /// then [`RoomKind::Other`].
    pub fn canonicalize(raw: &str) -> Self {
        let normalized = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if let Some((_, kind)) = EXACT_ROOM_NAMES.iter().find(|(name, _)| *name == normalized) {
            return *kind;
        }
        let compact = raw.trim().to_ascii_lowercase();
        ROOM_KEYWORDS
            .iter()
            .find(|(keyword, _)| compact.contains(keyword) || normalized.contains(keyword))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Other)
    }

    pub fn is_wet(self) -> bool {
        matches!(self, Self::Bathroom | Self::Wc | Self::Utility)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementRule {
    Center,
    WallOffset,
    OppositeWall,
    Corner,
    TableWithChairs,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurnitureItem {
    pub label: &'static str,
    pub width: f64,
    pub depth: f64,
    pub rule: PlacementRule,
}

const fn item(label: &'static str, width: f64, depth: f64, rule: PlacementRule) -> FurnitureItem {
    FurnitureItem {
        label,
        width,
        depth,
        rule,
    }
}

use PlacementRule::{Center, Corner, OppositeWall, TableWithChairs, WallOffset};

const LIVING: &[FurnitureItem] = &[
    item("sofa", 2.2, 0.9, WallOffset),
    item("coffee-table", 1.1, 0.6, Center),
    item("tv-unit", 1.6, 0.45, OppositeWall),
    item("armchair", 0.85, 0.85, Corner),
];
const KITCHEN: &[FurnitureItem] = &[
    item("worktop", 3.0, 0.6, WallOffset),
    item("island", 1.8, 0.9, Center),
];
const DINING: &[FurnitureItem] = &[item("dining-table", 1.6, 0.9, TableWithChairs)];
const BEDROOM: &[FurnitureItem] = &[
    item("bed", 1.5, 2.0, WallOffset),
    item("wardrobe", 1.8, 0.6, OppositeWall),
    item("bedside", 0.45, 0.4, Corner),
];
const BATHROOM: &[FurnitureItem] = &[
    item("bath", 1.7, 0.75, WallOffset),
    item("basin", 0.6, 0.45, OppositeWall),
    item("wc", 0.4, 0.65, Corner),
];
const WC: &[FurnitureItem] = &[item("wc", 0.4, 0.65, WallOffset), item("basin", 0.45, 0.35, Corner)];
const UTILITY: &[FurnitureItem] = &[
    item("washer", 0.6, 0.6, Corner),
    item("sink-unit", 1.2, 0.6, WallOffset),
];
const OFFICE: &[FurnitureItem] = &[
    item("desk", 1.4, 0.7, WallOffset),
    item("chair", 0.55, 0.55, Center),
    item("shelving", 1.2, 0.35, OppositeWall),
];
const STORAGE: &[FurnitureItem] = &[item("shelving", 1.2, 0.4, WallOffset)];
const GARAGE: &[FurnitureItem] = &[item("car", 1.9, 4.6, Center)];
const NONE: &[FurnitureItem] = &[];

pub fn furniture_for(kind: RoomKind) -> &'static [FurnitureItem] {
    match kind {
        RoomKind::Living => LIVING,
        RoomKind::Kitchen => KITCHEN,
        RoomKind::Dining => DINING,
        RoomKind::Bedroom => BEDROOM,
        RoomKind::Bathroom => BATHROOM,
        RoomKind::Wc => WC,
        RoomKind::Utility => UTILITY,
        RoomKind::Office => OFFICE,
        RoomKind::Storage => STORAGE,
        RoomKind::Garage => GARAGE,
        RoomKind::Hall | RoomKind::Corridor | RoomKind::Other => NONE,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingDirection {
    /// Leaf opens into the room the door serves.
    Inward,
    /// Leaf opens away from the room the door serves.
    Outward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HingeSide {
    /// Hinge at the edge of the opening nearest the wall start.
    #[default]
    Start,
    End,
}

/// Door swing lookup. Wet rooms open outward, everything else inward, unless
/// overridden per room kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwingTable {
    pub default: SwingDirection,
    pub wet_rooms: SwingDirection,
    pub overrides: BTreeMap<RoomKind, SwingDirection>,
    pub hinge: HingeSide,
}

impl Default for SwingTable {
    fn default() -> Self {
        Self {
            default: SwingDirection::Inward,
            wet_rooms: SwingDirection::Outward,
            overrides: BTreeMap::new(),
            hinge: HingeSide::Start,
        }
    }
}

impl SwingTable {
    pub fn direction(&self, kind: RoomKind) -> SwingDirection {
        if let Some(direction) = self.overrides.get(&kind) {
            return *direction;
        }
        if kind.is_wet() {
            self.wet_rooms
        } else {
            self.default
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialPattern {
    Brick,
    Timber,
    Render,
    Stone,
    Slate,
    Plain,
}

const MATERIAL_PREFERENCE: &[(&str, MaterialPattern)] = &[
    ("brick", MaterialPattern::Brick),
    ("timber", MaterialPattern::Timber),
    ("wood", MaterialPattern::Timber),
    ("cladding", MaterialPattern::Timber),
    ("render", MaterialPattern::Render),
    ("stucco", MaterialPattern::Render),
    ("plaster", MaterialPattern::Render),
    ("stone", MaterialPattern::Stone),
    ("flint", MaterialPattern::Stone),
    ("slate", MaterialPattern::Slate),
    ("tile", MaterialPattern::Slate),
];

impl MaterialPattern {
    /// Walks the preference table in order and returns the first pattern whose
    /// keyword appears in any material name.
    pub fn best_match<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let lowered: Vec<String> = names.into_iter().map(|n| n.to_ascii_lowercase()).collect();
        MATERIAL_PREFERENCE
            .iter()
            .find(|(keyword, _)| lowered.iter().any(|name| name.contains(keyword)))
            .map(|(_, pattern)| *pattern)
            .unwrap_or(Self::Plain)
    }

    pub fn for_walls(materials: &[Material]) -> Self {
        let facade: Vec<&str> = materials
            .iter()
            .filter(|m| {
                m.application
                    .as_deref()
                    .map(|app| !app.to_ascii_lowercase().contains("roof"))
                    .unwrap_or(true)
            })
            .map(|m| m.name.as_str())
            .collect();
        Self::best_match(facade.iter().copied())
    }

    pub fn for_roof(materials: &[Material]) -> Self {
        let roof: Vec<&str> = materials
            .iter()
            .filter(|m| {
                m.application
                    .as_deref()
                    .map(|app| app.to_ascii_lowercase().contains("roof"))
                    .unwrap_or(false)
            })
            .map(|m| m.name.as_str())
            .collect();
        match Self::best_match(roof.iter().copied()) {
            Self::Plain => Self::Slate,
            other => other,
        }
    }

    pub fn pattern_id(self) -> &'static str {
        match self {
            Self::Brick => "pattern-brick",
            Self::Timber => "pattern-timber",
            Self::Render => "pattern-render",
            Self::Stone => "pattern-stone",
            Self::Slate => "pattern-slate",
            Self::Plain => "pattern-plain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowStyle {
    Modern,
    Traditional,
    Georgian,
    Victorian,
    Cottage,
}

/// Glazing bar layout: vertical and horizontal bars inside one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mullions {
    pub vertical: u32,
    pub horizontal: u32,
}

impl WindowStyle {
    pub fn from_style(style: Option<&str>) -> Self {
        let Some(style) = style else {
            return Self::Traditional;
        };
        let lower = style.to_ascii_lowercase();
        if lower.contains("georgian") || lower.contains("regency") {
            Self::Georgian
        } else if lower.contains("victorian") || lower.contains("edwardian") {
            Self::Victorian
        } else if lower.contains("cottage") || lower.contains("rural") || lower.contains("farmhouse") {
            Self::Cottage
        } else if lower.contains("modern")
            || lower.contains("contemporary")
            || lower.contains("minimal")
        {
            Self::Modern
        } else {
            Self::Traditional
        }
    }

    pub fn mullions(self) -> Mullions {
        match self {
            Self::Modern => Mullions {
                vertical: 0,
                horizontal: 0,
            },
            Self::Traditional => Mullions {
                vertical: 1,
                horizontal: 0,
            },
            Self::Georgian => Mullions {
                vertical: 2,
                horizontal: 2,
            },
            Self::Victorian => Mullions {
                vertical: 1,
                horizontal: 1,
            },
            Self::Cottage => Mullions {
                vertical: 1,
                horizontal: 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_prefers_exact_then_substring() {
        assert_eq!(RoomKind::canonicalize("Living Room"), RoomKind::Living);
        assert_eq!(RoomKind::canonicalize("living_room"), RoomKind::Living);
        assert_eq!(RoomKind::canonicalize("Master Bedroom"), RoomKind::Bedroom);
        assert_eq!(RoomKind::canonicalize("Master En-Suite"), RoomKind::Bathroom);
        assert_eq!(RoomKind::canonicalize("Family Bathroom"), RoomKind::Bathroom);
        assert_eq!(RoomKind::canonicalize("WC"), RoomKind::Wc);
        assert_eq!(RoomKind::canonicalize("Plant"), RoomKind::Other);
    }

    #[test]
    fn wet_rooms_swing_outward_by_default() {
        let table = SwingTable::default();
        assert_eq!(table.direction(RoomKind::Bathroom), SwingDirection::Outward);
        assert_eq!(table.direction(RoomKind::Bedroom), SwingDirection::Inward);

        let mut custom = SwingTable::default();
        custom.overrides.insert(RoomKind::Bedroom, SwingDirection::Outward);
        assert_eq!(custom.direction(RoomKind::Bedroom), SwingDirection::Outward);
    }

    #[test]
    fn material_preference_is_ordered() {
        let names = ["Natural stone plinth", "Red brick"];
        assert_eq!(
            MaterialPattern::best_match(names.iter().copied()),
            MaterialPattern::Brick
        );
        assert_eq!(
            MaterialPattern::best_match(["glass"].iter().copied()),
            MaterialPattern::Plain
        );
    }

    #[test]
    fn roof_defaults_to_slate() {
        let materials = vec![Material {
            name: "Red brick".to_string(),
            color: None,
            application: Some("walls".to_string()),
        }];
        assert_eq!(MaterialPattern::for_walls(&materials), MaterialPattern::Brick);
        assert_eq!(MaterialPattern::for_roof(&materials), MaterialPattern::Slate);
    }

    #[test]
    fn every_kind_has_a_catalog_entry() {
        assert!(!furniture_for(RoomKind::Living).is_empty());
        assert!(furniture_for(RoomKind::Corridor).is_empty());
        assert_eq!(WindowStyle::from_style(Some("Georgian townhouse")).mullions().vertical, 2);
        assert_eq!(WindowStyle::from_style(Some("contemporary")).mullions().vertical, 0);
    }
}

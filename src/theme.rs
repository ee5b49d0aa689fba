use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::RoomKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub title_font_size: f64,
    pub background: String,
    pub line_color: String,
    pub wall_color: String,
    pub wall_hatch_color: String,
    pub interior_wall_color: String,
    pub room_stroke: String,
    pub text_color: String,
    pub dimension_color: String,
    pub door_color: String,
    pub window_color: String,
    pub furniture_color: String,
    pub grid_color: String,
    pub ground_color: String,
    pub roof_color: String,
    pub glazing_color: String,
    pub room_fills: BTreeMap<RoomKind, String>,
    pub default_room_fill: String,
}

fn fills(entries: &[(RoomKind, &str)]) -> BTreeMap<RoomKind, String> {
    entries
        .iter()
        .map(|(kind, color)| (*kind, color.to_string()))
        .collect()
}

impl Theme {
    pub fn technical() -> Self {
        Self {
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            font_size: 12.0,
            title_font_size: 18.0,
            background: "#FFFFFF".to_string(),
            line_color: "#333333".to_string(),
            wall_color: "#333333".to_string(),
            wall_hatch_color: "#999999".to_string(),
            interior_wall_color: "#555555".to_string(),
            room_stroke: "#BBBBBB".to_string(),
            text_color: "#333333".to_string(),
            dimension_color: "#888888".to_string(),
            door_color: "#666666".to_string(),
            window_color: "#3399FF".to_string(),
            furniture_color: "#7A7A7A".to_string(),
            grid_color: "#EEEEEE".to_string(),
            ground_color: "#8D7B68".to_string(),
            roof_color: "#5D5D5D".to_string(),
            glazing_color: "#D6EAF8".to_string(),
            room_fills: fills(&[
                (RoomKind::Living, "#E8F5E9"),
                (RoomKind::Kitchen, "#FFF3E0"),
                (RoomKind::Dining, "#FFF8E1"),
                (RoomKind::Bedroom, "#E3F2FD"),
                (RoomKind::Bathroom, "#FCE4EC"),
                (RoomKind::Wc, "#FCE4EC"),
                (RoomKind::Utility, "#ECEFF1"),
                (RoomKind::Office, "#E8EAF6"),
                (RoomKind::Hall, "#F5F5F5"),
                (RoomKind::Corridor, "#FAFAFA"),
                (RoomKind::Storage, "#ECEFF1"),
                (RoomKind::Garage, "#EFEBE9"),
            ]),
            default_room_fill: "#F5F5F5".to_string(),
        }
    }

    pub fn blueprint() -> Self {
        Self {
            font_family: "\"Courier New\", Courier, monospace".to_string(),
            font_size: 12.0,
            title_font_size: 18.0,
            background: "#0B3D91".to_string(),
            line_color: "#FFFFFF".to_string(),
            wall_color: "#FFFFFF".to_string(),
            wall_hatch_color: "#9DB8E8".to_string(),
            interior_wall_color: "#DCE6F7".to_string(),
            room_stroke: "#5C7FC4".to_string(),
            text_color: "#FFFFFF".to_string(),
            dimension_color: "#C8D6F0".to_string(),
            door_color: "#FFFFFF".to_string(),
            window_color: "#A9D1FF".to_string(),
            furniture_color: "#C8D6F0".to_string(),
            grid_color: "#1A4FA8".to_string(),
            ground_color: "#C8D6F0".to_string(),
            roof_color: "#DCE6F7".to_string(),
            glazing_color: "#1A4FA8".to_string(),
            room_fills: BTreeMap::new(),
            default_room_fill: "#0F4AA8".to_string(),
        }
    }

    pub fn room_fill(&self, kind: RoomKind) -> &str {
        self.room_fills
            .get(&kind)
            .map(String::as_str)
            .unwrap_or(&self.default_room_fill)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::technical()
    }
}

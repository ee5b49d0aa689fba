//! Furniture placement inside a room's bounding box.

use crate::catalog::{FurnitureItem, PlacementRule, RoomKind, furniture_for};
use crate::geometry::{EPSILON, Point, Rect};
use crate::ir::{Room, RoomShape};

/// Clearance kept between furniture and the room boundary, metres.
const CLEARANCE: f64 = 0.15;
const CHAIR: f64 = 0.45;
const CHAIR_PITCH: f64 = 0.6;
/// Clipped pieces smaller than this in either direction are dropped.
const MIN_PIECE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub label: &'static str,
    pub rect: Rect,
}

pub fn place_furniture(room: &Room) -> Vec<PlacedItem> {
    let Some(bbox) = room.bbox() else {
        return Vec::new();
    };
    let kind = RoomKind::canonicalize(room.semantic_type());
    let inner = bbox.inset(CLEARANCE);
    let mut placed = Vec::new();
    for item in furniture_for(kind) {
        for (label, rect) in position(item, inner) {
            let Some(clipped) = rect.intersection(&inner) else {
                continue;
            };
            if clipped.width < MIN_PIECE || clipped.length < MIN_PIECE {
                continue;
            }
            if !fits_inside(room, &clipped) {
                continue;
            }
            placed.push(PlacedItem {
                label,
                rect: clipped,
            });
        }
    }
    placed
}

/// A piece fits when its whole rectangle lies in the room. For polygons that
/// means every corner inside and no room vertex poking into the piece, which
/// catches the re-entrant corner of L and U shapes.
fn fits_inside(room: &Room, rect: &Rect) -> bool {
    let shrunk = rect.inset(EPSILON * 10.0);
    let corners = [
        Point::new(shrunk.x, shrunk.y),
        Point::new(shrunk.max_x(), shrunk.y),
        Point::new(shrunk.max_x(), shrunk.max_y()),
        Point::new(shrunk.x, shrunk.max_y()),
    ];
    if !corners.iter().all(|corner| room.contains(*corner)) {
        return false;
    }
    match &room.shape {
        RoomShape::Polygon(points) => !points.iter().any(|p| {
            p.x > rect.x + EPSILON
                && p.x < rect.max_x() - EPSILON
                && p.y > rect.y + EPSILON
                && p.y < rect.max_y() - EPSILON
        }),
        RoomShape::Rect(_) => true,
    }
}

fn position(item: &FurnitureItem, inner: Rect) -> Vec<(&'static str, Rect)> {
    let (w, d) = (item.width, item.depth);
    let centered_x = inner.x + (inner.width - w) / 2.0;
    match item.rule {
        PlacementRule::Center => {
            let c = inner.center();
            vec![(item.label, Rect::new(c.x - w / 2.0, c.y - d / 2.0, w, d))]
        }
        PlacementRule::WallOffset => vec![(item.label, Rect::new(centered_x, inner.y, w, d))],
        PlacementRule::OppositeWall => {
            vec![(item.label, Rect::new(centered_x, inner.max_y() - d, w, d))]
        }
        PlacementRule::Corner => vec![(item.label, Rect::new(inner.max_x() - w, inner.y, w, d))],
        PlacementRule::TableWithChairs => table_with_chairs(item, inner.center()),
    }
}

/// Table centred on `center` with chairs along both long sides and one at
/// each end.
fn table_with_chairs(item: &FurnitureItem, center: Point) -> Vec<(&'static str, Rect)> {
    let (w, d) = (item.width, item.depth);
    let table = Rect::new(center.x - w / 2.0, center.y - d / 2.0, w, d);
    let mut pieces = vec![(item.label, table)];

    let per_side = ((w / CHAIR_PITCH).floor() as usize).max(1);
    let pitch = w / per_side as f64;
    for i in 0..per_side {
        let cx = table.x + pitch * (i as f64 + 0.5) - CHAIR / 2.0;
        pieces.push(("chair", Rect::new(cx, table.y - CHAIR - 0.05, CHAIR, CHAIR)));
        pieces.push(("chair", Rect::new(cx, table.max_y() + 0.05, CHAIR, CHAIR)));
    }
    let cy = center.y - CHAIR / 2.0;
    pieces.push(("chair", Rect::new(table.x - CHAIR - 0.05, cy, CHAIR, CHAIR)));
    pieces.push(("chair", Rect::new(table.max_x() + 0.05, cy, CHAIR, CHAIR)));
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::RoomShape;

    fn room(name: &str, rect: Rect) -> Room {
        Room {
            name: name.to_string(),
            room_type: String::new(),
            shape: RoomShape::Rect(rect),
            area: None,
            floor_index: 0,
        }
    }

    #[test]
    fn pieces_stay_inside_the_room() {
        let bounds = Rect::new(2.0, 3.0, 2.5, 2.0);
        for name in ["Living Room", "Bedroom", "Kitchen", "Dining Room", "Bathroom", "Garage"] {
            for item in place_furniture(&room(name, bounds)) {
                assert!(item.rect.x >= bounds.x - 1e-9, "{name}: {:?}", item);
                assert!(item.rect.y >= bounds.y - 1e-9, "{name}: {:?}", item);
                assert!(item.rect.max_x() <= bounds.max_x() + 1e-9, "{name}: {:?}", item);
                assert!(item.rect.max_y() <= bounds.max_y() + 1e-9, "{name}: {:?}", item);
            }
        }
    }

    #[test]
    fn dining_table_gets_chairs() {
        let items = place_furniture(&room("Dining", Rect::new(0.0, 0.0, 4.0, 3.5)));
        assert_eq!(items[0].label, "dining-table");
        assert_eq!(items.iter().filter(|i| i.label == "chair").count(), 6);
    }

    #[test]
    fn l_shaped_rooms_keep_furniture_out_of_the_notch() {
        let outline = vec![
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(6.0, 2.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 6.0),
            Point::new(0.0, 6.0),
        ];
        let bedroom = Room {
            name: "Bedroom".to_string(),
            room_type: String::new(),
            shape: RoomShape::Polygon(outline),
            area: None,
            floor_index: 0,
        };
        let items = place_furniture(&bedroom);
        assert!(items.iter().all(|i| i.label != "bed"), "{items:?}");
        assert!(items.iter().all(|i| i.label != "wardrobe"), "{items:?}");
        assert!(items.iter().any(|i| i.label == "bedside"));
        for item in &items {
            let r = item.rect;
            for corner in [
                Point::new(r.x, r.y),
                Point::new(r.max_x(), r.y),
                Point::new(r.max_x(), r.max_y()),
                Point::new(r.x, r.max_y()),
            ] {
                assert!(corner.x <= 2.0 + 1e-9 || corner.y <= 2.0 + 1e-9, "{item:?}");
            }
        }
    }

    #[test]
    fn circulation_spaces_stay_empty() {
        assert!(place_furniture(&room("Hallway", Rect::new(0.0, 0.0, 4.0, 1.2))).is_empty());
    }
}

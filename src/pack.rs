//! Deterministic shelf packing for rooms that arrive without coordinates.

use serde::Serialize;

use crate::geometry::Rect;

/// A room known only by its approximate footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomFootprint {
    pub name: String,
    pub width: f64,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedRoom {
    pub name: String,
    pub rect: Rect,
}

/// Places rooms left to right in input order starting at `(margin, margin)`,
/// where the margin is the exterior wall thickness. A room that would cross
/// `building_width - margin` wraps to a new row below the tallest room of the
/// current row, separated by `interior_wall_thickness`. A room wider than the
/// available width is still placed alone at the start of its row.
pub fn pack(
    rooms: &[RoomFootprint],
    building_width: f64,
    wall_thickness: f64,
    interior_wall_thickness: f64,
) -> Vec<PositionedRoom> {
    let margin = wall_thickness.max(0.0);
    let gap = interior_wall_thickness.max(0.0);
    let limit = building_width - margin;

    let mut placed = Vec::with_capacity(rooms.len());
    let mut x = margin;
    let mut y = margin;
    let mut row_height: f64 = 0.0;
    let mut row_has_rooms = false;

    for room in rooms {
        let width = sanitize_extent(room.width);
        let length = sanitize_extent(room.length);
        if row_has_rooms && x + width > limit {
            y += row_height + gap;
            x = margin;
            row_height = 0.0;
            row_has_rooms = false;
        }
        placed.push(PositionedRoom {
            name: room.name.clone(),
            rect: Rect::new(x, y, width, length),
        });
        x += width + gap;
        row_height = row_height.max(length);
        row_has_rooms = true;
    }

    tracing::debug!(
        rooms = placed.len(),
        building_width,
        rows_end = y + row_height,
        "shelf-packed rooms"
    );
    placed
}

const MIN_EXTENT: f64 = 0.5;

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > MIN_EXTENT {
        value
    } else {
        MIN_EXTENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footprint(name: &str, width: f64, length: f64) -> RoomFootprint {
        RoomFootprint {
            name: name.to_string(),
            width,
            length,
        }
    }

    #[test]
    fn wraps_when_row_is_full() {
        let rooms = [
            footprint("Living", 5.0, 4.0),
            footprint("Kitchen", 3.0, 3.0),
            footprint("Bedroom", 4.0, 3.5),
        ];
        let placed = pack(&rooms, 10.0, 0.3, 0.1);
        assert_eq!(placed[0].rect, Rect::new(0.3, 0.3, 5.0, 4.0));
        assert!((placed[1].rect.x - 5.4).abs() < 1e-9);
        assert_eq!(placed[1].rect.y, 0.3);
        // 8.5 + 4.0 exceeds 9.7, so the bedroom starts a new row.
        assert_eq!(placed[2].rect.x, 0.3);
        assert!((placed[2].rect.y - 4.4).abs() < 1e-9);
    }

    #[test]
    fn oversized_room_is_placed_alone() {
        let rooms = [footprint("Hall", 20.0, 2.0), footprint("Store", 1.0, 1.0)];
        let placed = pack(&rooms, 10.0, 0.3, 0.1);
        assert_eq!(placed[0].rect.x, 0.3);
        assert_eq!(placed[1].rect.x, 0.3);
        assert!(placed[1].rect.y > placed[0].rect.max_y());
    }

    #[test]
    fn degenerate_extents_are_raised_to_minimum() {
        let placed = pack(&[footprint("Void", 0.0, f64::NAN)], 10.0, 0.3, 0.1);
        assert_eq!(placed[0].rect.width, MIN_EXTENT);
        assert_eq!(placed[0].rect.length, MIN_EXTENT);
    }

    #[test]
    fn packing_is_reproducible() {
        let rooms: Vec<_> = (0..12)
            .map(|i| footprint(&format!("R{i}"), 2.0 + (i % 4) as f64, 2.5 + (i % 3) as f64))
            .collect();
        assert_eq!(pack(&rooms, 12.0, 0.3, 0.1), pack(&rooms, 12.0, 0.3, 0.1));
    }
}

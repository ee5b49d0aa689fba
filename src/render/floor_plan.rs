//! Floor-plan renderer. The gates run before any markup is produced; a floor
//! that fails them yields an error and no drawing.

use super::annotations::{
    dimension_line, fit_font_size, floor_title, north_arrow, scale_bar, title_block,
};
use super::furniture::place_furniture;
use super::{Canvas, all_finite, background, polygon_to_path, svg_open, text, wall_hatch_def};
use crate::catalog::{HingeSide, RoomKind, SwingDirection, SwingTable};
use crate::config::DrawingOptions;
use crate::error::{
    AssemblyError, DrawingError, DrawingResult, FloorPlanValidationError, GateReason,
};
use crate::geometry::{self, EPSILON, Point, Rect, point_along, segment_frame, wall_quad};
use crate::ir::{BuildingGeometry, FloorIndex, FloorPlan, Opening, OpeningKind, Room, RoomShape, Wall};
use crate::normalize::resolve_floor_count;
use crate::theme::Theme;
use crate::walls::resolve_walls;

/// Space below the drawing for the scale bar and title, pixels.
const FOOTER: f64 = 70.0;
/// Distance past the wall face used to find the room a door serves, metres.
const SIDE_OFFSET: f64 = 0.05;

pub fn generate(
    geometry: &BuildingGeometry,
    floor_index: FloorIndex,
    options: &DrawingOptions,
) -> DrawingResult<String> {
    generate_with(
        geometry,
        floor_index,
        options,
        &Theme::default(),
        &SwingTable::default(),
    )
}

pub fn generate_with(
    geometry: &BuildingGeometry,
    floor_index: FloorIndex,
    options: &DrawingOptions,
    theme: &Theme,
    swing: &SwingTable,
) -> DrawingResult<String> {
    let (floor, rooms) = check_gates(geometry, floor_index, options.expected_room_count)
        .map_err(|detail| {
            tracing::warn!(code = detail.reason.code(), floor = floor_index, "floor plan gate failed");
            DrawingError::gate(detail)
        })?;
    let plan = PlanInput {
        geometry,
        floor_index,
        floor,
        rooms,
    };
    plan.assemble(options, theme, swing).map_err(|source| {
        DrawingError::generation(format!("floor plan for floor {floor_index}"), source)
    })
}

/// Hard gates, checked in order: the floor must exist, an expectation of
/// rooms needs at least one drawable room, and an expectation of several
/// rooms needs at least two.
pub fn check_gates(
    geometry: &BuildingGeometry,
    floor_index: FloorIndex,
    expected_room_count: usize,
) -> Result<(&FloorPlan, Vec<&Room>), FloorPlanValidationError> {
    let reject = |reason, actual| FloorPlanValidationError {
        floor: floor_index,
        expected_room_count,
        actual_room_count: actual,
        reason,
    };
    let Some(floor) = geometry.floor(floor_index) else {
        return Err(reject(GateReason::MissingFloorData, 0));
    };
    let rooms = drawable_rooms(floor);
    if expected_room_count > 0 && rooms.is_empty() {
        return Err(reject(GateReason::EmptyRoomGeometry, 0));
    }
    if expected_room_count > 1 && rooms.len() <= 1 {
        return Err(reject(
            GateReason::InsufficientRoomsForInteriorWalls,
            rooms.len(),
        ));
    }
    Ok((floor, rooms))
}

fn drawable_rooms(floor: &FloorPlan) -> Vec<&Room> {
    floor
        .rooms
        .iter()
        .filter(|room| {
            let drawable = match &room.shape {
                RoomShape::Polygon(points) => {
                    points.len() >= 3
                        && all_finite(points)
                        && geometry::polygon_area(points) > EPSILON
                }
                RoomShape::Rect(rect) => {
                    [rect.x, rect.y, rect.width, rect.length]
                        .iter()
                        .all(|v| v.is_finite())
                        && rect.width > 0.0
                        && rect.length > 0.0
                }
            };
            if !drawable {
                tracing::warn!(room = %room.name, "skipping room with degenerate geometry");
            }
            drawable
        })
        .collect()
}

/// Where an opening sits on its wall, as distances from the wall start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningSpan {
    pub center: Point,
    pub from: f64,
    pub to: f64,
}

/// Position is clamped to `[0, len]` before the gap is laid out around it, so
/// an opening never lands beyond its wall.
pub fn opening_span(wall: &Wall, opening: &Opening) -> Option<OpeningSpan> {
    let (_, _, len) = segment_frame(wall.start, wall.end)?;
    if !opening.width.is_finite() || opening.width <= 0.0 {
        return None;
    }
    let position = if opening.position.is_finite() {
        opening.position.clamp(0.0, len)
    } else {
        0.0
    };
    let half = opening.width / 2.0;
    Some(OpeningSpan {
        center: point_along(wall.start, wall.end, position)?,
        from: (position - half).max(0.0),
        to: (position + half).min(len),
    })
}

/// Wall outline split around its openings: one quadrilateral per solid run.
pub fn solid_wall_pieces(wall: &Wall, openings: &[&Opening]) -> Vec<[Point; 4]> {
    let Some((_, _, len)) = segment_frame(wall.start, wall.end) else {
        return Vec::new();
    };
    let mut gaps: Vec<(f64, f64)> = openings
        .iter()
        .filter_map(|o| opening_span(wall, o))
        .map(|span| (span.from, span.to))
        .collect();
    gaps.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut pieces = Vec::new();
    let mut cursor = 0.0;
    for (from, to) in gaps {
        if from - cursor > EPSILON {
            pieces.extend(piece(wall, cursor, from));
        }
        cursor = f64::max(cursor, to);
    }
    if len - cursor > EPSILON {
        pieces.extend(piece(wall, cursor, len));
    }
    pieces
}

fn piece(wall: &Wall, from: f64, to: f64) -> Option<[Point; 4]> {
    let a = point_along(wall.start, wall.end, from)?;
    let b = point_along(wall.start, wall.end, to)?;
    wall_quad(a, b, wall.thickness)
}

/// A door leaf swinging about `hinge` from its closed position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoorSwing {
    pub hinge: Point,
    pub closed: Point,
    pub open: Point,
    pub radius: f64,
    /// SVG arc sweep flag for the arc drawn from `closed` to `open`.
    pub sweep: bool,
}

impl DoorSwing {
    pub fn swept_degrees(&self) -> f64 {
        let a = self.closed.sub(self.hinge);
        let b = self.open.sub(self.hinge);
        a.cross(b).atan2(a.dot(b)).abs().to_degrees()
    }
}

/// `toward` is the unit wall normal on the side the leaf opens into. The
/// radius is the door width, the distance from hinge to the closed edge.
pub fn door_swing(hinge: Point, closed: Point, toward: Point) -> Option<DoorSwing> {
    let radius = hinge.distance(closed);
    if !radius.is_finite() || radius < EPSILON {
        return None;
    }
    let open = hinge.add(toward.scale(radius));
    let sweep = closed.sub(hinge).cross(open.sub(hinge)) > 0.0;
    Some(DoorSwing {
        hinge,
        closed,
        open,
        radius,
        sweep,
    })
}

struct PlanInput<'a> {
    geometry: &'a BuildingGeometry,
    floor_index: FloorIndex,
    floor: &'a FloorPlan,
    rooms: Vec<&'a Room>,
}

impl PlanInput<'_> {
    fn assemble(
        &self,
        options: &DrawingOptions,
        theme: &Theme,
        swing: &SwingTable,
    ) -> Result<String, AssemblyError> {
        let walls = resolve_walls(self.geometry, self.floor);
        let mut wall_openings: Vec<Vec<&Opening>> =
            walls.iter().map(|w| w.openings.iter().collect()).collect();
        for opening in &self.floor.openings {
            match opening.wall.and_then(|idx| wall_openings.get_mut(idx)) {
                Some(list) => list.push(opening),
                None => tracing::warn!(
                    floor = self.floor_index,
                    wall = ?opening.wall,
                    "dropping opening without a resolvable wall"
                ),
            }
        }

        let footprint = self.geometry.footprint();
        let extent = self.extent(footprint, &walls)?;
        let canvas = Canvas::new(extent, options.scale, options.margin, 0.0, FOOTER)?;
        let floor_count = resolve_floor_count(self.geometry);

        let mut svg = svg_open(
            &canvas,
            theme,
            &[
                ("class", "floor-plan".to_string()),
                ("data-floor", self.floor_index.to_string()),
                ("data-floor-count", floor_count.to_string()),
            ],
        );
        svg.push_str("<defs>");
        svg.push_str(&wall_hatch_def(theme));
        svg.push_str("</defs>");
        svg.push_str(&background(theme));

        if options.show_grid {
            svg.push_str(&grid(&canvas, extent, theme));
        }

        for (idx, wall) in walls.iter().enumerate().filter(|(_, w)| w.is_exterior()) {
            let d = wall_path(&canvas, wall, &wall_openings[idx]);
            if d.is_empty() {
                continue;
            }
            svg.push_str(&format!(
                "<path class=\"wall-exterior\" d=\"{d}\" fill=\"url(#wall-hatch)\" stroke=\"{}\" stroke-width=\"1.2\"/>",
                theme.wall_color
            ));
        }

        for room in &self.rooms {
            svg.push_str(&room_fill(&canvas, room, theme));
        }

        for (idx, wall) in walls.iter().enumerate().filter(|(_, w)| !w.is_exterior()) {
            let d = wall_path(&canvas, wall, &wall_openings[idx]);
            if d.is_empty() {
                continue;
            }
            svg.push_str(&format!(
                "<path class=\"wall-interior\" d=\"{d}\" fill=\"{color}\" stroke=\"{color}\" stroke-width=\"0.5\"/>",
                color = theme.interior_wall_color
            ));
        }

        let mut doors = String::new();
        let mut windows = String::new();
        for (idx, wall) in walls.iter().enumerate() {
            for opening in &wall_openings[idx] {
                let Some(span) = opening_span(wall, opening) else {
                    continue;
                };
                match opening.kind {
                    OpeningKind::Door => {
                        doors.push_str(&self.door(&canvas, wall, opening, span, options, theme, swing))
                    }
                    OpeningKind::Window => windows.push_str(&window(&canvas, wall, span, theme)),
                }
            }
        }
        svg.push_str(&doors);
        svg.push_str(&windows);

        if options.show_furniture {
            svg.push_str(&format!(
                "<g class=\"furniture\" opacity=\"{:.2}\">",
                options.furniture_opacity
            ));
            for room in &self.rooms {
                for item in place_furniture(room) {
                    let p = canvas.px(Point::new(item.rect.x, item.rect.y));
                    svg.push_str(&format!(
                        "<rect class=\"furniture-item\" data-item=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" fill=\"none\" stroke=\"{}\" stroke-width=\"0.8\"/>",
                        item.label,
                        p.x,
                        p.y,
                        canvas.len(item.rect.width),
                        canvas.len(item.rect.length),
                        theme.furniture_color
                    ));
                }
            }
            svg.push_str("</g>");
        }

        for room in &self.rooms {
            svg.push_str(&room_label(&canvas, room, theme));
        }

        if options.show_dimensions {
            let fp = footprint.unwrap_or(extent);
            let offset = canvas.len(options.dimension_offset);
            svg.push_str(&dimension_line(
                canvas.px(Point::new(fp.x, fp.y)),
                canvas.px(Point::new(fp.max_x(), fp.y)),
                Point::new(0.0, -1.0),
                offset,
                &format!("{:.2} m", fp.width),
                theme,
            ));
            svg.push_str(&dimension_line(
                canvas.px(Point::new(fp.x, fp.y)),
                canvas.px(Point::new(fp.x, fp.max_y())),
                Point::new(-1.0, 0.0),
                offset,
                &format!("{:.2} m", fp.length),
                theme,
            ));
        }

        if options.show_north_arrow {
            svg.push_str(&north_arrow(
                canvas.width - canvas.margin() / 2.0,
                canvas.margin() / 2.0 + 5.0,
                self.geometry.metadata.north_direction,
                theme,
            ));
        }

        let footer_y = canvas.height - FOOTER;
        svg.push_str(&scale_bar(canvas.margin(), footer_y + 30.0, canvas.scale(), theme));
        svg.push_str(&title_block(
            canvas.margin() + canvas.len(1.0) + 90.0,
            footer_y + 34.0,
            &floor_title(self.floor_index),
            self.geometry.metadata.name.as_deref(),
            theme,
        ));

        svg.push_str("</svg>");
        tracing::debug!(
            floor = self.floor_index,
            rooms = self.rooms.len(),
            walls = walls.len(),
            bytes = svg.len(),
            "rendered floor plan"
        );
        Ok(svg)
    }

    fn extent(&self, footprint: Option<Rect>, walls: &[Wall]) -> Result<Rect, AssemblyError> {
        let mut extent = footprint;
        let mut grow = |rect: Rect| {
            extent = Some(match extent {
                Some(current) => current.union(&rect),
                None => rect,
            });
        };
        for room in &self.rooms {
            if let Some(bbox) = room.bbox() {
                grow(bbox);
            }
        }
        for wall in walls {
            if let Some(bbox) = wall_quad(wall.start, wall.end, wall.thickness)
                .and_then(|quad| geometry::bounds(&quad))
            {
                grow(bbox);
            }
        }
        extent.ok_or(AssemblyError::EmptyCanvas)
    }

    #[allow(clippy::too_many_arguments)]
    fn door(
        &self,
        canvas: &Canvas,
        wall: &Wall,
        opening: &Opening,
        span: OpeningSpan,
        options: &DrawingOptions,
        theme: &Theme,
        swing: &SwingTable,
    ) -> String {
        let (Some(a), Some(b)) = (
            point_along(wall.start, wall.end, span.from),
            point_along(wall.start, wall.end, span.to),
        ) else {
            return String::new();
        };
        let mut svg = String::new();
        if let Some(quad) = wall_quad(a, b, wall.thickness) {
            svg.push_str(&format!(
                "<path class=\"door\" d=\"{}\" fill=\"{}\" fill-opacity=\"0.25\" stroke=\"{}\" stroke-width=\"0.8\"/>",
                polygon_to_path(&quad.map(|p| canvas.px(p))),
                theme.door_color,
                theme.door_color
            ));
        }
        if !options.show_door_swings {
            return svg;
        }
        let Some((_, normal, _)) = segment_frame(wall.start, wall.end) else {
            return svg;
        };

        let (hinge, closed) = match swing.hinge {
            HingeSide::Start => (a, b),
            HingeSide::End => (b, a),
        };
        let (served, side) = self.served_side(wall, opening, span.center, normal);
        let direction = served
            .map(|room| swing.direction(RoomKind::canonicalize(room.semantic_type())))
            .unwrap_or(SwingDirection::Inward);
        let toward = match direction {
            SwingDirection::Inward => normal.scale(side),
            SwingDirection::Outward => normal.scale(-side),
        };
        let Some(leaf) = door_swing(hinge, closed, toward) else {
            return svg;
        };

        let h = canvas.px(leaf.hinge);
        let c = canvas.px(leaf.closed);
        let o = canvas.px(leaf.open);
        let r = canvas.len(leaf.radius);
        svg.push_str(&format!(
            "<path class=\"door-swing\" d=\"M {:.2} {:.2} A {r:.2} {r:.2} 0 0 {} {:.2} {:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"0.8\" stroke-dasharray=\"3 2\"/>",
            c.x,
            c.y,
            u8::from(leaf.sweep),
            o.x,
            o.y,
            theme.door_color
        ));
        svg.push_str(&format!(
            "<path class=\"door-leaf\" d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{}\" stroke-width=\"1.5\"/>",
            h.x, h.y, o.x, o.y, theme.door_color
        ));
        svg
    }

    /// Room the door serves and the side of the wall it is on, `+1` along the
    /// wall normal or `-1` against it. A named room wins over probing.
    fn served_side(
        &self,
        wall: &Wall,
        opening: &Opening,
        center: Point,
        normal: Point,
    ) -> (Option<&Room>, f64) {
        let reach = wall.thickness / 2.0 + SIDE_OFFSET;
        let plus = center.add(normal.scale(reach));
        let minus = center.sub(normal.scale(reach));

        if let Some(name) = opening.room.as_deref() {
            if let Some(room) = self.rooms.iter().copied().find(|r| r.name.eq_ignore_ascii_case(name)) {
                if room.contains(plus) {
                    return (Some(room), 1.0);
                }
                if room.contains(minus) {
                    return (Some(room), -1.0);
                }
                if let Some(anchor) = room.label_anchor() {
                    let side = if anchor.sub(center).dot(normal) >= 0.0 { 1.0 } else { -1.0 };
                    return (Some(room), side);
                }
            }
        }
        if let Some(room) = self.rooms.iter().copied().find(|r| r.contains(plus)) {
            return (Some(room), 1.0);
        }
        if let Some(room) = self.rooms.iter().copied().find(|r| r.contains(minus)) {
            return (Some(room), -1.0);
        }
        (None, 1.0)
    }
}

fn wall_path(canvas: &Canvas, wall: &Wall, openings: &[&Opening]) -> String {
    solid_wall_pieces(wall, openings)
        .iter()
        .map(|quad| polygon_to_path(&quad.map(|p| canvas.px(p))))
        .collect::<Vec<_>>()
        .join(" ")
}

fn window(canvas: &Canvas, wall: &Wall, span: OpeningSpan, theme: &Theme) -> String {
    let (Some(a), Some(b), Some((_, normal, _))) = (
        point_along(wall.start, wall.end, span.from),
        point_along(wall.start, wall.end, span.to),
        segment_frame(wall.start, wall.end),
    ) else {
        return String::new();
    };
    let Some(quad) = wall_quad(a, b, wall.thickness) else {
        return String::new();
    };
    let pane = normal.scale(wall.thickness / 6.0);
    let (a1, b1) = (canvas.px(a.add(pane)), canvas.px(b.add(pane)));
    let (a2, b2) = (canvas.px(a.sub(pane)), canvas.px(b.sub(pane)));
    let mut svg = format!(
        "<path class=\"window\" d=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        polygon_to_path(&quad.map(|p| canvas.px(p))),
        theme.glazing_color,
        theme.window_color
    );
    svg.push_str(&format!(
        "<path class=\"glazing\" d=\"M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{}\" stroke-width=\"0.8\"/>",
        a1.x, a1.y, b1.x, b1.y, a2.x, a2.y, b2.x, b2.y, theme.window_color
    ));
    svg
}

fn room_fill(canvas: &Canvas, room: &Room, theme: &Theme) -> String {
    let fill = theme.room_fill(RoomKind::canonicalize(room.semantic_type()));
    let name = super::escape_xml(&room.name);
    match &room.shape {
        RoomShape::Polygon(points) => {
            let mapped: Vec<Point> = points.iter().map(|p| canvas.px(*p)).collect();
            format!(
                "<path class=\"room-fill\" data-room=\"{name}\" d=\"{}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"0.8\"/>",
                polygon_to_path(&mapped),
                theme.room_stroke
            )
        }
        RoomShape::Rect(rect) => {
            let p = canvas.px(Point::new(rect.x, rect.y));
            format!(
                "<rect class=\"room-fill\" data-room=\"{name}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"0.8\"/>",
                p.x,
                p.y,
                canvas.len(rect.width),
                canvas.len(rect.length),
                theme.room_stroke
            )
        }
    }
}

fn room_label(canvas: &Canvas, room: &Room, theme: &Theme) -> String {
    let (Some(anchor), Some(bbox)) = (room.label_anchor(), room.bbox()) else {
        return String::new();
    };
    let at = canvas.px(anchor);
    let available = canvas.len(bbox.width) * 0.9;
    let size = fit_font_size(&room.name, available, theme.font_size);
    let mut svg = text(at.x, at.y - 2.0, "room-label", "middle", size, &theme.text_color, &room.name);
    svg.push_str(&text(
        at.x,
        at.y + size,
        "room-area",
        "middle",
        size * 0.85,
        &theme.text_color,
        &format!("{:.1} m²", room.area()),
    ));
    svg
}

fn grid(canvas: &Canvas, extent: Rect, theme: &Theme) -> String {
    let mut d = String::new();
    let (x0, x1) = (extent.x.floor(), extent.max_x().ceil());
    let (y0, y1) = (extent.y.floor(), extent.max_y().ceil());
    let mut x = x0;
    while x <= x1 {
        let a = canvas.px(Point::new(x, y0));
        let b = canvas.px(Point::new(x, y1));
        d.push_str(&format!("M {:.2} {:.2} L {:.2} {:.2} ", a.x, a.y, b.x, b.y));
        x += 1.0;
    }
    let mut y = y0;
    while y <= y1 {
        let a = canvas.px(Point::new(x0, y));
        let b = canvas.px(Point::new(x1, y));
        d.push_str(&format!("M {:.2} {:.2} L {:.2} {:.2} ", a.x, a.y, b.x, b.y));
        y += 1.0;
    }
    format!(
        "<path class=\"grid\" d=\"{}\" stroke=\"{}\" stroke-width=\"0.5\" fill=\"none\"/>",
        d.trim_end(),
        theme.grid_color
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Dimensions, WallKind};

    fn polygon_room(name: &str, points: &[(f64, f64)]) -> Room {
        Room {
            name: name.to_string(),
            room_type: String::new(),
            shape: RoomShape::Polygon(points.iter().map(|(x, y)| Point::new(*x, *y)).collect()),
            area: None,
            floor_index: 0,
        }
    }

    fn two_room_building() -> BuildingGeometry {
        let mut geometry = BuildingGeometry {
            dimensions: Dimensions {
                width: Some(10.0),
                depth: Some(8.0),
                ..Dimensions::default()
            },
            ..BuildingGeometry::default()
        };
        let floor = geometry.floors.entry(0).or_default();
        floor.rooms.push(polygon_room(
            "Living Room",
            &[(0.0, 0.0), (5.0, 0.0), (5.0, 4.0), (0.0, 4.0)],
        ));
        floor.rooms.push(polygon_room(
            "Kitchen",
            &[(5.0, 0.0), (10.0, 0.0), (10.0, 4.0), (5.0, 4.0)],
        ));
        geometry
    }

    fn opening(kind: OpeningKind, position: f64, width: f64) -> Opening {
        Opening {
            kind,
            position,
            width,
            height: 2.1,
            sill_height: None,
            wall: None,
            room: None,
        }
    }

    #[test]
    fn renders_two_room_plan() {
        let geometry = two_room_building();
        let options = DrawingOptions {
            expected_room_count: 2,
            ..DrawingOptions::default()
        };
        let svg = generate(&geometry, 0, &options).unwrap();
        assert_eq!(svg.matches("class=\"room-fill\"").count(), 2);
        assert!(svg.contains("data-room=\"Living Room\""));
        assert!(svg.contains("data-room=\"Kitchen\""));
        assert_eq!(svg.matches("20.0 m²").count(), 2);
        assert!(svg.contains("class=\"wall-exterior\""));
        assert!(svg.contains("class=\"wall-interior\""));
        assert!(svg.contains("class=\"scale-bar\""));
        assert!(svg.contains("Ground Floor Plan"));
    }

    #[test]
    fn gates_reject_before_drawing() {
        let mut geometry = two_room_building();
        let options = DrawingOptions {
            expected_room_count: 3,
            ..DrawingOptions::default()
        };
        let err = generate(&geometry, 4, &options).unwrap_err();
        assert_eq!(err.code(), "MISSING_FLOOR_DATA");

        geometry.floors.get_mut(&0).unwrap().rooms.clear();
        let err = generate(&geometry, 0, &options).unwrap_err();
        assert_eq!(err.code(), "EMPTY_ROOM_GEOMETRY");

        geometry.floors.get_mut(&0).unwrap().rooms.push(polygon_room(
            "Studio",
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)],
        ));
        let options = DrawingOptions {
            expected_room_count: 2,
            ..DrawingOptions::default()
        };
        let err = generate(&geometry, 0, &options).unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_ROOMS_FOR_INTERIOR_WALLS");
        assert_eq!(err.gate_detail().unwrap().actual_room_count, 1);
    }

    #[test]
    fn no_expectation_means_no_gate() {
        let mut geometry = two_room_building();
        geometry.floors.get_mut(&0).unwrap().rooms.clear();
        let svg = generate(&geometry, 0, &DrawingOptions::default()).unwrap();
        assert!(!svg.contains("room-fill"));
    }

    #[test]
    fn opening_position_is_clamped_to_wall_end() {
        let wall = Wall::new(Point::new(0.0, 0.0), Point::new(5.0, 0.0), 0.3, WallKind::Exterior);
        let span = opening_span(&wall, &opening(OpeningKind::Window, 99.0, 1.2)).unwrap();
        assert_eq!(span.center, Point::new(5.0, 0.0));
        assert!(span.to <= 5.0);
        assert!((span.from - 4.4).abs() < 1e-9);
    }

    #[test]
    fn walls_split_around_openings() {
        let wall = Wall::new(Point::new(0.0, 0.0), Point::new(6.0, 0.0), 0.3, WallKind::Exterior);
        let door = opening(OpeningKind::Door, 3.0, 1.0);
        let pieces = solid_wall_pieces(&wall, &[&door]);
        assert_eq!(pieces.len(), 2);
        assert!((pieces[0][2].x - 2.5).abs() < 1e-9);
        assert!((pieces[1][1].x - 3.5).abs() < 1e-9);
    }

    #[test]
    fn door_swing_is_a_quarter_turn() {
        let leaf = door_swing(Point::new(1.0, 0.0), Point::new(1.9, 0.0), Point::new(0.0, 1.0)).unwrap();
        assert!((leaf.swept_degrees() - 90.0).abs() < 1e-9);
        assert!((leaf.radius - 0.9).abs() < 1e-9);
        assert!((leaf.open.y - 0.9).abs() < 1e-9);
        assert!(leaf.sweep);
    }

    #[test]
    fn wet_room_door_opens_away_from_room() {
        let mut geometry = two_room_building();
        let floor = geometry.floors.get_mut(&0).unwrap();
        floor.rooms[1].name = "Bathroom".to_string();
        let mut wall = Wall::new(Point::new(5.0, 0.0), Point::new(5.0, 4.0), 0.1, WallKind::Interior);
        let mut door = opening(OpeningKind::Door, 2.0, 0.8);
        door.room = Some("Bathroom".to_string());
        wall.openings.push(door);
        floor.walls.push(wall);

        let svg = generate(&geometry, 0, &DrawingOptions::default()).unwrap();
        // Wall normal points to -x; the bathroom lies on +x, so the leaf
        // swings out into the living room.
        let leaf_start = svg.find("class=\"door-leaf\"").unwrap();
        let leaf = &svg[leaf_start..];
        let d_start = leaf.find("d=\"M ").unwrap() + 5;
        let coords: Vec<f64> = leaf[d_start..]
            .split(|c: char| c == '"' || c == 'L')
            .take(2)
            .flat_map(|chunk| chunk.split_whitespace().map(|n| n.parse::<f64>().unwrap()).collect::<Vec<_>>())
            .collect();
        let (hinge_x, open_x) = (coords[0], coords[2]);
        assert!(open_x < hinge_x);
    }
}

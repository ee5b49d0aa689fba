//! Building sections. `A-A` cuts along the width at mid-depth, `B-B` across
//! it at mid-width.

use serde::{Deserialize, Serialize};

use super::annotations::{fit_font_size, scale_bar, title_block};
use super::elevation::{
    FOOTER, GROUND_EXTENSION, RoofInput, Storeys, ground_strip, level_markers, roof_profile,
    view_canvas,
};
use super::{Canvas, background, polygon_to_path, svg_open, text, wall_hatch_def};
use crate::config::ElevationOptions;
use crate::error::{AssemblyError, DrawingError, DrawingResult};
use crate::geometry::{Point, Rect, cross_horizontal, cross_vertical};
use crate::ir::{BuildingGeometry, Room};
use crate::theme::Theme;
use crate::walls::resolve_walls;

/// Slab thickness drawn at each floor level, metres.
const SLAB: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionCut {
    #[serde(rename = "A-A")]
    Longitudinal,
    #[serde(rename = "B-B")]
    Transverse,
}

impl SectionCut {
    pub const ALL: [SectionCut; 2] = [Self::Longitudinal, Self::Transverse];

    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "a" | "a-a" | "aa" | "longitudinal" => Some(Self::Longitudinal),
            "b" | "b-b" | "bb" | "transverse" => Some(Self::Transverse),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Longitudinal => "A-A",
            Self::Transverse => "B-B",
        }
    }
}

/// Cut geometry in plan: the axis the section runs along and where it cuts.
#[derive(Debug, Clone, Copy)]
struct CutLine {
    cut: SectionCut,
    axis_min: f64,
    span: f64,
    depth: f64,
    level: f64,
}

impl CutLine {
    fn new(cut: SectionCut, footprint: Rect) -> Self {
        let center = footprint.center();
        match cut {
            SectionCut::Longitudinal => Self {
                cut,
                axis_min: footprint.x,
                span: footprint.width,
                depth: footprint.length,
                level: center.y,
            },
            SectionCut::Transverse => Self {
                cut,
                axis_min: footprint.y,
                span: footprint.length,
                depth: footprint.width,
                level: center.x,
            },
        }
    }

    /// Position along the section of the point where `a -> b` crosses the cut.
    fn crossing(&self, a: Point, b: Point) -> Option<f64> {
        let along = match self.cut {
            SectionCut::Longitudinal => cross_horizontal(a, b, self.level)?,
            SectionCut::Transverse => cross_vertical(a, b, self.level)?,
        };
        Some(along - self.axis_min)
    }

    fn plan_point(&self, u: f64) -> Point {
        match self.cut {
            SectionCut::Longitudinal => Point::new(self.axis_min + u, self.level),
            SectionCut::Transverse => Point::new(self.level, self.axis_min + u),
        }
    }

    /// Where along the section a room is crossed, if the cut passes through it.
    fn room_crossing(&self, room: &Room) -> Option<f64> {
        let bbox = room.bbox()?;
        let (lo, extent) = match self.cut {
            SectionCut::Longitudinal => (bbox.x, bbox.width),
            SectionCut::Transverse => (bbox.y, bbox.length),
        };
        [0.5, 0.25, 0.75]
            .iter()
            .map(|f| lo + extent * f - self.axis_min)
            .find(|u| room.contains(self.plan_point(*u)))
    }
}

pub fn generate(
    geometry: &BuildingGeometry,
    cut: SectionCut,
    options: &ElevationOptions,
) -> DrawingResult<String> {
    generate_with(geometry, cut, options, &Theme::default())
}

pub fn generate_with(
    geometry: &BuildingGeometry,
    cut: SectionCut,
    options: &ElevationOptions,
    theme: &Theme,
) -> DrawingResult<String> {
    assemble(geometry, cut, options, theme)
        .map_err(|source| DrawingError::generation(format!("section {}", cut.label()), source))
}

fn assemble(
    geometry: &BuildingGeometry,
    cut: SectionCut,
    options: &ElevationOptions,
    theme: &Theme,
) -> Result<String, AssemblyError> {
    let footprint = geometry.footprint().ok_or(AssemblyError::EmptyCanvas)?;
    let line = CutLine::new(cut, footprint);
    let storeys = Storeys::resolve(geometry);
    let eaves = storeys.eaves();
    let roof = roof_profile(RoofInput {
        roof_type: geometry.envelope.roof_type,
        pitch: geometry.envelope.roof_pitch,
        span: line.span,
        depth: line.depth,
        eaves,
        overhang: options.eaves_overhang,
        parapet: options.parapet_height,
    });
    if !roof.ridge.is_finite() {
        return Err(AssemblyError::NonFiniteCoordinate("roof profile"));
    }
    let canvas = view_canvas(
        line.span,
        options.eaves_overhang,
        roof.ridge,
        options.ground_depth,
        options.scale,
        options.margin,
    )?;

    let mut svg = svg_open(
        &canvas,
        theme,
        &[
            ("class", "section".to_string()),
            ("data-cut", cut.label().to_string()),
            ("data-floor-count", storeys.count.to_string()),
        ],
    );
    svg.push_str("<defs>");
    svg.push_str(&wall_hatch_def(theme));
    svg.push_str("</defs>");
    svg.push_str(&background(theme));

    let overhang = options.eaves_overhang.max(0.0);
    svg.push_str(&ground_strip(
        &canvas,
        -(overhang + GROUND_EXTENSION),
        line.span + overhang + GROUND_EXTENSION,
        options.ground_depth,
        theme,
    ));

    let thickness = geometry.dimensions.wall_thickness.max(0.05);
    for u in [0.0, line.span] {
        svg.push_str(&band(
            &canvas,
            "wall-cut",
            u - thickness / 2.0,
            u + thickness / 2.0,
            0.0,
            eaves,
            "url(#wall-hatch)",
            &theme.wall_color,
        ));
    }

    let mut labels = String::new();
    for (idx, base) in storeys.bases.iter().enumerate() {
        let height = storeys.heights[idx];
        let Some(floor) = geometry.floor(idx as u32) else {
            continue;
        };
        for wall in resolve_walls(geometry, floor).iter().filter(|w| !w.is_exterior()) {
            let Some(u) = line.crossing(wall.start, wall.end) else {
                continue;
            };
            if u <= thickness || u >= line.span - thickness {
                continue;
            }
            svg.push_str(&band(
                &canvas,
                "wall-interior-cut",
                u - wall.thickness / 2.0,
                u + wall.thickness / 2.0,
                *base,
                base + height,
                &theme.interior_wall_color,
                &theme.interior_wall_color,
            ));
        }
        for room in &floor.rooms {
            let Some(u) = line.room_crossing(room) else {
                continue;
            };
            let at = canvas.elev(u, base + height / 2.0);
            let width = room
                .bbox()
                .map(|b| match cut {
                    SectionCut::Longitudinal => b.width,
                    SectionCut::Transverse => b.length,
                })
                .unwrap_or(line.span);
            let size = fit_font_size(&room.name, canvas.len(width) * 0.9, theme.font_size);
            labels.push_str(&text(at.x, at.y, "room-label", "middle", size, &theme.text_color, &room.name));
        }
    }

    for base in &storeys.bases {
        svg.push_str(&band(
            &canvas,
            "slab",
            -thickness / 2.0,
            line.span + thickness / 2.0,
            base - SLAB,
            *base,
            "url(#wall-hatch)",
            &theme.wall_color,
        ));
    }
    svg.push_str(&band(
        &canvas,
        "slab",
        -thickness / 2.0,
        line.span + thickness / 2.0,
        eaves - SLAB,
        eaves,
        "url(#wall-hatch)",
        &theme.wall_color,
    ));
    svg.push_str(&labels);

    let roof_points: Vec<Point> = roof.outline.iter().map(|(x, z)| canvas.elev(*x, *z)).collect();
    svg.push_str(&format!(
        "<path class=\"roof\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>",
        polygon_to_path(&roof_points),
        theme.roof_color
    ));

    if options.show_level_markers {
        svg.push_str(&level_markers(&canvas, &storeys, line.span, roof.ridge, theme));
    }

    let footer_y = canvas.height - FOOTER;
    svg.push_str(&scale_bar(canvas.margin(), footer_y + 30.0, canvas.scale(), theme));
    svg.push_str(&title_block(
        canvas.margin() + canvas.len(1.0) + 90.0,
        footer_y + 34.0,
        &format!("Section {}", cut.label()),
        geometry.metadata.name.as_deref(),
        theme,
    ));
    svg.push_str("</svg>");

    tracing::debug!(cut = cut.label(), floors = storeys.count, bytes = svg.len(), "rendered section");
    Ok(svg)
}

/// Filled band between two section positions and two levels.
#[allow(clippy::too_many_arguments)]
fn band(
    canvas: &Canvas,
    class: &str,
    u0: f64,
    u1: f64,
    z0: f64,
    z1: f64,
    fill: &str,
    stroke: &str,
) -> String {
    let outline = [
        canvas.elev(u0, z0),
        canvas.elev(u1, z0),
        canvas.elev(u1, z1),
        canvas.elev(u0, z1),
    ];
    format!(
        "<path class=\"{class}\" d=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"0.8\"/>",
        polygon_to_path(&outline)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Dimensions, RoomShape};

    fn room(name: &str, rect: Rect) -> Room {
        Room {
            name: name.to_string(),
            room_type: String::new(),
            shape: RoomShape::Rect(rect),
            area: None,
            floor_index: 0,
        }
    }

    fn building() -> BuildingGeometry {
        let mut geometry = BuildingGeometry {
            dimensions: Dimensions {
                width: Some(10.0),
                depth: Some(8.0),
                ..Dimensions::default()
            },
            ..BuildingGeometry::default()
        };
        let floor = geometry.floors.entry(0).or_default();
        floor.rooms.push(room("Living Room", Rect::new(0.0, 0.0, 6.0, 8.0)));
        floor.rooms.push(room("Kitchen", Rect::new(6.0, 0.0, 4.0, 8.0)));
        geometry
    }

    #[test]
    fn cut_tokens() {
        assert_eq!(SectionCut::from_token("A-A"), Some(SectionCut::Longitudinal));
        assert_eq!(SectionCut::from_token("bb"), Some(SectionCut::Transverse));
        assert_eq!(SectionCut::from_token("c"), None);
    }

    #[test]
    fn longitudinal_cut_crosses_partition_and_rooms() {
        let svg = generate(&building(), SectionCut::Longitudinal, &ElevationOptions::default()).unwrap();
        assert_eq!(svg.matches("class=\"wall-interior-cut\"").count(), 1);
        assert!(svg.contains(">Living Room</text>"));
        assert!(svg.contains(">Kitchen</text>"));
        assert!(svg.contains("data-cut=\"A-A\""));
        assert!(svg.contains("data-floor-count=\"1\""));
    }

    #[test]
    fn transverse_cut_misses_the_partition() {
        let svg = generate(&building(), SectionCut::Transverse, &ElevationOptions::default()).unwrap();
        assert!(!svg.contains("wall-interior-cut"));
        assert!(svg.contains(">Living Room</text>"));
        assert!(!svg.contains(">Kitchen</text>"));
    }
}

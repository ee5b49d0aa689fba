//! Facade elevations. Shares the storey stack, roof profiles, level markers and
//! ground strip with the section renderer.

use super::annotations::{level_label, level_marker, scale_bar, title_block};
use super::floor_plan::opening_span;
use super::{Canvas, background, material_pattern_def, polygon_to_path, svg_open};
use crate::catalog::{MaterialPattern, WindowStyle};
use crate::config::ElevationOptions;
use crate::error::{AssemblyError, DrawingError, DrawingResult};
use crate::geometry::{Point, Rect};
use crate::ir::{
    BuildingGeometry, DEFAULT_ROOF_PITCH, FacadeOpening, FloorIndex, Opening, OpeningKind,
    Orientation, RoofType, Wall,
};
use crate::normalize::{resolve_floor_count, resolve_floor_heights};
use crate::theme::Theme;
use crate::walls::resolve_walls;

pub(crate) const FOOTER: f64 = 70.0;
/// Room to the right of the drawing for level labels, pixels.
pub(crate) const LABEL_GUTTER: f64 = 110.0;
/// Ground strip extends this far past each end of the building, metres.
pub(crate) const GROUND_EXTENSION: f64 = 1.0;

const DOOR_HEIGHT: f64 = 2.1;
const WINDOW_HEIGHT: f64 = 1.2;
const WINDOW_SILL: f64 = 0.9;
const MANSARD_LOWER_PITCH: f64 = 70.0;
const MANSARD_UPPER_PITCH: f64 = 30.0;
/// Share of the half span taken by the steep lower slope of a mansard.
const MANSARD_LOWER_SHARE: f64 = 0.3;

pub fn generate(
    geometry: &BuildingGeometry,
    orientation: Orientation,
    options: &ElevationOptions,
) -> DrawingResult<String> {
    generate_with(geometry, orientation, options, &Theme::default())
}

pub fn generate_with(
    geometry: &BuildingGeometry,
    orientation: Orientation,
    options: &ElevationOptions,
    theme: &Theme,
) -> DrawingResult<String> {
    assemble(geometry, orientation, options, theme).map_err(|source| {
        DrawingError::generation(format!("{} elevation", orientation.label().to_lowercase()), source)
    })
}

/// Storey heights and the finished floor level of each storey.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Storeys {
    pub count: u32,
    pub heights: Vec<f64>,
    pub bases: Vec<f64>,
}

impl Storeys {
    pub fn resolve(geometry: &BuildingGeometry) -> Self {
        let count = resolve_floor_count(geometry);
        let heights = resolve_floor_heights(geometry);
        let mut bases = Vec::with_capacity(heights.len());
        let mut level = 0.0;
        for height in &heights {
            bases.push(level);
            level += height;
        }
        Self {
            count,
            heights,
            bases,
        }
    }

    pub fn eaves(&self) -> f64 {
        self.heights.iter().sum()
    }

    pub fn base(&self, floor: FloorIndex) -> f64 {
        self.bases
            .get(floor as usize)
            .copied()
            .unwrap_or_else(|| self.eaves())
    }
}

/// Roof silhouette in view coordinates `(x, z)`, with `x` in `0..span`.
#[derive(Debug, Clone, PartialEq)]
pub struct RoofProfile {
    pub outline: Vec<(f64, f64)>,
    pub ridge: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoofInput {
    pub roof_type: RoofType,
    pub pitch: f64,
    /// Building extent across the view.
    pub span: f64,
    /// Building extent along the line of sight.
    pub depth: f64,
    pub eaves: f64,
    pub overhang: f64,
    pub parapet: f64,
}

pub fn sanitize_pitch(pitch: f64) -> f64 {
    if pitch.is_finite() && pitch > 0.0 {
        pitch.clamp(5.0, 75.0)
    } else {
        DEFAULT_ROOF_PITCH
    }
}

/// The ridge runs along the longer plan dimension, so the roof rises across
/// the shorter one. Hips and mansards slope on all four sides.
pub fn roof_profile(input: RoofInput) -> RoofProfile {
    let RoofInput {
        roof_type,
        span,
        depth,
        eaves,
        overhang,
        parapet,
        ..
    } = input;
    let tan = sanitize_pitch(input.pitch).to_radians().tan();
    let half = span.min(depth) / 2.0;
    let rise = half * tan;
    let eaves_drop = overhang * tan;

    match roof_type {
        RoofType::Gable if span >= depth => RoofProfile {
            outline: vec![
                (-overhang, eaves),
                (-overhang, eaves + rise),
                (span + overhang, eaves + rise),
                (span + overhang, eaves),
            ],
            ridge: eaves + rise,
        },
        RoofType::Gable => RoofProfile {
            outline: vec![
                (-overhang, eaves - eaves_drop),
                (span / 2.0, eaves + rise),
                (span + overhang, eaves - eaves_drop),
            ],
            ridge: eaves + rise,
        },
        RoofType::Hip => {
            let inset = half.min(span / 2.0);
            RoofProfile {
                outline: vec![
                    (-overhang, eaves - eaves_drop),
                    (inset, eaves + rise),
                    (span - inset, eaves + rise),
                    (span + overhang, eaves - eaves_drop),
                ],
                ridge: eaves + rise,
            }
        }
        RoofType::Flat => RoofProfile {
            outline: vec![
                (0.0, eaves),
                (0.0, eaves + parapet),
                (span, eaves + parapet),
                (span, eaves),
            ],
            ridge: eaves + parapet,
        },
        RoofType::Mansard => {
            let lower_run = half * MANSARD_LOWER_SHARE;
            let lower_rise = lower_run * MANSARD_LOWER_PITCH.to_radians().tan();
            let upper_half = half - lower_run;
            let upper_rise = upper_half * MANSARD_UPPER_PITCH.to_radians().tan();
            let upper_inset = upper_half.min((span - 2.0 * lower_run) / 2.0);
            let break_z = eaves + lower_rise;
            let top = break_z + upper_rise;
            RoofProfile {
                outline: vec![
                    (-overhang, eaves),
                    (lower_run, break_z),
                    (lower_run + upper_inset, top),
                    (span - lower_run - upper_inset, top),
                    (span - lower_run, break_z),
                    (span + overhang, eaves),
                ],
                ridge: top,
            }
        }
    }
}

/// Opening as drawn on a facade: `x` from the facade's left edge, `bottom`
/// above ground level.
#[derive(Debug, Clone, PartialEq)]
pub struct FacadeInstance {
    pub kind: OpeningKind,
    pub x: f64,
    pub width: f64,
    pub bottom: f64,
    pub height: f64,
    pub floor: FloorIndex,
}

/// Explicit facade openings when the envelope lists any for `orientation`,
/// otherwise wall openings projected from exterior walls facing that way.
pub fn facade_openings(geometry: &BuildingGeometry, orientation: Orientation) -> Vec<FacadeInstance> {
    let storeys = Storeys::resolve(geometry);
    if let Some(explicit) = geometry
        .envelope
        .facades
        .get(&orientation)
        .filter(|list| !list.is_empty())
    {
        return explicit
            .iter()
            .map(|opening| from_explicit(opening, &storeys))
            .collect();
    }
    let Some(footprint) = geometry.footprint() else {
        return Vec::new();
    };

    let mut instances = Vec::new();
    for (&floor_index, floor) in &geometry.floors {
        let walls = resolve_walls(geometry, floor);
        let base = storeys.base(floor_index);
        for (idx, wall) in walls.iter().enumerate() {
            if !wall.is_exterior() || wall_facade(wall, footprint) != Some(orientation) {
                continue;
            }
            let linked = floor
                .openings
                .iter()
                .filter(|o| o.wall == Some(idx));
            for opening in wall.openings.iter().chain(linked) {
                if let Some(instance) =
                    project(wall, opening, orientation, footprint, base, floor_index)
                {
                    instances.push(instance);
                }
            }
        }
    }
    instances.sort_by(|a, b| a.floor.cmp(&b.floor).then(a.x.total_cmp(&b.x)));
    instances
}

fn from_explicit(opening: &FacadeOpening, storeys: &Storeys) -> FacadeInstance {
    let (height, sill) = opening_extent(opening.kind, opening.height, opening.sill_height);
    FacadeInstance {
        kind: opening.kind,
        x: opening.x,
        width: opening.width,
        bottom: storeys.base(opening.floor) + sill,
        height,
        floor: opening.floor,
    }
}

fn opening_extent(kind: OpeningKind, height: f64, sill: Option<f64>) -> (f64, f64) {
    let (default_height, default_sill) = match kind {
        OpeningKind::Door => (DOOR_HEIGHT, 0.0),
        OpeningKind::Window => (WINDOW_HEIGHT, WINDOW_SILL),
    };
    let height = if height.is_finite() && height > 0.0 {
        height
    } else {
        default_height
    };
    let sill = sill
        .filter(|s| s.is_finite() && *s >= 0.0)
        .unwrap_or(default_sill);
    (height, sill)
}

/// Tagged facade, else the footprint side an untagged exterior wall runs along.
fn wall_facade(wall: &Wall, footprint: Rect) -> Option<Orientation> {
    if wall.facade.is_some() {
        return wall.facade;
    }
    let mid = wall.start.add(wall.end).scale(0.5);
    let delta = wall.end.sub(wall.start);
    let tolerance = wall.thickness.max(0.05);
    if delta.x.abs() >= delta.y.abs() {
        if (mid.y - footprint.y).abs() <= tolerance {
            return Some(Orientation::North);
        }
        if (mid.y - footprint.max_y()).abs() <= tolerance {
            return Some(Orientation::South);
        }
    } else {
        if (mid.x - footprint.max_x()).abs() <= tolerance {
            return Some(Orientation::East);
        }
        if (mid.x - footprint.x).abs() <= tolerance {
            return Some(Orientation::West);
        }
    }
    None
}

/// Distance of a plan point from the left edge of the facade as seen by a
/// viewer standing outside it.
pub fn facade_x(point: Point, orientation: Orientation, footprint: Rect) -> f64 {
    match orientation {
        Orientation::North => footprint.max_x() - point.x,
        Orientation::South => point.x - footprint.x,
        Orientation::East => footprint.max_y() - point.y,
        Orientation::West => point.y - footprint.y,
    }
}

fn project(
    wall: &Wall,
    opening: &Opening,
    orientation: Orientation,
    footprint: Rect,
    base: f64,
    floor: FloorIndex,
) -> Option<FacadeInstance> {
    let span = opening_span(wall, opening)?;
    let (height, sill) = opening_extent(opening.kind, opening.height, opening.sill_height);
    let width = span.to - span.from;
    Some(FacadeInstance {
        kind: opening.kind,
        x: facade_x(span.center, orientation, footprint) - width / 2.0,
        width,
        bottom: base + sill,
        height,
        floor,
    })
}

/// Ground strip below finished ground level plus the ground line.
pub(crate) fn ground_strip(canvas: &Canvas, x0: f64, x1: f64, depth: f64, theme: &Theme) -> String {
    let a = canvas.elev(x0, 0.0);
    let b = canvas.elev(x1, -depth);
    format!(
        "<rect class=\"ground\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.35\"/><path class=\"ground-line\" d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{}\" stroke-width=\"2\"/>",
        a.x,
        a.y,
        b.x - a.x,
        b.y - a.y,
        theme.ground_color,
        a.x,
        a.y,
        b.x,
        a.y,
        theme.line_color
    )
}

/// One marker per storey at its finished floor level, plus the ridge.
pub(crate) fn level_markers(
    canvas: &Canvas,
    storeys: &Storeys,
    span: f64,
    ridge: f64,
    theme: &Theme,
) -> String {
    let x_from = canvas.elev(span, 0.0).x;
    let x_to = canvas.elev(span + GROUND_EXTENSION, 0.0).x + 16.0;
    let mut svg = String::new();
    for base in &storeys.bases {
        svg.push_str(&level_marker(
            x_from,
            x_to,
            canvas.elev(0.0, *base).y,
            &level_label(*base),
            theme,
        ));
    }
    svg.push_str(&level_marker(
        x_from,
        x_to,
        canvas.elev(0.0, ridge).y,
        &format!("Ridge {}", level_label(ridge)),
        theme,
    ));
    svg
}

/// Canvas covering the building, the ground strip and the roof. Extents are
/// stored as `(x, -z)`.
pub(crate) fn view_canvas(
    span: f64,
    overhang: f64,
    ridge: f64,
    ground_depth: f64,
    scale: f64,
    margin: f64,
) -> Result<Canvas, AssemblyError> {
    let left = -(overhang.max(0.0) + GROUND_EXTENSION);
    let right = span + overhang.max(0.0) + GROUND_EXTENSION;
    let extent = Rect::new(left, -ridge, right - left, ridge + ground_depth.max(0.0));
    Canvas::new(extent, scale, margin, LABEL_GUTTER, FOOTER)
}

fn assemble(
    geometry: &BuildingGeometry,
    orientation: Orientation,
    options: &ElevationOptions,
    theme: &Theme,
) -> Result<String, AssemblyError> {
    let footprint = geometry.footprint().ok_or(AssemblyError::EmptyCanvas)?;
    let (span, depth) = if orientation.spans_width() {
        (footprint.width, footprint.length)
    } else {
        (footprint.length, footprint.width)
    };
    let storeys = Storeys::resolve(geometry);
    let eaves = storeys.eaves();
    let roof = roof_profile(RoofInput {
        roof_type: geometry.envelope.roof_type,
        pitch: geometry.envelope.roof_pitch,
        span,
        depth,
        eaves,
        overhang: options.eaves_overhang,
        parapet: options.parapet_height,
    });
    if !roof.ridge.is_finite() || roof.outline.iter().any(|(x, z)| !x.is_finite() || !z.is_finite()) {
        return Err(AssemblyError::NonFiniteCoordinate("roof profile"));
    }
    let canvas = view_canvas(
        span,
        options.eaves_overhang,
        roof.ridge,
        options.ground_depth,
        options.scale,
        options.margin,
    )?;

    let wall_pattern = MaterialPattern::for_walls(&geometry.materials);
    let roof_pattern = MaterialPattern::for_roof(&geometry.materials);

    let mut svg = svg_open(
        &canvas,
        theme,
        &[
            ("class", "elevation".to_string()),
            ("data-orientation", orientation.label().to_lowercase()),
            ("data-floor-count", storeys.count.to_string()),
        ],
    );
    svg.push_str("<defs>");
    svg.push_str(&material_pattern_def(wall_pattern, theme));
    if roof_pattern != wall_pattern {
        svg.push_str(&material_pattern_def(roof_pattern, theme));
    }
    svg.push_str("</defs>");
    svg.push_str(&background(theme));

    let overhang = options.eaves_overhang.max(0.0);
    svg.push_str(&ground_strip(
        &canvas,
        -(overhang + GROUND_EXTENSION),
        span + overhang + GROUND_EXTENSION,
        options.ground_depth,
        theme,
    ));

    let wall_outline = [
        canvas.elev(0.0, 0.0),
        canvas.elev(span, 0.0),
        canvas.elev(span, eaves),
        canvas.elev(0.0, eaves),
    ];
    svg.push_str(&format!(
        "<path class=\"facade\" d=\"{}\" fill=\"url(#{})\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        polygon_to_path(&wall_outline),
        wall_pattern.pattern_id(),
        theme.line_color
    ));
    for base in storeys.bases.iter().skip(1) {
        let a = canvas.elev(0.0, *base);
        let b = canvas.elev(span, *base);
        svg.push_str(&format!(
            "<path class=\"floor-line\" d=\"M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{}\" stroke-width=\"0.8\" stroke-dasharray=\"6 4\"/>",
            a.x, a.y, b.x, b.y, theme.dimension_color
        ));
    }

    let roof_points: Vec<Point> = roof.outline.iter().map(|(x, z)| canvas.elev(*x, *z)).collect();
    svg.push_str(&format!(
        "<path class=\"roof\" d=\"{}\" fill=\"url(#{})\" stroke=\"{}\" stroke-width=\"1.5\"/>",
        polygon_to_path(&roof_points),
        roof_pattern.pattern_id(),
        theme.line_color
    ));

    let style = WindowStyle::from_style(geometry.envelope.style.as_deref());
    for instance in facade_openings(geometry, orientation) {
        svg.push_str(&opening_svg(&canvas, &instance, style, theme));
    }

    if options.show_level_markers {
        svg.push_str(&level_markers(&canvas, &storeys, span, roof.ridge, theme));
    }

    let footer_y = canvas.height - FOOTER;
    svg.push_str(&scale_bar(canvas.margin(), footer_y + 30.0, canvas.scale(), theme));
    svg.push_str(&title_block(
        canvas.margin() + canvas.len(1.0) + 90.0,
        footer_y + 34.0,
        &format!("{} Elevation", orientation.label()),
        geometry.metadata.name.as_deref(),
        theme,
    ));
    svg.push_str("</svg>");

    tracing::debug!(
        orientation = orientation.label(),
        floors = storeys.count,
        roof = ?geometry.envelope.roof_type,
        bytes = svg.len(),
        "rendered elevation"
    );
    Ok(svg)
}

fn opening_svg(canvas: &Canvas, instance: &FacadeInstance, style: WindowStyle, theme: &Theme) -> String {
    if !instance.x.is_finite() || !instance.width.is_finite() || instance.width <= 0.0 {
        return String::new();
    }
    let top_left = canvas.elev(instance.x, instance.bottom + instance.height);
    let w = canvas.len(instance.width);
    let h = canvas.len(instance.height);
    match instance.kind {
        OpeningKind::Door => format!(
            "<rect class=\"door\" data-floor=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            instance.floor, top_left.x, top_left.y, theme.door_color, theme.line_color
        ),
        OpeningKind::Window => {
            let mut svg = format!(
                "<rect class=\"window\" data-floor=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
                instance.floor, top_left.x, top_left.y, theme.glazing_color, theme.window_color
            );
            let mullions = style.mullions();
            let mut d = String::new();
            for i in 1..=mullions.vertical {
                let x = top_left.x + w * i as f64 / (mullions.vertical + 1) as f64;
                d.push_str(&format!("M {x:.2} {:.2} L {x:.2} {:.2} ", top_left.y, top_left.y + h));
            }
            for i in 1..=mullions.horizontal {
                let y = top_left.y + h * i as f64 / (mullions.horizontal + 1) as f64;
                d.push_str(&format!("M {:.2} {y:.2} L {:.2} {y:.2} ", top_left.x, top_left.x + w));
            }
            if !d.is_empty() {
                svg.push_str(&format!(
                    "<path class=\"mullion\" d=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
                    d.trim_end(),
                    theme.window_color
                ));
            }
            svg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Dimensions;

    fn input(roof_type: RoofType, span: f64, depth: f64) -> RoofInput {
        RoofInput {
            roof_type,
            pitch: 45.0,
            span,
            depth,
            eaves: 5.4,
            overhang: 0.0,
            parapet: 0.5,
        }
    }

    #[test]
    fn gable_peak_follows_pitch() {
        let end = roof_profile(input(RoofType::Gable, 8.0, 10.0));
        assert_eq!(end.outline.len(), 3);
        assert!((end.ridge - 9.4).abs() < 1e-9);
        let side = roof_profile(input(RoofType::Gable, 10.0, 8.0));
        assert_eq!(side.outline.len(), 4);
        assert!((side.ridge - end.ridge).abs() < 1e-9);
    }

    #[test]
    fn hip_and_flat_profiles() {
        let hip = roof_profile(input(RoofType::Hip, 10.0, 8.0));
        let close = |(x, z): (f64, f64), (ex, ez): (f64, f64)| (x - ex).abs() < 1e-9 && (z - ez).abs() < 1e-9;
        assert!(close(hip.outline[1], (4.0, 9.4)));
        assert!(close(hip.outline[2], (6.0, 9.4)));
        let flat = roof_profile(input(RoofType::Flat, 10.0, 8.0));
        assert!((flat.ridge - 5.9).abs() < 1e-9);
        let mansard = roof_profile(input(RoofType::Mansard, 10.0, 8.0));
        assert!(mansard.ridge > 5.4);
        assert_eq!(mansard.outline.len(), 6);
    }

    #[test]
    fn facade_x_is_measured_from_viewer_left() {
        let fp = Rect::new(0.0, 0.0, 10.0, 8.0);
        assert_eq!(facade_x(Point::new(2.0, 0.0), Orientation::North, fp), 8.0);
        assert_eq!(facade_x(Point::new(2.0, 8.0), Orientation::South, fp), 2.0);
        assert_eq!(facade_x(Point::new(10.0, 3.0), Orientation::East, fp), 5.0);
        assert_eq!(facade_x(Point::new(0.0, 3.0), Orientation::West, fp), 3.0);
    }

    #[test]
    fn elevation_reports_floor_count() {
        let geometry = BuildingGeometry {
            dimensions: Dimensions {
                width: Some(10.0),
                depth: Some(8.0),
                floor_count: Some(2),
                ..Dimensions::default()
            },
            ..BuildingGeometry::default()
        };
        let svg = generate(&geometry, Orientation::South, &ElevationOptions::default()).unwrap();
        assert!(svg.contains("data-floor-count=\"2\""));
        assert!(svg.contains("South Elevation"));
        assert!(svg.contains("+0.00"));
        assert!(svg.contains("+2.70"));
        assert!(svg.contains("Ridge +"));
    }

    #[test]
    fn elevation_without_footprint_is_a_generation_error() {
        let err = generate(&BuildingGeometry::default(), Orientation::North, &ElevationOptions::default())
            .unwrap_err();
        assert_eq!(err.code(), "GENERATION_ERROR");
    }
}

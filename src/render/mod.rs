pub mod annotations;
pub mod elevation;
pub mod floor_plan;
pub mod furniture;
pub mod section;

use crate::catalog::MaterialPattern;
use crate::error::AssemblyError;
use crate::geometry::{Point, Rect};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Maps building coordinates (metres) onto the sheet. Pure translate and
/// scale, so orientation and sweep directions carry over unchanged.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Canvas {
    origin: Point,
    scale: f64,
    margin: f64,
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    /// `extra` is added below the drawing for titles and the scale bar; `gutter`
    /// to its right for level labels.
    pub fn new(
        extent: Rect,
        scale: f64,
        margin: f64,
        gutter: f64,
        extra: f64,
    ) -> Result<Self, AssemblyError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AssemblyError::InvalidScale(scale));
        }
        let finite = [extent.x, extent.y, extent.width, extent.length]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(AssemblyError::NonFiniteCoordinate("canvas extent"));
        }
        if extent.width <= 0.0 || extent.length <= 0.0 {
            return Err(AssemblyError::EmptyCanvas);
        }
        let margin = if margin.is_finite() { margin.max(0.0) } else { 0.0 };
        Ok(Self {
            origin: Point::new(extent.x, extent.y),
            scale,
            margin,
            width: extent.width * scale + 2.0 * margin + gutter,
            height: extent.length * scale + 2.0 * margin + extra,
        })
    }

    pub fn px(&self, p: Point) -> Point {
        Point::new(
            self.margin + (p.x - self.origin.x) * self.scale,
            self.margin + (p.y - self.origin.y) * self.scale,
        )
    }

    /// Elevation coordinates: `x` along the facade, `z` up from ground level.
    /// The extent passed to [`Canvas::new`] must be expressed as `(x, -z)`.
    pub fn elev(&self, x: f64, z: f64) -> Point {
        self.px(Point::new(x, -z))
    }

    pub fn len(&self, metres: f64) -> f64 {
        metres * self.scale
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }
}

pub(crate) fn svg_open(canvas: &Canvas, theme: &Theme, attrs: &[(&str, String)]) -> String {
    let mut svg = String::new();
    let width = canvas.width;
    let height = canvas.height;
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\" font-family=\"{}\"",
        escape_xml(&theme.font_family)
    ));
    for (name, value) in attrs {
        svg.push_str(&format!(" {name}=\"{}\"", escape_xml(value)));
    }
    svg.push('>');
    svg
}

pub(crate) fn background(theme: &Theme) -> String {
    format!(
        "<rect class=\"background\" width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    )
}

/// Diagonal hatch used for cut and exterior walls.
pub(crate) fn wall_hatch_def(theme: &Theme) -> String {
    format!(
        "<pattern id=\"wall-hatch\" patternUnits=\"userSpaceOnUse\" width=\"6\" height=\"6\" patternTransform=\"rotate(45)\"><rect width=\"6\" height=\"6\" fill=\"{}\"/><line x1=\"0\" y1=\"0\" x2=\"0\" y2=\"6\" stroke=\"{}\" stroke-width=\"2.5\"/></pattern>",
        theme.wall_color, theme.wall_hatch_color
    )
}

pub(crate) fn material_pattern_def(pattern: MaterialPattern, theme: &Theme) -> String {
    let id = pattern.pattern_id();
    match pattern {
        MaterialPattern::Brick => format!(
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"24\" height=\"12\"><rect width=\"24\" height=\"12\" fill=\"#C9794F\"/><path d=\"M 0 0 L 24 0 M 0 6 L 24 6 M 12 0 L 12 6 M 0 6 L 0 12 M 24 6 L 24 12\" stroke=\"#EFE3D3\" stroke-width=\"1\" fill=\"none\"/></pattern>"
        ),
        MaterialPattern::Timber => format!(
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"40\" height=\"10\"><rect width=\"40\" height=\"10\" fill=\"#B08D57\"/><path d=\"M 0 9.5 L 40 9.5\" stroke=\"#7A5C33\" stroke-width=\"1\" fill=\"none\"/></pattern>"
        ),
        MaterialPattern::Render => format!(
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"10\" height=\"10\"><rect width=\"10\" height=\"10\" fill=\"#F2EDE4\"/><circle cx=\"3\" cy=\"4\" r=\"0.5\" fill=\"#D8D0C2\"/><circle cx=\"8\" cy=\"8\" r=\"0.5\" fill=\"#D8D0C2\"/></pattern>"
        ),
        MaterialPattern::Stone => format!(
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"30\" height=\"20\"><rect width=\"30\" height=\"20\" fill=\"#C8C2B4\"/><path d=\"M 0 0 L 30 0 M 0 10 L 30 10 M 18 0 L 18 10 M 8 10 L 8 20\" stroke=\"#8F8777\" stroke-width=\"1\" fill=\"none\"/></pattern>"
        ),
        MaterialPattern::Slate => format!(
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"16\" height=\"8\"><rect width=\"16\" height=\"8\" fill=\"{}\"/><path d=\"M 0 7.5 L 16 7.5 M 8 0 L 8 7.5\" stroke=\"#3E3E3E\" stroke-width=\"0.8\" fill=\"none\"/></pattern>",
            theme.roof_color
        ),
        MaterialPattern::Plain => format!(
            "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"10\" height=\"10\"><rect width=\"10\" height=\"10\" fill=\"#E6E6E6\"/></pattern>"
        ),
    }
}

/// Open polyline `M x y L x y ...`. Empty input yields an empty string.
pub(crate) fn points_to_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].x, points[0].y));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.x, point.y));
    }
    d
}

pub(crate) fn polygon_to_path(points: &[Point]) -> String {
    let mut d = points_to_path(points);
    if !d.is_empty() {
        d.push_str(" Z");
    }
    d
}

pub(crate) fn all_finite(points: &[Point]) -> bool {
    points.iter().all(|p| p.is_finite())
}

pub(crate) fn text(
    x: f64,
    y: f64,
    class: &str,
    anchor: &str,
    size: f64,
    fill: &str,
    content: &str,
) -> String {
    format!(
        "<text class=\"{class}\" x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"{anchor}\" font-size=\"{size:.1}\" fill=\"{fill}\">{}</text>",
        escape_xml(content)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|f| f.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "Arial".to_string());
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_rejects_bad_scale() {
        let extent = Rect::new(0.0, 0.0, 10.0, 8.0);
        assert!(matches!(
            Canvas::new(extent, 0.0, 40.0, 0.0, 0.0),
            Err(AssemblyError::InvalidScale(_))
        ));
        assert!(matches!(
            Canvas::new(extent, f64::NAN, 40.0, 0.0, 0.0),
            Err(AssemblyError::InvalidScale(_))
        ));
    }

    #[test]
    fn canvas_maps_linearly() {
        let canvas = Canvas::new(Rect::new(-1.0, 2.0, 10.0, 8.0), 50.0, 40.0, 0.0, 20.0).unwrap();
        assert_eq!(canvas.px(Point::new(-1.0, 2.0)), Point::new(40.0, 40.0));
        assert_eq!(canvas.px(Point::new(0.0, 3.0)), Point::new(90.0, 90.0));
        assert_eq!(canvas.width, 580.0);
        assert_eq!(canvas.height, 500.0);
    }

    #[test]
    fn closed_path_starts_with_move_to() {
        let d = polygon_to_path(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(d.starts_with("M 0.00 0.00"));
        assert!(d.ends_with(" Z"));
        assert_eq!(points_to_path(&[]), "");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("Bed & <Bath>"), "Bed &amp; &lt;Bath&gt;");
    }
}

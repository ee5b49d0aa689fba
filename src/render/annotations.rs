//! Sheet annotations shared by the plan, elevation and section renderers.
//! Every function here works in sheet pixels.

use super::{escape_xml, text};
use crate::geometry::Point;
use crate::theme::Theme;

/// Average glyph advance as a fraction of the font size. No font files are
/// read, so label sizing is identical on every machine.
const CHAR_WIDTH_RATIO: f64 = 0.6;
const MIN_LABEL_FONT: f64 = 7.0;

/// Largest font size not above `base` at which `label` fits `available` pixels.
pub fn fit_font_size(label: &str, available: f64, base: f64) -> f64 {
    let chars = label.chars().count().max(1) as f64;
    let needed = chars * base * CHAR_WIDTH_RATIO;
    if needed <= available || available <= 0.0 {
        return base;
    }
    (available / (chars * CHAR_WIDTH_RATIO)).clamp(MIN_LABEL_FONT, base)
}

pub fn floor_title(index: u32) -> String {
    match index {
        0 => "Ground Floor Plan".to_string(),
        1 => "First Floor Plan".to_string(),
        2 => "Second Floor Plan".to_string(),
        3 => "Third Floor Plan".to_string(),
        n => format!("Level {n} Floor Plan"),
    }
}

/// Ratio denominator for a sheet printed at 96 dpi.
pub fn scale_ratio(px_per_metre: f64) -> u32 {
    let px_per_metre_on_paper = 96.0 / 0.0254;
    (px_per_metre_on_paper / px_per_metre).round().max(1.0) as u32
}

pub fn north_arrow(x: f64, y: f64, rotation: f64, theme: &Theme) -> String {
    let rotation = if rotation.is_finite() { rotation } else { 0.0 };
    format!(
        "<g class=\"north-arrow\" transform=\"translate({x:.2} {y:.2}) rotate({rotation:.2})\"><circle r=\"16\" fill=\"none\" stroke=\"{line}\" stroke-width=\"0.8\"/><polygon points=\"0,-20 5,10 0,5 -5,10\" fill=\"{line}\"/>{label}</g>",
        line = theme.line_color,
        label = text(0.0, -24.0, "north-label", "middle", theme.font_size, &theme.text_color, "N"),
    )
}

/// One-metre bar with end ticks, its length label and the sheet ratio.
pub fn scale_bar(x: f64, y: f64, px_per_metre: f64, theme: &Theme) -> String {
    let end = x + px_per_metre;
    let mut svg = String::new();
    svg.push_str("<g class=\"scale-bar\">");
    svg.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"4\" fill=\"{}\"/>",
        y - 2.0,
        px_per_metre,
        theme.line_color
    ));
    svg.push_str(&format!(
        "<path d=\"M {x:.2} {:.2} L {x:.2} {:.2} M {end:.2} {:.2} L {end:.2} {:.2}\" stroke=\"{}\" stroke-width=\"1\"/>",
        y - 6.0,
        y + 6.0,
        y - 6.0,
        y + 6.0,
        theme.line_color
    ));
    let small = theme.font_size * 0.85;
    svg.push_str(&text(x, y + 18.0, "scale-label", "middle", small, &theme.text_color, "0"));
    svg.push_str(&text(end, y + 18.0, "scale-label", "middle", small, &theme.text_color, "1 m"));
    svg.push_str(&text(
        end + 14.0,
        y + 4.0,
        "scale-ratio",
        "start",
        small,
        &theme.text_color,
        &format!("1:{}", scale_ratio(px_per_metre)),
    ));
    svg.push_str("</g>");
    svg
}

/// Dimension line from `a` to `b`, drawn `offset` pixels along the unit
/// `normal`, with extension lines back to the measured points.
pub fn dimension_line(a: Point, b: Point, normal: Point, offset: f64, label: &str, theme: &Theme) -> String {
    let shift = normal.scale(offset);
    let da = a.add(shift);
    let db = b.add(shift);
    let tick = normal.scale(4.0);
    let along = db.sub(da);
    let len = along.length().max(1e-9);
    let dir = along.scale(1.0 / len);
    let slash = dir.add(normal).scale(3.0);

    let mut svg = String::new();
    svg.push_str("<g class=\"dimension\">");
    svg.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"0.8\"/>",
        a.x,
        a.y,
        da.add(tick).x,
        da.add(tick).y,
        b.x,
        b.y,
        db.add(tick).x,
        db.add(tick).y,
        da.x,
        da.y,
        db.x,
        db.y,
        theme.dimension_color
    ));
    svg.push_str(&format!(
        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{}\" stroke-width=\"1.2\"/>",
        da.sub(slash).x,
        da.sub(slash).y,
        da.add(slash).x,
        da.add(slash).y,
        db.sub(slash).x,
        db.sub(slash).y,
        db.add(slash).x,
        db.add(slash).y,
        theme.dimension_color
    ));

    let mid = da.add(db).scale(0.5).add(normal.scale(8.0));
    let angle = dir.y.atan2(dir.x).to_degrees();
    // Keep text upright on vertical runs.
    let angle = if angle > 90.0 || angle < -90.0 { angle + 180.0 } else { angle };
    svg.push_str(&format!(
        "<text class=\"dimension-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-size=\"{:.1}\" fill=\"{}\" transform=\"rotate({angle:.2} {:.2} {:.2})\">{}</text>",
        mid.x,
        mid.y,
        theme.font_size * 0.85,
        theme.dimension_color,
        mid.x,
        mid.y,
        escape_xml(label)
    ));
    svg.push_str("</g>");
    svg
}

/// Level marker: dashed datum line, datum triangle, elevation label.
pub fn level_marker(x_from: f64, x_to: f64, y: f64, label: &str, theme: &Theme) -> String {
    let mut svg = String::new();
    svg.push_str("<g class=\"level-marker\">");
    svg.push_str(&format!(
        "<path d=\"M {x_from:.2} {y:.2} L {x_to:.2} {y:.2}\" stroke=\"{}\" stroke-width=\"0.6\" stroke-dasharray=\"4 3\"/>",
        theme.dimension_color
    ));
    svg.push_str(&format!(
        "<path d=\"M {x_to:.2} {y:.2} L {:.2} {:.2} L {:.2} {:.2} Z\" fill=\"{}\"/>",
        x_to - 5.0,
        y - 8.0,
        x_to + 5.0,
        y - 8.0,
        theme.line_color
    ));
    svg.push_str(&text(
        x_to + 10.0,
        y - 2.0,
        "level-label",
        "start",
        theme.font_size * 0.85,
        &theme.text_color,
        label,
    ));
    svg.push_str("</g>");
    svg
}

pub fn level_label(elevation: f64) -> String {
    if elevation < 0.0 {
        format!("{elevation:.2}")
    } else {
        format!("+{elevation:.2}")
    }
}

pub fn title_block(x: f64, y: f64, title: &str, subtitle: Option<&str>, theme: &Theme) -> String {
    let mut svg = text(x, y, "title", "start", theme.title_font_size, &theme.text_color, title);
    if let Some(subtitle) = subtitle.filter(|s| !s.trim().is_empty()) {
        svg.push_str(&text(
            x,
            y + theme.title_font_size,
            "subtitle",
            "start",
            theme.font_size,
            &theme.text_color,
            subtitle,
        ));
    }
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_shrink() {
        assert_eq!(fit_font_size("Hall", 200.0, 12.0), 12.0);
        let shrunk = fit_font_size("Master Bedroom With Ensuite", 100.0, 12.0);
        assert!(shrunk < 12.0);
        assert!(shrunk >= MIN_LABEL_FONT);
    }

    #[test]
    fn titles_by_floor() {
        assert_eq!(floor_title(0), "Ground Floor Plan");
        assert_eq!(floor_title(1), "First Floor Plan");
        assert_eq!(floor_title(7), "Level 7 Floor Plan");
    }

    #[test]
    fn ratio_at_default_scale() {
        assert_eq!(scale_ratio(50.0), 76);
        assert_eq!(level_label(0.0), "+0.00");
        assert_eq!(level_label(2.7), "+2.70");
    }

    #[test]
    fn scale_bar_is_tagged() {
        let svg = scale_bar(10.0, 10.0, 50.0, &Theme::default());
        assert!(svg.starts_with("<g class=\"scale-bar\">"));
        assert!(svg.contains("1:76"));
    }
}

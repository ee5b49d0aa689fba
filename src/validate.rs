//! Post-render checks on generated SVG and the abort/fallback policy applied
//! to their outcome.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{DrawingError, DrawingResult};
use crate::geometry::{self, Point, Rect};

static PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<path\b[^>]*?(?:/>|>.*?</path>)").unwrap());
static D_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\sd\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9:_.-]*)\b[^>]*?(/?)>").unwrap());
static BAD_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:nan|undefined|null|inf|infinity)\b").unwrap());
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").unwrap());

/// Caller-assigned category of a drawing. Structural panels abort on failure,
/// decorative ones are repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelClass {
    FloorPlan,
    Elevation,
    Section,
}

impl PanelClass {
    pub fn default_policy(self) -> Policy {
        match self {
            Self::FloorPlan => Policy::Abort,
            Self::Elevation | Self::Section => Policy::Fallback,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    Abort,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    pub panel: PanelClass,
    pub expected_room_count: usize,
    /// Overrides the panel's default policy.
    pub policy: Option<Policy>,
}

impl ValidationOptions {
    pub fn new(panel: PanelClass) -> Self {
        Self {
            panel,
            expected_room_count: 0,
            policy: None,
        }
    }

    pub fn with_expected_rooms(mut self, count: usize) -> Self {
        self.expected_room_count = count;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn policy(&self) -> Policy {
        self.policy.unwrap_or_else(|| self.panel.default_policy())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMetrics {
    pub actual_room_count: usize,
    pub has_interior_walls: bool,
    pub has_room_labels: bool,
    pub has_dimensions: bool,
    pub has_scale_indicator: bool,
    pub invalid_paths: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metrics: ValidationMetrics,
}

#[derive(Debug, Clone)]
pub struct ValidatedDrawing {
    pub svg: String,
    pub result: ValidationResult,
}

/// Path data must open with a move-to and carry no placeholder tokens.
pub fn is_valid_path_data(d: &str) -> bool {
    let trimmed = d.trim_start();
    match trimmed.chars().next() {
        Some('M') | Some('m') => !BAD_TOKEN_RE.is_match(trimmed),
        _ => false,
    }
}

fn path_data(element: &str) -> Option<&str> {
    let caps = D_ATTR_RE.captures(element)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str())
}

fn has_class(svg: &str, class: &str) -> bool {
    svg.contains(&format!("class=\"{class}\""))
}

fn has_root(svg: &str) -> bool {
    let mut body = svg.trim();
    if body.starts_with("<?xml") {
        match body.find("?>") {
            Some(end) => body = body[end + 2..].trim_start(),
            None => return false,
        }
    }
    body.starts_with("<svg") && body.ends_with("</svg>")
}

fn check_balance(svg: &str) -> Result<(), String> {
    let mut stack: Vec<&str> = Vec::new();
    for caps in TAG_RE.captures_iter(svg) {
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closing = caps.get(3).is_some_and(|m| !m.as_str().is_empty());
        let Some(name) = caps.get(2).map(|m| m.as_str()) else {
            continue;
        };
        if self_closing {
            continue;
        }
        if !closing {
            stack.push(name);
            continue;
        }
        match stack.pop() {
            Some(open) if open == name => {}
            Some(open) => return Err(format!("unbalanced markup: </{name}> closes <{open}>")),
            None => return Err(format!("unbalanced markup: stray </{name}>")),
        }
    }
    match stack.last() {
        Some(open) => Err(format!("unbalanced markup: <{open}> is never closed")),
        None => Ok(()),
    }
}

fn preview(d: &str) -> String {
    let mut short: String = d.chars().take(32).collect();
    if d.chars().count() > 32 {
        short.push_str("...");
    }
    short
}

pub fn validate(svg: &str, options: &ValidationOptions) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if !has_root(svg) {
        errors.push("missing or malformed <svg> root element".to_string());
    } else if let Err(message) = check_balance(svg) {
        errors.push(message);
    }

    let mut invalid_paths = 0;
    for element in PATH_RE.find_iter(svg) {
        let d = path_data(element.as_str()).unwrap_or("");
        if !is_valid_path_data(d) {
            invalid_paths += 1;
            errors.push(format!("invalid path data: {:?}", preview(d)));
        }
    }

    let metrics = ValidationMetrics {
        actual_room_count: svg.matches("class=\"room-fill\"").count(),
        has_interior_walls: has_class(svg, "wall-interior") || has_class(svg, "wall-interior-cut"),
        has_room_labels: has_class(svg, "room-label"),
        has_dimensions: has_class(svg, "dimension"),
        has_scale_indicator: has_class(svg, "scale-bar"),
        invalid_paths,
    };

    if !metrics.has_scale_indicator {
        let message = "no scale indicator".to_string();
        if options.panel == PanelClass::FloorPlan {
            errors.push(message);
        } else {
            warnings.push(message);
        }
    }

    if options.panel == PanelClass::FloorPlan {
        let expected = options.expected_room_count;
        let actual = metrics.actual_room_count;
        if expected > 0 && actual < expected {
            errors.push(format!("expected {expected} rooms, found {actual}"));
        }
        if expected > 1 && !metrics.has_interior_walls {
            errors.push("multiple rooms expected but no interior walls rendered".to_string());
        }
        if expected == 0 && actual == 0 {
            warnings.push("no rooms rendered".to_string());
        }
        if actual > 0 && !metrics.has_room_labels {
            warnings.push("rooms rendered without labels".to_string());
        }
        if !metrics.has_dimensions {
            warnings.push("no dimension lines".to_string());
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
        metrics,
    }
}

/// Validates and applies the policy. `Abort` turns any error into
/// [`DrawingError::SvgValidationFailed`]; `Fallback` swaps invalid paths for
/// plain rectangles and reports everything left as warnings.
pub fn enforce(svg: String, options: &ValidationOptions) -> DrawingResult<ValidatedDrawing> {
    let result = validate(&svg, options);
    if result.valid {
        return Ok(ValidatedDrawing { svg, result });
    }
    match options.policy() {
        Policy::Abort => {
            tracing::warn!(panel = ?options.panel, errors = result.errors.len(), "drawing rejected");
            Err(DrawingError::SvgValidationFailed {
                panel: options.panel,
                errors: result.errors,
            })
        }
        Policy::Fallback => {
            let (repaired, replaced) = replace_invalid_paths(&svg);
            let mut result = validate(&repaired, options);
            if replaced > 0 {
                result
                    .warnings
                    .push(format!("replaced {replaced} invalid path(s) with fallback rectangles"));
            }
            let remaining = std::mem::take(&mut result.errors);
            result.warnings.extend(remaining);
            result.valid = true;
            tracing::warn!(panel = ?options.panel, replaced, "applied fallback repairs");
            Ok(ValidatedDrawing {
                svg: repaired,
                result,
            })
        }
    }
}

/// Replaces every path with invalid data by a neutral rectangle covering the
/// finite coordinates it did carry.
pub fn replace_invalid_paths(svg: &str) -> (String, usize) {
    let mut replaced = 0;
    let repaired = PATH_RE.replace_all(svg, |caps: &Captures| {
        let element = &caps[0];
        let d = path_data(element).unwrap_or("");
        if is_valid_path_data(d) {
            element.to_string()
        } else {
            replaced += 1;
            fallback_rect(d)
        }
    });
    (repaired.into_owned(), replaced)
}

fn fallback_rect(d: &str) -> String {
    let numbers: Vec<f64> = NUMBER_RE
        .find_iter(d)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect();
    let points: Vec<Point> = numbers
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect();
    let rect = geometry::bounds(&points).unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
    format!(
        "<rect class=\"fallback\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#999999\" stroke-dasharray=\"4 2\"/>",
        rect.x,
        rect.y,
        rect.width.max(1.0),
        rect.length.max(1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\"><g class=\"scale-bar\"><rect width=\"1\" height=\"1\"/></g><path d=\"M 0 0 L 10 10\"/></svg>";

    #[test]
    fn path_data_rules() {
        assert!(is_valid_path_data("M 0 0 L 1 1"));
        assert!(is_valid_path_data("m0,0 l1,1z"));
        assert!(!is_valid_path_data(""));
        assert!(!is_valid_path_data("undefined"));
        assert!(!is_valid_path_data("L 0 0"));
        assert!(!is_valid_path_data("M NaN 0 L 1 1"));
        assert!(!is_valid_path_data("M 0 0 L null 1"));
    }

    #[test]
    fn balanced_document_passes() {
        let result = validate(GOOD, &ValidationOptions::new(PanelClass::Elevation));
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.metrics.has_scale_indicator);
    }

    #[test]
    fn unbalanced_markup_is_reported() {
        let svg = "<svg><g class=\"scale-bar\"></svg>";
        let result = validate(svg, &ValidationOptions::new(PanelClass::Section));
        assert!(!result.valid);
        assert!(result.errors[0].contains("unbalanced"));
    }

    #[test]
    fn floor_plan_room_expectation() {
        let svg = "<svg><g class=\"scale-bar\"></g><path class=\"room-fill\" d=\"M 0 0 L 1 0 L 1 1 Z\"/><text class=\"room-label\">A</text></svg>";
        let options = ValidationOptions::new(PanelClass::FloorPlan).with_expected_rooms(2);
        let result = validate(svg, &options);
        assert_eq!(result.metrics.actual_room_count, 1);
        assert!(result.errors.iter().any(|e| e.contains("expected 2 rooms")));
        assert!(result.errors.iter().any(|e| e.contains("interior walls")));
    }

    #[test]
    fn abort_policy_raises() {
        let svg = GOOD.replace("M 0 0 L 10 10", "undefined");
        let err = enforce(svg, &ValidationOptions::new(PanelClass::FloorPlan)).unwrap_err();
        assert_eq!(err.code(), "SVG_VALIDATION_FAILED");
    }

    #[test]
    fn fallback_policy_substitutes_rectangle() {
        let svg = GOOD.replace("M 0 0 L 10 10", "undefined");
        let drawing = enforce(svg, &ValidationOptions::new(PanelClass::Elevation)).unwrap();
        assert!(drawing.result.valid);
        assert!(drawing.svg.contains("<rect class=\"fallback\""));
        assert!(!drawing.svg.contains("undefined"));
        assert!(drawing.result.warnings.iter().any(|w| w.contains("replaced 1")));
    }

    #[test]
    fn fallback_keeps_finite_extent() {
        let (svg, count) = replace_invalid_paths("<path d=\"L 10 20 L 30 60\"/>");
        assert_eq!(count, 1);
        assert!(svg.contains("x=\"10.00\" y=\"20.00\" width=\"20.00\" height=\"40.00\""));
    }
}

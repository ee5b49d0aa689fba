use crate::catalog::SwingTable;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Floor-plan drawing options. Lengths in pixels unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingOptions {
    /// Pixels per metre.
    pub scale: f64,
    pub margin: f64,
    pub show_furniture: bool,
    pub show_dimensions: bool,
    pub show_door_swings: bool,
    pub show_grid: bool,
    pub show_north_arrow: bool,
    /// Room count the caller expects; zero means no expectation. Only the
    /// hard gates and the validator read it.
    pub expected_room_count: usize,
    pub furniture_opacity: f64,
    /// Offset of the overall dimension lines outside the footprint, metres.
    pub dimension_offset: f64,
}

impl Default for DrawingOptions {
    fn default() -> Self {
        Self {
            scale: 50.0,
            margin: 90.0,
            show_furniture: true,
            show_dimensions: true,
            show_door_swings: true,
            show_grid: false,
            show_north_arrow: true,
            expected_room_count: 0,
            furniture_opacity: 0.55,
            dimension_offset: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevationOptions {
    /// Pixels per metre.
    pub scale: f64,
    pub margin: f64,
    pub show_level_markers: bool,
    /// Depth of the ground strip below finished ground level, metres.
    pub ground_depth: f64,
    /// Parapet height for flat roofs, metres.
    pub parapet_height: f64,
    /// Eaves overhang past the facade, metres.
    pub eaves_overhang: f64,
}

impl Default for ElevationOptions {
    fn default() -> Self {
        Self {
            scale: 50.0,
            margin: 70.0,
            show_level_markers: true,
            ground_depth: 0.6,
            parapet_height: 0.45,
            eaves_overhang: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub plan: DrawingOptions,
    pub elevation: ElevationOptions,
    pub swing: SwingTable,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    title_font_size: Option<f64>,
    background: Option<String>,
    line_color: Option<String>,
    wall_color: Option<String>,
    wall_hatch_color: Option<String>,
    interior_wall_color: Option<String>,
    text_color: Option<String>,
    dimension_color: Option<String>,
    door_color: Option<String>,
    window_color: Option<String>,
    furniture_color: Option<String>,
    roof_color: Option<String>,
    ground_color: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PlanConfigFile {
    scale: Option<f64>,
    margin: Option<f64>,
    show_furniture: Option<bool>,
    show_dimensions: Option<bool>,
    show_door_swings: Option<bool>,
    show_grid: Option<bool>,
    show_north_arrow: Option<bool>,
    expected_room_count: Option<usize>,
    furniture_opacity: Option<f64>,
    dimension_offset: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ElevationConfigFile {
    scale: Option<f64>,
    margin: Option<f64>,
    show_level_markers: Option<bool>,
    ground_depth: Option<f64>,
    parapet_height: Option<f64>,
    eaves_overhang: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    plan: Option<PlanConfigFile>,
    elevation: Option<ElevationConfigFile>,
    swing: Option<SwingTable>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "blueprint" => config.theme = Theme::blueprint(),
            "technical" | "default" => config.theme = Theme::technical(),
            other => tracing::warn!(theme = other, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.title_font_size {
            theme.title_font_size = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.line_color {
            theme.line_color = v;
        }
        if let Some(v) = vars.wall_color {
            theme.wall_color = v;
        }
        if let Some(v) = vars.wall_hatch_color {
            theme.wall_hatch_color = v;
        }
        if let Some(v) = vars.interior_wall_color {
            theme.interior_wall_color = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.dimension_color {
            theme.dimension_color = v;
        }
        if let Some(v) = vars.door_color {
            theme.door_color = v;
        }
        if let Some(v) = vars.window_color {
            theme.window_color = v;
        }
        if let Some(v) = vars.furniture_color {
            theme.furniture_color = v;
        }
        if let Some(v) = vars.roof_color {
            theme.roof_color = v;
        }
        if let Some(v) = vars.ground_color {
            theme.ground_color = v;
        }
    }

    if let Some(plan) = parsed.plan {
        let opts = &mut config.plan;
        if let Some(v) = plan.scale {
            opts.scale = v;
        }
        if let Some(v) = plan.margin {
            opts.margin = v;
        }
        if let Some(v) = plan.show_furniture {
            opts.show_furniture = v;
        }
        if let Some(v) = plan.show_dimensions {
            opts.show_dimensions = v;
        }
        if let Some(v) = plan.show_door_swings {
            opts.show_door_swings = v;
        }
        if let Some(v) = plan.show_grid {
            opts.show_grid = v;
        }
        if let Some(v) = plan.show_north_arrow {
            opts.show_north_arrow = v;
        }
        if let Some(v) = plan.expected_room_count {
            opts.expected_room_count = v;
        }
        if let Some(v) = plan.furniture_opacity {
            opts.furniture_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = plan.dimension_offset {
            opts.dimension_offset = v;
        }
    }

    if let Some(elevation) = parsed.elevation {
        let opts = &mut config.elevation;
        if let Some(v) = elevation.scale {
            opts.scale = v;
        }
        if let Some(v) = elevation.margin {
            opts.margin = v;
        }
        if let Some(v) = elevation.show_level_markers {
            opts.show_level_markers = v;
        }
        if let Some(v) = elevation.ground_depth {
            opts.ground_depth = v;
        }
        if let Some(v) = elevation.parapet_height {
            opts.parapet_height = v;
        }
        if let Some(v) = elevation.eaves_overhang {
            opts.eaves_overhang = v;
        }
    }

    if let Some(swing) = parsed.swing {
        config.swing = swing;
    }

    Ok(config)
}

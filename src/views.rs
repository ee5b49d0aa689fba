//! Per-view rendering with validation, and the full view set rendered in
//! parallel over one shared geometry.

use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::error::DrawingResult;
use crate::ir::{BuildingGeometry, FloorIndex, Orientation};
use crate::normalize::resolve_floor_count;
use crate::render::section::SectionCut;
use crate::render::{elevation, floor_plan, section};
use crate::validate::{PanelClass, ValidationOptions, ValidationResult, enforce};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewRequest {
    FloorPlan(FloorIndex),
    Elevation(Orientation),
    Section(SectionCut),
}

impl ViewRequest {
    pub fn panel(self) -> PanelClass {
        match self {
            Self::FloorPlan(_) => PanelClass::FloorPlan,
            Self::Elevation(_) => PanelClass::Elevation,
            Self::Section(_) => PanelClass::Section,
        }
    }

    /// File-name friendly identifier, e.g. `floor-0`, `elevation-north`.
    pub fn slug(self) -> String {
        match self {
            Self::FloorPlan(floor) => format!("floor-{floor}"),
            Self::Elevation(side) => format!("elevation-{}", side.label().to_lowercase()),
            Self::Section(cut) => format!("section-{}", cut.label().to_lowercase()),
        }
    }

    /// Every floor from the resolved floor count, four elevations, two sections.
    pub fn full_set(geometry: &BuildingGeometry) -> Vec<ViewRequest> {
        let floors = resolve_floor_count(geometry);
        let mut requests: Vec<ViewRequest> = (0..floors).map(Self::FloorPlan).collect();
        requests.extend(Orientation::ALL.into_iter().map(Self::Elevation));
        requests.extend(SectionCut::ALL.into_iter().map(Self::Section));
        requests
    }
}

impl fmt::Display for ViewRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FloorPlan(floor) => write!(f, "floor plan {floor}"),
            Self::Elevation(side) => write!(f, "{} elevation", side.label()),
            Self::Section(cut) => write!(f, "section {}", cut.label()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedView {
    pub request: ViewRequest,
    pub svg: String,
    pub validation: ValidationResult,
    /// Fingerprint of the geometry the view was drawn from.
    pub fingerprint: String,
}

/// Hex SHA-256 of the canonical JSON form of the geometry. Two panels with
/// the same fingerprint were drawn from the same building description.
pub fn geometry_fingerprint(geometry: &BuildingGeometry) -> String {
    let bytes = match serde_json::to_vec(geometry) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(error = %err, "geometry not serialisable, fingerprinting debug form");
            format!("{geometry:?}").into_bytes()
        }
    };
    let digest = Sha256::digest(&bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn render_view(
    geometry: &BuildingGeometry,
    request: ViewRequest,
    config: &Config,
) -> DrawingResult<RenderedView> {
    render_with_fingerprint(geometry, request, config, geometry_fingerprint(geometry))
}

/// Renders `requests` concurrently. Results come back in request order; one
/// failing view does not affect the others.
pub fn render_all(
    geometry: &BuildingGeometry,
    requests: &[ViewRequest],
    config: &Config,
) -> Vec<DrawingResult<RenderedView>> {
    let fingerprint = geometry_fingerprint(geometry);
    requests
        .par_iter()
        .map(|request| render_with_fingerprint(geometry, *request, config, fingerprint.clone()))
        .collect()
}

fn render_with_fingerprint(
    geometry: &BuildingGeometry,
    request: ViewRequest,
    config: &Config,
    fingerprint: String,
) -> DrawingResult<RenderedView> {
    let svg = match request {
        ViewRequest::FloorPlan(floor) => {
            floor_plan::generate_with(geometry, floor, &config.plan, &config.theme, &config.swing)?
        }
        ViewRequest::Elevation(side) => {
            elevation::generate_with(geometry, side, &config.elevation, &config.theme)?
        }
        ViewRequest::Section(cut) => {
            section::generate_with(geometry, cut, &config.elevation, &config.theme)?
        }
    };
    let mut options = ValidationOptions::new(request.panel());
    if let ViewRequest::FloorPlan(_) = request {
        options = options.with_expected_rooms(config.plan.expected_room_count);
    }
    let validated = enforce(svg, &options)?;
    tracing::debug!(view = %request, warnings = validated.result.warnings.len(), "view validated");
    Ok(RenderedView {
        request,
        svg: validated.svg,
        validation: validated.result,
        fingerprint,
    })
}

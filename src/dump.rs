use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use crate::geometry::Rect;
use crate::ir::BuildingGeometry;
use crate::normalize::{resolve_floor_count, resolve_floor_heights};
use crate::views::geometry_fingerprint;

/// Normalized geometry plus the values every view derives from it, for
/// debugging upstream descriptions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryDump<'a> {
    pub fingerprint: String,
    pub floor_count: u32,
    pub floor_heights: Vec<f64>,
    pub footprint: Option<Rect>,
    pub room_count: usize,
    pub geometry: &'a BuildingGeometry,
}

impl<'a> GeometryDump<'a> {
    pub fn from_geometry(geometry: &'a BuildingGeometry) -> Self {
        Self {
            fingerprint: geometry_fingerprint(geometry),
            floor_count: resolve_floor_count(geometry),
            floor_heights: resolve_floor_heights(geometry),
            footprint: geometry.footprint(),
            room_count: geometry.rooms().count(),
            geometry,
        }
    }
}

pub fn write_geometry_dump(path: &Path, geometry: &BuildingGeometry) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = GeometryDump::from_geometry(geometry);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dump;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod normalize;
pub mod pack;
pub mod render;
pub mod theme;
pub mod validate;
pub mod views;
pub mod walls;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, DrawingOptions, ElevationOptions, load_config};
pub use error::{DrawingError, DrawingResult};
pub use ir::{BuildingGeometry, Orientation};
pub use normalize::{normalize, parse_building_spec, resolve_floor_count};
pub use render::section::SectionCut;
pub use validate::{PanelClass, Policy, ValidationOptions, ValidationResult};
pub use views::{RenderedView, ViewRequest, geometry_fingerprint, render_all, render_view};

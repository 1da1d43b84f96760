//! This module is responsible for loading prepared place layers (buildings,
//! parks, walking network) and building an accessibility model from them.

mod builder;
mod clip;
mod config;
pub mod layers;
mod source;

pub use builder::{PreparedAnalysis, create_accessibility_model, create_street_graph};
pub use clip::clip_to_boundary;
pub use config::AnalysisConfig;
pub use source::{DataSource, Dataset, GeoJsonDirSource, safe_place_name};

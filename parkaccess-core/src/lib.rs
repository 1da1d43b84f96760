//! Park accessibility over a pedestrian street network.
//!
//! Buildings and parks are reduced to centroids, snapped to their nearest
//! street node, and a single multi-source shortest-path search from every
//! park node yields the walking distance from each building to its nearest
//! park, thresholded at an inclusive cutoff.

pub mod algo;
pub mod crs;
mod error;
pub mod loading;
pub mod model;
pub mod output;
pub mod prelude;
pub mod routing;

pub use crs::Crs;
pub use error::Error;

pub use algo::{AccessibilityReport, AccessibilityResult, compute_accessibility, resolve_features};
pub use loading::{
    AnalysisConfig, DataSource, Dataset, GeoJsonDirSource, create_accessibility_model,
};
pub use model::{AccessibilityModel, FeatureLayer, ResolvedFeatures, StreetGraph};

/// External (source dataset) street node identifier, e.g. an OSM node id
pub type NodeId = i64;
/// Index of a node inside the street graph
pub type StreetNodeId = petgraph::graph::NodeIndex;
/// Distance along the network or between projected coordinates
pub type Meters = f64;

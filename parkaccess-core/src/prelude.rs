pub use crate::Crs;
pub use crate::Error;

// Re-export key components
pub use crate::algo::{
    AccessibilityReport, AccessibilityResult, access_column_name, compute_accessibility,
    resolve_features,
};
pub use crate::loading::{
    AnalysisConfig, DataSource, Dataset, GeoJsonDirSource, create_accessibility_model,
    safe_place_name,
};
pub use crate::model::{AccessibilityModel, FeatureLayer, ResolvedFeatures, StreetGraph};
pub use crate::output::{AccessBand, AccessSummary, ExportPaths, export_report};

// Core scalar types
pub use crate::Meters;
pub use crate::NodeId;
pub use crate::StreetNodeId;

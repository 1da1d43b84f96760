//! Data model for park accessibility analysis
//!
//! Contains the pedestrian street network, the polygon layers snapped onto
//! it and the model tying both together.

pub mod accessibility_model;
pub mod features;
pub mod streets;

// Re-export of the main model structure
pub use accessibility_model::AccessibilityModel;

// Re-export of basic types for convenience
pub use features::{
    FeatureLayer, FeaturePoint, ParkNodeSet, PolygonFeature, Properties, ResolvedFeatures,
    SnappedFeature,
};
pub use streets::{StreetEdge, StreetGraph, StreetNode};

//! Geometry resolution and network accessibility

pub mod accessibility;
pub mod snapping;

pub use accessibility::{
    AccessibilityReport, AccessibilityResult, access_column_name, compute_accessibility,
    park_distances, validate_cutoff,
};
pub use snapping::{feature_points, resolve_features, snap_points};

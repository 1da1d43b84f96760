use geo::{Centroid, Intersects, MultiPolygon};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::Error;
use crate::crs::Transformer;
use crate::model::{FeatureLayer, PolygonFeature};

/// Keep the features whose centroid lies inside any boundary polygon.
///
/// The boundary is brought into the CRS of `layer`; the layer itself is not
/// reprojected. An empty boundary leaves the layer untouched.
///
/// # Errors
///
/// Returns an error if the boundary cannot be transformed into the layer CRS.
pub fn clip_to_boundary(
    layer: FeatureLayer,
    boundary: &FeatureLayer,
) -> Result<FeatureLayer, Error> {
    if boundary.is_empty() {
        warn!("Boundary layer has no polygons, features are not clipped");
        return Ok(layer);
    }
    if layer.is_empty() {
        return Ok(layer);
    }

    let area = MultiPolygon::new(
        boundary
            .features
            .iter()
            .flat_map(|feature| feature.geometry.0.iter().cloned())
            .collect(),
    );
    let area = Transformer::new(boundary.crs, layer.crs).transform_geometry(&area)?;

    let total = layer.len();
    let crs = layer.crs;
    let features: Vec<PolygonFeature> = layer
        .features
        .into_par_iter()
        .filter(|feature| {
            feature
                .geometry
                .centroid()
                .is_some_and(|centroid| area.intersects(&centroid))
        })
        .collect();

    if features.len() < total {
        info!(
            "Clipped {} of {total} features outside the boundary",
            total - features.len()
        );
    } else {
        debug!("All {total} features are inside the boundary");
    }
    Ok(FeatureLayer::new(crs, features))
}

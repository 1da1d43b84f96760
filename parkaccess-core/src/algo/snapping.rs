//! Geometry resolver: polygons to centroids, centroids to street nodes

use geo::Centroid;
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::Error;
use crate::crs::Transformer;
use crate::model::{
    FeatureLayer, FeaturePoint, ParkNodeSet, ResolvedFeatures, SnappedFeature, StreetGraph,
};

/// Reproject both layers into the graph CRS, reduce every polygon to its
/// centroid and snap the centroids to their nearest street nodes.
///
/// The graph is only read. Empty layers short-circuit without touching the
/// spatial index.
///
/// # Errors
///
/// Returns an error if a layer cannot be transformed into the graph CRS.
pub fn resolve_features(
    graph: &StreetGraph,
    buildings: &FeatureLayer,
    parks: &FeatureLayer,
) -> Result<ResolvedFeatures, Error> {
    let building_points = feature_points(buildings, graph)?;
    let park_points = feature_points(parks, graph)?;

    let buildings = snap_points(graph, building_points);
    let parks = snap_points(graph, park_points);
    let park_nodes: ParkNodeSet = parks.iter().filter_map(|park| park.node).collect();

    if park_nodes.is_empty() {
        warn!("No park could be snapped to the street network, nothing will be accessible");
    }
    info!(
        "Resolved {} buildings and {} parks onto {} distinct park nodes",
        buildings.len(),
        parks.len(),
        park_nodes.len()
    );

    Ok(ResolvedFeatures {
        buildings,
        parks,
        park_nodes,
    })
}

/// Reproject a polygon layer into the graph CRS and replace every polygon
/// with its centroid.
///
/// The centroid of a concave polygon may lie outside it; that is accepted.
/// Features without any coordinates have no centroid and are dropped.
pub fn feature_points(
    layer: &FeatureLayer,
    graph: &StreetGraph,
) -> Result<Vec<FeaturePoint>, Error> {
    if layer.is_empty() {
        return Ok(Vec::new());
    }

    let transformer = Transformer::new(layer.crs, graph.crs());
    debug!(
        "Projecting {} features from {} to {}",
        layer.len(),
        transformer.source(),
        transformer.target()
    );

    let points = layer
        .features
        .par_iter()
        .enumerate()
        .map(|(source_index, feature)| {
            let projected = transformer.transform_geometry(&feature.geometry)?;
            Ok::<_, Error>(projected.centroid().map(|geometry| FeaturePoint {
                source_index,
                geometry,
                properties: feature.properties.clone(),
            }))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let total = points.len();
    let points: Vec<FeaturePoint> = points.into_iter().flatten().collect();
    if points.len() < total {
        warn!(
            "{} of {total} features have empty geometries and were skipped",
            total - points.len()
        );
    }

    Ok(points)
}

/// Snap each point to its nearest street node.
///
/// An empty input returns immediately, an empty graph leaves every point
/// unassigned.
pub fn snap_points(graph: &StreetGraph, points: Vec<FeaturePoint>) -> Vec<SnappedFeature> {
    if points.is_empty() {
        return Vec::new();
    }

    points
        .into_par_iter()
        .map(|point| match graph.nearest_node(&point.geometry) {
            Some((node, snap_distance)) => SnappedFeature {
                node: Some(node),
                node_id: graph.node_id(node),
                snap_distance: Some(snap_distance),
                point,
            },
            None => {
                log::trace!(
                    "Feature {} has no street node to snap to",
                    point.source_index
                );
                SnappedFeature {
                    point,
                    node: None,
                    node_id: None,
                    snap_distance: None,
                }
            }
        })
        .collect()
}

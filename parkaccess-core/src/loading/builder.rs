use geo::{Centroid, ConvexHull, Distance, Euclidean, Intersects, Length, MultiPoint, Point};
use hashbrown::HashMap;
use log::{debug, info, warn};
use rayon::prelude::*;

use super::clip::clip_to_boundary;
use super::config::AnalysisConfig;
use super::layers::{EdgeLayer, NodeLayer};
use super::source::Dataset;
use crate::crs::Transformer;
use crate::model::{AccessibilityModel, FeatureLayer, StreetEdge, StreetGraph, StreetNode};
use crate::{Crs, Error, NodeId};

/// A model together with the building and park layers it will be queried with
#[derive(Debug, Clone)]
pub struct PreparedAnalysis {
    pub model: AccessibilityModel,
    pub buildings: FeatureLayer,
    pub parks: FeatureLayer,
}

/// Creates an accessibility model from a loaded dataset
///
/// The street graph is projected into `config.target_crs` while the building
/// and park layers are clipped to the place boundary.
///
/// # Errors
///
/// Returns an error if the graph cannot be projected or is malformed, or if
/// the boundary cannot be brought into a layer's CRS.
pub fn create_accessibility_model(
    dataset: Dataset,
    config: &AnalysisConfig,
) -> Result<PreparedAnalysis, Error> {
    let Dataset {
        boundary,
        buildings,
        parks,
        nodes,
        edges,
    } = dataset;

    info!(
        "Projecting street network ({} nodes, {} edges) to {}",
        nodes.nodes.len(),
        edges.edges.len(),
        config.target_crs
    );

    let boundary = boundary.filter(|_| config.clip_to_boundary);
    let (street_graph, clipped) = rayon::join(
        || create_street_graph(nodes, edges, config.target_crs),
        || match &boundary {
            Some(boundary) => Ok::<_, Error>((
                clip_to_boundary(buildings, boundary)?,
                clip_to_boundary(parks, boundary)?,
            )),
            None => Ok((buildings, parks)),
        },
    );
    let street_graph = street_graph?;
    let (buildings, parks) = clipped?;

    if street_graph.is_empty() {
        warn!("Street network is empty, no building can reach a park");
    } else {
        validate_layer_coverage(&street_graph, &buildings, "buildings");
        validate_layer_coverage(&street_graph, &parks, "parks");
    }

    info!("Accessibility model created successfully");
    Ok(PreparedAnalysis {
        model: AccessibilityModel::new(street_graph),
        buildings,
        parks,
    })
}

/// Project walking network layers into `target` and build the graph.
///
/// Edges without a stored length are measured along their projected
/// geometry, or along the straight segment between their endpoints when
/// they have none.
///
/// # Errors
///
/// [`Error::CrsMismatch`] for a geographic target, [`Error::Projection`] for
/// coordinates outside the source CRS, [`Error::MalformedGraph`] for
/// inconsistent topology.
pub fn create_street_graph(
    nodes: NodeLayer,
    edges: EdgeLayer,
    target: Crs,
) -> Result<StreetGraph, Error> {
    if !target.is_projected() {
        return Err(Error::CrsMismatch {
            expected: "a projected CRS with linear units in meters".to_string(),
            found: target.to_string(),
        });
    }

    let node_transform = Transformer::new(nodes.crs, target);
    let street_nodes = nodes
        .nodes
        .into_par_iter()
        .map(|record| {
            Ok::<_, Error>(StreetNode {
                id: record.id,
                geometry: node_transform.transform_geometry(&record.geometry)?,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let positions: HashMap<NodeId, Point<f64>> = street_nodes
        .iter()
        .map(|node| (node.id, node.geometry))
        .collect();

    let edge_transform = Transformer::new(edges.crs, target);
    let street_edges = edges
        .edges
        .into_par_iter()
        .map(|record| {
            let geometry = record
                .geometry
                .map(|line| edge_transform.transform_geometry(&line))
                .transpose()?;

            let length = match (record.length, &geometry) {
                (Some(length), _) => length,
                (None, Some(line)) => Euclidean.length(line),
                (None, None) => match (positions.get(&record.u), positions.get(&record.v)) {
                    (Some(&a), Some(&b)) => Euclidean.distance(a, b),
                    _ => {
                        return Err(Error::MalformedGraph(format!(
                            "edge ({}, {}) references a node that is not in the graph",
                            record.u, record.v
                        )));
                    }
                },
            };

            Ok::<_, Error>((record.u, record.v, StreetEdge { length, geometry }))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    debug!(
        "Projected {} nodes and {} edges into {target}",
        street_nodes.len(),
        street_edges.len()
    );
    StreetGraph::new(target, street_nodes, street_edges)
}

#[allow(clippy::cast_precision_loss)]
fn validate_layer_coverage(streets: &StreetGraph, layer: &FeatureLayer, what: &str) {
    if layer.is_empty() {
        return;
    }

    let graph_nodes: MultiPoint = streets
        .graph
        .node_weights()
        .map(|node| node.geometry)
        .collect();
    let Ok(graph_hull) =
        Transformer::new(streets.crs(), layer.crs).transform_geometry(&graph_nodes.convex_hull())
    else {
        debug!(
            "Street network hull cannot be expressed in {}, skipping coverage check",
            layer.crs
        );
        return;
    };

    let outside_hull = layer
        .features
        .par_iter()
        .filter(|feature| {
            feature
                .geometry
                .centroid()
                .is_some_and(|centroid| !centroid.intersects(&graph_hull))
        })
        .count();

    let total = layer.len();
    let percentage = (outside_hull as f64 / total as f64) * 100.0;
    if outside_hull > 0 {
        warn!(
            "{outside_hull} of {total} {what} ({percentage:.1}%) are outside \
        the street network coverage area. They will snap to the network edge and \
        may look farther from parks than they are."
        );
    }
}

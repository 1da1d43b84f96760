//! Polygon layers and the point features derived from them

use geo::{MultiPolygon, Point};
use itertools::Itertools;
use serde_json::{Map, Value};

use crate::{Crs, Meters, NodeId, StreetNodeId};

/// Arbitrary descriptive attributes carried through the analysis untouched
pub type Properties = Map<String, Value>;

/// Building or park polygon with its attributes
#[derive(Debug, Clone)]
pub struct PolygonFeature {
    pub geometry: MultiPolygon<f64>,
    pub properties: Properties,
}

/// A set of polygon features sharing one CRS
#[derive(Debug, Clone)]
pub struct FeatureLayer {
    pub crs: Crs,
    pub features: Vec<PolygonFeature>,
}

impl FeatureLayer {
    pub fn new(crs: Crs, features: Vec<PolygonFeature>) -> Self {
        Self { crs, features }
    }

    pub fn empty(crs: Crs) -> Self {
        Self {
            crs,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Polygon reduced to its centroid in the graph CRS
#[derive(Debug, Clone)]
pub struct FeaturePoint {
    /// Position of the source feature in its layer
    pub source_index: usize,
    pub geometry: Point<f64>,
    pub properties: Properties,
}

/// Feature point together with the street node it snapped to
#[derive(Debug, Clone)]
pub struct SnappedFeature {
    pub point: FeaturePoint,
    /// `None` only when the street graph has no nodes at all
    pub node: Option<StreetNodeId>,
    pub node_id: Option<NodeId>,
    /// Euclidean distance from the centroid to the snapped node
    pub snap_distance: Option<Meters>,
}

/// Deduplicated, sorted set of street nodes that serve as search origins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParkNodeSet {
    nodes: Vec<StreetNodeId>,
}

impl ParkNodeSet {
    pub fn new(nodes: impl IntoIterator<Item = StreetNodeId>) -> Self {
        Self {
            nodes: nodes.into_iter().sorted_unstable().dedup().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: StreetNodeId) -> bool {
        self.nodes.binary_search(&node).is_ok()
    }

    pub fn as_slice(&self) -> &[StreetNodeId] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = StreetNodeId> + '_ {
        self.nodes.iter().copied()
    }
}

impl FromIterator<StreetNodeId> for ParkNodeSet {
    fn from_iter<I: IntoIterator<Item = StreetNodeId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Output of the geometry resolver
#[derive(Debug, Clone, Default)]
pub struct ResolvedFeatures {
    pub buildings: Vec<SnappedFeature>,
    /// Park centroids, kept for display next to the results
    pub parks: Vec<SnappedFeature>,
    pub park_nodes: ParkNodeSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn park_node_set_is_sorted_and_unique() {
        let set: ParkNodeSet = [5, 1, 5, 3, 1]
            .into_iter()
            .map(StreetNodeId::new)
            .collect();

        assert_eq!(set.len(), 3);
        assert_eq!(
            set.as_slice(),
            &[
                StreetNodeId::new(1),
                StreetNodeId::new(3),
                StreetNodeId::new(5)
            ]
        );
        assert!(set.contains(StreetNodeId::new(3)));
        assert!(!set.contains(StreetNodeId::new(2)));
    }

    #[test]
    fn empty_park_node_set() {
        let set = ParkNodeSet::new(std::iter::empty());
        assert!(set.is_empty());
        assert_eq!(set, ParkNodeSet::default());
    }
}

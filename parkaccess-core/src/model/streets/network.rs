//! Walkable street graph with a spatial index over its nodes

use geo::Point;
use hashbrown::HashMap;
use log::debug;
use petgraph::Undirected;
use petgraph::graph::{Edges, UnGraph};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{StreetEdge, StreetNode};
use crate::{Crs, Error, Meters, NodeId, StreetNodeId};

/// Node position stored in the R-tree, carrying its graph index
pub type IndexedPoint = GeomWithData<Point<f64>, StreetNodeId>;

/// Undirected pedestrian network in a single projected CRS.
///
/// The graph is immutable once built, so a single instance can be shared
/// between any number of accessibility queries.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    pub graph: UnGraph<StreetNode, StreetEdge>,
    rtree: RTree<IndexedPoint>,
    node_ids: HashMap<NodeId, StreetNodeId>,
    crs: Crs,
}

impl StreetGraph {
    /// Build a street graph from nodes and `(u, v, edge)` triples keyed by
    /// external node ids.
    ///
    /// # Errors
    ///
    /// - [`Error::CrsMismatch`] if `crs` is not a projected, metric system
    /// - [`Error::MalformedGraph`] on duplicate node ids, non-finite node
    ///   coordinates, edges referencing unknown nodes, or negative/non-finite
    ///   edge lengths
    pub fn new(
        crs: Crs,
        nodes: Vec<StreetNode>,
        edges: Vec<(NodeId, NodeId, StreetEdge)>,
    ) -> Result<Self, Error> {
        if !crs.is_projected() {
            return Err(Error::CrsMismatch {
                expected: "a projected CRS with linear units in meters".to_string(),
                found: crs.to_string(),
            });
        }

        let mut graph = UnGraph::with_capacity(nodes.len(), edges.len());
        let mut node_ids = HashMap::with_capacity(nodes.len());

        for node in nodes {
            let (x, y) = node.geometry.x_y();
            if !x.is_finite() || !y.is_finite() {
                return Err(Error::MalformedGraph(format!(
                    "node {} has non-finite coordinates ({x}, {y})",
                    node.id
                )));
            }
            let id = node.id;
            let index = graph.add_node(node);
            if node_ids.insert(id, index).is_some() {
                return Err(Error::MalformedGraph(format!("duplicate node id {id}")));
            }
        }

        for (u, v, edge) in edges {
            let (Some(&source), Some(&target)) = (node_ids.get(&u), node_ids.get(&v)) else {
                return Err(Error::MalformedGraph(format!(
                    "edge ({u}, {v}) references a node that is not in the graph"
                )));
            };
            if !edge.length.is_finite() || edge.length < 0.0 {
                return Err(Error::MalformedGraph(format!(
                    "edge ({u}, {v}) has invalid length {}",
                    edge.length
                )));
            }
            graph.add_edge(source, target, edge);
        }

        let rtree = build_rtree(&graph);
        debug!(
            "Street graph built: {} nodes, {} edges in {crs}",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(Self {
            graph,
            rtree,
            node_ids,
            crs,
        })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, node: StreetNodeId) -> bool {
        node.index() < self.graph.node_count()
    }

    pub fn node(&self, node: StreetNodeId) -> Option<&StreetNode> {
        self.graph.node_weight(node)
    }

    /// External id of a node, if the index belongs to this graph
    pub fn node_id(&self, node: StreetNodeId) -> Option<NodeId> {
        self.node(node).map(|n| n.id)
    }

    /// Graph index of an external node id
    pub fn node_index(&self, id: NodeId) -> Option<StreetNodeId> {
        self.node_ids.get(&id).copied()
    }

    /// All edges incident to `node`, oriented so that `target()` is the neighbour
    pub fn edges(&self, node: StreetNodeId) -> Edges<'_, StreetEdge, Undirected> {
        self.graph.edges(node)
    }

    pub fn rtree_ref(&self) -> &RTree<IndexedPoint> {
        &self.rtree
    }

    /// Nearest street node to `point` and the Euclidean distance to it.
    ///
    /// Equidistant candidates resolve to the lowest external node id so
    /// repeated runs snap identically. Returns `None` for an empty graph.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(StreetNodeId, Meters)> {
        let mut candidates = self.rtree.nearest_neighbor_iter_with_distance_2(point);
        let (first, best_distance_2) = candidates.next()?;

        let mut best = first.data;
        for (candidate, distance_2) in candidates {
            if distance_2 > best_distance_2 {
                break;
            }
            if self.graph[candidate.data].id < self.graph[best].id {
                best = candidate.data;
            }
        }

        Some((best, best_distance_2.sqrt()))
    }
}

fn build_rtree(graph: &UnGraph<StreetNode, StreetEdge>) -> RTree<IndexedPoint> {
    let points = graph
        .node_indices()
        .map(|index| IndexedPoint::new(graph[index].geometry, index))
        .collect();
    RTree::bulk_load(points)
}

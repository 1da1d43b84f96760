//! Street network components - nodes and edges

use geo::{LineString, Point};

use crate::{Meters, NodeId};

/// Street graph node
#[derive(Debug, Clone)]
pub struct StreetNode {
    /// External (OSM) ID of the node
    pub id: NodeId,
    /// Node coordinates in the graph CRS
    pub geometry: Point<f64>,
}

/// Street graph edge (walkable street segment)
#[derive(Debug, Clone)]
pub struct StreetEdge {
    /// Segment length in meters
    pub length: Meters,
    /// Optional geometry for visualization
    pub geometry: Option<LineString<f64>>,
}

impl StreetEdge {
    pub fn length(&self) -> Meters {
        self.length
    }
}

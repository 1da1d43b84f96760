use geo::{LineString, Point};
use serde::Deserialize;

use crate::{Crs, Meters, NodeId};

/// Attributes read from a walking network node feature
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct NodeProperties {
    pub osmid: Option<NodeId>,
}

/// Attributes read from a walking network edge feature
#[derive(Debug, Deserialize)]
pub struct EdgeProperties {
    pub u: NodeId,
    pub v: NodeId,
    #[serde(default)]
    pub length: Option<Meters>,
}

#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: NodeId,
    pub geometry: Point<f64>,
}

#[derive(Debug, Clone)]
pub struct EdgeRecord {
    pub u: NodeId,
    pub v: NodeId,
    /// Stored length in meters, when the source provides one
    pub length: Option<Meters>,
    pub geometry: Option<LineString<f64>>,
}

/// Walking network nodes as read, in the CRS of their file
#[derive(Debug, Clone)]
pub struct NodeLayer {
    pub crs: Crs,
    pub nodes: Vec<NodeRecord>,
}

/// Walking network edges as read, in the CRS of their file
#[derive(Debug, Clone)]
pub struct EdgeLayer {
    pub crs: Crs,
    pub edges: Vec<EdgeRecord>,
}

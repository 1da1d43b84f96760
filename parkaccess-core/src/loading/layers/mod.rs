//! Reading prepared GeoJSON layers

mod parser;
mod raw_types;

pub use parser::{edge_layer, layer_crs, node_layer, polygon_layer, read_feature_collection};
pub use raw_types::{EdgeLayer, EdgeRecord, NodeLayer, NodeRecord};

//! Shortest-path search over the street network

pub mod dijkstra;

pub use dijkstra::multi_source_dijkstra;

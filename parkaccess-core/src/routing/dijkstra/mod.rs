mod multi_source;
mod state;

pub use multi_source::multi_source_dijkstra;

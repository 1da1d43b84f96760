use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use log::debug;
use petgraph::visit::EdgeRef;

use super::state::State;
use crate::model::StreetGraph;
use crate::{Meters, StreetNodeId};

/// Multi-source Dijkstra over the walking network.
///
/// All `sources` start at distance 0 and are relaxed together, so the result
/// maps every reached node to the length of the shortest path from the
/// *closest* source. Paths longer than `max_cost` are neither recorded nor
/// expanded; a path of exactly `max_cost` is kept.
///
/// Sources that are not nodes of `graph` are ignored.
pub fn multi_source_dijkstra(
    graph: &StreetGraph,
    sources: &[StreetNodeId],
    max_cost: Option<Meters>,
) -> HashMap<StreetNodeId, Meters> {
    let estimated_nodes = graph.node_count().min(1024);
    let mut distances: HashMap<StreetNodeId, Meters> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(sources.len().max(estimated_nodes / 4));

    for &source in sources {
        if !graph.contains_node(source) {
            debug!("Skipping search origin {source:?}: not a node of the street graph");
            continue;
        }
        if distances.insert(source, 0.0).is_none() {
            heap.push(State {
                cost: 0.0,
                node: source,
            });
        }
    }

    while let Some(State { cost, node }) = heap.pop() {
        // Stale heap entry, node already settled with a shorter path
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            if settled.contains(next.index()) {
                continue;
            }

            let next_cost = cost + edge.weight().length();
            if let Some(max) = max_cost
                && next_cost > max
            {
                continue;
            }

            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                    }
                }
            }
        }
    }

    distances
}

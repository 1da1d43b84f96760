use std::cmp::Ordering;

use crate::{Meters, StreetNodeId};

#[derive(Copy, Clone, Debug)]
pub(super) struct State {
    pub(super) cost: Meters,
    pub(super) node: StreetNodeId,
}

// Min-heap by cost (reversed from standard Rust BinaryHeap), equal costs pop
// in node order so the settle order never depends on push order
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for State {}

#[cfg(test)]
mod tests {
    use std::collections::BinaryHeap;

    use super::*;

    #[test]
    fn heap_pops_cheapest_then_lowest_node() {
        let mut heap = BinaryHeap::new();
        for (cost, node) in [(5.0, 1), (1.0, 4), (1.0, 2), (0.0, 9)] {
            heap.push(State {
                cost,
                node: StreetNodeId::new(node),
            });
        }

        let order: Vec<_> = std::iter::from_fn(|| heap.pop())
            .map(|s| (s.cost, s.node.index()))
            .collect();
        assert_eq!(order, vec![(0.0, 9), (1.0, 2), (1.0, 4), (5.0, 1)]);
    }
}

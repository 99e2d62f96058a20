use crate::{graph::*, instance::DemandPair, matching::MatchingGraph};
use fxhash::{FxHashMap, FxHashSet};

use super::*;

/// The stretch of the tree covered by the demand pairs of an L2 leaf `u`.
///
/// Every pair at `u` leaves the parent `p` of `u` towards one of the two internal
/// neighbours of `p`. Per side, the reach of a pair is its last internal node (the
/// endpoint, or the neighbour of a leaf endpoint) and the side ends in the closest
/// reach. The wingspan is the path between both ends; it runs through `p`.
///
/// A wingspan only exists if no pair at `u` ends in `p` or in a sibling leaf of `u`,
/// and if all pairs of a side pass through the closest reach of that side. Then
/// every edge of the wingspan between `p` and an end lies on all pairs of that side,
/// so a solution using such an edge never needs the leaf edge of `u`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct Wingspan {
    pub leaf: Node,
    pub parent: Node,
    /// The two internal neighbours of the parent
    pub sides: [Node; 2],
    /// The closest reach per side; `None` if no pair leaves in this direction
    pub ends: [Option<Node>; 2],
}

impl Wingspan {
    pub fn of(state: &KernelState, u: Node) -> Option<Self> {
        let tree = state.tree();
        if tree.role_of(u) != NodeRole::L2 {
            return None;
        }

        let pairs = state.pairs_at_node(u);
        if pairs.is_empty() {
            return None;
        }

        let parent = tree.neighbors_of(u)[0];
        let internal: Vec<Node> = tree
            .neighbors_of(parent)
            .iter()
            .copied()
            .filter(|&v| tree.is_internal(v))
            .collect();
        let &[left, right] = internal.as_slice() else {
            return None;
        };

        // (distance from `u` to the reach, reach, pair) per side
        let mut reaches: [Vec<(usize, Node, &DemandPair)>; 2] = [Vec::new(), Vec::new()];
        for id in pairs {
            let pair = state.pair(id)?;
            let other = pair.other_endpoint(u)?;
            let (reach, distance) = if tree.is_leaf(other) {
                (tree.neighbors_of(other)[0], pair.length() - 1)
            } else {
                (other, pair.length())
            };

            if reach == parent {
                return None;
            }

            let side = if pair.contains_edge(Edge(parent, left)) {
                0
            } else if pair.contains_edge(Edge(parent, right)) {
                1
            } else {
                return None;
            };
            reaches[side].push((distance, reach, pair));
        }

        let mut ends = [None, None];
        for (end, side) in ends.iter_mut().zip(&reaches) {
            let Some(&(_, closest, _)) = side.iter().min_by_key(|&&(d, r, _)| (d, r)) else {
                continue;
            };
            if !side.iter().all(|(_, _, pair)| pair.contains_node(closest)) {
                return None;
            }
            *end = Some(closest);
        }

        Some(Self {
            leaf: u,
            parent,
            sides: [left, right],
            ends,
        })
    }

    pub fn leaf_edge(&self) -> Edge {
        Edge(self.leaf, self.parent).normalized()
    }

    /// The end of `side`, or the parent if no pair leaves that way
    pub fn end_or_parent(&self, side: usize) -> Node {
        self.ends[side].unwrap_or(self.parent)
    }

    /// Nodes from one end of the wingspan to the other
    pub fn path(&self, tree: &Tree) -> Option<Vec<Node>> {
        tree.path_between(self.end_or_parent(0), self.end_or_parent(1))
            .ok()
    }

    /// First internal node outside the caterpillar of the parent when walking
    /// from the parent towards `side`
    pub fn extremity(&self, tree: &Tree, side: usize) -> Option<Node> {
        let (mut prev, mut current) = (self.parent, self.sides[side]);
        while tree.role_of(current) == NodeRole::I2 {
            let next = tree
                .neighbors_of(current)
                .iter()
                .copied()
                .find(|&x| x != prev && tree.is_internal(x))?;
            prev = current;
            current = next;
        }
        Some(current)
    }
}

/// `nodes` together with all their leaf neighbours
pub(super) fn with_leaves(tree: &Tree, nodes: &[Node]) -> FxHashSet<Node> {
    nodes
        .iter()
        .flat_map(|&u| std::iter::once(u).chain(tree.leaf_neighbors_of(u)))
        .collect()
}

/// Returns true if at least `required` of the demand pairs selected by `accept` are
/// pairwise endpoint-disjoint
pub(super) fn has_disjoint_pairs(
    state: &KernelState,
    required: usize,
    mut accept: impl FnMut(&DemandPair) -> bool,
) -> bool {
    let mut index: FxHashMap<Node, Node> = FxHashMap::default();
    let mut edges = Vec::new();
    for pair in state.pairs().filter(|p| accept(p)) {
        let mut local = |u: Node| {
            let next = index.len() as Node;
            *index.entry(u).or_insert(next)
        };
        let (a, b) = (local(pair.node1()), local(pair.node2()));
        edges.push((a, b));
    }

    if edges.len() < required {
        return false;
    }

    let mut graph = MatchingGraph::new(index.len() as NumNodes);
    for (a, b) in edges {
        graph.add_edge(a, b);
    }
    graph.has_matching_of_at_least(required)
}

#[cfg(test)]
mod test {
    use super::test_utils::*;
    use super::*;
    use std::collections::BTreeSet;

    //  5   6   7   8   9
    //  |   |   |   |   |
    //  0 - 1 - 2 - 3 - 4
    fn comb() -> [(Node, Node); 9] {
        [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (0, 5),
            (1, 6),
            (2, 7),
            (3, 8),
            (4, 9),
        ]
    }

    #[test]
    fn ends_and_extremities() {
        let state = state_from(comb(), &[(7, 5), (7, 9), (7, 4), (0, 8)], 2);
        let tree = state.tree();

        let wingspan = Wingspan::of(&state, 7).unwrap();
        assert_eq!(wingspan.parent, 2);
        assert_eq!(wingspan.sides, [1, 3]);
        assert_eq!(wingspan.ends, [Some(0), Some(4)]);
        assert_eq!(wingspan.leaf_edge(), Edge(2, 7));
        assert_eq!(wingspan.path(tree).unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(wingspan.extremity(tree, 0), Some(0));
        assert_eq!(wingspan.extremity(tree, 1), Some(4));

        // 5 and 9 are L1 leaves, 0 is internal
        assert_eq!(Wingspan::of(&state, 5), None);
        assert_eq!(Wingspan::of(&state, 0), None);

        // only one side is used
        let wingspan = Wingspan::of(&state, 8).unwrap();
        assert_eq!(wingspan.ends, [Some(0), None]);
        assert_eq!(wingspan.end_or_parent(1), 3);
    }

    #[test]
    fn no_wingspan_next_to_the_parent() {
        let state = state_from(comb(), &[(7, 2), (7, 5)], 2);
        assert_eq!(Wingspan::of(&state, 7), None);

        // 10 is a sibling leaf of 7
        let mut edges = comb().to_vec();
        edges.push((2, 10));
        let state = state_from(edges, &[(7, 5), (7, 10)], 2);
        assert_eq!(Wingspan::of(&state, 7), None);

        // (7, 6) and (7, 1) reach 1; (7, 5) reaches 0 and passes 1
        let state = state_from(comb(), &[(7, 6), (7, 1), (7, 5)], 2);
        assert_eq!(Wingspan::of(&state, 7).unwrap().ends, [Some(1), None]);
    }

    #[test]
    fn closest_reach_has_to_be_shared() {
        //  5   6   7   8       12
        //  |   |   |   |       |
        //  0 - 1 - 2 - 3 - 4 - 9
        //                  |
        //                  10 - 11
        let edges = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (0, 5),
            (1, 6),
            (2, 7),
            (3, 8),
            (4, 9),
            (4, 10),
            (10, 11),
            (9, 12),
        ];

        // 9 and 10 are both two steps behind 3 but on different branches
        let state = state_from(edges, &[(7, 9), (7, 10)], 2);
        assert_eq!(Wingspan::of(&state, 7), None);

        let state = state_from(edges, &[(7, 4), (7, 10)], 2);
        assert_eq!(Wingspan::of(&state, 7).unwrap().ends, [None, Some(4)]);
    }

    #[test]
    fn disjoint_pairs() {
        let state = state_from(comb(), &[(7, 5), (7, 9), (0, 8), (5, 6)], 3);
        assert!(has_disjoint_pairs(&state, 3, |_| true));
        assert!(!has_disjoint_pairs(&state, 4, |_| true));
        assert!(has_disjoint_pairs(&state, 1, |p| p.has_endpoint(7)));
        assert!(!has_disjoint_pairs(&state, 2, |p| p.has_endpoint(7)));

        let nodes: BTreeSet<Node> = with_leaves(state.tree(), &[0, 1]).into_iter().collect();
        let expected: BTreeSet<Node> = [0, 1, 5, 6].into();
        assert_eq!(nodes, expected);
    }
}

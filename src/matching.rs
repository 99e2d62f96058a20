//! Maximum cardinality matching in general graphs (Edmonds' blossom algorithm).
//!
//! Reduction rules frequently have to decide whether some set of objects contains
//! `k + 1` pairwise disjoint members. They model conflicts as edges of a small
//! [`MatchingGraph`] and ask [`MatchingGraph::has_matching_of_at_least`].
//!
//! Blossoms are never materialised: every vertex stores the base of the blossom it is
//! currently part of, and shrinking a blossom just rewrites those bases. The search is
//! a plain BFS over arena arrays and does not recurse.

use crate::graph::{Edge, Node, NumNodes};
use log::trace;
use std::collections::VecDeque;

const NONE: Node = Node::MAX;

/// A simple undirected graph on the vertices `0..n`
#[derive(Clone, Debug, Default)]
pub struct MatchingGraph {
    adj: Vec<Vec<Node>>,
    number_of_edges: usize,
}

impl MatchingGraph {
    pub fn new(n: NumNodes) -> Self {
        Self {
            adj: vec![Vec::new(); n as usize],
            number_of_edges: 0,
        }
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.adj.len() as NumNodes
    }

    pub fn number_of_edges(&self) -> usize {
        self.number_of_edges
    }

    /// Adds the edge {u, v}; loops are ignored
    pub fn add_edge(&mut self, u: Node, v: Node) {
        if u == v {
            return;
        }
        self.adj[u as usize].push(v);
        self.adj[v as usize].push(u);
        self.number_of_edges += 1;
    }

    /// Returns the mate of every vertex (`None` if the vertex is exposed) of a maximum matching
    pub fn maximum_matching(&self) -> Vec<Option<Node>> {
        let mut search = BlossomSearch::new(&self.adj);
        search.run(usize::MAX);
        search
            .mate
            .iter()
            .map(|&m| (m != NONE).then_some(m))
            .collect()
    }

    /// Returns the edges of a maximum matching, normalized and sorted
    pub fn maximum_matching_edges(&self) -> Vec<Edge> {
        self.maximum_matching()
            .into_iter()
            .enumerate()
            .filter_map(|(u, m)| m.filter(|&v| (u as Node) < v).map(|v| Edge(u as Node, v)))
            .collect()
    }

    /// Returns the size of a maximum matching
    pub fn matching_size(&self) -> usize {
        let mut search = BlossomSearch::new(&self.adj);
        search.run(usize::MAX)
    }

    /// Returns true if the graph has a matching with at least `required` edges.
    /// The search stops as soon as this many edges are matched.
    pub fn has_matching_of_at_least(&self, required: usize) -> bool {
        if required == 0 {
            return true;
        }
        if required > self.adj.len() / 2 || required > self.number_of_edges {
            return false;
        }

        let mut search = BlossomSearch::new(&self.adj);
        search.run(required) >= required
    }
}

struct BlossomSearch<'a> {
    adj: &'a [Vec<Node>],
    mate: Vec<Node>,
    parent: Vec<Node>,
    base: Vec<Node>,
    used: Vec<bool>,
    blossom: Vec<bool>,
    queue: VecDeque<Node>,
}

impl<'a> BlossomSearch<'a> {
    fn new(adj: &'a [Vec<Node>]) -> Self {
        let n = adj.len();
        Self {
            adj,
            mate: vec![NONE; n],
            parent: vec![NONE; n],
            base: vec![0; n],
            used: vec![false; n],
            blossom: vec![false; n],
            queue: VecDeque::with_capacity(n),
        }
    }

    /// Matches greedily, then augments from every exposed vertex. Returns the matching
    /// size, which may stop early once it reaches `stop_at`.
    fn run(&mut self, stop_at: usize) -> usize {
        let mut size = self.greedy_seed();
        trace!("greedy matching of size {size}");

        for root in 0..self.adj.len() as Node {
            if size >= stop_at {
                break;
            }
            if self.mate[root as usize] != NONE {
                continue;
            }

            if let Some(end) = self.find_augmenting_path(root) {
                self.augment(end);
                size += 1;
            }
        }

        size
    }

    fn greedy_seed(&mut self) -> usize {
        let mut size = 0;
        for u in 0..self.adj.len() {
            if self.mate[u] != NONE {
                continue;
            }
            if let Some(&v) = self.adj[u].iter().find(|&&v| self.mate[v as usize] == NONE) {
                self.mate[u] = v;
                self.mate[v as usize] = u as Node;
                size += 1;
            }
        }
        size
    }

    fn augment(&mut self, mut v: Node) {
        while v != NONE {
            let pv = self.parent[v as usize];
            let ppv = self.mate[pv as usize];
            self.mate[v as usize] = pv;
            self.mate[pv as usize] = v;
            v = ppv;
        }
    }

    /// Lowest common ancestor of `a` and `b` in the alternating forest, w.r.t. blossom bases
    fn lowest_common_base(&self, mut a: Node, mut b: Node) -> Node {
        let mut on_path = vec![false; self.adj.len()];
        loop {
            a = self.base[a as usize];
            on_path[a as usize] = true;
            if self.mate[a as usize] == NONE {
                break;
            }
            a = self.parent[self.mate[a as usize] as usize];
        }

        loop {
            b = self.base[b as usize];
            if on_path[b as usize] {
                return b;
            }
            b = self.parent[self.mate[b as usize] as usize];
        }
    }

    fn mark_path(&mut self, mut v: Node, base: Node, mut child: Node) {
        while self.base[v as usize] != base {
            let m = self.mate[v as usize];
            self.blossom[self.base[v as usize] as usize] = true;
            self.blossom[self.base[m as usize] as usize] = true;
            self.parent[v as usize] = child;
            child = m;
            v = self.parent[m as usize];
        }
    }

    /// BFS for an augmenting path starting in the exposed vertex `root`;
    /// returns its other (exposed) end
    fn find_augmenting_path(&mut self, root: Node) -> Option<Node> {
        let adj = self.adj;
        self.used.fill(false);
        self.parent.fill(NONE);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i as Node;
        }

        self.used[root as usize] = true;
        self.queue.clear();
        self.queue.push_back(root);

        while let Some(v) = self.queue.pop_front() {
            for &to in &adj[v as usize] {
                if self.base[v as usize] == self.base[to as usize] || self.mate[v as usize] == to {
                    continue;
                }

                let closes_odd_cycle = to == root
                    || (self.mate[to as usize] != NONE
                        && self.parent[self.mate[to as usize] as usize] != NONE);

                if closes_odd_cycle {
                    let base = self.lowest_common_base(v, to);
                    self.blossom.fill(false);
                    self.mark_path(v, base, to);
                    self.mark_path(to, base, v);

                    for i in 0..adj.len() {
                        if self.blossom[self.base[i] as usize] {
                            self.base[i] = base;
                            if !self.used[i] {
                                self.used[i] = true;
                                self.queue.push_back(i as Node);
                            }
                        }
                    }
                } else if self.parent[to as usize] == NONE {
                    self.parent[to as usize] = v;
                    let m = self.mate[to as usize];
                    if m == NONE {
                        return Some(to);
                    }
                    self.used[m as usize] = true;
                    self.queue.push_back(m);
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    fn graph_from(n: NumNodes, edges: &[(Node, Node)]) -> MatchingGraph {
        let mut graph = MatchingGraph::new(n);
        for &(u, v) in edges {
            graph.add_edge(u, v);
        }
        graph
    }

    fn brute_force_matching_size(n: usize, edges: &[(Node, Node)]) -> usize {
        fn recurse(edges: &[(Node, Node)], used: &mut Vec<bool>) -> usize {
            let Some((&(u, v), rest)) = edges.split_first() else {
                return 0;
            };

            let mut best = recurse(rest, used);
            if !used[u as usize] && !used[v as usize] {
                used[u as usize] = true;
                used[v as usize] = true;
                best = best.max(1 + recurse(rest, used));
                used[u as usize] = false;
                used[v as usize] = false;
            }
            best
        }

        recurse(edges, &mut vec![false; n])
    }

    fn assert_valid_matching(graph: &MatchingGraph, mates: &[Option<Node>]) {
        for (u, m) in mates.iter().enumerate() {
            if let Some(v) = *m {
                assert_eq!(mates[v as usize], Some(u as Node));
                assert!(graph.adj[u].contains(&v));
            }
        }
    }

    #[test]
    fn small_graphs() {
        let cycle = graph_from(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        assert_eq!(cycle.matching_size(), 2);
        assert!(cycle.has_matching_of_at_least(2));
        assert!(!cycle.has_matching_of_at_least(3));

        let path = graph_from(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_eq!(path.matching_size(), 2);
        assert!(!path.has_matching_of_at_least(3));

        let star = graph_from(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]);
        assert_eq!(star.matching_size(), 1);
        assert!(star.has_matching_of_at_least(1));
        assert!(!star.has_matching_of_at_least(2));

        let triangle = graph_from(3, &[(0, 1), (1, 2), (2, 0)]);
        assert_eq!(triangle.matching_size(), 1);

        let empty = MatchingGraph::new(0);
        assert!(empty.has_matching_of_at_least(0));
        assert!(!empty.has_matching_of_at_least(1));
    }

    #[test]
    fn augmenting_after_greedy_seed() {
        // the greedy seed matches {0, 1} and {2, 3} and leaves 4 and 5 exposed;
        // the augmenting path 4-3-2-1-0-5 runs along the odd cycle 1-2-3
        //   5 - 0 - 1 - 2
        //            \  |
        //              3 - 4
        let graph = graph_from(6, &[(0, 1), (1, 2), (2, 3), (3, 1), (3, 4), (0, 5)]);
        assert_eq!(graph.matching_size(), 3);

        let mates = graph.maximum_matching();
        assert_valid_matching(&graph, &mates);
        assert!(mates.iter().all(|m| m.is_some()));
        assert_eq!(graph.maximum_matching_edges().len(), 3);
    }

    #[test]
    fn random_graphs_against_brute_force() {
        let mut rng = Pcg64::seed_from_u64(0x3a7c_11);
        for _ in 0..300 {
            let n = rng.gen_range(1..10usize);
            let p = rng.gen_range(0.1..0.7);
            let edges = (0..n as Node)
                .tuple_combinations()
                .filter(|_| rng.gen_bool(p))
                .collect_vec();

            let graph = graph_from(n as NumNodes, &edges);
            let expected = brute_force_matching_size(n, &edges);

            assert_eq!(graph.matching_size(), expected, "n={n} edges={edges:?}");
            assert_valid_matching(&graph, &graph.maximum_matching());
            for r in 0..=n / 2 + 1 {
                assert_eq!(graph.has_matching_of_at_least(r), r <= expected);
            }
        }
    }
}

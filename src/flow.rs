//! Maximum integral multicommodity flow with unit capacities in a tree, i.e. the
//! largest number of commodities that can be routed along pairwise edge-disjoint
//! paths.
//!
//! The tree is rooted and processed bottom-up. For every node `v` we compute the
//! optimal number of routed commodities inside the subtree `T_v` and the set of
//! commodities that may additionally use the edge from `v` to its parent without
//! lowering that optimum. At `v` we first route, per child, one commodity that ends
//! in `v` itself, then a maximum matching of commodities between two child subtrees
//! (computed by the blossom algorithm). A top-down pass then commits the choices.

use crate::{graph::*, matching::MatchingGraph};
use fxhash::FxHashMap;
use itertools::Itertools;
use log::trace;

pub type CommodityId = usize;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowResult {
    /// Number of routed commodities
    pub value: usize,
    /// Ids (indices into the input) of the routed commodities, sorted
    pub routed: Vec<CommodityId>,
}

/// Computes a maximum set of commodities with pairwise edge-disjoint paths in `tree`.
/// Commodities with identical endpoints or endpoints outside the tree are never routed.
pub fn maximum_multicommodity_flow(tree: &Tree, commodities: &[(Node, Node)]) -> FlowResult {
    let Some(root) = tree.nodes().next() else {
        return FlowResult::default();
    };

    let mut flow = TreeFlow::new(tree, root, commodities);
    let value = flow.upward_pass();
    let routed = flow.downward_pass();
    debug_assert_eq!(value, routed.len());

    trace!(
        "routed {value} of {} commodities on {} nodes",
        commodities.len(),
        tree.number_of_nodes()
    );

    FlowResult { value, routed }
}

/// Decisions taken at a single node during the upward pass
#[derive(Default)]
struct Junction {
    /// Children sorted by their preorder index
    children: Vec<Node>,
    /// Commodity between this node and the subtree of the i-th child, if one is routed
    ends_here: Vec<Option<CommodityId>>,
    /// Commodities between two child subtrees, as `(i, j, commodity)` with `i < j`
    crossing: Vec<(Node, Node, CommodityId)>,
    /// Commodities that may leave the subtree through the parent edge, with the child
    /// whose subtree they come from (`None` if they start in this node)
    upward: FxHashMap<CommodityId, Option<Node>>,
}

struct TreeFlow<'a> {
    commodities: &'a [(Node, Node)],
    preorder: Vec<Node>,
    tin: Vec<u32>,
    subtree_size: Vec<u32>,
    at_node: Vec<Vec<CommodityId>>,
    junctions: Vec<Junction>,
}

impl<'a> TreeFlow<'a> {
    fn new(tree: &Tree, root: Node, commodities: &'a [(Node, Node)]) -> Self {
        let n = tree.vertices_range().end as usize;

        // the stack based traversal yields a preorder in which every subtree is contiguous
        let order = tree.dfs(root).collect_vec();

        let mut tin = vec![u32::MAX; n];
        for (i, &(_, u)) in order.iter().enumerate() {
            tin[u as usize] = i as u32;
        }

        let mut subtree_size = vec![1u32; n];
        for &(p, u) in order.iter().rev() {
            if p != u {
                subtree_size[p as usize] += subtree_size[u as usize];
            }
        }

        let mut junctions: Vec<Junction> = (0..n).map(|_| Junction::default()).collect();
        for &(p, u) in &order {
            if p != u {
                junctions[p as usize].children.push(u);
            }
        }
        for j in &mut junctions {
            j.children.sort_unstable_by_key(|&c| tin[c as usize]);
        }

        let mut at_node = vec![Vec::new(); n];
        for (i, &(s, t)) in commodities.iter().enumerate() {
            if s == t || !tree.has_node(s) || !tree.has_node(t) {
                continue;
            }
            at_node[s as usize].push(i);
            at_node[t as usize].push(i);
        }

        Self {
            commodities,
            preorder: order.into_iter().map(|(_, u)| u).collect(),
            tin,
            subtree_size,
            at_node,
            junctions,
        }
    }

    fn in_subtree(&self, root: Node, u: Node) -> bool {
        let (r, x) = (self.tin[root as usize], self.tin[u as usize]);
        r <= x && x < r + self.subtree_size[root as usize]
    }

    /// Returns the endpoint of commodity `c` that is not inside the subtree of `root`
    fn outer_endpoint(&self, c: CommodityId, root: Node) -> Node {
        let (s, t) = self.commodities[c];
        if self.in_subtree(root, s) { t } else { s }
    }

    /// Index of the child whose subtree contains `u`; `u` must be a proper descendant of their parent
    fn child_towards(&self, children: &[Node], u: Node) -> usize {
        let x = self.tin[u as usize];
        children.partition_point(|&c| self.tin[c as usize] <= x) - 1
    }

    fn upward_pass(&mut self) -> usize {
        let mut value = 0;
        for idx in (0..self.preorder.len()).rev() {
            let v = self.preorder[idx];
            value += self.process_node(v);
        }
        value
    }

    /// Fills the junction of `v` and returns the number of commodities routed through `v`
    /// as their topmost node
    fn process_node(&mut self, v: Node) -> usize {
        let children = std::mem::take(&mut self.junctions[v as usize].children);
        let deg = children.len();

        let mut ends_here = vec![None; deg];
        let mut crossing = Vec::new();

        for (i, &c) in children.iter().enumerate() {
            for (&q, _) in self.junctions[c as usize].upward.iter().sorted_by_key(|(q, _)| **q) {
                let other = self.outer_endpoint(q, c);
                if other == v {
                    if ends_here[i].is_none() {
                        ends_here[i] = Some(q);
                    }
                } else if self.in_subtree(v, other) {
                    let j = self.child_towards(&children, other);
                    let cj = children[j];
                    if i < j && self.junctions[cj as usize].upward.contains_key(&q) {
                        crossing.push((i as Node, j as Node, q));
                    }
                }
            }
        }

        let matching_graph = |excluded: Option<usize>| {
            let mut graph = MatchingGraph::new(deg as NumNodes);
            for &(i, j, _) in &crossing {
                let blocked = |x: Node| ends_here[x as usize].is_some() || excluded == Some(x as usize);
                if !blocked(i) && !blocked(j) {
                    graph.add_edge(i, j);
                }
            }
            graph
        };

        let full = matching_graph(None);
        let mates = full.maximum_matching();
        let matched = mates.iter().filter(|m| m.is_some()).count() / 2;

        let mut upward: FxHashMap<CommodityId, Option<Node>> = FxHashMap::default();
        for &q in &self.at_node[v as usize] {
            if !self.in_subtree(v, self.outer_endpoint_of_node(q, v)) {
                upward.insert(q, None);
            }
        }

        for (i, &c) in children.iter().enumerate() {
            if ends_here[i].is_some() {
                continue;
            }

            let leaving = self.junctions[c as usize]
                .upward
                .keys()
                .copied()
                .filter(|&q| !self.in_subtree(v, self.outer_endpoint(q, c)))
                .collect_vec();
            if leaving.is_empty() {
                continue;
            }

            let free = mates[i].is_none() || matching_graph(Some(i)).matching_size() == matched;
            if free {
                upward.extend(leaving.into_iter().map(|q| (q, Some(c))));
            }
        }

        let routed_here = ends_here.iter().flatten().count() + matched;

        let junction = &mut self.junctions[v as usize];
        junction.children = children;
        junction.ends_here = ends_here;
        junction.crossing = crossing;
        junction.upward = upward;

        routed_here
    }

    /// Returns the endpoint of `q` that is not `v`
    fn outer_endpoint_of_node(&self, q: CommodityId, v: Node) -> Node {
        let (s, t) = self.commodities[q];
        if s == v { t } else { s }
    }

    fn downward_pass(&self) -> Vec<CommodityId> {
        let mut routed = Vec::new();
        let Some(&root) = self.preorder.first() else {
            return routed;
        };

        // (node, commodity entering through the parent edge)
        let mut stack = vec![(root, None)];
        while let Some((v, incoming)) = stack.pop() {
            let junction = &self.junctions[v as usize];
            let deg = junction.children.len();
            let mut child_incoming: Vec<Option<CommodityId>> = vec![None; deg];

            let reserved = incoming.and_then(|q| {
                let origin = junction.upward.get(&q).copied().flatten()?;
                let i = junction.children.iter().position(|&c| c == origin)?;
                child_incoming[i] = Some(q);
                Some(i)
            });

            for (i, q) in junction.ends_here.iter().enumerate() {
                if let Some(q) = *q {
                    child_incoming[i] = Some(q);
                    routed.push(q);
                }
            }

            let mut graph = MatchingGraph::new(deg as NumNodes);
            let mut commodity_of: FxHashMap<(Node, Node), CommodityId> = FxHashMap::default();
            for &(i, j, q) in &junction.crossing {
                let blocked = |x: Node| {
                    junction.ends_here[x as usize].is_some() || reserved == Some(x as usize)
                };
                if !blocked(i) && !blocked(j) && !commodity_of.contains_key(&(i, j)) {
                    commodity_of.insert((i, j), q);
                    graph.add_edge(i, j);
                }
            }

            for Edge(i, j) in graph.maximum_matching_edges() {
                if let Some(&q) = commodity_of.get(&(i, j)) {
                    child_incoming[i as usize] = Some(q);
                    child_incoming[j as usize] = Some(q);
                    routed.push(q);
                }
            }

            stack.extend(junction.children.iter().copied().zip(child_incoming));
        }

        routed.sort_unstable();
        routed
    }
}

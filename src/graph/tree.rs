use super::*;
use crate::errors::{InvariantCheck, KernelError, KernelResult};
use smallvec::SmallVec;
use std::fmt;

#[derive(Clone, Default)]
struct Neighborhood {
    nodes: SmallVec<[Node; 4]>,
}

impl Neighborhood {
    fn has_neighbor(&self, v: Node) -> bool {
        self.nodes.contains(&v)
    }

    /// Returns true if `v` was not a neighbor before
    fn try_add(&mut self, v: Node) -> bool {
        if self.has_neighbor(v) {
            return false;
        }
        self.nodes.push(v);
        true
    }

    /// Returns true if `v` was a neighbor before
    fn try_remove(&mut self, v: Node) -> bool {
        match self.nodes.iter().position(|&x| x == v) {
            Some(idx) => {
                self.nodes.swap_remove(idx);
                true
            }
            None => false,
        }
    }
}

/// The working tree of a multicut instance.
///
/// Nodes live in an arena and are addressed by their index. Contracting an
/// edge keeps the endpoint with the smaller id and retires the other one; retired
/// ids are never reused and remember the node they were merged into (see
/// [`Tree::resolve`]), so stale ids held by other datastructures can be mapped
/// onto the current tree.
#[derive(Clone)]
pub struct Tree {
    adj: Vec<Neighborhood>,
    alive: Vec<bool>,
    merged_into: Vec<Node>,
    number_of_nodes: NumNodes,
    number_of_edges: NumEdges,
}

impl GraphNodeOrder for Tree {
    fn number_of_nodes(&self) -> NumNodes {
        self.number_of_nodes
    }

    fn vertices_range(&self) -> Range<Node> {
        0..self.adj.len() as Node
    }

    fn has_node(&self, u: Node) -> bool {
        self.alive.get(u as usize).copied().unwrap_or(false)
    }
}

impl GraphEdgeOrder for Tree {
    fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }
}

impl AdjacencyList for Tree {
    fn neighbors_of(&self, u: Node) -> &[Node] {
        &self.adj[u as usize].nodes
    }
}

impl AdjacencyTest for Tree {
    fn has_edge(&self, u: Node, v: Node) -> bool {
        self.has_node(u) && self.has_node(v) && self.adj[u as usize].has_neighbor(v)
    }
}

impl Tree {
    /// Creates `n` isolated nodes `0..n`. Only [`Tree::from_edges`] guarantees
    /// that the result is actually a tree.
    pub fn new(n: NumNodes) -> Self {
        Self {
            adj: vec![Default::default(); n as usize],
            alive: vec![true; n as usize],
            merged_into: (0..n).collect(),
            number_of_nodes: n,
            number_of_edges: 0,
        }
    }

    /// Builds a tree on the nodes `0..n`. Fails if the edges do not form a tree.
    pub fn from_edges(
        n: NumNodes,
        edges: impl IntoIterator<Item = impl Into<Edge>>,
    ) -> KernelResult<Self> {
        if n == 0 {
            return Err(KernelError::InvalidArgument(
                "a tree needs at least one node".into(),
            ));
        }

        let mut tree = Self::new(n);
        for Edge(u, v) in edges.into_iter().map(|e| e.into()) {
            tree.add_edge(u, v)
                .map_err(|e| KernelError::InvalidArgument(format!("cannot add edge: {e}")))?;
        }

        tree.is_correct()
            .map_err(|e| KernelError::InvalidArgument(format!("input is not a tree: {e}")))?;

        Ok(tree)
    }

    #[cfg(test)]
    pub fn test_only_from(edges: impl Clone + IntoIterator<Item = impl Into<Edge>>) -> Self {
        let n = edges
            .clone()
            .into_iter()
            .map(|e| e.into())
            .map(|e| e.0.max(e.1) + 1)
            .max()
            .unwrap_or(1);

        Self::from_edges(n, edges).unwrap()
    }

    /// Returns an iterator over all alive nodes
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.vertices_range().filter(|&u| self.alive[u as usize])
    }

    /// Returns an iterator over all edges, each normalized and reported once
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nodes().flat_map(move |u| {
            self.neighbors_of(u)
                .iter()
                .filter(move |&&v| u < v)
                .map(move |&v| Edge(u, v))
        })
    }

    /// Returns the normalized edges incident to `u`
    pub fn edges_at(&self, u: Node) -> impl Iterator<Item = Edge> + '_ {
        self.neighbors_of(u)
            .iter()
            .map(move |&v| Edge(u, v).normalized())
    }

    pub fn has_edge_between(&self, edge: Edge) -> bool {
        self.has_edge(edge.0, edge.1)
    }

    pub fn is_leaf(&self, u: Node) -> bool {
        self.degree_of(u) == 1
    }

    pub fn is_internal(&self, u: Node) -> bool {
        self.degree_of(u) > 1
    }

    /// Returns the leaves adjacent to `u`
    pub fn leaf_neighbors_of(&self, u: Node) -> impl Iterator<Item = Node> + '_ {
        self.neighbors_of(u)
            .iter()
            .copied()
            .filter(|&v| self.is_leaf(v))
    }

    /// Follows the contraction history of `u` and returns the alive node it is part of today
    pub fn resolve(&self, mut u: Node) -> Node {
        while self.merged_into[u as usize] != u {
            u = self.merged_into[u as usize];
        }
        u
    }

    /// Maps a possibly stale edge onto the current tree. Returns `None` if the
    /// edge got contracted in the meantime (or never existed).
    pub fn resolve_edge(&self, edge: Edge) -> Option<Edge> {
        let resolved = Edge(self.resolve(edge.0), self.resolve(edge.1)).normalized();
        (!resolved.is_loop() && self.has_edge_between(resolved)).then_some(resolved)
    }

    /// Adds an isolated node and returns its id. The caller is responsible to
    /// connect it to the tree.
    pub fn add_node(&mut self) -> Node {
        let u = self.adj.len() as Node;
        self.adj.push(Default::default());
        self.alive.push(true);
        self.merged_into.push(u);
        self.number_of_nodes += 1;
        u
    }

    /// Removes a leaf (or an isolated node) together with its edge.
    pub fn remove_node(&mut self, u: Node) -> KernelResult<()> {
        if !self.has_node(u) {
            return Err(KernelError::NodeNotInTree(u));
        }
        if self.degree_of(u) > 1 {
            return Err(KernelError::InvalidArgument(format!(
                "removing the internal node {u} would disconnect the tree"
            )));
        }

        if let Some(&v) = self.neighbors_of(u).first() {
            self.remove_edge(u, v)?;
        }

        self.alive[u as usize] = false;
        self.number_of_nodes -= 1;
        Ok(())
    }

    /// Adds the undirected edge {u, v}. Fails on loops, missing nodes and existing edges.
    pub fn add_edge(&mut self, u: Node, v: Node) -> KernelResult<()> {
        for x in [u, v] {
            if !self.has_node(x) {
                return Err(KernelError::NodeNotInTree(x));
            }
        }
        if u == v || self.adj[u as usize].has_neighbor(v) {
            return Err(KernelError::InvalidArgument(format!(
                "cannot add edge {}",
                Edge(u, v)
            )));
        }

        self.adj[u as usize].try_add(v);
        self.adj[v as usize].try_add(u);
        self.number_of_edges += 1;
        Ok(())
    }

    /// Removes the undirected edge {u, v} without merging its endpoints; this
    /// splits the tree into two components.
    pub fn remove_edge(&mut self, u: Node, v: Node) -> KernelResult<()> {
        if !self.has_edge(u, v) {
            return Err(KernelError::EdgeNotInTree(Edge(u, v)));
        }

        self.adj[u as usize].try_remove(v);
        self.adj[v as usize].try_remove(u);
        self.number_of_edges -= 1;
        Ok(())
    }

    /// Contracts `edge` and returns the merged node, which is the endpoint with the
    /// smaller id. All other edges of the retired endpoint are re-attached to the
    /// merged node; duplicates and loops are dropped.
    pub fn contract_edge(&mut self, edge: Edge) -> KernelResult<Node> {
        if edge.is_loop() || !self.has_edge_between(edge) {
            return Err(KernelError::EdgeNotInTree(edge));
        }

        let Edge(survivor, removed) = edge.normalized();
        let neighbors = std::mem::take(&mut self.adj[removed as usize].nodes);

        for v in neighbors {
            self.adj[v as usize].try_remove(removed);
            self.number_of_edges -= 1;

            if v != survivor && self.adj[survivor as usize].try_add(v) {
                self.adj[v as usize].try_add(survivor);
                self.number_of_edges += 1;
            }
        }

        self.alive[removed as usize] = false;
        self.merged_into[removed as usize] = survivor;
        self.number_of_nodes -= 1;

        Ok(survivor)
    }

    /// Returns the nodes on the unique path from `u` to `v` (both included)
    pub fn path_between(&self, u: Node, v: Node) -> KernelResult<Vec<Node>> {
        for x in [u, v] {
            if !self.has_node(x) {
                return Err(KernelError::NodeNotInTree(x));
            }
        }

        self.bfs(u).path_to(v).ok_or_else(|| {
            KernelError::InvalidArgument(format!("nodes {u} and {v} are not connected"))
        })
    }
}

impl InvariantCheck<KernelError> for Tree {
    fn is_correct(&self) -> Result<(), KernelError> {
        let mut degree_sum = 0;
        for u in self.vertices_range() {
            let neighbors = self.neighbors_of(u);
            if !self.alive[u as usize] {
                if !neighbors.is_empty() {
                    return Err(KernelError::InvalidArgument(format!(
                        "retired node {u} still has neighbors"
                    )));
                }
                continue;
            }

            for &v in neighbors {
                if v == u || !self.has_node(v) || !self.adj[v as usize].has_neighbor(u) {
                    return Err(KernelError::InvalidArgument(format!(
                        "inconsistent adjacency at edge {}",
                        Edge(u, v)
                    )));
                }
            }
            degree_sum += neighbors.len() as NumEdges;
        }

        if degree_sum != 2 * self.number_of_edges {
            return Err(KernelError::InvalidArgument(
                "edge counter does not match adjacency".into(),
            ));
        }

        if self.number_of_nodes == 0 {
            return Ok(());
        }

        if self.number_of_edges + 1 != self.number_of_nodes as NumEdges {
            return Err(KernelError::InvalidArgument(format!(
                "{} nodes but {} edges",
                self.number_of_nodes, self.number_of_edges
            )));
        }

        // with n - 1 edges, connectivity implies acyclicity
        let Some(root) = self.nodes().next() else {
            return Ok(());
        };
        if self.bfs(root).count() != self.number_of_nodes as usize {
            return Err(KernelError::InvalidArgument("tree is not connected".into()));
        }

        Ok(())
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("n", &self.number_of_nodes)
            .field("edges", &self.edges().collect::<Vec<_>>())
            .finish()
    }
}

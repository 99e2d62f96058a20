use super::*;
use fxhash::FxHashSet;

/// A pair of nodes that has to be separated, together with the unique tree path between them.
#[derive(Clone, Debug)]
pub struct DemandPair {
    id: PairId,
    path: Vec<Node>,
    edges: FxHashSet<Edge>,
}

impl PartialEq for DemandPair {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.path == other.path
    }
}

impl Eq for DemandPair {}

impl DemandPair {
    /// Creates the demand pair between `node1` and `node2`, computing its path in `tree`
    pub fn new(id: PairId, node1: Node, node2: Node, tree: &Tree) -> KernelResult<Self> {
        if node1 == node2 {
            return Err(KernelError::DegeneratePath { pair: id });
        }

        let path = tree.path_between(node1, node2)?;
        Ok(Self::from_path(id, path))
    }

    fn from_path(id: PairId, path: Vec<Node>) -> Self {
        let edges = Self::edge_set_of(&path);
        Self { id, path, edges }
    }

    fn edge_set_of(path: &[Node]) -> FxHashSet<Edge> {
        path.iter()
            .tuple_windows()
            .map(|(&u, &v)| Edge(u, v).normalized())
            .collect()
    }

    pub fn id(&self) -> PairId {
        self.id
    }

    pub fn node1(&self) -> Node {
        self.path[0]
    }

    pub fn node2(&self) -> Node {
        self.path[self.path.len() - 1]
    }

    pub fn endpoints(&self) -> (Node, Node) {
        (self.node1(), self.node2())
    }

    pub fn has_endpoint(&self, u: Node) -> bool {
        self.node1() == u || self.node2() == u
    }

    /// Returns the endpoint that is not `u`, or `None` if `u` is no endpoint
    pub fn other_endpoint(&self, u: Node) -> Option<Node> {
        if self.node1() == u {
            Some(self.node2())
        } else if self.node2() == u {
            Some(self.node1())
        } else {
            None
        }
    }

    /// Number of edges on the path
    pub fn length(&self) -> usize {
        self.path.len() - 1
    }

    /// Nodes on the path, starting at [`DemandPair::node1`]
    pub fn path(&self) -> &[Node] {
        &self.path
    }

    /// Normalized edges on the path in path order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.path
            .iter()
            .tuple_windows()
            .map(|(&u, &v)| Edge(u, v).normalized())
    }

    pub fn contains_edge(&self, edge: Edge) -> bool {
        self.edges.contains(&edge.normalized())
    }

    pub fn contains_node(&self, u: Node) -> bool {
        self.path.contains(&u)
    }

    /// The edge incident to `node1`
    pub fn first_edge(&self) -> Edge {
        Edge(self.path[0], self.path[1]).normalized()
    }

    /// The edge incident to `node2`
    pub fn last_edge(&self) -> Edge {
        let l = self.path.len();
        Edge(self.path[l - 2], self.path[l - 1]).normalized()
    }

    /// Returns the first edge of the path when walking from the endpoint `u`,
    /// or `None` if `u` is no endpoint
    pub fn edge_leaving(&self, u: Node) -> Option<Edge> {
        if self.node1() == u {
            Some(self.first_edge())
        } else if self.node2() == u {
            Some(self.last_edge())
        } else {
            None
        }
    }

    /// Returns the second edge of the path when walking from the endpoint `u`,
    /// or `None` if `u` is no endpoint or the path has a single edge
    pub fn second_edge_from(&self, u: Node) -> Option<Edge> {
        let l = self.path.len();
        if l < 3 {
            return None;
        }
        if self.node1() == u {
            Some(Edge(self.path[1], self.path[2]).normalized())
        } else if self.node2() == u {
            Some(Edge(self.path[l - 3], self.path[l - 2]).normalized())
        } else {
            None
        }
    }

    /// Returns true if every edge of `self` is also on the path of `other`
    pub fn is_sub_path_of(&self, other: &DemandPair) -> bool {
        // in a tree, a path is contained in another one iff both of its extremal edges are
        self.length() <= other.length()
            && other.contains_edge(self.first_edge())
            && other.contains_edge(self.last_edge())
    }

    /// Replaces the endpoint `old_endpoint` by `new_endpoint`, which has to lie on the
    /// current path, and returns the edges that are no longer on the path. A path can
    /// only ever be shortened this way.
    pub fn shorten_endpoint(
        &mut self,
        old_endpoint: Node,
        new_endpoint: Node,
    ) -> KernelResult<Vec<Edge>> {
        let other = self
            .other_endpoint(old_endpoint)
            .ok_or(KernelError::NotAnEndpoint {
                pair: self.id,
                node: old_endpoint,
            })?;

        if new_endpoint == other {
            return Err(KernelError::DegeneratePath { pair: self.id });
        }

        let idx = self
            .path
            .iter()
            .position(|&x| x == new_endpoint)
            .ok_or(KernelError::NodeNotOnDemandPath {
                pair: self.id,
                node: new_endpoint,
            })?;

        let mut new_path = if old_endpoint == self.node1() {
            self.path[idx..].to_vec()
        } else {
            self.path[..=idx].to_vec()
        };
        std::mem::swap(&mut self.path, &mut new_path);

        let new_edges = Self::edge_set_of(&self.path);
        let dropped = Self::edge_set_of(&new_path)
            .into_iter()
            .filter(|e| !new_edges.contains(e))
            .sorted()
            .collect_vec();
        self.edges = new_edges;

        Ok(dropped)
    }

    /// Updates the path after `edge` on it was contracted into `merged`
    pub fn on_edge_contracted(&mut self, edge: Edge, merged: Node) -> KernelResult<()> {
        let edge = edge.normalized();
        if !self.edges.contains(&edge) {
            return Err(KernelError::EdgeNotOnDemandPath {
                pair: self.id,
                edge,
            });
        }

        if self.length() == 1 {
            return Err(KernelError::DegeneratePath { pair: self.id });
        }

        let idx = self
            .path
            .iter()
            .tuple_windows()
            .position(|(&u, &v)| Edge(u, v).normalized() == edge)
            .ok_or(KernelError::EdgeNotOnDemandPath {
                pair: self.id,
                edge,
            })?;

        self.path[idx] = merged;
        self.path.remove(idx + 1);
        self.edges = Self::edge_set_of(&self.path);

        Ok(())
    }

    /// Renames the node `retired` to `survivor`; used for pairs passing through the
    /// retired endpoint of a contracted edge without using the edge itself
    pub fn rename_node(&mut self, retired: Node, survivor: Node) {
        if let Some(x) = self.path.iter_mut().find(|x| **x == retired) {
            *x = survivor;
            self.edges = Self::edge_set_of(&self.path);
        }
    }
}

impl InvariantCheck<KernelError> for (&DemandPair, &Tree) {
    /// The cached path has to be the unique tree path between the endpoints
    fn is_correct(&self) -> Result<(), KernelError> {
        let (pair, tree) = *self;
        if pair.node1() == pair.node2() {
            return Err(KernelError::DegeneratePath { pair: pair.id() });
        }

        let expected = tree.path_between(pair.node1(), pair.node2())?;
        if expected != pair.path {
            return Err(KernelError::InvalidArgument(format!(
                "pair {} caches path {:?} but the tree path is {:?}",
                pair.id(),
                pair.path,
                expected
            )));
        }

        if pair.edges != DemandPair::edge_set_of(&expected) {
            return Err(KernelError::InvalidArgument(format!(
                "pair {} has an inconsistent edge set",
                pair.id()
            )));
        }

        Ok(())
    }
}

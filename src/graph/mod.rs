pub mod edge;
pub mod generators;
pub mod role;
pub mod traversal;
pub mod tree;

pub type Node = u32;
pub type NumNodes = Node;
pub type NumEdges = u64;

use std::ops::Range;

pub use edge::*;
pub use role::*;
pub use traversal::*;
pub use tree::*;

/// Provides getters pertaining to the size of a graph
pub trait GraphNodeOrder {
    /// Returns the number of (alive) nodes of the graph
    fn number_of_nodes(&self) -> NumNodes;

    /// Returns the number of nodes as usize
    fn len(&self) -> usize {
        self.number_of_nodes() as usize
    }

    /// Returns true if the graph has no nodes (and thus no edges)
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a range of node ids possibly including retired nodes.
    /// In contrast to an iterator over the alive nodes, the range does not
    /// borrow self and hence may be used while the graph is modified.
    ///
    /// # Warning
    /// It is the responsibility of the caller to skip retired nodes.
    fn vertices_range(&self) -> Range<Node>;

    /// Returns true if `u` is an alive node of the graph
    fn has_node(&self, u: Node) -> bool;
}

pub trait GraphEdgeOrder {
    /// Returns the number of edges of the graph
    fn number_of_edges(&self) -> NumEdges;
}

pub trait AdjacencyList: GraphNodeOrder {
    /// Returns a slice of neighbors of a given vertex.
    /// ** Panics if the v >= n **
    fn neighbors_of(&self, u: Node) -> &[Node];

    /// Returns the number of neighbors of from [`u`]
    fn degree_of(&self, u: Node) -> NumNodes {
        self.neighbors_of(u).len() as NumNodes
    }
}

/// Provides efficient tests whether an edge exists
pub trait AdjacencyTest {
    /// Returns *true* exactly if the graph contains the undirected edge {u, v}
    fn has_edge(&self, u: Node, v: Node) -> bool;
}

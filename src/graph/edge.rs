use super::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub trait EdgeOps {
    fn normalized(&self) -> Self;
    fn is_normalized(&self) -> bool;
    fn is_loop(&self) -> bool;
    fn reverse(&self) -> Self;

    /// Returns true if `u` is one of the two endpoints
    fn is_incident_to(&self, u: Node) -> bool;

    /// Returns the endpoint that is not `u`, or `None` if `u` is not an endpoint
    fn opposite_of(&self, u: Node) -> Option<Node>;

    /// Returns the node both edges share, if any
    fn shared_node(&self, other: &Self) -> Option<Node>;
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge(pub Node, pub Node);

impl EdgeOps for Edge {
    fn normalized(&self) -> Self {
        Edge(self.0.min(self.1), self.0.max(self.1))
    }

    fn is_normalized(&self) -> bool {
        self.0 <= self.1
    }

    fn is_loop(&self) -> bool {
        self.0 == self.1
    }

    fn reverse(&self) -> Self {
        Edge(self.1, self.0)
    }

    fn is_incident_to(&self, u: Node) -> bool {
        self.0 == u || self.1 == u
    }

    fn opposite_of(&self, u: Node) -> Option<Node> {
        if self.0 == u {
            Some(self.1)
        } else if self.1 == u {
            Some(self.0)
        } else {
            None
        }
    }

    fn shared_node(&self, other: &Self) -> Option<Node> {
        if other.is_incident_to(self.0) {
            Some(self.0)
        } else if other.is_incident_to(self.1) {
            Some(self.1)
        } else {
            None
        }
    }
}

impl From<(Node, Node)> for Edge {
    fn from(value: (Node, Node)) -> Self {
        Edge(value.0, value.1)
    }
}

impl From<&(Node, Node)> for Edge {
    fn from(value: &(Node, Node)) -> Self {
        Edge(value.0, value.1)
    }
}

impl From<Edge> for (Node, Node) {
    fn from(value: Edge) -> Self {
        (value.0, value.1)
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {}}}", self.0, self.1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize() {
        assert_eq!(Edge(3, 1).normalized(), Edge(1, 3));
        assert_eq!(Edge(1, 3).normalized(), Edge(1, 3));
        assert!(Edge(2, 2).is_loop());
        assert!(!Edge(4, 2).is_normalized());
        assert_eq!(Edge(4, 2).reverse(), Edge(2, 4));
    }

    #[test]
    fn incidence() {
        let e = Edge(5, 7);
        assert!(e.is_incident_to(5));
        assert!(!e.is_incident_to(6));
        assert_eq!(e.opposite_of(7), Some(5));
        assert_eq!(e.opposite_of(1), None);
        assert_eq!(e.shared_node(&Edge(7, 9)), Some(7));
        assert_eq!(e.shared_node(&Edge(8, 9)), None);
    }
}

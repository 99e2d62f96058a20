use crate::{graph::*, instance::PairId};

/// An edge that got contracted into `merged`, together with the demand pairs
/// whose path used the edge at that time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractedEdge {
    pub edge: Edge,
    pub merged: Node,
    pub pairs: Vec<PairId>,
}

/// A demand pair that got removed, with a snapshot of its last path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovedPair {
    pub id: PairId,
    pub path: Vec<Node>,
}

/// A demand pair whose endpoint moved; `dropped` are the edges no longer on its path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangedPair {
    pub id: PairId,
    pub dropped: Vec<Edge>,
}

/// Everything that changed in the instance since a rule last looked at it.
///
/// Node ids and edges stored here may have been retired by later contractions;
/// consumers map them onto the current tree with [`Tree::resolve`] and
/// [`Tree::resolve_edge`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleDelta {
    pub contracted: Vec<ContractedEdge>,
    pub removed: Vec<RemovedPair>,
    pub changed: Vec<ChangedPair>,
}

impl RuleDelta {
    pub fn is_empty(&self) -> bool {
        self.contracted.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    pub fn extend(&mut self, other: &RuleDelta) {
        self.contracted.extend(other.contracted.iter().cloned());
        self.removed.extend(other.removed.iter().cloned());
        self.changed.extend(other.changed.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.contracted.clear();
        self.removed.clear();
        self.changed.clear();
    }

    /// Edges that lost at least one demand pair: the paths of removed pairs and the
    /// dropped edges of changed pairs. Stale edges are resolved against `tree` and
    /// skipped if they no longer exist.
    pub fn edges_that_lost_pairs(&self, tree: &Tree) -> Vec<Edge> {
        let from_removed = self
            .removed
            .iter()
            .flat_map(|r| r.path.windows(2).map(|w| Edge(w[0], w[1])));
        let from_changed = self.changed.iter().flat_map(|c| c.dropped.iter().copied());

        let mut edges: Vec<Edge> = from_removed
            .chain(from_changed)
            .filter_map(|e| tree.resolve_edge(e))
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Demand pairs whose path got shorter, either by a contraction or by moving an endpoint
    pub fn shortened_pairs(&self) -> Vec<PairId> {
        let mut pairs: Vec<PairId> = self
            .contracted
            .iter()
            .flat_map(|c| c.pairs.iter().copied())
            .chain(self.changed.iter().map(|c| c.id))
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

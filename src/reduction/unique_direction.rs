use crate::graph::*;
use fxhash::FxHashSet;
use itertools::Itertools;
use log::debug;
use std::collections::VecDeque;

use super::*;

/// If all demand paths starting in a node `u` continue in the same direction, the
/// edge on the other side is dominated and gets contracted:
///  - `u` is a leaf, every path at `u` has length at least two and they all use
///    the same second edge: contract the leaf edge.
///  - `u` has degree two and every path at `u` leaves through the same edge:
///    contract the other edge of `u`.
///
/// Each firing contracts a single edge. Nodes still waiting to be checked stay in a
/// backlog, so no candidate is lost.
pub struct RuleUniqueDirection {
    allow_leaf_attached_to_inner_node: bool,
    backlog: VecDeque<Node>,
    queued: FxHashSet<Node>,
}

impl RuleUniqueDirection {
    /// If `allow_leaf_attached_to_inner_node` is false, degree-two nodes with a leaf
    /// neighbour are never reduced
    pub fn new(allow_leaf_attached_to_inner_node: bool) -> Self {
        Self {
            allow_leaf_attached_to_inner_node,
            backlog: VecDeque::new(),
            queued: FxHashSet::default(),
        }
    }

    fn enqueue(&mut self, u: Node) {
        if self.queued.insert(u) {
            self.backlog.push_back(u);
        }
    }

    /// Returns the edge to contract if `u` qualifies
    fn edge_to_contract(&self, state: &KernelState, u: Node) -> Option<Edge> {
        let tree = state.tree();
        let pairs = state.pairs_at_node(u);
        if pairs.is_empty() {
            return None;
        }

        match tree.neighbors_of(u) {
            &[parent] => {
                let second_edges = pairs
                    .iter()
                    .map(|&id| state.pair(id).and_then(|p| p.second_edge_from(u)))
                    .collect::<Option<Vec<_>>>()?;
                second_edges
                    .iter()
                    .all_equal()
                    .then_some(Edge(u, parent).normalized())
            }
            &[a, b] => {
                if !self.allow_leaf_attached_to_inner_node
                    && tree.leaf_neighbors_of(u).next().is_some()
                {
                    return None;
                }

                let first_edges = pairs
                    .iter()
                    .map(|&id| state.pair(id).and_then(|p| p.edge_leaving(u)))
                    .collect::<Option<Vec<_>>>()?;
                let towards = first_edges.iter().all_equal_value().ok()?;
                let other = if towards.is_incident_to(a) { b } else { a };
                Some(Edge(u, other).normalized())
            }
            _ => None,
        }
    }

    fn contract_first_candidate(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        while let Some(u) = self.backlog.pop_front() {
            self.queued.remove(&u);

            let u = state.tree().resolve(u);
            if !state.tree().has_node(u) {
                continue;
            }

            if let Some(edge) = self.edge_to_contract(state, u) {
                debug!("all demand paths at {u} point away from {edge}");
                state.contract_edges(&[edge])?;
                return Ok(RuleOutcome::Fired);
            }
        }

        Ok(RuleOutcome::Idle)
    }
}

impl ReductionRule for RuleUniqueDirection {
    fn name(&self) -> &'static str {
        "UniqueDirection"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        self.backlog.clear();
        self.queued.clear();
        for u in state.tree().nodes().collect_vec() {
            self.enqueue(u);
        }
        self.contract_first_candidate(state)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        let tree = state.tree();
        let mut touched = Vec::new();

        // degrees and leaf neighbours change around merged nodes
        for contracted in &delta.contracted {
            let merged = tree.resolve(contracted.merged);
            touched.push(merged);
            if tree.has_node(merged) {
                touched.extend_from_slice(tree.neighbors_of(merged));
            }
            touched.extend(
                contracted
                    .pairs
                    .iter()
                    .filter_map(|&id| state.pair(id))
                    .flat_map(|p| [p.node1(), p.node2()]),
            );
        }

        // the set of paths at the endpoints changed
        for removed in &delta.removed {
            if let (Some(&first), Some(&last)) = (removed.path.first(), removed.path.last()) {
                touched.push(first);
                touched.push(last);
            }
        }
        for changed in &delta.changed {
            if let Some(pair) = state.pair(changed.id) {
                touched.extend([pair.node1(), pair.node2()]);
            }
            touched.extend(changed.dropped.iter().flat_map(|e| [e.0, e.1]));
        }

        let touched = touched
            .into_iter()
            .map(|u| tree.resolve(u))
            .filter(|&u| tree.has_node(u))
            .collect_vec();
        for u in touched {
            self.enqueue(u);
        }

        self.contract_first_candidate(state)
    }
}

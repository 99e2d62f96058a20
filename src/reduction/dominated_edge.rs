use crate::{graph::*, instance::PairId};
use fxhash::FxHashSet;
use itertools::Itertools;
use log::debug;

use super::*;

/// An edge `e1` is dominated by `e2 != e1` if every demand pair using `e1` also uses
/// `e2`. Some optimal solution avoids `e1`, so it gets contracted.
///
/// A dominating edge lies on every path through `e1`, in particular on the shortest
/// one; only its edges are candidates. The improved variant tries the neighbours of
/// `e1` on that path first, which are the most likely dominators.
pub struct RuleDominatedEdge {
    improved: bool,
    contract: FxHashSet<Edge>,
}

impl RuleDominatedEdge {
    pub fn new() -> Self {
        Self::with_improvement(false)
    }

    pub fn improved() -> Self {
        Self::with_improvement(true)
    }

    fn with_improvement(improved: bool) -> Self {
        Self {
            improved,
            contract: FxHashSet::default(),
        }
    }

    fn dominates(state: &KernelState, dominator: Edge, pairs: &[PairId]) -> bool {
        state.number_of_pairs_on_edge(dominator) >= pairs.len()
            && pairs.iter().all(|&id| state.edge_has_pair(dominator, id))
    }

    /// Edges that may dominate `edge`, i.e. the other edges of the shortest pair through it
    fn candidates_on_shortest_path(
        &self,
        state: &KernelState,
        edge: Edge,
        pairs: &[PairId],
    ) -> Vec<Edge> {
        let Some(shortest) = pairs
            .iter()
            .filter_map(|&id| state.pair(id))
            .min_by_key(|p| (p.length(), p.id()))
        else {
            return Vec::new();
        };

        let mut candidates = shortest.edges().filter(|&e| e != edge).collect_vec();
        if self.improved {
            // stable sort: adjacent edges first, the rest in path order
            candidates.sort_by_key(|e| e.shared_node(&edge).is_none());
        }
        candidates
    }

    /// Collects the dominated edges among `candidates` and contracts them in one batch.
    /// An edge is only contracted if it has a dominator that is kept; following the
    /// chain of dominators of a contracted edge always ends in a kept edge, so every
    /// demand pair keeps at least one edge.
    fn contract_dominated(
        &mut self,
        state: &mut KernelState,
        candidates: Vec<Edge>,
        compare_with_all_edges: bool,
    ) -> KernelResult<RuleOutcome> {
        self.contract.clear();
        let all_edges = if compare_with_all_edges {
            state.tree().edges().collect_vec()
        } else {
            Vec::new()
        };

        for edge in candidates {
            let pairs = state.pairs_on_edge(edge);
            if pairs.is_empty() {
                continue;
            }

            let others = if compare_with_all_edges {
                all_edges.clone()
            } else {
                self.candidates_on_shortest_path(state, edge, &pairs)
            };

            let dominator = others.into_iter().find(|&other| {
                other != edge
                    && !self.contract.contains(&other)
                    && Self::dominates(state, other, &pairs)
            });

            if let Some(dominator) = dominator {
                debug!("{edge} is dominated by {dominator}");
                self.contract.insert(edge);
            }
        }

        if self.contract.is_empty() {
            return Ok(RuleOutcome::Idle);
        }

        let edges = self.contract.iter().copied().sorted().collect_vec();
        state.contract_edges(&edges)?;
        Ok(RuleOutcome::Fired)
    }
}

impl Default for RuleDominatedEdge {
    fn default() -> Self {
        Self::new()
    }
}

impl ReductionRule for RuleDominatedEdge {
    fn name(&self) -> &'static str {
        if self.improved {
            "ImprovedDominatedEdge"
        } else {
            "DominatedEdge"
        }
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let edges = state.tree().edges().collect_vec();
        self.contract_dominated(state, edges, !self.improved)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        // an edge can only become dominated by losing demand pairs
        let candidates = delta.edges_that_lost_pairs(state.tree());
        self.contract_dominated(state, candidates, false)
    }
}

use crate::{graph::*, instance::PairId};
use fxhash::FxHashSet;
use itertools::Itertools;
use log::debug;

use super::*;

/// If more than k' demand paths of length two share the edge `e` and their other
/// edges are pairwise different, a solution avoiding `e` needs more than k' cuts.
/// So `e` is part of every solution and gets cut.
#[derive(Default)]
pub struct RuleOverloadedEdge {
    last_remaining_budget: Option<usize>,
    partners: FxHashSet<Edge>,
}

impl RuleOverloadedEdge {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_overloaded(&mut self, state: &KernelState, edge: Edge) -> bool {
        self.partners.clear();
        for id in state.pairs_on_edge(edge) {
            let Some(pair) = state.pair(id) else {
                continue;
            };
            if pair.length() != 2 {
                continue;
            }
            if let Some(partner) = pair.edges().find(|&e| e != edge) {
                self.partners.insert(partner);
            }
        }
        self.partners.len() > state.remaining_budget()
    }

    fn cut_overloaded(
        &mut self,
        state: &mut KernelState,
        candidates: Vec<Edge>,
    ) -> KernelResult<RuleOutcome> {
        self.last_remaining_budget = Some(state.remaining_budget());

        let mut overloaded = Vec::new();
        for edge in candidates {
            if self.is_overloaded(state, edge) {
                debug!(
                    "{edge} has {} length-two paths to different edges",
                    self.partners.len()
                );
                overloaded.push(edge);
            }
        }

        if overloaded.is_empty() {
            return Ok(RuleOutcome::Idle);
        }

        state.cut_edges(&overloaded)?;
        Ok(RuleOutcome::Fired)
    }

    /// Edges of the demand paths that got shortened to length two
    fn edges_of_new_short_paths(state: &KernelState, shortened: Vec<PairId>) -> Vec<Edge> {
        shortened
            .into_iter()
            .filter_map(|id| state.pair(id))
            .filter(|p| p.length() == 2)
            .flat_map(|p| p.edges().collect_vec())
            .sorted()
            .dedup()
            .collect()
    }
}

impl ReductionRule for RuleOverloadedEdge {
    fn name(&self) -> &'static str {
        "OverloadedEdge"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let edges = state.tree().edges().collect_vec();
        self.cut_overloaded(state, edges)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        // the threshold moved, so any edge may be overloaded now
        if self.last_remaining_budget != Some(state.remaining_budget()) {
            return self.run_first_iteration(state);
        }

        let candidates = Self::edges_of_new_short_paths(state, delta.shortened_pairs());
        self.cut_overloaded(state, candidates)
    }
}

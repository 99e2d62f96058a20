use crate::graph::*;
use itertools::Itertools;

use super::*;

/// Contracts every edge that no demand path uses.
#[derive(Default)]
pub struct RuleIdleEdge;

impl RuleIdleEdge {
    pub fn new() -> Self {
        Self
    }

    fn contract_idle(
        state: &mut KernelState,
        candidates: impl IntoIterator<Item = Edge>,
    ) -> KernelResult<RuleOutcome> {
        let idle = candidates
            .into_iter()
            .filter(|&e| state.number_of_pairs_on_edge(e) == 0)
            .collect_vec();

        if !idle.is_empty() {
            state.contract_edges(&idle)?;
        }

        Ok(fired_if(!idle.is_empty()))
    }
}

impl ReductionRule for RuleIdleEdge {
    fn name(&self) -> &'static str {
        "IdleEdge"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let edges = state.tree().edges().collect_vec();
        Self::contract_idle(state, edges)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        // only edges that lost a demand pair can have become idle
        let candidates = delta.edges_that_lost_pairs(state.tree());
        Self::contract_idle(state, candidates)
    }
}

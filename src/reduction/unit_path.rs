use crate::{graph::*, instance::PairId};
use itertools::Itertools;

use super::*;

/// A demand pair whose path is a single edge forces that edge into the solution.
#[derive(Default)]
pub struct RuleUnitPath;

impl RuleUnitPath {
    pub fn new() -> Self {
        Self
    }

    fn cut_unit_paths(
        state: &mut KernelState,
        candidates: impl IntoIterator<Item = PairId>,
    ) -> KernelResult<RuleOutcome> {
        let edges = candidates
            .into_iter()
            .filter_map(|id| state.pair(id))
            .filter(|pair| pair.length() == 1)
            .map(|pair| pair.first_edge())
            .unique()
            .collect_vec();

        if !edges.is_empty() {
            state.cut_edges(&edges)?;
        }

        Ok(fired_if(!edges.is_empty()))
    }
}

impl ReductionRule for RuleUnitPath {
    fn name(&self) -> &'static str {
        "UnitPath"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let all = state.pairs().map(|p| p.id()).collect_vec();
        Self::cut_unit_paths(state, all)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        Self::cut_unit_paths(state, delta.shortened_pairs())
    }
}

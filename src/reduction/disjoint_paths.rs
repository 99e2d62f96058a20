use crate::flow::maximum_multicommodity_flow;
use itertools::Itertools;
use log::debug;

use super::*;

/// Every demand path of a set of pairwise edge-disjoint paths needs its own cut. If the
/// maximum number of such paths exceeds the remaining budget, there is no solution.
#[derive(Default)]
pub struct RuleDisjointPaths;

impl RuleDisjointPaths {
    pub fn new() -> Self {
        Self
    }

    fn check(state: &KernelState) -> RuleOutcome {
        let commodities = state.pairs().map(|p| p.endpoints()).collect_vec();
        let flow = maximum_multicommodity_flow(state.tree(), &commodities);

        if flow.value > state.remaining_budget() {
            debug!(
                "{} edge-disjoint demand paths but only {} cuts left",
                flow.value,
                state.remaining_budget()
            );
            RuleOutcome::Infeasible
        } else {
            RuleOutcome::Idle
        }
    }
}

impl ReductionRule for RuleDisjointPaths {
    fn name(&self) -> &'static str {
        "DisjointPaths"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        Ok(Self::check(state))
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        if delta.is_empty() {
            return Ok(RuleOutcome::Idle);
        }
        Ok(Self::check(state))
    }
}

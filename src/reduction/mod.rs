pub mod delta;
pub use delta::RuleDelta;

mod wingspan;

pub mod bidimensional_dominating_wingspan;
pub use bidimensional_dominating_wingspan::RuleBidimensionalDominatingWingspan;
pub mod common_factor;
pub use common_factor::RuleCommonFactor;
pub mod disjoint_paths;
pub use disjoint_paths::RuleDisjointPaths;
pub mod dominated_edge;
pub use dominated_edge::RuleDominatedEdge;
pub mod dominated_path;
pub use dominated_path::RuleDominatedPath;
pub mod generalised_dominating_wingspan;
pub use generalised_dominating_wingspan::RuleGeneralisedDominatingWingspan;
pub mod idle_edge;
pub use idle_edge::RuleIdleEdge;
pub mod overloaded_caterpillar;
pub use overloaded_caterpillar::RuleOverloadedCaterpillar;
pub mod overloaded_edge;
pub use overloaded_edge::RuleOverloadedEdge;
pub mod overloaded_l3_leaves;
pub use overloaded_l3_leaves::RuleOverloadedL3Leaves;
pub mod unique_direction;
pub use unique_direction::RuleUniqueDirection;
pub mod unit_path;
pub use unit_path::RuleUnitPath;

use crate::{errors::KernelResult, kernelization::KernelState};

/// What a single application of a rule achieved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule did not apply
    Idle,
    /// The rule changed the instance
    Fired,
    /// The rule proved that no solution within the budget exists
    Infeasible,
}

pub trait ReductionRule {
    fn name(&self) -> &'static str;

    /// Scans the whole instance. The rule may build private state that later
    /// iterations keep up to date.
    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome>;

    /// Only looks at what `delta` (all changes since this rule last ran) makes
    /// plausible. Rules depending on global quantities (remaining budget, caterpillar
    /// structure) fall back to a full scan when these changed.
    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome>;
}

/// Maps "did we change anything" onto an outcome
fn fired_if(changed: bool) -> RuleOutcome {
    if changed {
        RuleOutcome::Fired
    } else {
        RuleOutcome::Idle
    }
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;
    use crate::{errors::InvariantCheck, graph::*};

    pub fn state_from(
        edges: impl Clone + IntoIterator<Item = impl Into<Edge>>,
        pairs: &[(Node, Node)],
        budget: usize,
    ) -> KernelState {
        KernelState::new(Tree::test_only_from(edges), pairs, budget).unwrap()
    }

    /// Runs the first iteration, then later iterations with the accumulated delta until
    /// the rule becomes idle. Returns the number of times the rule fired.
    pub fn run_exhaustively(rule: &mut dyn ReductionRule, state: &mut KernelState) -> usize {
        let mut fired = 0;
        let mut outcome = rule.run_first_iteration(state).unwrap();
        while outcome == RuleOutcome::Fired {
            fired += 1;
            assert!(state.is_correct().is_ok());
            let delta = state.take_delta();
            outcome = rule.run_later_iteration(state, &delta).unwrap();
        }
        fired
    }
}

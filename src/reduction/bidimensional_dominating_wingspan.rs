use crate::graph::*;
use log::debug;

use super::{wingspan::*, *};

/// Contracts the edge of an L2 leaf `u` if the part of its caterpillar covered by the
/// wingspan of `u` holds `k' + 1` endpoint-disjoint demand pairs.
///
/// Inside the covered part, a leaf edge separates at most one of these pairs, so every
/// solution within the budget cuts an edge of the wingspan backbone. Such an edge lies
/// on all pairs of `u` leaving in its direction, and the edge from the parent of `u`
/// in the other direction replaces the leaf edge.
#[derive(Default)]
pub struct RuleBidimensionalDominatingWingspan;

impl RuleBidimensionalDominatingWingspan {
    pub fn new() -> Self {
        Self
    }

    fn dominating_wingspan(
        state: &KernelState,
        components: &CaterpillarComponents,
        u: Node,
    ) -> Option<Wingspan> {
        let wingspan = Wingspan::of(state, u)?;
        let tree = state.tree();
        let path = wingspan.path(tree)?;

        let own = components.component_of(u);
        let backbone: Vec<Node> = path
            .into_iter()
            .filter(|&x| own.is_some() && components.component_of(x) == own)
            .collect();
        let covered = with_leaves(tree, &backbone);

        has_disjoint_pairs(state, state.remaining_budget() + 1, |pair| {
            covered.contains(&pair.node1()) && covered.contains(&pair.node2())
        })
        .then_some(wingspan)
    }

    fn contract_first_dominated(state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let components = state.caterpillar_components().clone();

        let Some(wingspan) = state
            .tree()
            .nodes()
            .find_map(|u| Self::dominating_wingspan(state, &components, u))
        else {
            return Ok(RuleOutcome::Idle);
        };

        let edge = wingspan.leaf_edge();
        debug!(
            "leaf {} is dominated by its wingspan; contract {edge}",
            wingspan.leaf
        );
        state.contract_edges(&[edge])?;
        Ok(RuleOutcome::Fired)
    }
}

impl ReductionRule for RuleBidimensionalDominatingWingspan {
    fn name(&self) -> &'static str {
        "BidimensionalDominatingWingspan"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        Self::contract_first_dominated(state)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        if delta.is_empty() {
            return Ok(RuleOutcome::Idle);
        }
        Self::contract_first_dominated(state)
    }
}

#[cfg(test)]
mod test {
    use super::test_utils::*;
    use super::*;

    //  5   6   7   8   9
    //  |   |   |   |   |
    //  0 - 1 - 2 - 3 - 4
    fn comb() -> [(Node, Node); 9] {
        [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 4),
            (0, 5),
            (1, 6),
            (2, 7),
            (3, 8),
            (4, 9),
        ]
    }

    #[test]
    fn contracts_dominated_leaf() {
        // the wingspan of 7 is 1 - 2 - 3; it holds the disjoint pairs (7, 6) and (1, 3)
        let pairs = [(7, 6), (7, 8), (1, 3)];

        let mut state = state_from(comb(), &pairs, 2);
        let mut rule = RuleBidimensionalDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);

        let mut state = state_from(comb(), &pairs, 1);
        let mut rule = RuleBidimensionalDominatingWingspan::new();
        assert_eq!(run_exhaustively(&mut rule, &mut state), 1);
        assert!(!state.tree().has_node(7));
        assert_eq!(state.pair(0).unwrap().path(), &[2, 1, 6]);
        assert_eq!(state.pair(1).unwrap().path(), &[2, 3, 8]);
        assert_eq!(state.number_of_pairs(), 3);
    }

    #[test]
    fn pairs_outside_the_caterpillar_do_not_count() {
        // 0 and 4 are no members of the caterpillar 1 - 2 - 3
        let pairs = [(7, 6), (7, 8), (0, 4)];
        let mut state = state_from(comb(), &pairs, 1);
        let mut rule = RuleBidimensionalDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);
    }

    #[test]
    fn later_iteration_after_removal() {
        // the unit path (7, 2) ends at the parent of 7
        let pairs = [(7, 6), (7, 8), (1, 3), (7, 2)];
        let mut state = state_from(comb(), &pairs, 1);
        let mut rule = RuleBidimensionalDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);

        state.remove_demand_pairs(&[3]).unwrap();
        let delta = state.take_delta();
        assert_eq!(
            rule.run_later_iteration(&mut state, &delta).unwrap(),
            RuleOutcome::Fired
        );
        assert!(!state.tree().has_node(7));
        assert_eq!(
            rule.run_later_iteration(&mut state, &RuleDelta::default()).unwrap(),
            RuleOutcome::Idle
        );
    }
}

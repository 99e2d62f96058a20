use crate::graph::*;
use fxhash::FxHashSet;
use log::debug;

use super::{wingspan::*, *};

/// Contracts the edge of an L2 leaf `u` whose wingspan covers its whole caterpillar
/// if `k' + 1` endpoint-disjoint demand pairs cross the wingspan.
///
/// Let `a` and `b` be the first internal nodes outside the caterpillar of `u` in
/// both directions. `u` covers the caterpillar if its wingspan contains `a` and `b`.
/// The rule looks for disjoint pairs between the nodes from `a` to the end of the
/// wingspan behind it and the nodes from `b` to `u` (plus their leaves), and the same
/// with both directions swapped. Such pairs only use wingspan edges and leaf edges.
#[derive(Default)]
pub struct RuleGeneralisedDominatingWingspan;

impl RuleGeneralisedDominatingWingspan {
    pub fn new() -> Self {
        Self
    }

    fn dominating_wingspan(state: &KernelState, u: Node) -> Option<Wingspan> {
        let wingspan = Wingspan::of(state, u)?;
        let tree = state.tree();

        let mut outer = [(0, 0); 2];
        for (side, slot) in outer.iter_mut().enumerate() {
            let end = wingspan.ends[side]?;
            let extremity = wingspan.extremity(tree, side)?;
            let covers = tree
                .path_between(wingspan.parent, end)
                .is_ok_and(|path| path.contains(&extremity));
            if !covers {
                return None;
            }
            *slot = (extremity, end);
        }

        let required = state.remaining_budget() + 1;
        let dominated = (0..2).any(|side| {
            let (extremity, end) = outer[side];
            let (other_extremity, _) = outer[1 - side];

            let (Ok(far), Ok(near)) = (
                tree.path_between(extremity, end),
                tree.path_between(other_extremity, u),
            ) else {
                return false;
            };
            let far: FxHashSet<Node> = with_leaves(tree, &far);
            let near: FxHashSet<Node> = with_leaves(tree, &near);

            has_disjoint_pairs(state, required, |pair| {
                let (s, t) = pair.endpoints();
                (far.contains(&s) && near.contains(&t)) || (far.contains(&t) && near.contains(&s))
            })
        });
        dominated.then_some(wingspan)
    }

    fn contract_first_dominated(state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let Some(wingspan) = state
            .tree()
            .nodes()
            .find_map(|u| Self::dominating_wingspan(state, u))
        else {
            return Ok(RuleOutcome::Idle);
        };

        let edge = wingspan.leaf_edge();
        debug!(
            "leaf {} covers its caterpillar and is dominated; contract {edge}",
            wingspan.leaf
        );
        state.contract_edges(&[edge])?;
        Ok(RuleOutcome::Fired)
    }
}

impl ReductionRule for RuleGeneralisedDominatingWingspan {
    fn name(&self) -> &'static str {
        "GeneralisedDominatingWingspan"
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
    fn contracts_covering_leaf() {
        // 7 reaches both extremities 0 and 4; (7, 5) and (0, 8) cross its wingspan
        let pairs = [(7, 5), (7, 9), (0, 8)];

        let mut state = state_from(comb(), &pairs, 2);
        let mut rule = RuleGeneralisedDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);

        let mut state = state_from(comb(), &pairs, 1);
        let mut rule = RuleGeneralisedDominatingWingspan::new();
        assert_eq!(run_exhaustively(&mut rule, &mut state), 1);
        assert!(!state.tree().has_node(7));
        assert_eq!(state.pair(0).unwrap().path(), &[2, 1, 0, 5]);
        assert_eq!(state.pair(1).unwrap().path(), &[2, 3, 4, 9]);
    }

    #[test]
    fn leaf_has_to_cover_its_caterpillar() {
        // (7, 6) ends inside the caterpillar 1 - 2 - 3
        let pairs = [(7, 6), (7, 9), (1, 8), (6, 9)];
        let mut state = state_from(comb(), &pairs, 1);
        let mut rule = RuleGeneralisedDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);

        // no pair leaves 7 to the left
        let pairs = [(7, 9), (0, 8), (5, 4)];
        let mut state = state_from(comb(), &pairs, 1);
        let mut rule = RuleGeneralisedDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);
    }

    #[test]
    fn later_iteration_after_removal() {
        //  5   6   7   8   9   11
        //  |   |   |   |   |   |
        //  0 - 1 - 2 - 3 - 4 - 10
        let mut edges = comb().to_vec();
        edges.extend([(4, 10), (10, 11)]);

        // 4 is an I2 node now, so the caterpillar ends in 10
        let pairs = [(7, 5), (7, 11), (0, 8), (7, 4)];
        let mut state = state_from(edges, &pairs, 1);
        let mut rule = RuleGeneralisedDominatingWingspan::new();
        assert_eq!(rule.run_first_iteration(&mut state).unwrap(), RuleOutcome::Idle);

        state.remove_demand_pairs(&[3]).unwrap();
        let delta = state.take_delta();
        assert_eq!(
            rule.run_later_iteration(&mut state, &delta).unwrap(),
            RuleOutcome::Fired
        );
        assert!(!state.tree().has_node(7));
    }
}

use crate::{graph::*, instance::PairId, matching::MatchingGraph};
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use log::debug;

use super::*;

/// Removes a demand pair `P` if any solution within the budget separates it anyway.
///
/// Let `Z` be the edges hanging off the nodes of `P` without lying on `P`, and `Y`
/// the edges of `Z` used by a pair that ends on `P` and shares an edge with it. Each
/// edge of `Y` forces a cut next to `P`. Join two edges of `Z \ Y` if some demand pair
/// uses both; if this graph has a matching of size `k' + 1 - |Y|`, no solution of
/// size `k'` can avoid cutting `P` itself.
#[derive(Default)]
pub struct RuleCommonFactor {
    members: FxHashMap<PairId, Vec<Node>>,
}

impl RuleCommonFactor {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_separated_anyway(&mut self, state: &KernelState, id: PairId) -> bool {
        let Some(pair) = state.pair(id) else {
            return false;
        };
        let tree = state.tree();

        let hanging = pair
            .path()
            .iter()
            .flat_map(|&u| tree.edges_at(u))
            .filter(|&e| !pair.contains_edge(e))
            .collect_vec();

        let touching: FxHashSet<PairId> = pair
            .path()
            .iter()
            .flat_map(|&u| state.pairs_at_node(u))
            .filter(|&other| other != id)
            .collect();

        let shares_edge_with_pair =
            |other: PairId| pair.edges().any(|e| state.edge_has_pair(e, other));

        let (forced, free): (Vec<Edge>, Vec<Edge>) = hanging.into_iter().partition(|&e| {
            state
                .pairs_on_edge(e)
                .into_iter()
                .any(|other| touching.contains(&other) && shares_edge_with_pair(other))
        });

        let required = state.remaining_budget() as i64 + 1 - forced.len() as i64;
        if required <= 0 {
            debug!("pair {id} has {} forced neighbouring cuts", forced.len());
            return true;
        }

        self.members.clear();
        for (i, &e) in free.iter().enumerate() {
            for other in state.pairs_on_edge(e) {
                self.members.entry(other).or_default().push(i as Node);
            }
        }

        let mut graph = MatchingGraph::new(free.len() as NumNodes);
        for edges in self.members.values() {
            for (&a, &b) in edges.iter().tuple_combinations() {
                graph.add_edge(a, b);
            }
        }

        let separated = graph.has_matching_of_at_least(required as usize);
        if separated {
            debug!(
                "pair {id}: {} forced cuts and {required} disjoint neighbouring pairs",
                forced.len()
            );
        }
        separated
    }

    fn remove_first_separated(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let ids = state.pairs().map(|p| p.id()).collect_vec();
        let Some(id) = ids
            .into_iter()
            .find(|&id| self.is_separated_anyway(state, id))
        else {
            return Ok(RuleOutcome::Idle);
        };

        state.remove_demand_pairs(&[id])?;
        Ok(RuleOutcome::Fired)
    }
}

impl ReductionRule for RuleCommonFactor {
    fn name(&self) -> &'static str {
        "CommonFactor"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        self.remove_first_separated(state)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        if delta.is_empty() {
            return Ok(RuleOutcome::Idle);
        }
        self.remove_first_separated(state)
    }
}

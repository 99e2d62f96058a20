use crate::{graph::*, instance::PairId};
use itertools::Itertools;
use log::debug;
use std::collections::BTreeMap;

use super::*;

/// If more than k' demand pairs connect a node `v` with L3 leaves of the same node
/// `p != v`, all of them are separated by cutting one edge between `v` and `p`
/// unless the solution spends more than k' cuts on the leaf edges. One of them is
/// shortened to `(v, p)` and the others are removed.
#[derive(Default)]
pub struct RuleOverloadedL3Leaves;

impl RuleOverloadedL3Leaves {
    pub fn new() -> Self {
        Self
    }

    /// Returns the demand pairs at `v` grouped by the parent of their L3 leaf endpoint
    fn groups_at(state: &KernelState, v: Node) -> BTreeMap<Node, Vec<(PairId, Node)>> {
        let tree = state.tree();
        let mut groups: BTreeMap<Node, Vec<(PairId, Node)>> = BTreeMap::new();

        for id in state.pairs_at_node(v) {
            let Some(leaf) = state.pair(id).and_then(|p| p.other_endpoint(v)) else {
                continue;
            };
            if tree.role_of(leaf) != NodeRole::L3 {
                continue;
            }
            let parent = tree.neighbors_of(leaf)[0];
            if parent != v {
                groups.entry(parent).or_default().push((id, leaf));
            }
        }

        groups
    }

    fn reduce_first_overload(state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let threshold = state.remaining_budget();

        let overload = state.tree().nodes().find_map(|v| {
            Self::groups_at(state, v)
                .into_iter()
                .find(|(_, group)| group.len() > threshold)
                .map(|(parent, group)| (v, parent, group))
        });

        let Some((v, parent, group)) = overload else {
            return Ok(RuleOutcome::Idle);
        };

        debug!(
            "{v} has {} demand pairs to L3 leaves of {parent}",
            group.len()
        );

        let (kept, leaf) = group[0];
        let others = group[1..].iter().map(|&(id, _)| id).collect_vec();
        state.remove_demand_pairs(&others)?;
        state.change_endpoints_of_demand_pairs(&[(kept, leaf, parent)])?;

        Ok(RuleOutcome::Fired)
    }
}

impl ReductionRule for RuleOverloadedL3Leaves {
    fn name(&self) -> &'static str {
        "OverloadedL3Leaves"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        Self::reduce_first_overload(state)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        // removing demand pairs alone never creates an overload
        if delta.contracted.is_empty() && delta.changed.is_empty() {
            return Ok(RuleOutcome::Idle);
        }
        Self::reduce_first_overload(state)
    }
}

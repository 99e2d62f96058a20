use crate::{graph::*, instance::PairId};
use fxhash::FxHashSet;
use itertools::Itertools;
use log::debug;
use std::cmp::Reverse;

use super::*;

/// If more than k' demand pairs connect a node `v` with nodes of the same caterpillar
/// component not containing `v`, the longest of them is dominated by the others and
/// gets removed, until only k' such pairs remain.
///
/// This relies on the absence of dominated paths, which the rule sets guarantee by
/// running [`super::RuleDominatedPath`] with higher priority.
#[derive(Default)]
pub struct RuleOverloadedCaterpillar {
    removed: FxHashSet<PairId>,
}

impl RuleOverloadedCaterpillar {
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_overloads(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        self.removed.clear();
        let components = state.caterpillar_components().clone();
        let threshold = state.remaining_budget();

        for v in state.tree().nodes() {
            let own = components.component_of(v);

            let candidates = state
                .pairs_at_node(v)
                .into_iter()
                .filter(|id| !self.removed.contains(id))
                .filter_map(|id| {
                    let pair = state.pair(id)?;
                    let other = pair.other_endpoint(v)?;
                    let component = components.component_of(other)?;
                    (Some(component) != own).then_some((component, Reverse(pair.length()), id))
                })
                .sorted()
                .collect_vec();

            for (component, group) in &candidates.into_iter().chunk_by(|&(c, _, _)| c) {
                let group = group.collect_vec();
                if group.len() <= threshold {
                    continue;
                }

                debug!(
                    "{v} has {} demand pairs into caterpillar {component}",
                    group.len()
                );
                // longest first
                self.removed.extend(
                    group
                        .iter()
                        .take(group.len() - threshold)
                        .map(|&(_, _, id)| id),
                );
            }
        }

        if self.removed.is_empty() {
            return Ok(RuleOutcome::Idle);
        }

        let ids = self.removed.iter().copied().sorted().collect_vec();
        state.remove_demand_pairs(&ids)?;
        Ok(RuleOutcome::Fired)
    }
}

impl ReductionRule for RuleOverloadedCaterpillar {
    fn name(&self) -> &'static str {
        "OverloadedCaterpillar"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        self.remove_overloads(state)
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
        self.remove_overloads(state)
    }
}

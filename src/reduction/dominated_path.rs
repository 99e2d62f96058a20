use crate::instance::PairId;
use fxhash::FxHashSet;
use itertools::Itertools;
use log::debug;

use super::*;

/// If the path of demand pair `P` is contained in the path of `Q`, every solution
/// separating `P` also separates `Q`, so `Q` is removed.
#[derive(Default)]
pub struct RuleDominatedPath {
    removed: FxHashSet<PairId>,
}

impl RuleDominatedPath {
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_super_paths(
        &mut self,
        state: &mut KernelState,
        candidates: Vec<PairId>,
    ) -> KernelResult<RuleOutcome> {
        self.removed.clear();

        for id in candidates {
            if self.removed.contains(&id) {
                continue;
            }
            let Some(pair) = state.pair(id) else {
                continue;
            };

            // every super path contains both extremal edges of `pair`
            let (first, last) = (pair.first_edge(), pair.last_edge());
            for other in state.pairs_on_edge(first) {
                if other == id || self.removed.contains(&other) || !state.edge_has_pair(last, other)
                {
                    continue;
                }
                debug!("pair {id} is contained in pair {other}");
                self.removed.insert(other);
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

impl ReductionRule for RuleDominatedPath {
    fn name(&self) -> &'static str {
        "DominatedPath"
    }

    fn run_first_iteration(&mut self, state: &mut KernelState) -> KernelResult<RuleOutcome> {
        let all = state.pairs().map(|p| p.id()).collect_vec();
        self.remove_super_paths(state, all)
    }

    fn run_later_iteration(
        &mut self,
        state: &mut KernelState,
        delta: &RuleDelta,
    ) -> KernelResult<RuleOutcome> {
        // paths never grow, so only a shortened pair can be contained in a new super path
        self.remove_super_paths(state, delta.shortened_pairs())
    }
}

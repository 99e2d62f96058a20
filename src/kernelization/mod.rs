pub mod config;
pub mod state;

pub use config::{KernelConfig, RuleKind, RuleSet};
pub use state::KernelState;

use crate::{
    errors::{InvariantCheck, KernelError, KernelResult},
    graph::*,
    instance::DemandPair,
    reduction::{ReductionRule, RuleDelta, RuleOutcome},
};
use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// How a kernelization run ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KernelStatus {
    /// Every demand pair is separated within the budget; the kernel is a single node
    Solved,
    /// No rule applies anymore; the remaining instance is the kernel
    KernelReached,
    /// No solution within the budget exists
    Unsolvable,
}

/// Result of [`Kernelizer::run`]
#[derive(Clone, Debug)]
pub struct Kernel {
    pub tree: Tree,
    /// Edges of the input tree that every solution of the kernel has to be extended by
    pub solution: Vec<Edge>,
    pub demand_pairs: Vec<DemandPair>,
    pub status: KernelStatus,
    pub solvable: bool,
    /// Number of times each rule fired, in priority order
    pub rule_applications: Vec<(&'static str, usize)>,
}

struct RuleSlot {
    rule: Box<dyn ReductionRule>,
    has_run: bool,
    pending: RuleDelta,
    applications: usize,
}

/// Applies a priority-ordered list of reduction rules until none of them fires.
///
/// Whenever a rule fires, the changes it made are handed to every rule that already
/// ran (including itself) and the scan restarts with the highest priority rule.
pub struct Kernelizer {
    state: KernelState,
    rules: Vec<RuleSlot>,
}

impl Kernelizer {
    pub fn new(
        tree: Tree,
        demand_pairs: &[(Node, Node)],
        budget: i64,
        rules: Vec<Box<dyn ReductionRule>>,
    ) -> KernelResult<Self> {
        let budget = usize::try_from(budget).map_err(|_| {
            KernelError::InvalidArgument(format!("budget must not be negative, got {budget}"))
        })?;

        let state = KernelState::new(tree, demand_pairs, budget)?;
        let rules = rules
            .into_iter()
            .map(|rule| RuleSlot {
                rule,
                has_run: false,
                pending: RuleDelta::default(),
                applications: 0,
            })
            .collect();

        Ok(Self { state, rules })
    }

    pub fn from_config(
        tree: Tree,
        demand_pairs: &[(Node, Node)],
        budget: i64,
        config: &KernelConfig,
    ) -> KernelResult<Self> {
        Self::new(tree, demand_pairs, budget, config.rule_set.build_rules())
    }

    pub fn state(&self) -> &KernelState {
        &self.state
    }

    /// Runs the rules to a fixpoint. Structural errors raised by a rule are passed on.
    pub fn run(mut self) -> KernelResult<Kernel> {
        info!(
            "Start kernelization: n = {}, m = {}, |P| = {}, k = {}",
            self.state.tree().number_of_nodes(),
            self.state.tree().number_of_edges(),
            self.state.number_of_pairs(),
            self.state.budget()
        );

        let status = loop {
            if let Some(status) = self.terminal_status() {
                break status;
            }

            match self.apply_first_rule()? {
                RuleOutcome::Fired => continue,
                RuleOutcome::Infeasible => break KernelStatus::Unsolvable,
                RuleOutcome::Idle => break KernelStatus::KernelReached,
            }
        };

        if status == KernelStatus::Solved {
            // without demand pairs every edge is idle
            let idle = self.state.tree().edges().collect_vec();
            debug!("contract the {} remaining edges", idle.len());
            self.state.contract_edges(&idle)?;
        }

        info!(
            "Kernelization finished with {status:?}: n = {}, m = {}, |P| = {}, |S| = {}",
            self.state.tree().number_of_nodes(),
            self.state.tree().number_of_edges(),
            self.state.number_of_pairs(),
            self.state.solution().len()
        );

        let rule_applications = self
            .rules
            .iter()
            .map(|slot| (slot.rule.name(), slot.applications))
            .collect();

        let (tree, solution, demand_pairs) = self.state.into_parts();
        Ok(Kernel {
            tree,
            solution,
            demand_pairs,
            status,
            solvable: status != KernelStatus::Unsolvable,
            rule_applications,
        })
    }

    fn terminal_status(&self) -> Option<KernelStatus> {
        let used = self.state.solution().len();
        let budget = self.state.budget();

        if used > budget {
            return Some(KernelStatus::Unsolvable);
        }
        if self.state.number_of_pairs() == 0 {
            return Some(KernelStatus::Solved);
        }
        // every remaining pair needs at least one more cut
        if used == budget {
            return Some(KernelStatus::Unsolvable);
        }
        None
    }

    /// Asks the rules in priority order; returns as soon as one does not stay idle
    fn apply_first_rule(&mut self) -> KernelResult<RuleOutcome> {
        for index in 0..self.rules.len() {
            let before_nodes = self.state.tree().number_of_nodes();
            let before_edges = self.state.tree().number_of_edges();
            let before_pairs = self.state.number_of_pairs();
            let before_solution = self.state.solution().len();

            let slot = &mut self.rules[index];
            let outcome = if slot.has_run {
                let delta = std::mem::take(&mut slot.pending);
                slot.rule.run_later_iteration(&mut self.state, &delta)?
            } else {
                slot.has_run = true;
                slot.rule.run_first_iteration(&mut self.state)?
            };

            match outcome {
                RuleOutcome::Idle => {}
                RuleOutcome::Infeasible => {
                    info!("{} proved that the budget is exceeded", slot.rule.name());
                    return Ok(outcome);
                }
                RuleOutcome::Fired => {
                    slot.applications += 1;

                    info!(
                        "{} n -= {}, m -= {}, |P| -= {}, |S| += {}",
                        slot.rule.name(),
                        before_nodes - self.state.tree().number_of_nodes(),
                        before_edges - self.state.tree().number_of_edges(),
                        before_pairs - self.state.number_of_pairs(),
                        self.state.solution().len() - before_solution
                    );

                    debug_assert!(self.state.is_correct().is_ok());

                    let delta = self.state.take_delta();
                    for slot in self.rules.iter_mut().filter(|slot| slot.has_run) {
                        slot.pending.extend(&delta);
                    }
                    return Ok(outcome);
                }
            }
        }

        debug!("no rule applies");
        Ok(RuleOutcome::Idle)
    }
}

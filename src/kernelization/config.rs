use crate::{errors::KernelError, reduction::*};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A single reduction rule, as it appears in rule sets and configuration files
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    UnitPath,
    IdleEdge,
    DominatedEdge,
    ImprovedDominatedEdge,
    DominatedPath,
    DisjointPaths,
    OverloadedEdge,
    /// Also reduces degree-two nodes that have a leaf neighbour
    UniqueDirection,
    /// Never reduces degree-two nodes that have a leaf neighbour
    UniqueDirectionWithoutLeaves,
    OverloadedCaterpillar,
    OverloadedL3Leaves,
    CommonFactor,
    BidimensionalDominatingWingspan,
    GeneralisedDominatingWingspan,
}

impl RuleKind {
    pub const ALL: [RuleKind; 14] = [
        RuleKind::UnitPath,
        RuleKind::IdleEdge,
        RuleKind::DominatedEdge,
        RuleKind::ImprovedDominatedEdge,
        RuleKind::DominatedPath,
        RuleKind::DisjointPaths,
        RuleKind::OverloadedEdge,
        RuleKind::UniqueDirection,
        RuleKind::UniqueDirectionWithoutLeaves,
        RuleKind::OverloadedCaterpillar,
        RuleKind::OverloadedL3Leaves,
        RuleKind::CommonFactor,
        RuleKind::BidimensionalDominatingWingspan,
        RuleKind::GeneralisedDominatingWingspan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RuleKind::UnitPath => "unit-path",
            RuleKind::IdleEdge => "idle-edge",
            RuleKind::DominatedEdge => "dominated-edge",
            RuleKind::ImprovedDominatedEdge => "improved-dominated-edge",
            RuleKind::DominatedPath => "dominated-path",
            RuleKind::DisjointPaths => "disjoint-paths",
            RuleKind::OverloadedEdge => "overloaded-edge",
            RuleKind::UniqueDirection => "unique-direction",
            RuleKind::UniqueDirectionWithoutLeaves => "unique-direction-without-leaves",
            RuleKind::OverloadedCaterpillar => "overloaded-caterpillar",
            RuleKind::OverloadedL3Leaves => "overloaded-l3-leaves",
            RuleKind::CommonFactor => "common-factor",
            RuleKind::BidimensionalDominatingWingspan => "bidimensional-dominating-wingspan",
            RuleKind::GeneralisedDominatingWingspan => "generalised-dominating-wingspan",
        }
    }

    /// Creates a fresh, uninitialized instance of the rule
    pub fn build(self) -> Box<dyn ReductionRule> {
        match self {
            RuleKind::UnitPath => Box::new(RuleUnitPath::new()),
            RuleKind::IdleEdge => Box::new(RuleIdleEdge::new()),
            RuleKind::DominatedEdge => Box::new(RuleDominatedEdge::new()),
            RuleKind::ImprovedDominatedEdge => Box::new(RuleDominatedEdge::improved()),
            RuleKind::DominatedPath => Box::new(RuleDominatedPath::new()),
            RuleKind::DisjointPaths => Box::new(RuleDisjointPaths::new()),
            RuleKind::OverloadedEdge => Box::new(RuleOverloadedEdge::new()),
            RuleKind::UniqueDirection => Box::new(RuleUniqueDirection::new(true)),
            RuleKind::UniqueDirectionWithoutLeaves => Box::new(RuleUniqueDirection::new(false)),
            RuleKind::OverloadedCaterpillar => Box::new(RuleOverloadedCaterpillar::new()),
            RuleKind::OverloadedL3Leaves => Box::new(RuleOverloadedL3Leaves::new()),
            RuleKind::CommonFactor => Box::new(RuleCommonFactor::new()),
            RuleKind::BidimensionalDominatingWingspan => {
                Box::new(RuleBidimensionalDominatingWingspan::new())
            }
            RuleKind::GeneralisedDominatingWingspan => {
                Box::new(RuleGeneralisedDominatingWingspan::new())
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| KernelError::InvalidArgument(format!("unknown reduction rule '{s}'")))
    }
}

/// A priority-ordered list of reduction rules
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleSet {
    #[default]
    GuoNiedermeier,
    GuoNiedermeierImproved,
    /// Guo-Niedermeier with the domination rules for edges and paths swapped
    GuoNiedermeierSwap34,
    Chen,
    Bousquet,
    Custom(Vec<RuleKind>),
}

impl RuleSet {
    pub const PRESETS: [(&'static str, RuleSet); 5] = [
        ("guo-niedermeier", RuleSet::GuoNiedermeier),
        ("guo-niedermeier-improved", RuleSet::GuoNiedermeierImproved),
        ("guo-niedermeier-swap34", RuleSet::GuoNiedermeierSwap34),
        ("chen", RuleSet::Chen),
        ("bousquet", RuleSet::Bousquet),
    ];

    /// The rules in priority order
    pub fn rules(&self) -> Vec<RuleKind> {
        use RuleKind::*;

        match self {
            RuleSet::GuoNiedermeier => vec![
                IdleEdge,
                UnitPath,
                DominatedEdge,
                DominatedPath,
                DisjointPaths,
                OverloadedEdge,
                OverloadedCaterpillar,
                OverloadedL3Leaves,
            ],
            RuleSet::GuoNiedermeierImproved => vec![
                IdleEdge,
                UnitPath,
                ImprovedDominatedEdge,
                DominatedPath,
                DisjointPaths,
                OverloadedEdge,
                OverloadedCaterpillar,
                OverloadedL3Leaves,
            ],
            RuleSet::GuoNiedermeierSwap34 => vec![
                IdleEdge,
                UnitPath,
                DominatedPath,
                DominatedEdge,
                DisjointPaths,
                OverloadedEdge,
                OverloadedCaterpillar,
                OverloadedL3Leaves,
            ],
            RuleSet::Chen => vec![
                IdleEdge,
                UnitPath,
                DisjointPaths,
                UniqueDirection,
                DominatedPath,
            ],
            RuleSet::Bousquet => vec![
                UnitPath,
                DisjointPaths,
                UniqueDirectionWithoutLeaves,
                DominatedPath,
                CommonFactor,
            ],
            RuleSet::Custom(rules) => rules.clone(),
        }
    }

    pub fn build_rules(&self) -> Vec<Box<dyn ReductionRule>> {
        self.rules().into_iter().map(RuleKind::build).collect()
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((name, _)) = Self::PRESETS.iter().find(|(_, set)| set == self) {
            return f.write_str(name);
        }
        write!(f, "{}", self.rules().iter().join(","))
    }
}

impl FromStr for RuleSet {
    type Err = KernelError;

    /// Accepts the name of a preset or a comma separated list of rules
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((_, set)) = Self::PRESETS.iter().find(|(name, _)| *name == s) {
            return Ok(set.clone());
        }

        let rules = s
            .split(',')
            .filter(|x| !x.trim().is_empty())
            .map(RuleKind::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if rules.is_empty() {
            return Err(KernelError::InvalidArgument(format!(
                "'{s}' is neither a preset nor a list of rules"
            )));
        }

        Ok(RuleSet::Custom(rules))
    }
}

/// Everything that controls a kernelization run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    pub rule_set: RuleSet,
}

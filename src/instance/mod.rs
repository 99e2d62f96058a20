pub mod demand_pair;

pub use demand_pair::DemandPair;

use crate::{
    errors::{InvariantCheck, KernelError, KernelResult},
    graph::*,
};
use itertools::Itertools;
use rand::Rng;

/// Stable identifier of a demand pair; ids are never reused within one run
pub type PairId = u32;

/// An input instance: a tree, the node pairs to separate and the number of edges we may cut
#[derive(Clone, Debug)]
pub struct MulticutInstance {
    pub tree: Tree,
    pub demand_pairs: Vec<(Node, Node)>,
    pub budget: i64,
}

impl MulticutInstance {
    /// Random tree on `n` nodes drawn via a Prüfer sequence with `pairs` uniform demand pairs
    pub fn random(rng: &mut impl Rng, n: NumNodes, pairs: usize, budget: i64) -> Self {
        let tree = generators::random_prufer_tree(rng, n.max(2));
        let demand_pairs = generators::random_demand_pairs(rng, &tree, pairs);
        Self {
            tree,
            demand_pairs,
            budget,
        }
    }

    /// Random caterpillar on `n` nodes with `pairs` uniform demand pairs
    pub fn random_caterpillar(rng: &mut impl Rng, n: NumNodes, pairs: usize, budget: i64) -> Self {
        let tree = generators::random_caterpillar(rng, n);
        let demand_pairs = generators::random_demand_pairs(rng, &tree, pairs);
        Self {
            tree,
            demand_pairs,
            budget,
        }
    }
}

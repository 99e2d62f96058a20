use super::{
    graph::*,
    instance::MulticutInstance,
    kernelization::{Kernel, KernelConfig, KernelStatus, Kernelizer, RuleKind, RuleSet},
};
use itertools::Itertools;
use rand::Rng;

/// Edges of the tree path between `s` and `t`
pub fn path_edges(tree: &Tree, (s, t): (Node, Node)) -> Vec<Edge> {
    tree.path_between(s, t)
        .unwrap()
        .into_iter()
        .tuple_windows()
        .map(|(u, v)| Edge(u, v).normalized())
        .collect()
}

/// Smallest set of edges hitting every path; exponential in the number of used edges
pub fn brute_force_multicut(paths: &[Vec<Edge>]) -> Vec<Edge> {
    let candidates = paths.iter().flatten().copied().sorted().dedup().collect_vec();

    for size in 0..=candidates.len() {
        for cut in candidates.iter().copied().combinations(size) {
            if paths.iter().all(|p| p.iter().any(|e| cut.contains(e))) {
                return cut;
            }
        }
    }

    unreachable!("cutting all edges separates every pair")
}

pub fn optimum_of(instance: &MulticutInstance) -> usize {
    let paths = instance
        .demand_pairs
        .iter()
        .map(|&pair| path_edges(&instance.tree, pair))
        .collect_vec();
    brute_force_multicut(&paths).len()
}

/// Yields small random instances together with their optimum. Every second instance
/// gets a budget one below the optimum, all others a budget equal to it.
pub fn generate_random_instance_stream(
    rng: &mut impl Rng,
    n: NumNodes,
) -> impl Iterator<Item = (MulticutInstance, usize)> + '_ {
    (0..).map(move |i: usize| {
        let pairs = rng.gen_range(1..=n as usize);
        let mut instance = if i % 3 == 2 {
            MulticutInstance::random_caterpillar(rng, n, pairs, 0)
        } else {
            MulticutInstance::random(rng, n, pairs, 0)
        };

        let opt = optimum_of(&instance);
        instance.budget = opt as i64 - (i % 2) as i64;
        (instance, opt)
    })
}

/// Checks everything a kernel has to satisfy w.r.t. the input `instance` with optimum `opt`
pub fn assert_kernel_is_sound(instance: &MulticutInstance, opt: usize, kernel: &Kernel) {
    let budget = instance.budget as usize;
    let context = || {
        format!(
            "tree: {:?}, pairs: {:?}, k: {budget}, opt: {opt}, status: {:?}, solution: {:?}",
            instance.tree, instance.demand_pairs, kernel.status, kernel.solution
        )
    };

    assert!(kernel.solution.iter().all_unique(), "{}", context());
    assert!(
        kernel
            .solution
            .iter()
            .all(|e| instance.tree.has_edge_between(*e)),
        "{}",
        context()
    );

    for pair in &kernel.demand_pairs {
        assert_eq!(
            pair.path(),
            kernel
                .tree
                .path_between(pair.node1(), pair.node2())
                .unwrap()
                .as_slice(),
            "{}",
            context()
        );
    }

    if kernel.status == KernelStatus::Unsolvable {
        assert!(opt > budget, "{}", context());
        return;
    }

    assert!(kernel.solution.len() <= budget, "{}", context());

    let remaining = kernel
        .demand_pairs
        .iter()
        .map(|p| p.edges().collect_vec())
        .collect_vec();
    let total = kernel.solution.len() + brute_force_multicut(&remaining).len();

    if opt <= budget {
        assert_eq!(total, opt, "{}", context());
    } else {
        assert!(total > budget, "{}", context());
    }

    if kernel.status == KernelStatus::Solved {
        assert!(kernel.demand_pairs.is_empty());
        assert_eq!(kernel.tree.number_of_nodes(), 1, "{}", context());
        for &pair in &instance.demand_pairs {
            let path = path_edges(&instance.tree, pair);
            assert!(
                path.iter().any(|e| kernel.solution.contains(e)),
                "pair {pair:?} not separated; {}",
                context()
            );
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SoundnessStats {
    /// Number of times the last rule of the list fired
    pub applications_of_last_rule: usize,
    pub unsolvable: usize,
}

/// Kernelizes `attempts` random instances with `rules` and checks every kernel against
/// brute force
pub fn test_rules_are_sound(
    rng: &mut impl Rng,
    rules: &[RuleKind],
    nodes: NumNodes,
    attempts: usize,
) -> SoundnessStats {
    let config = KernelConfig {
        rule_set: RuleSet::Custom(rules.to_vec()),
    };
    test_rule_set_is_sound(rng, &config, nodes, attempts)
}

pub fn test_rule_set_is_sound(
    rng: &mut impl Rng,
    config: &KernelConfig,
    nodes: NumNodes,
    attempts: usize,
) -> SoundnessStats {
    let mut stats = SoundnessStats::default();

    for (instance, opt) in generate_random_instance_stream(rng, nodes).take(attempts) {
        let kernel = Kernelizer::from_config(
            instance.tree.clone(),
            &instance.demand_pairs,
            instance.budget,
            config,
        )
        .unwrap()
        .run()
        .unwrap();

        assert_kernel_is_sound(&instance, opt, &kernel);

        stats.applications_of_last_rule += kernel.rule_applications.last().map_or(0, |x| x.1);
        stats.unsolvable += (kernel.status == KernelStatus::Unsolvable) as usize;
    }

    stats
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn brute_force() {
        //  0 - 1 - 2
        //      |
        //      3
        let tree = Tree::test_only_from([(0, 1), (1, 2), (1, 3)]);
        let paths = [(0, 2), (2, 3), (3, 0)].map(|p| path_edges(&tree, p));
        assert_eq!(brute_force_multicut(&paths).len(), 2);
        assert_eq!(brute_force_multicut(&paths[..1]).len(), 1);
        assert!(brute_force_multicut(&[]).is_empty());
    }

    #[test]
    fn presets_are_sound() {
        let mut rng = Pcg64::seed_from_u64(0x5eed);
        for (name, rule_set) in RuleSet::PRESETS {
            let config = KernelConfig { rule_set };
            for n in [4, 7, 10] {
                let stats = test_rule_set_is_sound(&mut rng, &config, n, 100);
                assert!(stats.unsolvable > 0, "{name} never proved infeasibility");
            }
        }
    }

    fn single_rule(kind: RuleKind, seed: u64) -> SoundnessStats {
        let mut rng = Pcg64::seed_from_u64(seed);
        let mut stats = SoundnessStats::default();
        for n in [5, 8, 11] {
            let new = test_rules_are_sound(&mut rng, &[kind], n, 100);
            stats.applications_of_last_rule += new.applications_of_last_rule;
            stats.unsolvable += new.unsolvable;
        }
        stats
    }

    #[test]
    fn frequent_rules_are_sound() {
        for (i, kind) in [
            RuleKind::UnitPath,
            RuleKind::IdleEdge,
            RuleKind::DominatedEdge,
            RuleKind::ImprovedDominatedEdge,
            RuleKind::DominatedPath,
            RuleKind::UniqueDirection,
            RuleKind::UniqueDirectionWithoutLeaves,
        ]
        .into_iter()
        .enumerate()
        {
            let stats = single_rule(kind, 0x1000 + i as u64);
            assert!(stats.applications_of_last_rule > 0, "{kind} never fired");
        }
    }

    /// Kernelizes a hand-built instance with `rules`, checks the kernel against brute
    /// force and returns how often the last rule fired
    fn applications_on(
        rules: &[RuleKind],
        edges: &[(Node, Node)],
        pairs: &[(Node, Node)],
        budget: i64,
    ) -> usize {
        let instance = MulticutInstance {
            tree: Tree::test_only_from(edges.iter().copied()),
            demand_pairs: pairs.to_vec(),
            budget,
        };
        let opt = optimum_of(&instance);
        let config = KernelConfig {
            rule_set: RuleSet::Custom(rules.to_vec()),
        };

        let kernel = Kernelizer::from_config(
            instance.tree.clone(),
            &instance.demand_pairs,
            instance.budget,
            &config,
        )
        .unwrap()
        .run()
        .unwrap();

        assert_kernel_is_sound(&instance, opt, &kernel);
        kernel.rule_applications.last().map_or(0, |x| x.1)
    }

    //  5   6   7   8   9
    //  |   |   |   |   |
    //  0 - 1 - 2 - 3 - 4
    const COMB: [(Node, Node); 9] = [
        (0, 1),
        (1, 2),
        (2, 3),
        (3, 4),
        (0, 5),
        (1, 6),
        (2, 7),
        (3, 8),
        (4, 9),
    ];

    #[test]
    fn budget_rules_are_sound() {
        let stats = single_rule(RuleKind::DisjointPaths, 0x2000);
        assert!(stats.unsolvable > 0);

        //      1   2
        //      |   |
        //  5 - 0 - 3 - 4
        //      |
        //      6 - 7
        let edges = [(0, 1), (3, 2), (0, 5), (0, 3), (3, 4), (0, 6), (6, 7)];
        let kind = RuleKind::OverloadedEdge;
        let fired = applications_on(&[kind], &edges, &[(1, 3), (5, 3), (0, 2), (0, 4), (6, 3)], 4)
            + applications_on(&[kind], &edges, &[(1, 3), (3, 1), (5, 3)], 1)
            + single_rule(kind, 0x2001).applications_of_last_rule;
        assert!(fired > 0, "{kind} never fired");

        //    3   4
        //     \ /
        //  1 - 0 - 2
        //     / \
        //    5   6
        let star = [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5), (0, 6)];
        let kind = RuleKind::CommonFactor;
        let fired = applications_on(&[kind], &star, &[(1, 2), (1, 3), (2, 4)], 1)
            + applications_on(&[kind], &star, &[(1, 2), (3, 4), (5, 6)], 1)
            + single_rule(kind, 0x2002).applications_of_last_rule;
        assert!(fired > 0, "{kind} never fired");
    }

    #[test]
    fn caterpillar_rules_are_sound() {
        //  4 - 0 - 1 - 2 - 3 - 9
        //          |   |   |
        //          5   6   7 - 8
        let edges = [
            (4, 0),
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 9),
            (1, 5),
            (2, 6),
            (3, 7),
            (7, 8),
        ];
        let caterpillar = [RuleKind::OverloadedCaterpillar];
        let mut fired = applications_on(&caterpillar, &edges, &[(4, 5), (4, 6), (9, 4)], 2)
            + applications_on(&caterpillar, &edges, &[(4, 5), (4, 6), (9, 4)], 1);

        //  7 - 1       4
        //       \     /
        //  8 - 2 - 0 - 5
        //       /     \
        //  9 - 3       6
        let edges = [
            (0, 1),
            (0, 2),
            (0, 3),
            (0, 4),
            (0, 5),
            (0, 6),
            (1, 7),
            (2, 8),
            (3, 9),
        ];
        let l3_leaves = [RuleKind::OverloadedL3Leaves];
        let mut fired_l3 = applications_on(&l3_leaves, &edges, &[(7, 4), (5, 7), (7, 6)], 2);

        // both rules expect an instance without dominated paths
        let mut rng = Pcg64::seed_from_u64(0x3000);
        for n in [6, 9, 12] {
            let rules = [RuleKind::DominatedPath, RuleKind::OverloadedCaterpillar];
            fired += test_rules_are_sound(&mut rng, &rules, n, 100).applications_of_last_rule;

            let rules = [RuleKind::DominatedPath, RuleKind::OverloadedL3Leaves];
            fired_l3 += test_rules_are_sound(&mut rng, &rules, n, 100).applications_of_last_rule;
        }

        assert!(fired > 0, "overloaded-caterpillar never fired");
        assert!(fired_l3 > 0, "overloaded-l3-leaves never fired");
    }

    #[test]
    fn wingspan_rules_are_sound() {
        let kind = RuleKind::BidimensionalDominatingWingspan;
        assert_eq!(applications_on(&[kind], &COMB, &[(7, 6), (7, 8), (1, 3)], 1), 1);
        assert_eq!(
            applications_on(&[kind], &COMB, &[(7, 6), (7, 8), (1, 3), (6, 2)], 2),
            1
        );

        let kind = RuleKind::GeneralisedDominatingWingspan;
        assert_eq!(applications_on(&[kind], &COMB, &[(7, 5), (7, 9), (0, 8)], 1), 1);

        // 0 becomes an I3 node with the branches 10 - 11 and 12 - 13
        let mut edges = COMB.to_vec();
        edges.extend([(0, 10), (10, 11), (0, 12), (12, 13)]);
        assert_eq!(
            applications_on(&[kind], &edges, &[(7, 11), (7, 9), (0, 8), (5, 4)], 2),
            1
        );

        let mut rng = Pcg64::seed_from_u64(0x4000);
        for kind in [
            RuleKind::BidimensionalDominatingWingspan,
            RuleKind::GeneralisedDominatingWingspan,
        ] {
            for n in [6, 9, 12] {
                test_rules_are_sound(&mut rng, &[kind], n, 100);
            }
        }
    }
}

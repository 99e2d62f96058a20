//! Random instance generators. All of them take the random source explicitly,
//! so a run is reproducible from its seed.

use super::*;
use itertools::Itertools;
use rand::{Rng, seq::SliceRandom};
use rand_distr::{Beta, Distribution};

/// Returns the edges of the tree encoded by the Prüfer sequence `prufer` on `prufer.len() + 2` nodes.
pub fn edges_from_prufer_sequence(prufer: &[Node]) -> Vec<Edge> {
    let n = prufer.len() + 2;
    let mut degree = vec![1u32; n];
    for &u in prufer {
        degree[u as usize] += 1;
    }

    let mut edges = Vec::with_capacity(n - 1);
    for &u in prufer {
        // smallest remaining leaf; quadratic, which is fine for generator sizes
        let leaf = (0..n).find(|&v| degree[v] == 1).unwrap_or(0);
        edges.push(Edge(leaf as Node, u));
        degree[leaf] -= 1;
        degree[u as usize] -= 1;
    }

    let (a, b) = (0..n)
        .filter(|&v| degree[v] == 1)
        .map(|v| v as Node)
        .collect_tuple()
        .unwrap_or((0, 1));
    edges.push(Edge(a, b));

    edges
}

/// Samples a uniform random labeled tree on `n` nodes through a random Prüfer sequence
pub fn random_prufer_tree(rng: &mut impl Rng, n: NumNodes) -> Tree {
    let edges = match n {
        0 | 1 => Vec::new(),
        2 => vec![Edge(0, 1)],
        _ => {
            let prufer = (0..n - 2).map(|_| rng.gen_range(0..n)).collect_vec();
            edges_from_prufer_sequence(&prufer)
        }
    };

    let mut tree = Tree::new(n);
    for Edge(u, v) in edges {
        // cannot fail: Prüfer sequences encode trees
        let _ = tree.add_edge(u, v);
    }
    tree
}

/// Samples a caterpillar on `n >= 4` nodes: a backbone of internal nodes between two
/// I1 nodes (each with one leaf), with all remaining nodes attached as leaves to uniformly
/// random backbone nodes. The number of I2 backbone nodes is drawn from a Beta(2, 8)
/// distribution scaled to the available nodes.
pub fn random_caterpillar(rng: &mut impl Rng, n: NumNodes) -> Tree {
    let n = n.max(4);
    let inner = match Beta::new(2.0, 8.0) {
        Ok(beta) => (beta.sample(rng) * (n - 4) as f64).round() as NumNodes,
        Err(_) => 0,
    };
    let free_leaves = n - 4 - inner;

    let mut tree = Tree::new(n);
    let mut backbone = vec![0];
    for u in 2..2 + inner {
        backbone.push(u);
    }
    backbone.push(1);

    let mut edges = backbone.iter().copied().tuple_windows().collect_vec();
    edges.push((0, 2 + inner));
    edges.push((1, 3 + inner));
    for leaf in 4 + inner..4 + inner + free_leaves {
        let attach_to = *backbone.choose(rng).unwrap_or(&0);
        edges.push((attach_to, leaf));
    }

    for (u, v) in edges {
        let _ = tree.add_edge(u, v);
    }
    tree
}

/// Draws `count` demand pairs with two distinct, uniformly random endpoints
pub fn random_demand_pairs(rng: &mut impl Rng, tree: &Tree, count: usize) -> Vec<(Node, Node)> {
    let nodes = tree.nodes().collect_vec();
    if nodes.len() < 2 {
        return Vec::new();
    }

    (0..count)
        .map(|_| {
            let i = rng.gen_range(0..nodes.len());
            let mut j = rng.gen_range(0..nodes.len() - 1);
            if j >= i {
                j += 1;
            }
            (nodes[i], nodes[j])
        })
        .collect()
}

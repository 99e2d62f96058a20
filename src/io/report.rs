use std::io::Write;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::InstanceDescription;
use crate::{
    graph::*,
    kernelization::{Kernel, KernelStatus},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleApplications {
    pub rule: String,
    pub applications: usize,
}

/// Summary of a kernelization run as written by the `kernelize` binary.
///
/// The kernel's nodes are relabeled to `0..n'`; `kernel_node_ids[i]` is the id the
/// i-th kernel node had in the input tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelReport {
    pub status: KernelStatus,
    pub solvable: bool,
    pub budget: i64,
    /// Edges of the input tree that have been cut
    pub solution: Vec<Edge>,
    pub kernel: InstanceDescription,
    pub kernel_node_ids: Vec<Node>,
    pub rule_applications: Vec<RuleApplications>,
}

impl KernelReport {
    pub fn new(kernel: &Kernel, budget: i64) -> Self {
        let kernel_node_ids = kernel.tree.nodes().collect_vec();

        let mut new_id = vec![0; kernel.tree.vertices_range().end as usize];
        for (i, &u) in kernel_node_ids.iter().enumerate() {
            new_id[u as usize] = i as Node;
        }
        let relabel = |u: Node| new_id[u as usize];

        let description = InstanceDescription {
            nodes: kernel_node_ids.len() as NumNodes,
            edges: kernel
                .tree
                .edges()
                .map(|Edge(u, v)| Edge(relabel(u), relabel(v)).normalized())
                .sorted()
                .collect(),
            demand_pairs: kernel
                .demand_pairs
                .iter()
                .map(|p| (relabel(p.node1()), relabel(p.node2())))
                .collect(),
            budget: budget - kernel.solution.len() as i64,
        };

        Self {
            status: kernel.status,
            solvable: kernel.solvable,
            budget,
            solution: kernel.solution.clone(),
            kernel: description,
            kernel_node_ids,
            rule_applications: kernel
                .rule_applications
                .iter()
                .map(|&(rule, applications)| RuleApplications {
                    rule: rule.to_string(),
                    applications,
                })
                .collect(),
        }
    }

    pub fn try_write_json<W: Write>(&self, writer: W) -> std::io::Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

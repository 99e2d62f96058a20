use super::*;
use serde::Serialize;

/// Structural classification of a node, used to recognise caterpillars.
///
/// An internal node is `I1`, `I2` or `I3` if it has at most one, exactly two or
/// more than two internal neighbours. A leaf inherits the class of its parent
/// (`L1`, `L2`, `L3`). Isolated nodes and both nodes of a single-edge tree are `Other`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
pub enum NodeRole {
    I1,
    I2,
    I3,
    L1,
    L2,
    L3,
    Other,
}

impl NodeRole {
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeRole::L1 | NodeRole::L2 | NodeRole::L3)
    }

    pub fn is_internal(self) -> bool {
        matches!(self, NodeRole::I1 | NodeRole::I2 | NodeRole::I3)
    }

    /// Nodes of this role are part of a caterpillar component
    pub fn is_caterpillar_member(self) -> bool {
        matches!(self, NodeRole::I2 | NodeRole::L2)
    }

    fn of_internal(internal_neighbors: usize) -> Self {
        match internal_neighbors {
            0 | 1 => NodeRole::I1,
            2 => NodeRole::I2,
            _ => NodeRole::I3,
        }
    }

    fn of_leaf_with_parent(parent: NodeRole) -> Self {
        match parent {
            NodeRole::I1 => NodeRole::L1,
            NodeRole::I2 => NodeRole::L2,
            NodeRole::I3 => NodeRole::L3,
            _ => NodeRole::Other,
        }
    }
}

pub type CaterpillarId = u32;

/// Caterpillar component of every node of a tree; `None` for nodes that are neither `I2` nor `L2`.
#[derive(Clone, Debug, Default)]
pub struct CaterpillarComponents {
    component: Vec<Option<CaterpillarId>>,
    number_of_components: CaterpillarId,
}

impl CaterpillarComponents {
    pub fn component_of(&self, u: Node) -> Option<CaterpillarId> {
        self.component.get(u as usize).copied().flatten()
    }

    pub fn number_of_components(&self) -> CaterpillarId {
        self.number_of_components
    }
}

impl Tree {
    fn internal_role_of(&self, u: Node) -> NodeRole {
        NodeRole::of_internal(
            self.neighbors_of(u)
                .iter()
                .filter(|&&v| self.is_internal(v))
                .count(),
        )
    }

    /// Computes the role of a single node in time linear in the degree of it (or of its parent)
    pub fn role_of(&self, u: Node) -> NodeRole {
        match self.neighbors_of(u) {
            [] => NodeRole::Other,
            &[parent] if self.is_leaf(parent) => NodeRole::Other,
            &[parent] => NodeRole::of_leaf_with_parent(self.internal_role_of(parent)),
            _ => self.internal_role_of(u),
        }
    }

    /// Computes the roles of all nodes in linear time; retired nodes are `Other`
    pub fn roles(&self) -> Vec<NodeRole> {
        let mut roles = vec![NodeRole::Other; self.vertices_range().end as usize];

        for u in self.nodes().filter(|&u| self.is_internal(u)) {
            roles[u as usize] = self.internal_role_of(u);
        }

        for u in self.nodes().filter(|&u| self.is_leaf(u)) {
            let parent = self.neighbors_of(u)[0];
            roles[u as usize] = NodeRole::of_leaf_with_parent(roles[parent as usize]);
        }

        roles
    }

    /// Labels the caterpillar components by a single depth-first search. Stepping from
    /// an `I1` or `I3` node into an `I2`/`L2` node opens a new component; every other
    /// step into an `I2`/`L2` node stays in the current one.
    pub fn caterpillar_components(&self) -> CaterpillarComponents {
        let roles = self.roles();
        let mut component = vec![None; roles.len()];
        let mut number_of_components = 0;

        let Some(root) = self.nodes().next() else {
            return CaterpillarComponents::default();
        };

        if roles[root as usize].is_caterpillar_member() {
            component[root as usize] = Some(number_of_components);
            number_of_components += 1;
        }

        for (pred, u) in self.dfs(root) {
            if pred == u || !roles[u as usize].is_caterpillar_member() {
                continue;
            }

            component[u as usize] = match roles[pred as usize] {
                NodeRole::I1 | NodeRole::I3 => {
                    number_of_components += 1;
                    Some(number_of_components - 1)
                }
                _ => component[pred as usize],
            };
        }

        CaterpillarComponents {
            component,
            number_of_components,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::generators::random_prufer_tree;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    //  4 - 0 - 1 - 2 - 3 - 9
    //          |   |   |
    //          5   6   7 - 8
    fn caterpillar_tree() -> Tree {
        Tree::test_only_from([
            (4, 0),
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 9),
            (1, 5),
            (2, 6),
            (3, 7),
            (7, 8),
        ])
    }

    #[test]
    fn roles() {
        let tree = caterpillar_tree();
        let roles = tree.roles();

        use NodeRole::*;
        assert_eq!(roles, vec![I1, I2, I2, I2, L1, L2, L2, I1, L1, L2]);

        for u in tree.nodes() {
            assert_eq!(tree.role_of(u), roles[u as usize]);
        }
    }

    #[test]
    fn roles_of_tiny_trees() {
        let tree = Tree::from_edges(1, Vec::<(Node, Node)>::new()).unwrap();
        assert_eq!(tree.role_of(0), NodeRole::Other);

        let tree = Tree::test_only_from([(0, 1)]);
        assert_eq!(tree.roles(), vec![NodeRole::Other, NodeRole::Other]);

        let tree = Tree::test_only_from([(0, 1), (0, 2)]);
        assert_eq!(tree.roles(), vec![NodeRole::I1, NodeRole::L1, NodeRole::L1]);
    }

    #[test]
    fn caterpillar_components() {
        let tree = caterpillar_tree();
        let comps = tree.caterpillar_components();

        // the I2 backbone 1, 2, 3 and its leaves 5, 6, 9 form one caterpillar
        let c = comps.component_of(1);
        assert!(c.is_some());
        for u in [2, 3, 5, 6, 9] {
            assert_eq!(comps.component_of(u), c);
        }
        for u in [0, 4, 7, 8] {
            assert_eq!(comps.component_of(u), None);
        }
        assert_eq!(comps.number_of_components(), 1);
    }

    #[test]
    fn caterpillars_are_separated_by_i3_nodes() {
        //  7 - 4 - 1 - 0 - 2 - 5 - 8
        //          |   |
        //         10   3 - 6 - 9
        let tree = Tree::test_only_from([
            (0, 1),
            (0, 2),
            (0, 3),
            (1, 4),
            (2, 5),
            (3, 6),
            (4, 7),
            (5, 8),
            (6, 9),
            (1, 10),
        ]);
        assert_eq!(tree.role_of(0), NodeRole::I3);
        assert_eq!(tree.role_of(10), NodeRole::L2);

        let comps = tree.caterpillar_components();
        assert_eq!(comps.number_of_components(), 3);
        for u in [0, 4, 5, 6, 7, 8, 9] {
            assert_eq!(comps.component_of(u), None);
        }
        for u in [1, 2, 3] {
            assert!(comps.component_of(u).is_some());
        }
        assert_eq!(comps.component_of(1), comps.component_of(10));
        assert_ne!(comps.component_of(1), comps.component_of(2));
        assert_ne!(comps.component_of(1), comps.component_of(3));
        assert_ne!(comps.component_of(2), comps.component_of(3));
    }

    #[test]
    fn caterpillar_members_have_matching_roles() {
        let mut rng = Pcg64::seed_from_u64(4711);
        for _ in 0..30 {
            let tree = random_prufer_tree(&mut rng, 30);
            let roles = tree.roles();
            let comps = tree.caterpillar_components();

            for u in tree.nodes() {
                assert_eq!(
                    comps.component_of(u).is_some(),
                    roles[u as usize].is_caterpillar_member()
                );
            }

            // adjacent caterpillar members share their component
            for Edge(u, v) in tree.edges() {
                if let (Some(a), Some(b)) = (comps.component_of(u), comps.component_of(v)) {
                    assert_eq!(a, b);
                }
            }
        }
    }
}

use super::*;
use std::collections::VecDeque;

/// A visited node together with the neighbour it was reached from. The root of a walk
/// is its own parent.
pub type ParentOfNode = (Node, Node);

/// Frontier of a walk; a queue yields BFS order, a stack DFS order
pub trait Frontier {
    fn init(item: ParentOfNode) -> Self;
    fn push(&mut self, item: ParentOfNode);
    fn pop(&mut self) -> Option<ParentOfNode>;
    fn clear(&mut self);
}

impl Frontier for VecDeque<ParentOfNode> {
    fn init(item: ParentOfNode) -> Self {
        Self::from(vec![item])
    }
    fn push(&mut self, item: ParentOfNode) {
        self.push_back(item)
    }
    fn pop(&mut self) -> Option<ParentOfNode> {
        self.pop_front()
    }
    fn clear(&mut self) {
        VecDeque::clear(self)
    }
}

impl Frontier for Vec<ParentOfNode> {
    fn init(item: ParentOfNode) -> Self {
        vec![item]
    }
    fn push(&mut self, item: ParentOfNode) {
        self.push(item)
    }
    fn pop(&mut self) -> Option<ParentOfNode> {
        self.pop()
    }
    fn clear(&mut self) {
        Vec::clear(self)
    }
}

/// Walks the tree away from a root. Nodes are marked when pushed, so the walk also
/// terminates on a corrupted tree with a cycle.
pub struct TreeWalk<'a, F: Frontier> {
    tree: &'a Tree,
    root: Node,
    visited: Vec<bool>,
    frontier: F,
    stop_at: Option<Node>,
}

pub type Bfs<'a> = TreeWalk<'a, VecDeque<ParentOfNode>>;
pub type Dfs<'a> = TreeWalk<'a, Vec<ParentOfNode>>;

impl<'a, F: Frontier> TreeWalk<'a, F> {
    fn new(tree: &'a Tree, root: Node) -> Self {
        let mut visited = vec![false; tree.vertices_range().end as usize];
        visited[root as usize] = true;
        Self {
            tree,
            root,
            visited,
            frontier: F::init((root, root)),
            stop_at: None,
        }
    }

    /// Ends the walk once `stopper` is returned
    pub fn stop_at(mut self, stopper: Node) -> Self {
        self.stop_at = Some(stopper);
        self
    }

    /// Consumes the walk into a parent array indexed by node; nodes that were not
    /// reached keep themselves as parent
    pub fn parent_array(self) -> Vec<Node> {
        let mut parents: Vec<_> = self.tree.vertices_range().collect();
        for (p, u) in self {
            parents[u as usize] = p;
        }
        parents
    }

    /// Nodes on the path from the root of the walk to `target`, both included
    pub fn path_to(self, target: Node) -> Option<Vec<Node>> {
        let root = self.root;
        let parents = self.stop_at(target).parent_array();

        let mut path = vec![target];
        let mut current = target;
        while let Some(&p) = parents.get(current as usize).filter(|&&p| p != current) {
            path.push(p);
            current = p;
        }
        path.reverse();

        // unreached nodes are their own parents
        (current == root).then_some(path)
    }
}

impl<'a, F: Frontier> Iterator for TreeWalk<'a, F> {
    type Item = ParentOfNode;

    fn next(&mut self) -> Option<Self::Item> {
        let (p, u) = self.frontier.pop()?;

        if self.stop_at == Some(u) {
            self.frontier.clear();
        } else {
            for &v in self.tree.neighbors_of(u) {
                if !self.visited[v as usize] {
                    self.visited[v as usize] = true;
                    self.frontier.push((u, v));
                }
            }
        }

        Some((p, u))
    }
}

impl Tree {
    /// Visits the nodes reachable from `root` in breadth-first order
    pub fn bfs(&self, root: Node) -> Bfs<'_> {
        Bfs::new(self, root)
    }

    /// Visits the nodes reachable from `root` in preorder; every subtree is a
    /// contiguous block of the walk
    pub fn dfs(&self, root: Node) -> Dfs<'_> {
        Dfs::new(self, root)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use itertools::Itertools;

    //       1
    //     /   \
    //    0     2 - 4
    //    |
    //    3
    fn tree() -> Tree {
        Tree::test_only_from([(1, 0), (1, 2), (0, 3), (2, 4)])
    }

    #[test]
    fn bfs_order() {
        let order = tree().bfs(1).map(|(_, u)| u).collect_vec();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], 1);
        assert_eq!(order[1..3].iter().copied().sorted().collect_vec(), vec![0, 2]);
        assert_eq!(order[3..].iter().copied().sorted().collect_vec(), vec![3, 4]);
    }

    #[test]
    fn dfs_parents() {
        let edges = tree().dfs(3).sorted_by_key(|&(_, u)| u).collect_vec();
        assert_eq!(edges, vec![(3, 0), (0, 1), (1, 2), (3, 3), (2, 4)]);
    }

    #[test]
    fn stopper() {
        //  3 - 0 - 1 - 2
        let tree = Tree::test_only_from([(0, 1), (1, 2), (0, 3)]);
        let order = tree.dfs(1).map(|(_, u)| u).collect_vec();
        assert_eq!(order, vec![1, 2, 0, 3]);

        let order = tree.bfs(1).stop_at(0).map(|(_, u)| u).collect_vec();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn parents_and_paths() {
        assert_eq!(tree().bfs(1).parent_array(), vec![1, 1, 1, 0, 2]);

        assert_eq!(tree().bfs(3).path_to(4), Some(vec![3, 0, 1, 2, 4]));
        assert_eq!(tree().dfs(2).path_to(0), Some(vec![2, 1, 0]));
        assert_eq!(tree().bfs(4).path_to(4), Some(vec![4]));

        // 5 lies in another component
        let mut forest = tree();
        let u = forest.add_node();
        assert_eq!(u, 5);
        assert_eq!(forest.bfs(1).path_to(u), None);
    }
}

use crate::{
    errors::{InvariantCheck, KernelError, KernelResult},
    graph::*,
    instance::{DemandPair, PairId},
    reduction::delta::*,
};
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use log::debug;

/// The instance under reduction: tree, demand pairs with their indices, the partial
/// solution and the budget.
///
/// Reduction rules read everything through accessors and change the instance only
/// through the mutation primitives ([`KernelState::cut_edges`],
/// [`KernelState::contract_edges`], [`KernelState::remove_demand_pairs`] and
/// [`KernelState::change_endpoints_of_demand_pairs`]). Each primitive validates all of
/// its arguments before it touches anything and records what it changed in a
/// [`RuleDelta`] that the orchestrator hands on to the rules.
#[derive(Clone)]
pub struct KernelState {
    tree: Tree,
    pairs: Vec<Option<DemandPair>>,
    number_of_pairs: usize,
    pairs_on_edge: FxHashMap<Edge, FxHashSet<PairId>>,
    pairs_at_node: Vec<FxHashSet<PairId>>,
    solution: Vec<Edge>,
    origin: FxHashMap<Edge, Edge>,
    budget: usize,
    caterpillars: Option<CaterpillarComponents>,
    delta: RuleDelta,
}

impl KernelState {
    /// Builds the state; the i-th demand pair receives id `i`
    pub fn new(tree: Tree, demand_pairs: &[(Node, Node)], budget: usize) -> KernelResult<Self> {
        tree.is_correct()
            .map_err(|e| KernelError::InvalidArgument(format!("input is not a tree: {e}")))?;

        let mut pairs = Vec::with_capacity(demand_pairs.len());
        for (id, &(s, t)) in demand_pairs.iter().enumerate() {
            let pair = DemandPair::new(id as PairId, s, t, &tree).map_err(|e| {
                KernelError::InvalidArgument(format!("demand pair {id} ({s}, {t}) is invalid: {e}"))
            })?;
            pairs.push(Some(pair));
        }

        let mut pairs_on_edge: FxHashMap<Edge, FxHashSet<PairId>> = FxHashMap::default();
        let mut pairs_at_node = vec![FxHashSet::default(); tree.vertices_range().end as usize];
        for pair in pairs.iter().flatten() {
            for e in pair.edges() {
                pairs_on_edge.entry(e).or_default().insert(pair.id());
            }
            pairs_at_node[pair.node1() as usize].insert(pair.id());
            pairs_at_node[pair.node2() as usize].insert(pair.id());
        }

        let origin = tree.edges().map(|e| (e, e)).collect();

        Ok(Self {
            number_of_pairs: pairs.len(),
            tree,
            pairs,
            pairs_on_edge,
            pairs_at_node,
            solution: Vec::new(),
            origin,
            budget,
            caterpillars: None,
            delta: RuleDelta::default(),
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn pair(&self, id: PairId) -> Option<&DemandPair> {
        self.pairs.get(id as usize).and_then(|p| p.as_ref())
    }

    /// Iterates over the remaining demand pairs in id order
    pub fn pairs(&self) -> impl Iterator<Item = &DemandPair> + '_ {
        self.pairs.iter().flatten()
    }

    pub fn number_of_pairs(&self) -> usize {
        self.number_of_pairs
    }

    /// Ids of the demand pairs whose path contains `edge`, in ascending order
    pub fn pairs_on_edge(&self, edge: Edge) -> Vec<PairId> {
        self.pairs_on_edge
            .get(&edge.normalized())
            .map_or_else(Vec::new, |set| set.iter().copied().sorted().collect())
    }

    pub fn number_of_pairs_on_edge(&self, edge: Edge) -> usize {
        self.pairs_on_edge
            .get(&edge.normalized())
            .map_or(0, |set| set.len())
    }

    pub fn edge_has_pair(&self, edge: Edge, id: PairId) -> bool {
        self.pairs_on_edge
            .get(&edge.normalized())
            .is_some_and(|set| set.contains(&id))
    }

    /// Ids of the demand pairs with an endpoint in `u`, in ascending order
    pub fn pairs_at_node(&self, u: Node) -> Vec<PairId> {
        self.pairs_at_node
            .get(u as usize)
            .map_or_else(Vec::new, |set| set.iter().copied().sorted().collect())
    }

    pub fn number_of_pairs_at_node(&self, u: Node) -> usize {
        self.pairs_at_node.get(u as usize).map_or(0, |set| set.len())
    }

    /// The cut edges so far, as edges of the input tree
    pub fn solution(&self) -> &[Edge] {
        &self.solution
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// The number of edges that may still be cut (k')
    pub fn remaining_budget(&self) -> usize {
        self.budget.saturating_sub(self.solution.len())
    }

    /// Maps an edge of the working tree onto the input edge it descends from
    pub fn input_edge_of(&self, edge: Edge) -> Option<Edge> {
        self.origin.get(&edge.normalized()).copied()
    }

    /// Caterpillar components of the current tree; computed lazily and cached until
    /// the next contraction
    pub fn caterpillar_components(&mut self) -> &CaterpillarComponents {
        self.caterpillars
            .get_or_insert_with(|| self.tree.caterpillar_components())
    }

    /// Returns everything that changed since the last call
    pub fn take_delta(&mut self) -> RuleDelta {
        std::mem::take(&mut self.delta)
    }

    pub(crate) fn into_parts(self) -> (Tree, Vec<Edge>, Vec<DemandPair>) {
        let pairs = self.pairs.into_iter().flatten().collect();
        (self.tree, self.solution, pairs)
    }

    ////////////////////////////////////////////////////////////////////////////////// Validation

    fn existing_edge(&self, edge: Edge) -> KernelResult<Edge> {
        let edge = edge.normalized();
        if edge.is_loop() || !self.tree.has_edge_between(edge) {
            return Err(KernelError::EdgeNotInTree(edge));
        }
        Ok(edge)
    }

    fn existing_pair(&self, id: PairId) -> KernelResult<&DemandPair> {
        self.pair(id).ok_or(KernelError::UnknownDemandPair(id))
    }

    ////////////////////////////////////////////////////////////////////////////////// Mutations

    /// Adds `edges` to the solution, removes all demand pairs using them and contracts them.
    pub fn cut_edges(&mut self, edges: &[Edge]) -> KernelResult<()> {
        let edges = edges
            .iter()
            .map(|&e| self.existing_edge(e))
            .collect::<KernelResult<Vec<_>>>()?;

        for edge in edges.into_iter().unique() {
            // an earlier contraction of this batch may have renamed an endpoint
            let Some(edge) = self.tree.resolve_edge(edge) else {
                continue;
            };

            let input_edge = self.origin.get(&edge).copied().unwrap_or(edge);
            self.solution.push(input_edge);
            debug!("cut {edge} (input edge {input_edge})");

            let separated = self.pairs_on_edge(edge);
            for id in separated {
                self.remove_pair(id);
            }
            self.contract(edge)?;
        }

        Ok(())
    }

    /// Contracts `edges`. Fails without changing anything if an edge is missing or if the
    /// contractions would shrink the path of some demand pair to a single node.
    pub fn contract_edges(&mut self, edges: &[Edge]) -> KernelResult<()> {
        let edges = edges
            .iter()
            .map(|&e| self.existing_edge(e))
            .collect::<KernelResult<Vec<_>>>()?
            .into_iter()
            .unique()
            .collect_vec();

        let mut covered: FxHashMap<PairId, usize> = FxHashMap::default();
        for &edge in &edges {
            for id in self.pairs_on_edge(edge) {
                *covered.entry(id).or_default() += 1;
            }
        }
        for (&id, &count) in covered.iter().sorted() {
            if self.pair(id).is_some_and(|p| p.length() <= count) {
                return Err(KernelError::DegeneratePath { pair: id });
            }
        }

        for edge in edges {
            if let Some(edge) = self.tree.resolve_edge(edge) {
                self.contract(edge)?;
            }
        }

        Ok(())
    }

    /// Removes the demand pairs `ids`; fails without changing anything if one is unknown
    pub fn remove_demand_pairs(&mut self, ids: &[PairId]) -> KernelResult<()> {
        for &id in ids {
            self.existing_pair(id)?;
        }

        for id in ids.iter().copied().unique() {
            self.remove_pair(id);
        }

        Ok(())
    }

    /// Shortens demand pairs: `(id, old, new)` replaces the endpoint `old` of pair `id`
    /// by `new`, which has to lie on the current path of the pair. Every pair may
    /// appear at most once.
    pub fn change_endpoints_of_demand_pairs(
        &mut self,
        changes: &[(PairId, Node, Node)],
    ) -> KernelResult<()> {
        if let Some((id, _, _)) = changes.iter().duplicates_by(|c| c.0).next() {
            return Err(KernelError::InvalidArgument(format!(
                "demand pair {id} changes more than one endpoint at once"
            )));
        }

        for &(id, old, new) in changes {
            let pair = self.existing_pair(id)?;
            let other = pair
                .other_endpoint(old)
                .ok_or(KernelError::NotAnEndpoint { pair: id, node: old })?;
            if !self.tree.has_node(new) {
                return Err(KernelError::NodeNotInTree(new));
            }
            if new == other {
                return Err(KernelError::DegeneratePath { pair: id });
            }
            if !pair.contains_node(new) {
                return Err(KernelError::NodeNotOnDemandPath { pair: id, node: new });
            }
        }

        for &(id, old, new) in changes {
            self.change_endpoint(id, old, new)?;
        }

        Ok(())
    }

    fn remove_pair(&mut self, id: PairId) {
        let Some(pair) = self.pairs.get_mut(id as usize).and_then(|p| p.take()) else {
            return;
        };

        for edge in pair.edges() {
            self.unindex_edge(edge, id);
        }
        for u in [pair.node1(), pair.node2()] {
            self.pairs_at_node[u as usize].remove(&id);
        }

        self.number_of_pairs -= 1;
        self.delta.removed.push(RemovedPair {
            id,
            path: pair.path().to_vec(),
        });
    }

    fn unindex_edge(&mut self, edge: Edge, id: PairId) {
        if let Some(set) = self.pairs_on_edge.get_mut(&edge) {
            set.remove(&id);
            if set.is_empty() {
                self.pairs_on_edge.remove(&edge);
            }
        }
    }

    fn change_endpoint(&mut self, id: PairId, old: Node, new: Node) -> KernelResult<()> {
        let pair = self.pairs[id as usize]
            .as_mut()
            .ok_or(KernelError::UnknownDemandPair(id))?;

        let dropped = pair.shorten_endpoint(old, new)?;
        for &edge in &dropped {
            self.unindex_edge(edge, id);
        }
        self.pairs_at_node[old as usize].remove(&id);
        self.pairs_at_node[new as usize].insert(id);

        debug!("pair {id} moved endpoint {old} to {new}");
        self.delta.changed.push(ChangedPair { id, dropped });
        Ok(())
    }

    /// Contracts a (normalized, existing) edge and updates all indices
    fn contract(&mut self, edge: Edge) -> KernelResult<()> {
        let Edge(survivor, retired) = edge;

        let on_edge = self
            .pairs_on_edge
            .remove(&edge)
            .map_or_else(Vec::new, |set| set.into_iter().sorted().collect_vec());
        for &id in &on_edge {
            if let Some(pair) = self.pairs[id as usize].as_mut() {
                pair.on_edge_contracted(edge, survivor)?;
            }
        }

        let other_neighbors = self
            .tree
            .neighbors_of(retired)
            .iter()
            .copied()
            .filter(|&x| x != survivor)
            .collect_vec();

        for x in other_neighbors {
            let old_edge = Edge(retired, x).normalized();
            let new_edge = Edge(survivor, x).normalized();

            if let Some(set) = self.pairs_on_edge.remove(&old_edge) {
                for &id in &set {
                    if let Some(pair) = self.pairs[id as usize].as_mut() {
                        pair.rename_node(retired, survivor);
                    }
                }
                self.pairs_on_edge.insert(new_edge, set);
            }

            if let Some(input) = self.origin.remove(&old_edge) {
                self.origin.insert(new_edge, input);
            }
        }
        self.origin.remove(&edge);

        let moved = std::mem::take(&mut self.pairs_at_node[retired as usize]);
        self.pairs_at_node[survivor as usize].extend(moved);

        self.tree.contract_edge(edge)?;
        self.caterpillars = None;

        self.delta.contracted.push(ContractedEdge {
            edge,
            merged: survivor,
            pairs: on_edge,
        });

        Ok(())
    }
}

impl InvariantCheck<KernelError> for KernelState {
    fn is_correct(&self) -> Result<(), KernelError> {
        self.tree.is_correct()?;

        let mut expected_on_edge: FxHashMap<Edge, FxHashSet<PairId>> = FxHashMap::default();
        let mut expected_at_node = vec![FxHashSet::default(); self.pairs_at_node.len()];
        for pair in self.pairs() {
            (pair, &self.tree).is_correct()?;
            for e in pair.edges() {
                expected_on_edge.entry(e).or_default().insert(pair.id());
            }
            expected_at_node[pair.node1() as usize].insert(pair.id());
            expected_at_node[pair.node2() as usize].insert(pair.id());
        }

        if expected_on_edge != self.pairs_on_edge {
            return Err(KernelError::InvalidArgument(
                "pairs per edge index is out of sync".into(),
            ));
        }

        if expected_at_node != self.pairs_at_node {
            return Err(KernelError::InvalidArgument(
                "pairs per node index is out of sync".into(),
            ));
        }

        if self.pairs().count() != self.number_of_pairs {
            return Err(KernelError::InvalidArgument("pair count is off".into()));
        }

        if self.origin.len() as NumEdges != self.tree.number_of_edges()
            || self.tree.edges().any(|e| !self.origin.contains_key(&e))
        {
            return Err(KernelError::InvalidArgument(
                "input edge map is out of sync".into(),
            ));
        }

        Ok(())
    }
}

use crate::{
    graph::{Edge, Node},
    instance::PairId,
};
use std::error::Error;
use thiserror::Error;

/// Trait for checking invariants in datastructures
pub trait InvariantCheck<E: Error> {
    fn is_correct(&self) -> Result<(), E>;
}

/// Everything that can go wrong while building or reducing an instance.
///
/// Running out of budget is not an error; it is reported as
/// [`crate::kernelization::KernelStatus::Unsolvable`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("node {0} is not part of the tree")]
    NodeNotInTree(Node),

    #[error("edge {0} is not part of the tree")]
    EdgeNotInTree(Edge),

    #[error("node {node} is not an endpoint of demand pair {pair}")]
    NotAnEndpoint { pair: PairId, node: Node },

    #[error("edge {edge} is not on the path of demand pair {pair}")]
    EdgeNotOnDemandPath { pair: PairId, edge: Edge },

    #[error("node {node} is not on the path of demand pair {pair}")]
    NodeNotOnDemandPath { pair: PairId, node: Node },

    #[error("demand pair {pair} would have a path of length zero")]
    DegeneratePath { pair: PairId },

    #[error("demand pair {0} does not exist (anymore)")]
    UnknownDemandPair(PairId),
}

pub type KernelResult<T> = Result<T, KernelError>;

// rewind/src/core/node.rs

//! Defines the arena node that stores one step of a chain.

use crate::core::step::StepFn;

/// Index of a node inside its chain's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(pub(crate) usize);

impl NodeId {
  pub(crate) fn index(self) -> usize {
    self.0
  }
}

/// One step of a chain: its two operations plus links to its neighbours.
///
/// Links are arena indices, so the chain remains the sole owner of every node.
pub(crate) struct ChainNode<T> {
  pub(crate) name: String,
  pub(crate) forward: StepFn<T>,
  pub(crate) reverse: StepFn<T>,
  pub(crate) predecessor: Option<NodeId>,
  pub(crate) successor: Option<NodeId>,
}

impl<T> ChainNode<T> {
  pub(crate) fn new(name: String, forward: StepFn<T>, reverse: StepFn<T>, predecessor: Option<NodeId>) -> Self {
    Self {
      name,
      forward,
      reverse,
      predecessor,
      successor: None,
    }
  }

  pub(crate) fn has_predecessor(&self) -> bool {
    self.predecessor.is_some()
  }
}

// StepFn is a boxed closure without Debug; show only the structural fields.
impl<T> std::fmt::Debug for ChainNode<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ChainNode")
      .field("name", &self.name)
      .field("predecessor", &self.predecessor)
      .field("successor", &self.successor)
      .finish()
  }
}

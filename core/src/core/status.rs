// rewind/src/core/status.rs

//! Defines the status carried by an envelope and the traversal direction of a chain.

/// Outcome carried by an [`Envelope`](crate::Envelope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
  /// Every step run so far has succeeded.
  #[default]
  Ok,
  /// A step failed. Once failed, an envelope never returns to `Ok`.
  Failed,
}

impl Status {
  pub fn is_ok(self) -> bool {
    matches!(self, Status::Ok)
  }
}

/// Which loop of the chain invoked a step operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  /// The step's primary ("do") operation, run in append order.
  Forward,
  /// The step's compensating ("undo") operation, run in reverse order.
  Reverse,
}

// rewind/src/chain/trace.rs

//! Record of every step invocation made during one execution of a chain.

use crate::core::status::Direction;
use std::time::Duration;

/// How a single step invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
  /// The operation returned an envelope without recording a new failure.
  Succeeded,
  /// The operation returned an envelope carrying a newly recorded failure.
  Reported,
  /// The operation returned `Err`.
  Faulted,
}

/// One step invocation.
#[derive(Debug, Clone)]
pub struct TraceEntry {
  /// Name of the step.
  pub step: String,
  /// Append position of the step (0-based).
  pub index: usize,
  /// Whether the forward or reverse operation ran.
  pub direction: Direction,
  pub outcome: StepOutcome,
  /// Time spent awaiting the operation.
  pub elapsed: Duration,
}

/// Ordered log of the operations one `execute_traced` call invoked.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTrace {
  entries: Vec<TraceEntry>,
}

impl ExecutionTrace {
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn record(&mut self, entry: TraceEntry) {
    self.entries.push(entry);
  }

  /// All invocations in the order they happened.
  pub fn entries(&self) -> &[TraceEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Names of the steps whose forward operation ran, in execution order.
  pub fn forward_steps(&self) -> Vec<&str> {
    self.steps_in(Direction::Forward)
  }

  /// Names of the steps whose reverse operation ran, in execution order.
  pub fn compensated_steps(&self) -> Vec<&str> {
    self.steps_in(Direction::Reverse)
  }

  /// The forward invocation that failed, if the forward loop did not succeed.
  pub fn failed_step(&self) -> Option<&TraceEntry> {
    self
      .entries
      .iter()
      .find(|e| e.direction == Direction::Forward && e.outcome != StepOutcome::Succeeded)
  }

  fn steps_in(&self, direction: Direction) -> Vec<&str> {
    self
      .entries
      .iter()
      .filter(|e| e.direction == direction)
      .map(|e| e.step.as_str())
      .collect()
  }
}

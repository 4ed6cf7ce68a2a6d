// rewind/src/chain/definition.rs

//! Contains the `Chain<T>` struct definition and the methods that append steps to it.

use crate::core::envelope::Envelope;
use crate::core::node::{ChainNode, NodeId};
use crate::core::step::{boxed_op, ops_from_step, ChainStep, StepFn};
use std::future::Future;
use std::sync::Arc;
use tracing::{event, Level};

/// An ordered sequence of steps, each paired with a compensating operation.
///
/// Steps run in append order. When one fails, the reverse operations of the
/// steps that already succeeded run from the most recent back to the first.
///
/// Nodes live in an arena owned by the chain and link to their neighbours by
/// index. A built chain is read-only during execution, so it can be shared
/// (for example behind an `Arc`) and executed from several tasks at once.
pub struct Chain<T>
where
  T: 'static + Send,
{
  pub(crate) label: Option<String>,
  pub(crate) nodes: Vec<ChainNode<T>>,
  /// First appended node, where forward execution starts.
  pub(crate) entry: Option<NodeId>,
  /// Most recently appended node, where forward execution ends.
  pub(crate) exit: Option<NodeId>,
}

impl<T> Chain<T>
where
  T: 'static + Send,
{
  /// Creates an empty chain.
  pub fn new() -> Self {
    Self {
      label: None,
      nodes: Vec::new(),
      entry: None,
      exit: None,
    }
  }

  /// Creates an empty chain with a label shown in tracing spans.
  pub fn named(label: impl Into<String>) -> Self {
    Self {
      label: Some(label.into()),
      ..Self::new()
    }
  }

  pub fn label(&self) -> Option<&str> {
    self.label.as_deref()
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    let mut names = Vec::with_capacity(self.nodes.len());
    let mut cursor = self.entry;
    while let Some(id) = cursor {
      let node = self.node(id);
      names.push(node.name.as_str());
      cursor = node.successor;
    }
    names
  }

  /// Appends a step at the end of the execution order.
  ///
  /// `forward` and `reverse` take the current envelope and resolve to the next
  /// one. Their error type only needs to convert into `anyhow::Error`.
  /// The step is named `step_<index>` after its append position.
  ///
  /// Must not be called while an execution of this chain is in flight; the
  /// `&mut self` receiver enforces this for safe code.
  pub fn append<FwdFut, RevFut, FwdErr, RevErr>(
    &mut self,
    forward: impl Fn(Envelope<T>) -> FwdFut + Send + Sync + 'static,
    reverse: impl Fn(Envelope<T>) -> RevFut + Send + Sync + 'static,
  ) where
    FwdFut: Future<Output = Result<Envelope<T>, FwdErr>> + Send + 'static,
    RevFut: Future<Output = Result<Envelope<T>, RevErr>> + Send + 'static,
    FwdErr: Into<anyhow::Error> + Send + Sync + 'static,
    RevErr: Into<anyhow::Error> + Send + Sync + 'static,
  {
    self.push_node(None, boxed_op(forward), boxed_op(reverse));
  }

  /// Same as [`append`](Self::append), with an explicit step name.
  pub fn append_named<FwdFut, RevFut, FwdErr, RevErr>(
    &mut self,
    name: impl Into<String>,
    forward: impl Fn(Envelope<T>) -> FwdFut + Send + Sync + 'static,
    reverse: impl Fn(Envelope<T>) -> RevFut + Send + Sync + 'static,
  ) where
    FwdFut: Future<Output = Result<Envelope<T>, FwdErr>> + Send + 'static,
    RevFut: Future<Output = Result<Envelope<T>, RevErr>> + Send + 'static,
    FwdErr: Into<anyhow::Error> + Send + Sync + 'static,
    RevErr: Into<anyhow::Error> + Send + Sync + 'static,
  {
    self.push_node(Some(name.into()), boxed_op(forward), boxed_op(reverse));
  }

  /// Appends a step supplied through the [`ChainStep`] contract.
  pub fn append_step<S>(&mut self, step: S)
  where
    S: ChainStep<T> + 'static,
  {
    self.append_shared_step(Arc::new(step));
  }

  /// Appends a step that is also held elsewhere, e.g. one instance reused by
  /// several chains.
  pub fn append_shared_step(&mut self, step: Arc<dyn ChainStep<T>>) {
    let name = step.name().map(str::to_string);
    let (forward, reverse) = ops_from_step(step);
    self.push_node(name, forward, reverse);
  }

  /// Appends pre-boxed operations.
  pub fn append_boxed(&mut self, name: Option<String>, forward: StepFn<T>, reverse: StepFn<T>) {
    self.push_node(name, forward, reverse);
  }

  fn push_node(&mut self, name: Option<String>, forward: StepFn<T>, reverse: StepFn<T>) {
    let id = NodeId(self.nodes.len());
    let name = name.unwrap_or_else(|| format!("step_{}", id.index()));
    event!(Level::TRACE, step = %name, step_index = id.index(), "Appending step.");

    let predecessor = self.exit;
    self.nodes.push(ChainNode::new(name, forward, reverse, predecessor));
    match predecessor {
      Some(prev) => self.nodes[prev.index()].successor = Some(id),
      None => self.entry = Some(id),
    }
    self.exit = Some(id);
  }

  pub(crate) fn node(&self, id: NodeId) -> &ChainNode<T> {
    &self.nodes[id.index()]
  }
}

impl<T> Default for Chain<T>
where
  T: 'static + Send,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T> std::fmt::Debug for Chain<T>
where
  T: 'static + Send,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Chain")
      .field("label", &self.label)
      .field("steps", &self.step_names())
      .finish()
  }
}

// rewind/src/core/step.rs

//! Defines the `StepFn<T>` operation type and the `ChainStep<T>` contract for
//! pluggable steps.

use crate::core::envelope::Envelope;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a step operation.
pub type StepFuture<T> = Pin<Box<dyn Future<Output = Result<Envelope<T>, anyhow::Error>> + Send>>;

/// Type alias for a forward or reverse step operation.
///
/// An operation takes ownership of the current `Envelope<T>` and resolves to the
/// envelope the chain continues with. Returning `Err` is an unexpected fault:
/// in the forward direction the chain absorbs it into the envelope and starts
/// compensating, in the reverse direction it ends compensation and escapes
/// `Chain::execute`.
///
/// To report an ordinary failure, return `Ok(envelope.fail(..))` instead.
pub type StepFn<T> = Box<dyn Fn(Envelope<T>) -> StepFuture<T> + Send + Sync>;

/// Wraps a user closure into a `StepFn<T>`, converting its error into `anyhow::Error`.
pub(crate) fn boxed_op<T, F, UserErr>(op: impl Fn(Envelope<T>) -> F + Send + Sync + 'static) -> StepFn<T>
where
  T: Send + 'static,
  F: Future<Output = Result<Envelope<T>, UserErr>> + Send + 'static,
  UserErr: Into<anyhow::Error> + Send + Sync + 'static,
{
  Box::new(move |envelope| {
    let user_fut = op(envelope);
    Box::pin(async move { user_fut.await.map_err(Into::into) })
  })
}

/// A step supplied as a type rather than a pair of closures.
///
/// `forward` is the step's "do" operation and `reverse` its "undo". The chain
/// only calls `reverse` for steps whose `forward` already succeeded, and never
/// calls either concurrently with another step of the same execution.
#[async_trait]
pub trait ChainStep<T>: Send + Sync
where
  T: Send + 'static,
{
  /// Label used in traces, tracing spans and fault errors.
  /// `None` lets the chain assign a positional name.
  fn name(&self) -> Option<&str> {
    None
  }

  async fn forward(&self, envelope: Envelope<T>) -> anyhow::Result<Envelope<T>>;

  async fn reverse(&self, envelope: Envelope<T>) -> anyhow::Result<Envelope<T>>;
}

/// Splits a shared `ChainStep` into the two boxed operations a node stores.
pub(crate) fn ops_from_step<T, S>(step: Arc<S>) -> (StepFn<T>, StepFn<T>)
where
  T: Send + 'static,
  S: ChainStep<T> + ?Sized + 'static,
{
  let forward_step = Arc::clone(&step);
  let forward: StepFn<T> = Box::new(move |envelope| {
    let step = Arc::clone(&forward_step);
    Box::pin(async move { step.forward(envelope).await })
  });
  let reverse: StepFn<T> = Box::new(move |envelope| {
    let step = Arc::clone(&step);
    Box::pin(async move { step.reverse(envelope).await })
  });
  (forward, reverse)
}

// rewind/src/chain/execution.rs

//! Contains `Chain::execute()` and the two loops behind it: the forward loop,
//! which runs steps in append order, and the compensation loop, which unwinds the
//! steps that succeeded when a later one fails.

use crate::chain::definition::Chain;
use crate::chain::trace::{ExecutionTrace, StepOutcome, TraceEntry};
use crate::core::envelope::Envelope;
use crate::core::node::NodeId;
use crate::core::status::Direction;
use crate::error::{RewindError, RewindResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{event, instrument, span, Instrument, Level};

/// Where the forward loop stopped.
enum ForwardOutcome<T> {
  /// Every step succeeded.
  Succeeded(Envelope<T>),
  /// The step at `at` reported failure or faulted; `envelope` carries the detail.
  Failed { at: NodeId, envelope: Envelope<T> },
}

impl<T> Chain<T>
where
  T: 'static + Clone + Send,
{
  /// Runs the chain on `value`.
  ///
  /// Every forward-step failure, whether reported through the envelope or
  /// raised as `Err`, is absorbed: compensation runs and the failed envelope
  /// comes back as `Ok`. Callers must check [`Envelope::status`].
  ///
  /// `Err(RewindError::CompensationFault)` is returned only when a reverse
  /// operation itself returns `Err`; compensation stops at that step.
  ///
  /// The envelope is cloned before every forward operation so a fault can be
  /// recorded against what the step received. Keep `T` cheap to clone (or wrap
  /// large payloads in an `Arc`) for long chains.
  pub async fn execute(&self, value: T) -> RewindResult<Envelope<T>> {
    let (result, _trace) = self.execute_traced(value).await;
    result
  }

  /// Like [`execute`](Self::execute), also returning the list of operations invoked.
  #[instrument(
        name = "Chain::execute",
        skip_all,
        fields(
            chain = self.label.as_deref().unwrap_or("unnamed"),
            value_type = %std::any::type_name::<T>(),
            num_steps = self.nodes.len(),
        )
    )]
  pub async fn execute_traced(&self, value: T) -> (RewindResult<Envelope<T>>, ExecutionTrace) {
    let mut trace = ExecutionTrace::new();
    let envelope = Envelope::new(value);

    let Some(entry) = self.entry else {
      event!(Level::DEBUG, "Chain has no steps, returning envelope unchanged.");
      return (Ok(envelope), trace);
    };

    event!(Level::DEBUG, "Chain execution starting.");
    let result = match self.run_forward(entry, envelope, &mut trace).await {
      ForwardOutcome::Succeeded(envelope) => {
        event!(Level::DEBUG, completed = envelope.completed_count(), "Chain execution completed successfully.");
        Ok(envelope)
      }
      ForwardOutcome::Failed { at, envelope } => self.compensate(at, envelope, &mut trace).await,
    };
    (result, trace)
  }

  /// Runs forward operations from `entry` until one fails or the exit node succeeds.
  async fn run_forward(&self, entry: NodeId, mut envelope: Envelope<T>, trace: &mut ExecutionTrace) -> ForwardOutcome<T> {
    let mut cursor = entry;
    // Owned by the loop so a step returning a fresh envelope cannot reset it.
    let mut completed = envelope.completed_count();
    loop {
      let node = self.node(cursor);
      let step_span = span!(Level::DEBUG, "forward_step", step = %node.name, step_index = cursor.index());

      // Kept so a fault can still be recorded against the envelope the step received.
      let snapshot = envelope.clone();
      let started = Instant::now();
      let result = (node.forward)(envelope).instrument(step_span).await;
      let elapsed = started.elapsed();

      let (outcome, next) = match result {
        Err(source) => {
          event!(Level::ERROR, step = %node.name, error = %source, "Forward operation faulted.");
          let failed = snapshot.record_failure(RewindError::ForwardFault {
            step: node.name.clone(),
            source,
          });
          (StepOutcome::Faulted, Err(failed))
        }
        Ok(mut returned) if returned.is_failed() => {
          returned.stamp_completed(completed);
          if let Some(detail) = returned.failure_detail() {
            event!(Level::WARN, step = %node.name, failure = %detail, "Forward operation reported failure.");
          }
          (StepOutcome::Reported, Err(returned))
        }
        Ok(mut returned) => {
          completed += 1;
          returned.stamp_completed(completed);
          event!(Level::TRACE, step = %node.name, completed = returned.completed_count(), "Forward operation succeeded.");
          (StepOutcome::Succeeded, Ok(returned))
        }
      };

      trace.record(TraceEntry {
        step: node.name.clone(),
        index: cursor.index(),
        direction: Direction::Forward,
        outcome,
        elapsed,
      });

      match next {
        Err(failed) => return ForwardOutcome::Failed { at: cursor, envelope: failed },
        Ok(succeeded) => match node.successor {
          Some(successor) => {
            envelope = succeeded;
            cursor = successor;
          }
          None => return ForwardOutcome::Succeeded(succeeded),
        },
      }
    }
  }

  /// Runs the reverse operation of every predecessor of `failed_at`, most recent first.
  ///
  /// The failed node's own reverse operation never runs. A reverse operation
  /// that records a failure does not stop the loop; one that returns `Err` does.
  async fn compensate(
    &self,
    failed_at: NodeId,
    mut envelope: Envelope<T>,
    trace: &mut ExecutionTrace,
  ) -> RewindResult<Envelope<T>> {
    let completed = envelope.completed_count();
    event!(
      Level::INFO,
      failed_step = %self.node(failed_at).name,
      to_compensate = completed,
      "Compensating completed steps."
    );

    let mut cursor = failed_at;
    while let Some(predecessor) = self.node(cursor).predecessor {
      cursor = predecessor;
      let node = self.node(cursor);
      let step_span = span!(Level::DEBUG, "reverse_step", step = %node.name, step_index = cursor.index());

      let detail_before = envelope.failure_handle();
      let started = Instant::now();
      let result = (node.reverse)(envelope).instrument(step_span).await;
      let elapsed = started.elapsed();

      match result {
        Ok(mut returned) => {
          // Compensation never clears the failure or the forward count.
          returned.keep_failure(detail_before.clone());
          returned.stamp_completed(completed);
          let outcome = if recorded_new_failure(detail_before.as_ref(), returned.failure_handle().as_ref()) {
            event!(Level::WARN, step = %node.name, "Reverse operation reported failure, continuing compensation.");
            StepOutcome::Reported
          } else {
            event!(Level::TRACE, step = %node.name, "Reverse operation succeeded.");
            StepOutcome::Succeeded
          };
          trace.record(TraceEntry {
            step: node.name.clone(),
            index: cursor.index(),
            direction: Direction::Reverse,
            outcome,
            elapsed,
          });
          envelope = returned;
        }
        Err(source) => {
          event!(Level::ERROR, step = %node.name, error = %source, "Reverse operation faulted, abandoning compensation.");
          trace.record(TraceEntry {
            step: node.name.clone(),
            index: cursor.index(),
            direction: Direction::Reverse,
            outcome: StepOutcome::Faulted,
            elapsed,
          });
          return Err(RewindError::CompensationFault {
            step: node.name.clone(),
            source,
            forward_failure: detail_before,
          });
        }
      }
    }

    event!(Level::DEBUG, "Compensation finished.");
    Ok(envelope)
  }
}

fn recorded_new_failure(before: Option<&Arc<RewindError>>, after: Option<&Arc<RewindError>>) -> bool {
  match (before, after) {
    (_, None) => false,
    (None, Some(_)) => true,
    (Some(before), Some(after)) => !Arc::ptr_eq(before, after),
  }
}

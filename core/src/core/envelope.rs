// rewind/src/core/envelope.rs

//! Defines `Envelope<T>`, the context threaded through every step of a chain.

use crate::core::status::Status;
use crate::error::RewindError;
use std::sync::Arc;

/// The mutable context handed from step to step.
///
/// Each forward or reverse operation receives the current envelope by value and
/// returns the envelope the chain should continue with. The payload lives in
/// the public `value` field; the status is derived from the failure detail, so an
/// envelope is `Failed` exactly when a failure detail is present.
///
/// There is no way to clear a failure once recorded. Recording a later failure
/// replaces the detail but the status stays `Failed`.
#[derive(Debug, Clone)]
pub struct Envelope<T> {
  /// The payload produced and transformed by steps.
  pub value: T,
  /// Free-form diagnostic text a step may leave for the caller.
  pub message: Option<String>,
  failure: Option<Arc<RewindError>>,
  completed: usize,
}

impl<T> Envelope<T> {
  /// Creates an `Ok` envelope around `value` with no completed steps.
  pub fn new(value: T) -> Self {
    Self {
      value,
      message: None,
      failure: None,
      completed: 0,
    }
  }

  pub fn status(&self) -> Status {
    if self.failure.is_some() {
      Status::Failed
    } else {
      Status::Ok
    }
  }

  pub fn is_ok(&self) -> bool {
    self.status().is_ok()
  }

  pub fn is_failed(&self) -> bool {
    !self.is_ok()
  }

  pub fn failure_detail(&self) -> Option<&RewindError> {
    self.failure.as_deref()
  }

  /// Number of steps whose forward operation succeeded so far.
  pub fn completed_count(&self) -> usize {
    self.completed
  }

  /// Marks the envelope as failed with a plain reason.
  pub fn fail(self, reason: impl Into<String>) -> Self {
    self.record_failure(RewindError::Reported { reason: reason.into() })
  }

  /// Marks the envelope as failed with an underlying error.
  pub fn fail_with(self, error: impl Into<anyhow::Error>) -> Self {
    self.record_failure(RewindError::StepError { source: error.into() })
  }

  /// Sets the diagnostic message, replacing any previous one.
  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  /// Transforms the payload, keeping status, message and completed count.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
    Envelope {
      value: f(self.value),
      message: self.message,
      failure: self.failure,
      completed: self.completed,
    }
  }

  pub fn into_value(self) -> T {
    self.value
  }

  pub(crate) fn record_failure(mut self, error: RewindError) -> Self {
    self.failure = Some(Arc::new(error));
    self
  }

  /// Shared handle to the current failure detail, used to notice when a
  /// reverse operation records a new one.
  pub(crate) fn failure_handle(&self) -> Option<Arc<RewindError>> {
    self.failure.clone()
  }

  /// Overwrites the completed count with the one tracked by the chain.
  pub(crate) fn stamp_completed(&mut self, completed: usize) {
    self.completed = completed;
  }

  /// Puts `failure` back if a step returned an envelope without one.
  pub(crate) fn keep_failure(&mut self, failure: Option<Arc<RewindError>>) {
    if self.failure.is_none() {
      self.failure = failure;
    }
  }
}

impl<T: Default> Default for Envelope<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

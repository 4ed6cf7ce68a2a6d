// rewind/src/error.rs
use anyhow::Error as AnyhowError;
use std::sync::Arc;
use thiserror::Error;

/// Failure details recorded on an [`Envelope`](crate::Envelope) or returned by
/// [`Chain::execute`](crate::Chain::execute).
#[derive(Debug, Error)]
pub enum RewindError {
  /// A step marked the envelope as failed with a plain reason.
  #[error("Step reported failure: {reason}")]
  Reported { reason: String },

  /// A step marked the envelope as failed with an underlying error.
  #[error("Step reported failure. Source: {source}")]
  StepError {
    #[source]
    source: AnyhowError,
  },

  /// A forward operation returned `Err` instead of an envelope.
  #[error("Forward operation of step '{step}' faulted. Source: {source}")]
  ForwardFault {
    step: String,
    #[source]
    source: AnyhowError,
  },

  /// A reverse operation returned `Err` while compensating. This is the only
  /// variant `Chain::execute` itself returns.
  ///
  /// `forward_failure` is the failure detail the envelope carried when the
  /// faulting reverse operation was invoked: the forward failure that started
  /// compensation, unless an earlier reverse operation replaced it.
  #[error("Reverse operation of step '{step}' faulted during compensation. Source: {source}")]
  CompensationFault {
    step: String,
    #[source]
    source: AnyhowError,
    forward_failure: Option<Arc<RewindError>>,
  },
}

impl RewindError {
  /// Name of the step the fault originated from, when the chain knows it.
  pub fn step_name(&self) -> Option<&str> {
    match self {
      RewindError::ForwardFault { step, .. } | RewindError::CompensationFault { step, .. } => Some(step),
      RewindError::Reported { .. } | RewindError::StepError { .. } => None,
    }
  }
}

impl From<AnyhowError> for RewindError {
  fn from(err: AnyhowError) -> Self {
    RewindError::StepError { source: err }
  }
}

pub type RewindResult<T, E = RewindError> = std::result::Result<T, E>;

// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use parking_lot::Mutex;
use rewind::{Chain, Envelope};
use std::sync::Arc;
use tracing::Level;

// --- Common Payload ---
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger {
  pub total: i64,
  pub applied: Vec<String>,
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Test forward operation failed: {0}")]
  Forward(String),

  #[error("Test reverse operation failed: {0}")]
  Reverse(String),
}

/// How a test operation ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
  /// Apply the change and return the envelope.
  Succeed,
  /// Return the envelope marked as failed.
  Report(&'static str),
  /// Return `Err`.
  Fault(&'static str),
}

// --- Call Recorder ---
/// Shared log of operation invocations, as `"<step>:<fwd|rev>"` entries.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, entry: String) {
    self.0.lock().push(entry);
  }

  pub fn entries(&self) -> Vec<String> {
    self.0.lock().clone()
  }

  pub fn count(&self, entry: &str) -> usize {
    self.0.lock().iter().filter(|e| e.as_str() == entry).count()
  }
}

// --- Common Step Appenders ---

/// Appends a step named `name` whose forward operation adds `delta` to the
/// ledger and whose reverse operation subtracts it again.
pub fn append_ledger_step(
  chain: &mut Chain<Ledger>,
  log: &CallLog,
  name: &'static str,
  delta: i64,
  forward: Behaviour,
  reverse: Behaviour,
) {
  let fwd_log = log.clone();
  let rev_log = log.clone();
  chain.append_named(
    name,
    move |mut envelope: Envelope<Ledger>| {
      let log = fwd_log.clone();
      async move {
        log.push(format!("{}:fwd", name));
        tracing::debug!(target: "test_steps", step = name, total = envelope.value.total, "forward");
        match forward {
          Behaviour::Succeed => {
            envelope.value.total += delta;
            envelope.value.applied.push(name.to_string());
            Ok(envelope)
          }
          Behaviour::Report(reason) => Ok(envelope.fail(reason)),
          Behaviour::Fault(reason) => Err(TestError::Forward(reason.to_string())),
        }
      }
    },
    move |mut envelope: Envelope<Ledger>| {
      let log = rev_log.clone();
      async move {
        log.push(format!("{}:rev", name));
        tracing::debug!(target: "test_steps", step = name, total = envelope.value.total, "reverse");
        match reverse {
          Behaviour::Succeed => {
            envelope.value.total -= delta;
            envelope.value.applied.retain(|applied| applied != name);
            Ok(envelope)
          }
          Behaviour::Report(reason) => Ok(envelope.fail(reason)),
          Behaviour::Fault(reason) => Err(TestError::Reverse(reason.to_string())),
        }
      }
    },
  );
}

/// Appends a step that always succeeds in both directions.
pub fn append_ok_step(chain: &mut Chain<Ledger>, log: &CallLog, name: &'static str, delta: i64) {
  append_ledger_step(chain, log, name, delta, Behaviour::Succeed, Behaviour::Succeed);
}

/// Builds a chain of `names.len()` succeeding steps, each adding 1.
pub fn ok_chain(log: &CallLog, names: &[&'static str]) -> Chain<Ledger> {
  let mut chain = Chain::named("test_chain");
  for &name in names {
    append_ok_step(&mut chain, log, name, 1);
  }
  chain
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

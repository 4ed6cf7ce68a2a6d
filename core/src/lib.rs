// src/lib.rs

//! Rewind: an ASYNC compensating execution chain for Rust.
//!
//! A chain is an ordered sequence of asynchronous steps, each paired with an
//! inverse ("undo") operation. Steps run one at a time in append order. If a step
//! fails, the steps that already succeeded are unwound in reverse order by
//! invoking their inverses.
//!
//!  - Steps are appended as closure pairs (`append`, `append_named`) or as types
//!    implementing [`ChainStep`] (`append_step`).
//!  - An [`Envelope`] carries the payload, status, failure detail, and count of
//!    completed steps from step to step.
//!  - Forward failures, reported or raised, never escape `execute`; only a fault
//!    during compensation does.
//!  - A built chain is read-only during execution and can be shared between tasks.

pub mod chain;
pub mod core;
pub mod error;

// --- Re-exports for the Public API ---

pub use crate::core::envelope::Envelope;
pub use crate::core::status::{Direction, Status};
pub use crate::core::step::{ChainStep, StepFn, StepFuture};

pub use crate::chain::definition::Chain;
pub use crate::chain::trace::{ExecutionTrace, StepOutcome, TraceEntry};

pub use crate::error::{RewindError, RewindResult};

/*
    Core Workflow:
    1. Pick the payload type `T` the steps will transform (must be `Clone + Send`).
    2. Create a `Chain<T>` and append steps in execution order, each with a
       forward and a reverse operation.
    3. Call `chain.execute(value).await`.
    4. Inspect the returned envelope's `status()`; `Err` means compensation
       itself faulted and the unwind is incomplete.
*/

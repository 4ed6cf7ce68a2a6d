// rewind/src/chain/mod.rs

//! Defines the `Chain<T>` struct, its construction, and its forward/compensation execution logic.

pub mod definition;
pub mod execution;
pub mod trace;

// Re-export the main Chain struct
pub use definition::Chain;
pub use trace::{ExecutionTrace, StepOutcome, TraceEntry};

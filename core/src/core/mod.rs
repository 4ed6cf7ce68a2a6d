pub mod envelope;
pub(crate) mod node;
pub mod status;
pub mod step;

// Re-export key types for easier access from other modules (and lib.rs)
pub use envelope::Envelope;
pub use status::{Direction, Status};
pub use step::{ChainStep, StepFn, StepFuture};

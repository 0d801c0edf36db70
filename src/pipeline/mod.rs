//! Task pipeline execution engine.
//!
//! A task's `mapper` is an ordered list of step specs. The compiler turns
//! the specs into bound steps, and the runner threads the caller's input
//! through them, collecting auxiliary response fragments along the way.
//! The final output is the task's terminal result code.

pub mod compile;
pub mod run;
pub mod steps;

pub use compile::compile;
pub use run::run;
pub use steps::{
    Auxiliary, CompiledStep, StepContext, StepKind, WaitMessagePicker, WAIT_MESSAGES,
};

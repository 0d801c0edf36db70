//! CLI commands for the tutor service.
//!
//! Each command wraps one service operation and renders its result either
//! as JSON or as human-readable text. The clap definitions live in the
//! binary; these modules hold the command logic so it stays testable
//! against in-memory collaborators.

pub mod attempt;
pub mod clues;
pub mod describe;
pub mod lessons;
pub mod notify;

pub use attempt::AttemptCommand;
pub use clues::CluesCommand;
pub use describe::DescribeCommand;
pub use lessons::LessonsCommand;
pub use notify::NotifyCommand;

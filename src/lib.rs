//! Tutor - interactive lesson service
//!
//! Tutor runs authored lessons: each lesson is a table of tasks, each task
//! maps typed input (or external OS events) through a step pipeline to a
//! result code, and each result code triggers effects — replies, unlocks,
//! lesson completion, and movement to the next task.

pub mod cli;
pub mod config;
pub mod descriptor;
pub mod effects;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod process;
pub mod service;
pub mod storage;
pub mod util;

pub use config::Config;
pub use descriptor::{
    load_lessons_file, Clue, DescriptorSet, Effect, InputDirective, InputSpec, LessonDescriptor,
    SideEffect, TaskDescriptor, CLUE_KINDS, INPUT_EXTERNAL_EVENTS,
};
pub use effects::{resolve_effect, EffectOutcome};
pub use error::{Result, TutorError};
pub use events::{EventBoundary, EventTracker, NullBoundary, OutputSpec, SatisfiedOutput};
pub use pipeline::{Auxiliary, CompiledStep, StepContext, WaitMessagePicker, WAIT_MESSAGES};
pub use process::{shell_argv, ExecOutput, ProcessRunner, ShellRunner};
pub use service::{AttemptOutcome, LessonService, LessonSummary};
pub use storage::{
    FileSettingsStore, MemorySettingsStore, SettingsStore, CLUES_KEY, KNOWN_SPELLS_KEY,
    UNLOCKED_LESSONS_KEY,
};

// CLI commands
pub use cli::{AttemptCommand, CluesCommand, DescribeCommand, LessonsCommand, NotifyCommand};

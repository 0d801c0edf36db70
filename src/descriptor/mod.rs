//! Lesson descriptor data model and lookup.
//!
//! Descriptors arrive as a finished table — authoring-format validation and
//! file-change monitoring belong to an external collaborator. The set is
//! immutable once loaded and replaced wholesale on reload, never mutated in
//! place.

pub mod set;
pub mod types;

pub use set::{load_lessons_file, DescriptorSet};
pub use types::{
    Clue, Effect, InputDirective, InputSpec, LessonDescriptor, SideEffect, TaskDescriptor,
    CLUE_KINDS, INPUT_EXTERNAL_EVENTS,
};

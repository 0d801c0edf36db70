//! Lesson, task, and effect descriptor types.
//!
//! These mirror the authored JSON shape. Two fields are deliberately loose:
//! `mapper` entries stay raw JSON so the pipeline compiler can report a
//! malformed spec back to the author verbatim, and `Effect::reply` stays raw
//! JSON because both strings and arbitrary response objects are legal there.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input spec type that arms the external-event tracker when a task
/// description is fetched.
pub const INPUT_EXTERNAL_EVENTS: &str = "external_events";

/// Clue kinds the service knows how to store.
pub const CLUE_KINDS: &[&str] = &["text", "image-path"];

/// One lesson: a named unit of content with a table of practice tasks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LessonDescriptor {
    /// Unique lesson name.
    pub name: String,
    /// Short human-readable description.
    pub desc: String,
    /// Task id to start with.
    pub entry: String,
    /// Client identifiers this lesson is offered to.
    #[serde(default)]
    pub available_to: Vec<String>,
    /// Tasks by id.
    #[serde(default)]
    pub practice: BTreeMap<String, TaskDescriptor>,
}

/// One exercise unit inside a lesson.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDescriptor {
    /// Prompt text shown to the caller.
    pub task: String,
    /// How input for this task is collected.
    pub input: InputDirective,
    /// Ordered step specs; validated by the pipeline compiler, not here.
    #[serde(default)]
    pub mapper: Vec<Value>,
    /// Result code to effect bundle.
    #[serde(default)]
    pub effects: BTreeMap<String, Effect>,
}

/// Input spec as authored: either a bare type name or the full form.
///
/// The bare-string shorthand is common enough in lesson files that the
/// service normalizes it rather than making authors spell out empty
/// settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InputDirective {
    /// Shorthand: just the input type, empty settings.
    Shorthand(String),
    /// Full form with settings.
    Full(InputSpec),
}

impl InputDirective {
    /// Normalize to the full form.
    pub fn normalize(&self) -> InputSpec {
        match self {
            Self::Shorthand(kind) => InputSpec {
                kind: kind.clone(),
                settings: Value::Object(serde_json::Map::new()),
            },
            Self::Full(spec) => spec.clone(),
        }
    }
}

/// Normalized input spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InputSpec {
    /// Input type name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific settings.
    #[serde(default = "empty_object")]
    pub settings: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

/// The mutation/response bundle attached to one result code.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    /// Reply content: a string (wrapped as a scrolled response) or a
    /// response object passed through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<Value>,
    /// Side effects applied in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub side_effects: Vec<SideEffect>,
    /// Whether reaching this result completes the lesson.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub completes_lesson: bool,
    /// Task to move to next; defaults to staying on the current task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_to: Option<String>,
}

/// One declared side effect.
///
/// The kind stays a plain string so unknown types survive deserialization
/// and fail at resolution time with the offending name, where the author
/// can see it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SideEffect {
    /// Side effect type name (`shell`, `unlock`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Type-specific payload.
    #[serde(default)]
    pub value: Value,
}

/// A registered clue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Clue {
    /// Clue kind, one of [`CLUE_KINDS`].
    pub kind: String,
    /// Clue content (text, or a path for `image-path`).
    pub content: String,
}

//! The step library.
//!
//! Every step is a total function from `(input, config)` to
//! `(output, auxiliaries)`. The set of step kinds is a closed enumeration:
//! lesson authors pick from these, and an unknown name is a compile error,
//! not a plugin hook.

use std::collections::HashMap;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde_json::{json, Value};

use crate::error::Result;
use crate::events::EventTracker;
use crate::process::{shell_argv, ProcessRunner};

/// Messages shown while a learner waits on an event-gated task.
pub const WAIT_MESSAGES: &[&str] = &[
    "Wait for it",
    "Combubulating transistors",
    "Adjusting for combinatorial flux",
    "Hacking the matrix",
    "Exchanging electrical bits",
    "Refuelling source code",
    "Fetching arbitrary refs",
    "Resolving mathematical contradictions",
    "Fluxing liquid input",
];

/// A side-channel response fragment emitted by a step alongside its
/// primary output.
///
/// Only `response`-typed fragments exist today; the effect resolver
/// prepends their content to the reply list.
#[derive(Debug, Clone, PartialEq)]
pub enum Auxiliary {
    /// A response fragment forwarded to the caller.
    Response(Value),
}

impl Auxiliary {
    /// A "please wait" fragment.
    pub fn scroll_wait(message: &str) -> Self {
        Self::Response(json!({"type": "scroll_wait", "value": message}))
    }

    /// A fragment echoing the step input verbatim.
    pub fn wrapped(input: &str) -> Self {
        Self::Response(json!({"type": "wrapped", "value": input}))
    }

    /// The response content carried by this fragment.
    pub fn into_response(self) -> Value {
        match self {
            Self::Response(content) => content,
        }
    }
}

/// Pseudo-random chooser over [`WAIT_MESSAGES`].
///
/// Seedable so pipelines containing `wait_message` steps stay deterministic
/// in tests.
#[derive(Debug)]
pub struct WaitMessagePicker {
    rng: Mutex<StdRng>,
}

impl WaitMessagePicker {
    /// Picker seeded from system entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Picker with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Pick a message.
    pub fn pick(&self) -> &'static str {
        let mut rng = self.rng.lock().unwrap();
        WAIT_MESSAGES[rng.gen_range(0..WAIT_MESSAGES.len())]
    }
}

impl Default for WaitMessagePicker {
    fn default() -> Self {
        Self::new()
    }
}

/// The closed set of step kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Identity; passes input through untouched.
    Input,
    /// Case-insensitive, multi-line regex match; yields success/failure.
    Regex,
    /// Executes the *input* as shellcode and yields its combined output.
    Shell,
    /// Executes a fixed command from the step config, ignoring input.
    ShellCustom,
    /// Pass-through that appends a "please wait" response fragment.
    WaitMessage,
    /// Pass-through that appends the input as a wrapped response fragment.
    WrappedOutput,
    /// Terminal step of event-gated tasks; asks the tracker which output
    /// the fired events satisfy.
    CheckExternalEvents,
}

impl StepKind {
    /// Parse a step type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "input" => Some(Self::Input),
            "regex" => Some(Self::Regex),
            "shell" => Some(Self::Shell),
            "shell_custom" => Some(Self::ShellCustom),
            "wait_message" => Some(Self::WaitMessage),
            "wrapped_output" => Some(Self::WrappedOutput),
            "check_external_events" => Some(Self::CheckExternalEvents),
            _ => None,
        }
    }
}

/// A step bound to its config and, where needed, its owning (lesson, task).
#[derive(Debug, Clone)]
pub enum CompiledStep {
    /// Identity.
    Input,
    /// Regex validator with a pre-compiled pattern.
    Regex(Regex),
    /// Shell executor; environment overrides come from the step config.
    Shell { env: HashMap<String, String> },
    /// Shell executor with a fixed command.
    ShellCustom {
        command: String,
        env: HashMap<String, String>,
    },
    /// Wait-message annotation.
    WaitMessage,
    /// Wrapped-output annotation.
    WrappedOutput,
    /// Tracker resolution bound to the owning (lesson, task).
    CheckExternalEvents { lesson: String, task: String },
}

/// Collaborators a pipeline needs while running.
pub struct StepContext<'a> {
    /// Process execution seam, for shell steps.
    pub process: &'a dyn ProcessRunner,
    /// Event tracker, for the event-check step.
    pub tracker: &'a EventTracker,
    /// Wait-message chooser.
    pub picker: &'a WaitMessagePicker,
}

impl CompiledStep {
    /// Apply this step to `input`.
    pub fn apply(&self, input: &str, ctx: &StepContext<'_>) -> Result<(String, Vec<Auxiliary>)> {
        match self {
            Self::Input => Ok((input.to_string(), Vec::new())),

            Self::Regex(pattern) => {
                let result = if pattern.is_match(input) {
                    "success"
                } else {
                    "failure"
                };
                Ok((result.to_string(), Vec::new()))
            }

            Self::Shell { env } => run_shellcode(input, env, ctx.process),

            Self::ShellCustom { command, env } => run_shellcode(command, env, ctx.process),

            Self::WaitMessage => Ok((
                input.to_string(),
                vec![Auxiliary::scroll_wait(ctx.picker.pick())],
            )),

            Self::WrappedOutput => Ok((input.to_string(), vec![Auxiliary::wrapped(input)])),

            // Ignores its nominal input: the result comes from which
            // declared output the fired events satisfy.
            Self::CheckExternalEvents { lesson, task } => {
                let output = ctx.tracker.resolve(lesson, task)?;
                Ok((output.name, Vec::new()))
            }
        }
    }
}

/// Execute shellcode and return the combined captured output.
///
/// Standard output and standard error are concatenated with a newline, so
/// a following regex step can match against either stream.
fn run_shellcode(
    shellcode: &str,
    env: &HashMap<String, String>,
    process: &dyn ProcessRunner,
) -> Result<(String, Vec<Auxiliary>)> {
    let output = process.exec(&shell_argv(shellcode), env)?;
    Ok((format!("{}\n{}", output.stdout, output.stderr), Vec::new()))
}

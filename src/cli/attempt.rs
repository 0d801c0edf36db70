//! Attempt command.
//!
//! Submits input against a task and reports the responses plus where the
//! learner goes next.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::EventBoundary;
use crate::process::ProcessRunner;
use crate::service::LessonService;
use crate::storage::SettingsStore;

/// Options for the attempt command.
#[derive(Debug, Clone, Default)]
pub struct AttemptOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output of the attempt command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptOutput {
    /// Whether the attempt ran.
    pub success: bool,
    /// Response fragments, in delivery order.
    pub responses: Vec<Value>,
    /// Next task id; empty when the lesson is finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_to: Option<String>,
    /// Error message if the attempt failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AttemptOutput {
    /// Create a successful output.
    pub fn success(responses: Vec<Value>, move_to: String) -> Self {
        Self {
            success: true,
            responses,
            move_to: Some(move_to),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            responses: Vec::new(),
            move_to: None,
            error: Some(error.into()),
        }
    }
}

/// The attempt command implementation.
pub struct AttemptCommand<S, P, B> {
    service: LessonService<S, P, B>,
}

impl<S, P, B> AttemptCommand<S, P, B>
where
    S: SettingsStore,
    P: ProcessRunner,
    B: EventBoundary,
{
    /// Create a new attempt command.
    pub fn new(service: LessonService<S, P, B>) -> Self {
        Self { service }
    }

    /// Run the attempt command.
    pub fn run(
        &self,
        lesson: &str,
        task: &str,
        input: &str,
        _options: &AttemptOptions,
    ) -> AttemptOutput {
        match self.service.attempt_task(lesson, task, input) {
            Ok(outcome) => AttemptOutput::success(outcome.responses, outcome.move_to),
            Err(e) => AttemptOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &AttemptOutput, options: &AttemptOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Attempt failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        for response in &output.responses {
            let text = response
                .get("value")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| response.to_string());
            lines.push(text);
        }
        match output.move_to.as_deref() {
            Some("") => lines.push("Lesson complete.".to_string()),
            Some(next) => lines.push(format!("Next task: {next}")),
            None => {}
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

//! Describe command.
//!
//! Fetches a task's prompt and input spec. Describing an event-gated task
//! arms its event tracking as a side effect, same as over a bus transport.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::EventBoundary;
use crate::process::ProcessRunner;
use crate::service::LessonService;
use crate::storage::SettingsStore;

/// Options for the describe command.
#[derive(Debug, Clone, Default)]
pub struct DescribeOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output of the describe command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeOutput {
    /// Whether the lookup succeeded.
    pub success: bool,
    /// The task prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// The normalized input spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    /// Error message if the lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DescribeOutput {
    /// Create a successful output.
    pub fn success(prompt: String, input: Value) -> Self {
        Self {
            success: true,
            prompt: Some(prompt),
            input: Some(input),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            prompt: None,
            input: None,
            error: Some(error.into()),
        }
    }
}

/// The describe command implementation.
pub struct DescribeCommand<S, P, B> {
    service: LessonService<S, P, B>,
}

impl<S, P, B> DescribeCommand<S, P, B>
where
    S: SettingsStore,
    P: ProcessRunner,
    B: EventBoundary,
{
    /// Create a new describe command.
    pub fn new(service: LessonService<S, P, B>) -> Self {
        Self { service }
    }

    /// Run the describe command.
    pub fn run(&self, lesson: &str, task: &str, _options: &DescribeOptions) -> DescribeOutput {
        match self.service.get_task_description(lesson, task) {
            Ok((prompt, input)) => match serde_json::to_value(&input) {
                Ok(input) => DescribeOutput::success(prompt, input),
                Err(e) => DescribeOutput::failure(e.to_string()),
            },
            Err(e) => DescribeOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &DescribeOutput, options: &DescribeOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Describe failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let kind = output
            .input
            .as_ref()
            .and_then(|i| i.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        format!(
            "{}\n(input: {})\n",
            output.prompt.as_deref().unwrap_or(""),
            kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::descriptor::{DescriptorSet, LessonDescriptor};
    use crate::events::NullBoundary;
    use crate::process::fake::RecordingRunner;
    use crate::storage::MemorySettingsStore;
    use serde_json::json;

    fn command() -> DescribeCommand<MemorySettingsStore, RecordingRunner, NullBoundary> {
        let lessons: Vec<LessonDescriptor> = serde_json::from_value(json!([{
            "name": "intro",
            "desc": "d",
            "entry": "1",
            "available_to": ["console"],
            "practice": {
                "1": {"task": "Say hello", "input": "text"}
            }
        }]))
        .unwrap();
        let service = LessonService::new(
            Config::default(),
            DescriptorSet::new(lessons),
            MemorySettingsStore::new(),
            RecordingRunner::default(),
            NullBoundary,
        );
        DescribeCommand::new(service)
    }

    #[test]
    fn test_describe_returns_prompt_and_input() {
        let cmd = command();
        let output = cmd.run("intro", "1", &DescribeOptions::default());
        assert!(output.success);
        assert_eq!(output.prompt.as_deref(), Some("Say hello"));
        assert_eq!(output.input.unwrap()["type"], "text");
    }

    #[test]
    fn test_describe_unknown_task_fails() {
        let cmd = command();
        let output = cmd.run("intro", "99", &DescribeOptions::default());
        assert!(!output.success);
        assert!(output.error.unwrap().contains("99"));
    }

    #[test]
    fn test_format_human_readable() {
        let cmd = command();
        let options = DescribeOptions::default();
        let output = cmd.run("intro", "1", &options);
        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("Say hello"));
        assert!(formatted.contains("(input: text)"));
    }

    #[test]
    fn test_format_json() {
        let cmd = command();
        let options = DescribeOptions {
            json: true,
            ..Default::default()
        };
        let output = cmd.run("intro", "1", &options);
        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"success\": true"));
    }
}

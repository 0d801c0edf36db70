//! Notify command.
//!
//! Delivers a named external event to the service, as a bus transport would
//! on receipt of a platform signal.

use serde::{Deserialize, Serialize};

use crate::events::EventBoundary;
use crate::process::ProcessRunner;
use crate::service::LessonService;
use crate::storage::SettingsStore;

/// Options for the notify command.
#[derive(Debug, Clone, Default)]
pub struct NotifyOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output of the notify command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyOutput {
    /// Always true; delivery of an unknown event is a silent no-op.
    pub success: bool,
    /// The delivered event name.
    pub event: String,
}

/// The notify command implementation.
pub struct NotifyCommand<S, P, B> {
    service: LessonService<S, P, B>,
}

impl<S, P, B> NotifyCommand<S, P, B>
where
    S: SettingsStore,
    P: ProcessRunner,
    B: EventBoundary,
{
    /// Create a new notify command.
    pub fn new(service: LessonService<S, P, B>) -> Self {
        Self { service }
    }

    /// Run the notify command.
    pub fn run(&self, event: &str, _options: &NotifyOptions) -> NotifyOutput {
        self.service.notify_event(event);
        NotifyOutput {
            success: true,
            event: event.to_string(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &NotifyOutput, options: &NotifyOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            format!("Delivered event {}\n", output.event)
        }
    }
}

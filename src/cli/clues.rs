//! Clues command.
//!
//! Lists registered clues and registers new ones.

use serde::{Deserialize, Serialize};

use crate::events::EventBoundary;
use crate::process::ProcessRunner;
use crate::service::LessonService;
use crate::storage::SettingsStore;

/// Options for the clues command.
#[derive(Debug, Clone, Default)]
pub struct CluesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One listed clue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClueEntry {
    /// Clue kind.
    pub kind: String,
    /// Clue content.
    pub content: String,
}

/// Output of the clues command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CluesOutput {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Number of clues (after a register, the new total).
    pub count: usize,
    /// The clues; empty for a register.
    pub clues: Vec<ClueEntry>,
    /// Error message if the operation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CluesOutput {
    /// Create a successful output.
    pub fn success(clues: Vec<ClueEntry>) -> Self {
        let count = clues.len();
        Self {
            success: true,
            count,
            clues,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            clues: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The clues command implementation.
pub struct CluesCommand<S, P, B> {
    service: LessonService<S, P, B>,
}

impl<S, P, B> CluesCommand<S, P, B>
where
    S: SettingsStore,
    P: ProcessRunner,
    B: EventBoundary,
{
    /// Create a new clues command.
    pub fn new(service: LessonService<S, P, B>) -> Self {
        Self { service }
    }

    /// List all registered clues.
    pub fn run_list(&self, _options: &CluesOptions) -> CluesOutput {
        match self.service.clues() {
            Ok(clues) => CluesOutput::success(
                clues
                    .into_iter()
                    .map(|c| ClueEntry {
                        kind: c.kind,
                        content: c.content,
                    })
                    .collect(),
            ),
            Err(e) => CluesOutput::failure(e.to_string()),
        }
    }

    /// Register a clue, then report the updated listing.
    pub fn run_register(&self, kind: &str, content: &str, options: &CluesOptions) -> CluesOutput {
        match self.service.register_clue(kind, content) {
            Ok(()) => self.run_list(options),
            Err(e) => CluesOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &CluesOutput, options: &CluesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if !output.success {
            return format!(
                "Clue operation failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.clues.is_empty() {
            return "No clues registered.\n".to_string();
        }

        let mut lines = Vec::new();
        for clue in &output.clues {
            lines.push(format!("[{}] {}", clue.kind, clue.content));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

//! Lessons command.
//!
//! Lists the lessons a client can start, or the ones it has completed.

use serde::{Deserialize, Serialize};

use crate::events::EventBoundary;
use crate::process::ProcessRunner;
use crate::service::LessonService;
use crate::storage::SettingsStore;

/// Options for the lessons command.
#[derive(Debug, Clone, Default)]
pub struct LessonsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// List completed lessons instead of unlocked ones.
    pub known: bool,
}

/// One listed lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonEntry {
    /// Lesson name.
    pub name: String,
    /// Short description.
    pub desc: String,
    /// Entry task id.
    pub entry: String,
}

/// Output of the lessons command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonsOutput {
    /// Whether the listing succeeded.
    pub success: bool,
    /// Number of lessons.
    pub count: usize,
    /// The lessons.
    pub lessons: Vec<LessonEntry>,
    /// Error message if listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LessonsOutput {
    /// Create a successful output.
    pub fn success(lessons: Vec<LessonEntry>) -> Self {
        let count = lessons.len();
        Self {
            success: true,
            count,
            lessons,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            lessons: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The lessons command implementation.
pub struct LessonsCommand<S, P, B> {
    service: LessonService<S, P, B>,
}

impl<S, P, B> LessonsCommand<S, P, B>
where
    S: SettingsStore,
    P: ProcessRunner,
    B: EventBoundary,
{
    /// Create a new lessons command.
    pub fn new(service: LessonService<S, P, B>) -> Self {
        Self { service }
    }

    /// Run the lessons command for a client.
    pub fn run(&self, client: &str, options: &LessonsOptions) -> LessonsOutput {
        let result = if options.known {
            self.service.known_lessons(client)
        } else {
            self.service.unlocked_lessons(client)
        };

        match result {
            Ok(summaries) => LessonsOutput::success(
                summaries
                    .into_iter()
                    .map(|s| LessonEntry {
                        name: s.name,
                        desc: s.desc,
                        entry: s.entry,
                    })
                    .collect(),
            ),
            Err(e) => LessonsOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &LessonsOutput, options: &LessonsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output, options)
        }
    }

    fn format_human_readable(&self, output: &LessonsOutput, options: &LessonsOptions) -> String {
        if !output.success {
            return format!(
                "Listing failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.lessons.is_empty() {
            return if options.known {
                "No lessons completed yet.\n".to_string()
            } else {
                "No lessons available.\n".to_string()
            };
        }

        let mut lines = Vec::new();
        for lesson in &output.lessons {
            lines.push(format!(
                "{} — {} (starts at task {})",
                lesson.name, lesson.desc, lesson.entry
            ));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

//! Descriptor table lookup and the thin file loader.

use std::fs;
use std::path::Path;

use crate::descriptor::types::{LessonDescriptor, TaskDescriptor};
use crate::error::{Result, TutorError};

/// The loaded descriptor table.
///
/// Immutable between reloads; [`DescriptorSet::replace`] swaps the whole
/// table at once so a request never observes a half-updated catalog.
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    lessons: Vec<LessonDescriptor>,
}

impl DescriptorSet {
    /// Create a set from already-loaded descriptors.
    pub fn new(lessons: Vec<LessonDescriptor>) -> Self {
        Self { lessons }
    }

    /// Replace the whole table.
    pub fn replace(&mut self, lessons: Vec<LessonDescriptor>) {
        self.lessons = lessons;
    }

    /// All lessons, in table order.
    pub fn lessons(&self) -> &[LessonDescriptor] {
        &self.lessons
    }

    /// Find a lesson by name.
    ///
    /// Returns `None` unless exactly one lesson matches; a duplicated name
    /// is an authoring mistake worth a log line, not a crash.
    pub fn lookup(&self, lesson: &str) -> Option<&LessonDescriptor> {
        let mut matches = self.lessons.iter().filter(|d| d.name == lesson);
        let first = matches.next()?;
        if matches.next().is_some() {
            tracing::warn!("expected a single match for lesson {lesson} but found several");
            return None;
        }
        Some(first)
    }

    /// Resolve a (lesson, task) pair to its task descriptor.
    pub fn task(&self, lesson: &str, task: &str) -> Result<&TaskDescriptor> {
        self.lookup(lesson)
            .and_then(|d| d.practice.get(task))
            .ok_or_else(|| TutorError::task_not_found(lesson, task))
    }
}

/// Load lesson descriptors from a JSON file.
///
/// This is the demo boundary's loader only: it parses the file and nothing
/// more. Schema validation and change monitoring are the authoring
/// collaborator's job.
pub fn load_lessons_file(path: &Path) -> Result<Vec<LessonDescriptor>> {
    let content = fs::read_to_string(path).map_err(|e| TutorError::storage(path, e))?;
    serde_json::from_str(&content).map_err(|e| {
        TutorError::serde(format!("invalid lessons file {}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lesson(name: &str) -> LessonDescriptor {
        serde_json::from_value(json!({
            "name": name,
            "desc": "desc",
            "entry": "1",
            "available_to": ["console"],
            "practice": {
                "1": {"task": "prompt", "input": "text"}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let set = DescriptorSet::new(vec![lesson("a"), lesson("b")]);
        assert_eq!(set.lookup("b").unwrap().name, "b");
        assert!(set.lookup("c").is_none());
    }

    #[test]
    fn test_lookup_rejects_duplicates() {
        let set = DescriptorSet::new(vec![lesson("a"), lesson("a")]);
        assert!(set.lookup("a").is_none());
    }

    #[test]
    fn test_task_resolution() {
        let set = DescriptorSet::new(vec![lesson("a")]);
        assert_eq!(set.task("a", "1").unwrap().task, "prompt");

        let err = set.task("a", "2").unwrap_err();
        assert_eq!(err.kind(), "task-not-found");
        let err = set.task("missing", "1").unwrap_err();
        assert_eq!(err.kind(), "task-not-found");
    }

    #[test]
    fn test_replace_swaps_table() {
        let mut set = DescriptorSet::new(vec![lesson("a")]);
        set.replace(vec![lesson("b")]);
        assert!(set.lookup("a").is_none());
        assert!(set.lookup("b").is_some());
    }

    #[test]
    fn test_load_lessons_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lessons.json");
        std::fs::write(
            &path,
            json!([{
                "name": "a",
                "desc": "d",
                "entry": "1",
                "available_to": [],
                "practice": {}
            }])
            .to_string(),
        )
        .unwrap();

        let lessons = load_lessons_file(&path).unwrap();
        assert_eq!(lessons.len(), 1);
        assert_eq!(lessons[0].name, "a");
    }

    #[test]
    fn test_load_lessons_file_invalid_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lessons.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_lessons_file(&path).unwrap_err();
        assert_eq!(err.kind(), "serde");
    }

    #[test]
    fn test_load_lessons_file_missing() {
        let err = load_lessons_file(Path::new("/nonexistent/lessons.json")).unwrap_err();
        assert_eq!(err.kind(), "storage");
    }
}

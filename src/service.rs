//! The lesson service.
//!
//! Ties the descriptor table, pipeline engine, event tracker, effect
//! resolver, and settings store together behind the three core operations:
//! describing a task, attempting a task, and delivering an external event.
//! The service is transport-agnostic; callers (the CLI here, a bus daemon
//! elsewhere) hold it behind `&self` and may share it across threads.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

use crate::config::Config;
use crate::descriptor::{
    Clue, DescriptorSet, InputSpec, LessonDescriptor, CLUE_KINDS, INPUT_EXTERNAL_EVENTS,
};
use crate::effects::resolve_effect;
use crate::error::{Result, TutorError};
use crate::events::{EventBoundary, EventTracker, OutputSpec};
use crate::pipeline::{self, StepContext, WaitMessagePicker};
use crate::process::ProcessRunner;
use crate::storage::{SettingsStore, CLUES_KEY, KNOWN_SPELLS_KEY, UNLOCKED_LESSONS_KEY};
use crate::util::add_array_unique;

/// A lesson as listed to a client: enough to render a menu entry and start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonSummary {
    pub name: String,
    pub desc: String,
    pub entry: String,
}

/// Result of one task attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    /// Response fragments in delivery order.
    pub responses: Vec<Value>,
    /// Task to present next; empty when the lesson is finished.
    pub move_to: String,
}

/// The lesson service core.
pub struct LessonService<S, P, B> {
    descriptors: RwLock<DescriptorSet>,
    tracker: EventTracker,
    picker: WaitMessagePicker,
    config: Config,
    store: S,
    process: P,
    boundary: B,
}

impl<S, P, B> LessonService<S, P, B>
where
    S: SettingsStore,
    P: ProcessRunner,
    B: EventBoundary,
{
    /// Build a service over its collaborators.
    pub fn new(config: Config, descriptors: DescriptorSet, store: S, process: P, boundary: B) -> Self {
        Self {
            descriptors: RwLock::new(descriptors),
            tracker: EventTracker::new(),
            picker: WaitMessagePicker::new(),
            config,
            store,
            process,
            boundary,
        }
    }

    /// Swap the whole descriptor table.
    pub fn replace_descriptors(&self, lessons: Vec<LessonDescriptor>) {
        self.descriptors.write().unwrap().replace(lessons);
    }

    /// Describe a task: its prompt and normalized input spec.
    ///
    /// Fetching the description of an `external_events` task arms the event
    /// tracker for it and advertises the tracked event names through the
    /// boundary. Re-describing re-arms from scratch.
    pub fn get_task_description(&self, lesson: &str, task: &str) -> Result<(String, InputSpec)> {
        let descriptors = self.descriptors.read().unwrap();
        let descriptor = descriptors.task(lesson, task)?;
        let input = descriptor.input.normalize();

        if input.kind == INPUT_EXTERNAL_EVENTS {
            let outputs: BTreeMap<String, OutputSpec> =
                serde_json::from_value(input.settings.clone()).map_err(|e| {
                    TutorError::serde(format!(
                        "invalid external_events settings on {lesson}/{task}: {e}"
                    ))
                })?;
            let interested = self.tracker.arm(lesson, task, &outputs);
            self.boundary.announce_interest(&interested);
        }

        Ok((descriptor.task.clone(), input))
    }

    /// Attempt a task with the given input.
    ///
    /// Compiles and runs the task's pipeline, resolves the terminal result
    /// code against the effect table, persists any progress change, and
    /// reports the responses plus the next task. Moving off the task drops
    /// its pending event state.
    pub fn attempt_task(&self, lesson: &str, task: &str, input: &str) -> Result<AttemptOutcome> {
        let descriptors = self.descriptors.read().unwrap();
        let descriptor = descriptors.task(lesson, task)?;

        let steps = pipeline::compile(&descriptor.mapper, lesson, task)?;
        let ctx = StepContext {
            process: &self.process,
            tracker: &self.tracker,
            picker: &self.picker,
        };
        let (result, auxiliaries) = pipeline::run(&steps, input, &ctx)?;

        let prior_unlocked = self.store.get_strings(UNLOCKED_LESSONS_KEY)?;
        let prior_known = self.store.get_strings(KNOWN_SPELLS_KEY)?;

        let outcome = resolve_effect(
            &result,
            &descriptor.effects,
            lesson,
            task,
            auxiliaries,
            &prior_unlocked,
            &prior_known,
            &self.process,
        )?;

        if outcome.unlocked != prior_unlocked {
            self.store.set_strings(UNLOCKED_LESSONS_KEY, &outcome.unlocked)?;
        }
        if outcome.known != prior_known {
            self.store.set_strings(KNOWN_SPELLS_KEY, &outcome.known)?;
        }

        if outcome.move_to != task {
            self.tracker.disarm(lesson, task);
        }

        tracing::debug!(
            "attempt on {lesson}/{task} resolved to {result}, moving to {:?}",
            outcome.move_to
        );
        Ok(AttemptOutcome {
            responses: outcome.responses,
            move_to: outcome.move_to,
        })
    }

    /// Deliver a named external event.
    ///
    /// Every armed task sees the event; each (lesson, task) whose winning
    /// output asks for notification is signalled through the boundary.
    pub fn notify_event(&self, event: &str) {
        for (lesson, task) in self.tracker.notify(event) {
            self.boundary.signal_satisfied(&lesson, &task);
        }
    }

    /// Lessons the client may start: unlocked (stored set unioned with the
    /// configured always-unlocked list) and offered to this client.
    pub fn unlocked_lessons(&self, client: &str) -> Result<Vec<LessonSummary>> {
        let stored = self.store.get_strings(UNLOCKED_LESSONS_KEY)?;
        let unlocked = add_array_unique(&stored, &self.config.progress.always_unlocked);
        self.summaries(client, &unlocked)
    }

    /// Lessons the client has completed.
    pub fn known_lessons(&self, client: &str) -> Result<Vec<LessonSummary>> {
        let known = self.store.get_strings(KNOWN_SPELLS_KEY)?;
        self.summaries(client, &known)
    }

    fn summaries(&self, client: &str, names: &[String]) -> Result<Vec<LessonSummary>> {
        let descriptors = self.descriptors.read().unwrap();
        Ok(descriptors
            .lessons()
            .iter()
            .filter(|lesson| {
                names.contains(&lesson.name)
                    && lesson.available_to.iter().any(|c| c == client)
            })
            .map(|lesson| LessonSummary {
                name: lesson.name.clone(),
                desc: lesson.desc.clone(),
                entry: lesson.entry.clone(),
            })
            .collect())
    }

    /// Register a clue. Duplicates (same kind and content) are dropped.
    pub fn register_clue(&self, kind: &str, content: &str) -> Result<()> {
        if !CLUE_KINDS.contains(&kind) {
            return Err(TutorError::UnknownClueType {
                kind: kind.to_string(),
                known: CLUE_KINDS.iter().map(|k| k.to_string()).collect(),
            });
        }

        let clue = Clue {
            kind: kind.to_string(),
            content: content.to_string(),
        };
        let encoded = serde_json::to_string(&clue)?;

        let mut entries = self.store.get_strings(CLUES_KEY)?;
        if !entries.contains(&encoded) {
            entries.push(encoded);
            self.store.set_strings(CLUES_KEY, &entries)?;
        }
        Ok(())
    }

    /// All registered clues.
    ///
    /// An entry that no longer parses is skipped with a warning rather than
    /// poisoning the whole listing.
    pub fn clues(&self) -> Result<Vec<Clue>> {
        let entries = self.store.get_strings(CLUES_KEY)?;
        Ok(entries
            .iter()
            .filter_map(|entry| match serde_json::from_str(entry) {
                Ok(clue) => Some(clue),
                Err(e) => {
                    tracing::warn!("dropping unparseable clue entry {entry:?}: {e}");
                    None
                }
            })
            .collect())
    }
}

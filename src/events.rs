//! External-event tracking for event-gated tasks.
//!
//! Some tasks cannot determine their result from typed input alone; they
//! wait on named OS-level events delivered from outside the pipeline. The
//! [`EventTracker`] owns the pending state for every such (lesson, task)
//! pair and resolves which declared output the fired events satisfy.
//!
//! Overlapping outputs are disambiguated by *subsumption*: when several
//! outputs have all of their events satisfied, the winner is the one whose
//! `subsumes` list names every other satisfied sibling. Authoring where no
//! single output dominates is a logic error, reported loudly rather than
//! guessed around.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};
use crate::util::add_array_unique;

/// Declared shape of one output branch, as authored in a task's
/// `external_events` input settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSpec {
    /// Events that must all fire before this output is satisfied.
    pub events: Vec<String>,
    /// Sibling outputs this one dominates when both are satisfied.
    #[serde(default)]
    pub subsumes: Vec<String>,
    /// Whether satisfying this output should signal the boundary.
    #[serde(default)]
    pub notify: bool,
}

/// The resolved winner for a (lesson, task) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SatisfiedOutput {
    /// Output name; becomes the pipeline's terminal result code.
    pub name: String,
    /// The winner's `notify` flag.
    pub notify: bool,
    /// The winner's tracked event names.
    pub events: Vec<String>,
}

/// Tracked state of one output branch.
#[derive(Debug, Clone)]
struct OutputState {
    /// Event name to whether it has fired.
    events: BTreeMap<String, bool>,
    subsumes: Vec<String>,
    notify: bool,
}

impl OutputState {
    fn from_spec(spec: &OutputSpec) -> Self {
        Self {
            events: spec.events.iter().map(|e| (e.clone(), false)).collect(),
            subsumes: spec.subsumes.clone(),
            notify: spec.notify,
        }
    }

    fn is_satisfied(&self) -> bool {
        self.events.values().all(|fired| *fired)
    }
}

/// Pending event state for one (lesson, task) pair.
#[derive(Debug, Clone)]
struct PendingEventState {
    outputs: BTreeMap<String, OutputState>,
}

impl PendingEventState {
    /// Mark an event as fired in every output that tracks it.
    ///
    /// Idempotent: marking the same event twice changes nothing.
    fn mark(&mut self, event: &str) {
        for output in self.outputs.values_mut() {
            if let Some(fired) = output.events.get_mut(event) {
                *fired = true;
            }
        }
    }

    /// Names of outputs whose every tracked event has fired.
    fn satisfied_outputs(&self) -> Vec<String> {
        self.outputs
            .iter()
            .filter(|(_, state)| state.is_satisfied())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Event names that have fired so far, across all outputs.
    fn fired_events(&self) -> Vec<String> {
        let mut fired = Vec::new();
        for output in self.outputs.values() {
            for (event, has_fired) in &output.events {
                if *has_fired && !fired.contains(event) {
                    fired.push(event.clone());
                }
            }
        }
        fired
    }

    /// Apply the subsumption filter and demand a single winner.
    ///
    /// An output survives iff its `subsumes` list contains every *other*
    /// satisfied output. With a single satisfied output the filter is
    /// vacuous and that output wins.
    fn resolve(&self, lesson: &str, task: &str) -> Result<SatisfiedOutput> {
        let satisfied = self.satisfied_outputs();

        if satisfied.is_empty() {
            return Err(TutorError::NoOutputSatisfied {
                lesson: lesson.to_string(),
                task: task.to_string(),
                events: self.fired_events(),
            });
        }

        let survivors: Vec<&String> = satisfied
            .iter()
            .filter(|name| {
                let output = &self.outputs[*name];
                satisfied
                    .iter()
                    .filter(|other| other != name)
                    .all(|other| output.subsumes.contains(other))
            })
            .collect();

        match survivors.as_slice() {
            [winner] => {
                let output = &self.outputs[*winner];
                Ok(SatisfiedOutput {
                    name: (*winner).clone(),
                    notify: output.notify,
                    events: output.events.keys().cloned().collect(),
                })
            }
            _ => {
                let mut events = Vec::new();
                for name in &satisfied {
                    let tracked: Vec<String> =
                        self.outputs[name].events.keys().cloned().collect();
                    events = add_array_unique(&events, &tracked);
                }
                // A filter that eliminated everything still means several
                // outputs matched; name them all for the author.
                let outputs = if survivors.is_empty() {
                    satisfied.clone()
                } else {
                    survivors.iter().map(|s| (*s).clone()).collect()
                };
                Err(TutorError::AmbiguousOutputs { outputs, events })
            }
        }
    }
}

/// Process-wide tracker of pending external events, keyed by
/// (lesson, task).
///
/// This is the only shared mutable state in the core. `notify` may arrive
/// at any time relative to pipeline execution, including before anything is
/// armed (a no-op) and after a task has moved on (a disarmed key is never
/// resurrected).
#[derive(Debug, Default)]
pub struct EventTracker {
    pending: RwLock<HashMap<(String, String), PendingEventState>>,
}

impl EventTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm event tracking for a (lesson, task) pair.
    ///
    /// Replaces (never merges with) any existing state for the key. Returns
    /// the de-duplicated union of all referenced event names, for the
    /// boundary to advertise interest in.
    pub fn arm(
        &self,
        lesson: &str,
        task: &str,
        outputs: &BTreeMap<String, OutputSpec>,
    ) -> Vec<String> {
        let state = PendingEventState {
            outputs: outputs
                .iter()
                .map(|(name, spec)| (name.clone(), OutputState::from_spec(spec)))
                .collect(),
        };

        let mut interested = Vec::new();
        for spec in outputs.values() {
            interested = add_array_unique(&interested, &spec.events);
        }

        tracing::debug!("arming event tracking for {lesson}/{task}: {interested:?}");
        let mut pending = self.pending.write().unwrap();
        pending.insert((lesson.to_string(), task.to_string()), state);
        interested
    }

    /// Record that a named external event occurred.
    ///
    /// Marks the event in every armed state, then attempts resolution per
    /// key. Returns the (lesson, task) pairs whose single surviving output
    /// carries `notify = true`; the caller signals the boundary for each.
    /// A key that resolves to the same output on a later event fires again —
    /// re-notification before the caller acts is tolerated by design of the
    /// protocol, not deduplicated here.
    pub fn notify(&self, event: &str) -> Vec<(String, String)> {
        let mut pending = self.pending.write().unwrap();
        let mut to_signal = Vec::new();

        for ((lesson, task), state) in pending.iter_mut() {
            state.mark(event);

            match state.resolve(lesson, task) {
                Ok(output) if output.notify => {
                    to_signal.push((lesson.clone(), task.clone()));
                }
                Ok(_) => {}
                // Unsatisfied is the normal waiting state; a subsumption
                // contradiction still surfaces as a hard error when the
                // task's pipeline resolves.
                Err(TutorError::NoOutputSatisfied { .. }) => {}
                Err(err) => {
                    tracing::warn!("event {event} hit contradictory outputs on {lesson}/{task}: {err}");
                }
            }
        }

        to_signal.sort();
        to_signal
    }

    /// Resolve the currently satisfied output for a (lesson, task) pair.
    pub fn resolve(&self, lesson: &str, task: &str) -> Result<SatisfiedOutput> {
        let pending = self.pending.read().unwrap();
        match pending.get(&(lesson.to_string(), task.to_string())) {
            Some(state) => state.resolve(lesson, task),
            None => Err(TutorError::NoOutputSatisfied {
                lesson: lesson.to_string(),
                task: task.to_string(),
                events: Vec::new(),
            }),
        }
    }

    /// Drop pending state for a (lesson, task) pair.
    ///
    /// Called when a task's result routes elsewhere, so stale tracking
    /// cannot leak into the next task.
    pub fn disarm(&self, lesson: &str, task: &str) {
        let mut pending = self.pending.write().unwrap();
        if pending
            .remove(&(lesson.to_string(), task.to_string()))
            .is_some()
        {
            tracing::debug!("disarmed event tracking for {lesson}/{task}");
        }
    }

    /// Whether a (lesson, task) pair currently has armed state.
    pub fn is_armed(&self, lesson: &str, task: &str) -> bool {
        self.pending
            .read()
            .unwrap()
            .contains_key(&(lesson.to_string(), task.to_string()))
    }
}

/// Boundary notified about event interest and satisfaction.
///
/// The transport half (D-Bus signals on the reference platform) lives
/// outside the crate.
pub trait EventBoundary: Send + Sync {
    /// Advertise the events the service now wants to hear about.
    fn announce_interest(&self, events: &[String]);

    /// Report that a (lesson, task) pair's events are satisfied.
    fn signal_satisfied(&self, lesson: &str, task: &str);
}

/// Blanket implementation for Arc-wrapped boundaries, so a boundary can be
/// shared with callers that keep their own handle.
impl<T: EventBoundary + ?Sized> EventBoundary for std::sync::Arc<T> {
    fn announce_interest(&self, events: &[String]) {
        (**self).announce_interest(events)
    }

    fn signal_satisfied(&self, lesson: &str, task: &str) {
        (**self).signal_satisfied(lesson, task)
    }
}

/// Boundary that drops everything; useful when no transport is attached.
#[derive(Debug, Clone, Default)]
pub struct NullBoundary;

impl EventBoundary for NullBoundary {
    fn announce_interest(&self, _events: &[String]) {}
    fn signal_satisfied(&self, _lesson: &str, _task: &str) {}
}

/// Test fakes for the event boundary.
#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    /// Recording fake boundary.
    #[derive(Debug, Default)]
    pub struct RecordingBoundary {
        /// Every announce_interest payload, in order.
        pub announced: Mutex<Vec<Vec<String>>>,
        /// Every signal_satisfied (lesson, task), in order.
        pub satisfied: Mutex<Vec<(String, String)>>,
    }

    impl RecordingBoundary {
        /// Create a new recording boundary.
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl EventBoundary for RecordingBoundary {
        fn announce_interest(&self, events: &[String]) {
            self.announced.lock().unwrap().push(events.to_vec());
        }

        fn signal_satisfied(&self, lesson: &str, task: &str) {
            self.satisfied
                .lock()
                .unwrap()
                .push((lesson.to_string(), task.to_string()));
        }
    }
}

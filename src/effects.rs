//! Effect resolution.
//!
//! The pipeline's terminal result code selects one entry from the task's
//! effect table; this module turns that entry into the response bundle and
//! the state changes to apply. Unlock and known-lesson sets are always
//! updated as order-preserving dedup unions over the prior values — never
//! replaced.

use std::collections::{BTreeMap, HashMap};

use serde_json::{json, Value};

use crate::descriptor::Effect;
use crate::error::{Result, TutorError};
use crate::pipeline::Auxiliary;
use crate::process::{shell_argv, ProcessRunner};
use crate::util::add_array_unique;

/// Result of resolving one effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectOutcome {
    /// Response fragments for the caller: pipeline auxiliaries first, the
    /// effect's reply (if any) last.
    pub responses: Vec<Value>,
    /// Updated unlocked-lesson set (union of prior and unlock effects).
    pub unlocked: Vec<String>,
    /// Updated known-lesson set (union of prior and lesson completion).
    pub known: Vec<String>,
    /// Next task id: `move_to` if declared, the same task otherwise, or
    /// the empty string if the lesson was just completed ("no further
    /// task").
    pub move_to: String,
}

/// Resolve a terminal result code against a task's effect table.
///
/// Side effects run in declaration order. Shell side effects go through
/// the process collaborator, and a failure there fails the resolution —
/// never swallowed.
#[allow(clippy::too_many_arguments)]
pub fn resolve_effect(
    result: &str,
    effects: &BTreeMap<String, Effect>,
    lesson: &str,
    task: &str,
    auxiliaries: Vec<Auxiliary>,
    prior_unlocked: &[String],
    prior_known: &[String],
    process: &dyn ProcessRunner,
) -> Result<EffectOutcome> {
    let effect = effects.get(result).ok_or_else(|| TutorError::UnknownResultCode {
        result: result.to_string(),
        known: effects.keys().cloned().collect(),
    })?;

    let mut responses: Vec<Value> = auxiliaries
        .into_iter()
        .map(Auxiliary::into_response)
        .collect();

    if let Some(reply) = &effect.reply {
        match reply {
            Value::String(text) => responses.push(json!({"type": "scrolled", "value": text})),
            Value::Object(_) => responses.push(reply.clone()),
            other => {
                return Err(TutorError::invalid_effect_spec(format!(
                    "reply must be a string or an object, got {other}"
                )))
            }
        }
    }

    let mut unlocked = prior_unlocked.to_vec();
    for side_effect in &effect.side_effects {
        match side_effect.kind.as_str() {
            "shell" => {
                let command = side_effect.value.as_str().ok_or_else(|| {
                    TutorError::invalid_effect_spec(format!(
                        "shell side effect value must be a string, got {}",
                        side_effect.value
                    ))
                })?;
                process.exec(&shell_argv(command), &HashMap::new())?;
            }
            "unlock" => {
                let additions: Vec<String> = serde_json::from_value(side_effect.value.clone())
                    .map_err(|_| {
                        TutorError::invalid_effect_spec(format!(
                            "unlock side effect value must be a list of lesson names, got {}",
                            side_effect.value
                        ))
                    })?;
                unlocked = add_array_unique(&unlocked, &additions);
            }
            other => return Err(TutorError::unknown_side_effect(other)),
        }
    }

    let known = if effect.completes_lesson {
        add_array_unique(prior_known, &[lesson.to_string()])
    } else {
        prior_known.to_vec()
    };

    let move_to = match &effect.move_to {
        Some(next) => next.clone(),
        None if effect.completes_lesson => String::new(),
        None => task.to_string(),
    };

    Ok(EffectOutcome {
        responses,
        unlocked,
        known,
        move_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::{FailingRunner, RecordingRunner};

    fn effects_from_json(value: Value) -> BTreeMap<String, Effect> {
        serde_json::from_value(value).unwrap()
    }

    fn resolve_simple(
        result: &str,
        effects: &BTreeMap<String, Effect>,
        process: &dyn ProcessRunner,
    ) -> Result<EffectOutcome> {
        resolve_effect(result, effects, "lesson", "task", Vec::new(), &[], &[], process)
    }

    #[test]
    fn test_unknown_result_code() {
        let effects = effects_from_json(json!({"success": {}}));
        let process = RecordingRunner::default();

        let err = resolve_simple("maybe", &effects, &process).unwrap_err();
        assert_eq!(err.kind(), "unknown-result-code");
        assert!(err.to_string().contains("success"));
    }

    #[test]
    fn test_string_reply_is_wrapped_as_scrolled() {
        let effects = effects_from_json(json!({"success": {"reply": "Good job!"}}));
        let process = RecordingRunner::default();

        let outcome = resolve_simple("success", &effects, &process).unwrap();
        assert_eq!(
            outcome.responses,
            vec![json!({"type": "scrolled", "value": "Good job!"})]
        );
    }

    #[test]
    fn test_object_reply_passes_through_verbatim() {
        let effects = effects_from_json(json!({
            "success": {"reply": {"type": "printed", "value": "done"}}
        }));
        let process = RecordingRunner::default();

        let outcome = resolve_simple("success", &effects, &process).unwrap();
        assert_eq!(
            outcome.responses,
            vec![json!({"type": "printed", "value": "done"})]
        );
    }

    #[test]
    fn test_non_string_non_object_reply_is_invalid() {
        let effects = effects_from_json(json!({"success": {"reply": 7}}));
        let process = RecordingRunner::default();

        let err = resolve_simple("success", &effects, &process).unwrap_err();
        assert_eq!(err.kind(), "invalid-effect-spec");
    }

    #[test]
    fn test_auxiliaries_precede_reply() {
        let effects = effects_from_json(json!({"success": {"reply": "done"}}));
        let process = RecordingRunner::default();

        let outcome = resolve_effect(
            "success",
            &effects,
            "lesson",
            "task",
            vec![Auxiliary::wrapped("ls output")],
            &[],
            &[],
            &process,
        )
        .unwrap();

        assert_eq!(outcome.responses.len(), 2);
        assert_eq!(outcome.responses[0]["type"], "wrapped");
        assert_eq!(outcome.responses[1]["type"], "scrolled");
    }

    #[test]
    fn test_unlock_unions_with_prior() {
        let effects = effects_from_json(json!({
            "success": {"side_effects": [{"type": "unlock", "value": ["terminal", "intro"]}]}
        }));
        let process = RecordingRunner::default();

        let outcome = resolve_effect(
            "success",
            &effects,
            "lesson",
            "task",
            Vec::new(),
            &["intro".to_string()],
            &[],
            &process,
        )
        .unwrap();

        // Prior order preserved, new names appended, duplicates dropped.
        assert_eq!(
            outcome.unlocked,
            vec!["intro".to_string(), "terminal".to_string()]
        );
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let effects = effects_from_json(json!({
            "success": {"side_effects": [{"type": "unlock", "value": ["x"]}]}
        }));
        let process = RecordingRunner::default();

        let once = resolve_simple("success", &effects, &process).unwrap();
        let twice = resolve_effect(
            "success",
            &effects,
            "lesson",
            "task",
            Vec::new(),
            &once.unlocked,
            &[],
            &process,
        )
        .unwrap();

        assert_eq!(once.unlocked, twice.unlocked);
    }

    #[test]
    fn test_shell_side_effect_runs_in_order() {
        let effects = effects_from_json(json!({
            "success": {"side_effects": [
                {"type": "shell", "value": "touch /tmp/first"},
                {"type": "shell", "value": "touch /tmp/second"}
            ]}
        }));
        let process = RecordingRunner::default();

        resolve_simple("success", &effects, &process).unwrap();

        let calls = process.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0[2], "touch /tmp/first; exit 0");
        assert_eq!(calls[1].0[2], "touch /tmp/second; exit 0");
    }

    #[test]
    fn test_shell_side_effect_failure_propagates() {
        let effects = effects_from_json(json!({
            "success": {"side_effects": [{"type": "shell", "value": "true"}]}
        }));
        let process = FailingRunner;

        let err = resolve_simple("success", &effects, &process).unwrap_err();
        assert_eq!(err.kind(), "process");
    }

    #[test]
    fn test_unknown_side_effect_type() {
        let effects = effects_from_json(json!({
            "success": {"side_effects": [{"type": "launch-rocket", "value": null}]}
        }));
        let process = RecordingRunner::default();

        let err = resolve_simple("success", &effects, &process).unwrap_err();
        assert_eq!(err.kind(), "unknown-side-effect");
        assert!(err.to_string().contains("launch-rocket"));
    }

    #[test]
    fn test_completes_lesson_adds_to_known_set() {
        let effects = effects_from_json(json!({"success": {"completes_lesson": true}}));
        let process = RecordingRunner::default();

        let outcome = resolve_effect(
            "success",
            &effects,
            "terminal-intro",
            "task",
            Vec::new(),
            &[],
            &["older".to_string()],
            &process,
        )
        .unwrap();

        assert_eq!(
            outcome.known,
            vec!["older".to_string(), "terminal-intro".to_string()]
        );
        assert_eq!(outcome.move_to, "");
    }

    #[test]
    fn test_default_move_to_stays_on_task() {
        let effects = effects_from_json(json!({"failure": {"reply": "Try again"}}));
        let process = RecordingRunner::default();

        let outcome = resolve_effect(
            "failure",
            &effects,
            "lesson",
            "2",
            Vec::new(),
            &[],
            &[],
            &process,
        )
        .unwrap();
        assert_eq!(outcome.move_to, "2");
    }

    #[test]
    fn test_explicit_move_to_wins_over_completion() {
        let effects = effects_from_json(json!({
            "success": {"completes_lesson": true, "move_to": "bonus"}
        }));
        let process = RecordingRunner::default();

        let outcome = resolve_simple("success", &effects, &process).unwrap();
        assert_eq!(outcome.move_to, "bonus");
        assert_eq!(outcome.known, vec!["lesson".to_string()]);
    }

    #[test]
    fn test_invalid_unlock_value() {
        let effects = effects_from_json(json!({
            "success": {"side_effects": [{"type": "unlock", "value": "not-a-list"}]}
        }));
        let process = RecordingRunner::default();

        let err = resolve_simple("success", &effects, &process).unwrap_err();
        assert_eq!(err.kind(), "invalid-effect-spec");
    }
}

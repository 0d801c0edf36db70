//! Pipeline compilation.
//!
//! Turns a task's authored step specs into bound [`CompiledStep`]s. A spec
//! is either a bare type name (shorthand for `{type, value: null}`) or an
//! object with exactly the keys `type` and `value` — anything stricter or
//! looser is a definition error reported with the offending spec attached.

use std::collections::HashMap;

use regex::RegexBuilder;
use serde_json::Value;

use crate::error::{Result, TutorError};
use crate::pipeline::steps::{CompiledStep, StepKind};

/// Compile a task's step specs into an executable pipeline.
///
/// `lesson` and `task` identify the owner; the event-check step binds to
/// them so it can resolve against the right tracker key.
pub fn compile(specs: &[Value], lesson: &str, task: &str) -> Result<Vec<CompiledStep>> {
    specs
        .iter()
        .map(|spec| compile_step(spec, lesson, task))
        .collect()
}

fn compile_step(spec: &Value, lesson: &str, task: &str) -> Result<CompiledStep> {
    let (type_name, value) = normalize(spec)?;

    let kind = StepKind::parse(type_name)
        .ok_or_else(|| TutorError::unknown_step_type(type_name))?;

    match kind {
        StepKind::Input => Ok(CompiledStep::Input),

        StepKind::Regex => {
            let pattern = value.as_str().ok_or_else(|| {
                TutorError::invalid_step_config(format!(
                    "regex step value must be a pattern string, got {value}"
                ))
            })?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map_err(|e| {
                    TutorError::invalid_step_config(format!("invalid regex {pattern:?}: {e}"))
                })?;
            Ok(CompiledStep::Regex(regex))
        }

        StepKind::Shell => Ok(CompiledStep::Shell {
            env: environment_overrides(value),
        }),

        StepKind::ShellCustom => {
            let command = value
                .get("command")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    TutorError::invalid_step_config(format!(
                        "shell_custom value.command must be a string; value is {value}"
                    ))
                })?;
            Ok(CompiledStep::ShellCustom {
                command: command.to_string(),
                env: environment_overrides(value),
            })
        }

        StepKind::WaitMessage => Ok(CompiledStep::WaitMessage),

        StepKind::WrappedOutput => Ok(CompiledStep::WrappedOutput),

        StepKind::CheckExternalEvents => Ok(CompiledStep::CheckExternalEvents {
            lesson: lesson.to_string(),
            task: task.to_string(),
        }),
    }
}

/// Normalize a step spec to its (type, value) parts.
fn normalize(spec: &Value) -> Result<(&str, &Value)> {
    match spec {
        Value::String(name) => Ok((name.as_str(), &Value::Null)),
        Value::Object(map) => {
            // Exactly two keys, both present. A null value is fine; a
            // missing or extra key means the author mistyped something.
            if map.len() != 2 {
                return Err(TutorError::invalid_pipeline_spec(spec));
            }
            let type_name = match map.get("type") {
                Some(Value::String(name)) => name.as_str(),
                _ => return Err(TutorError::invalid_pipeline_spec(spec)),
            };
            let value = map
                .get("value")
                .ok_or_else(|| TutorError::invalid_pipeline_spec(spec))?;
            Ok((type_name, value))
        }
        _ => Err(TutorError::invalid_pipeline_spec(spec)),
    }
}

/// Environment overrides from a step config value.
///
/// Non-string entries are ignored rather than failing the pipeline; the
/// environment is advisory context for the learner's command.
fn environment_overrides(value: &Value) -> HashMap<String, String> {
    value
        .get("environment")
        .and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, val)| val.as_str().map(|s| (key.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

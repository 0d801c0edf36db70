//! Unified error types for the tutor service.
//!
//! Malformed lesson content is a hard stop for the request that touched it,
//! never for the whole service: every failure here is surfaced to the
//! boundary adapter as a structured (kind, message) pair and the service
//! keeps running. The core never substitutes a default result for a
//! malformed definition.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tutor operations.
#[derive(Error, Debug)]
pub enum TutorError {
    /// Unknown lesson name or task id.
    #[error("no task {task} in lesson {lesson}")]
    TaskNotFound { lesson: String, task: String },

    /// A step spec is neither a bare type name nor a `{type, value}` object.
    #[error("invalid step spec: {spec}")]
    InvalidPipelineSpec { spec: String },

    /// A step spec references a step type the library does not know.
    #[error("unknown step type: {step_type}")]
    UnknownStepType { step_type: String },

    /// A step's config is the wrong shape for its type.
    #[error("invalid step config: {message}")]
    InvalidStepConfig { message: String },

    /// No armed output had all of its events satisfied.
    ///
    /// Every reachable state must have at least one satisfiable output, so
    /// this indicates broken lesson authoring, not a transient condition.
    #[error("no outputs were satisfied by events [{}] for {lesson}/{task}; at any given point one output must be satisfiable", events.join(", "))]
    NoOutputSatisfied {
        lesson: String,
        task: String,
        events: Vec<String>,
    },

    /// More than one satisfied output survived the subsumption filter.
    ///
    /// The lesson's `subsumes` declarations are contradictory: each output's
    /// event set must be a strict superset of every other output it can
    /// co-trigger with.
    #[error("outputs [{}] all matched with events [{}] satisfied; exactly one output must subsume the rest", outputs.join(", "), events.join(", "))]
    AmbiguousOutputs {
        outputs: Vec<String>,
        events: Vec<String>,
    },

    /// The pipeline produced a result code with no entry in the effect table.
    #[error("no effect for result {result} (effects define: {})", known.join(", "))]
    UnknownResultCode { result: String, known: Vec<String> },

    /// An effect's reply is neither a string nor an object.
    #[error("invalid effect spec: {message}")]
    InvalidEffectSpec { message: String },

    /// An effect declares a side effect type the resolver does not know.
    #[error("unknown side effect type: {kind}")]
    UnknownSideEffect { kind: String },

    /// A clue was registered with an unknown kind.
    #[error("unknown clue kind {kind} (known kinds: {})", known.join(", "))]
    UnknownClueType { kind: String, known: Vec<String> },

    /// I/O errors from the settings store or lessons file.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Failures from the process collaborator while running a shell step.
    #[error("process error: {message}")]
    Process { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for tutor operations.
pub type Result<T> = std::result::Result<T, TutorError>;

impl TutorError {
    /// Create a task-not-found error.
    pub fn task_not_found(lesson: impl Into<String>, task: impl Into<String>) -> Self {
        Self::TaskNotFound {
            lesson: lesson.into(),
            task: task.into(),
        }
    }

    /// Create an invalid-pipeline-spec error carrying the offending spec.
    pub fn invalid_pipeline_spec(spec: &serde_json::Value) -> Self {
        Self::InvalidPipelineSpec {
            spec: spec.to_string(),
        }
    }

    /// Create an unknown-step-type error.
    pub fn unknown_step_type(step_type: impl Into<String>) -> Self {
        Self::UnknownStepType {
            step_type: step_type.into(),
        }
    }

    /// Create an invalid-step-config error.
    pub fn invalid_step_config(message: impl Into<String>) -> Self {
        Self::InvalidStepConfig {
            message: message.into(),
        }
    }

    /// Create an invalid-effect-spec error.
    pub fn invalid_effect_spec(message: impl Into<String>) -> Self {
        Self::InvalidEffectSpec {
            message: message.into(),
        }
    }

    /// Create an unknown-side-effect error.
    pub fn unknown_side_effect(kind: impl Into<String>) -> Self {
        Self::UnknownSideEffect { kind: kind.into() }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a process error.
    pub fn process(message: impl Into<String>) -> Self {
        Self::Process {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable kind name for this error.
    ///
    /// Boundary adapters (D-Bus, RPC) surface errors as (kind, message)
    /// pairs; the kind is part of the wire contract and must not change
    /// when messages are reworded.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TaskNotFound { .. } => "task-not-found",
            Self::InvalidPipelineSpec { .. } => "invalid-pipeline-spec",
            Self::UnknownStepType { .. } => "unknown-step-type",
            Self::InvalidStepConfig { .. } => "invalid-step-config",
            Self::NoOutputSatisfied { .. } => "no-output-satisfied",
            Self::AmbiguousOutputs { .. } => "ambiguous-outputs",
            Self::UnknownResultCode { .. } => "unknown-result-code",
            Self::InvalidEffectSpec { .. } => "invalid-effect-spec",
            Self::UnknownSideEffect { .. } => "unknown-side-effect",
            Self::UnknownClueType { .. } => "unknown-clue-type",
            Self::Storage { .. } => "storage",
            Self::Serde { .. } => "serde",
            Self::Process { .. } => "process",
            Self::Config { .. } => "config",
        }
    }

    /// Whether this error indicates contradictory lesson authoring.
    ///
    /// These are logic errors in the descriptor data, not transient
    /// failures, and deserve the author's attention rather than a retry.
    pub fn is_authoring_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPipelineSpec { .. }
                | Self::UnknownStepType { .. }
                | Self::InvalidStepConfig { .. }
                | Self::NoOutputSatisfied { .. }
                | Self::AmbiguousOutputs { .. }
                | Self::UnknownResultCode { .. }
                | Self::InvalidEffectSpec { .. }
                | Self::UnknownSideEffect { .. }
        )
    }
}

impl From<io::Error> for TutorError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for TutorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_not_found_display() {
        let err = TutorError::task_not_found("terminal-intro", "3");
        assert_eq!(err.to_string(), "no task 3 in lesson terminal-intro");
    }

    #[test]
    fn test_invalid_pipeline_spec_carries_offender() {
        let spec = serde_json::json!({"type": "regex"});
        let err = TutorError::invalid_pipeline_spec(&spec);
        assert!(err.to_string().contains("\"regex\""));
    }

    #[test]
    fn test_no_output_satisfied_lists_events() {
        let err = TutorError::NoOutputSatisfied {
            lesson: "l".to_string(),
            task: "t".to_string(),
            events: vec!["e1".to_string(), "e2".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("e1, e2"));
        assert!(message.contains("l/t"));
    }

    #[test]
    fn test_ambiguous_outputs_lists_survivors() {
        let err = TutorError::AmbiguousOutputs {
            outputs: vec!["a".to_string(), "b".to_string()],
            events: vec!["e1".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("[a, b]"));
        assert!(message.contains("[e1]"));
    }

    #[test]
    fn test_unknown_result_code_lists_known() {
        let err = TutorError::UnknownResultCode {
            result: "maybe".to_string(),
            known: vec!["success".to_string(), "failure".to_string()],
        };
        assert!(err.to_string().contains("success, failure"));
    }

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(
            TutorError::task_not_found("l", "t").kind(),
            "task-not-found"
        );
        assert_eq!(
            TutorError::unknown_side_effect("beep").kind(),
            "unknown-side-effect"
        );
        assert_eq!(TutorError::serde("x").kind(), "serde");
    }

    #[test]
    fn test_authoring_errors_flagged() {
        assert!(TutorError::unknown_step_type("x").is_authoring_error());
        assert!(TutorError::invalid_effect_spec("x").is_authoring_error());
        assert!(!TutorError::process("spawn failed").is_authoring_error());
        assert!(!TutorError::config("bad toml").is_authoring_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: TutorError = io_err.into();
        assert!(matches!(err, TutorError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: TutorError = json_err.into();
        assert!(matches!(err, TutorError::Serde { .. }));
    }
}

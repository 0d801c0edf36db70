//! Process execution seam for shell steps and shell side effects.
//!
//! The core never spawns processes directly; it goes through the
//! [`ProcessRunner`] trait so the pipeline stays testable and the spawning
//! primitives stay replaceable.

use std::collections::HashMap;
use std::process::Command;
use std::sync::Arc;

use crate::error::{Result, TutorError};

/// Captured output of one executed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Raw exit status.
    pub status: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Trait for the process execution collaborator.
pub trait ProcessRunner: Send + Sync {
    /// Execute `argv` with the process environment merged with `env`.
    ///
    /// Overrides in `env` win over inherited variables. A spawn failure is
    /// an error; a non-zero exit status is not (shell steps append
    /// `; exit 0` precisely so the pipeline sees the output either way).
    fn exec(&self, argv: &[String], env: &HashMap<String, String>) -> Result<ExecOutput>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for Arc<T> {
    fn exec(&self, argv: &[String], env: &HashMap<String, String>) -> Result<ExecOutput> {
        (**self).exec(argv, env)
    }
}

/// Build the argv for running a line of shellcode.
///
/// The trailing `exit 0` keeps a failing exercise command from looking like
/// a failed step: the learner's output, not the exit status, is what the
/// pipeline inspects.
pub fn shell_argv(shellcode: &str) -> Vec<String> {
    vec![
        "/bin/bash".to_string(),
        "-c".to_string(),
        format!("{shellcode}; exit 0"),
    ]
}

/// Real process runner backed by `std::process`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for ShellRunner {
    fn exec(&self, argv: &[String], env: &HashMap<String, String>) -> Result<ExecOutput> {
        let program = argv
            .first()
            .ok_or_else(|| TutorError::process("cannot execute an empty argv"))?;

        let output = Command::new(program)
            .args(&argv[1..])
            .envs(env)
            .output()
            .map_err(|e| {
                TutorError::process(format!("failed to execute {}: {}", argv.join(" "), e))
            })?;

        Ok(ExecOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

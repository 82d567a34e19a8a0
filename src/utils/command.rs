//! Command execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Error, Result};

/// Run a command and return stdout on success.
///
/// Returns trimmed stdout if the command succeeds.
/// Returns an error with stderr (or stdout fallback) if it fails.
pub fn run(program: &str, args: &[&str], context: &str) -> Result<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::internal_io(format!("Failed to run {}: {}", context, e), Some(context.to_string())))?;

    if !output.status.success() {
        return Err(Error::internal_io(format!(
            "{} failed: {}",
            context,
            error_text(&output)
        ), Some(context.to_string())));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a command in `dir`, keeping both streams whatever the exit status.
///
/// Only a failure to spawn is an error; callers decide what a non-zero exit means.
pub fn capture_in(dir: &Path, program: &str, args: &[String], context: &str) -> Result<CommandRun> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::internal_io(format!("Failed to run {}: {}", context, e), Some(context.to_string())))?;

    Ok(CommandRun {
        success: output.status.success(),
        exit_code: output.status.code(),
        output: CapturedOutput::new(
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        ),
    })
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

use serde::Serialize;

/// Captured output from command execution.
/// Reusable primitive for any command that executes external processes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CapturedOutput {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CapturedOutput {
    pub fn new(stdout: String, stderr: String) -> Self {
        Self { stdout, stderr }
    }

    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

/// Result of [`capture_in`].
#[derive(Debug, Clone)]
pub struct CommandRun {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub output: CapturedOutput,
}

//! External command execution
//!
//! Every provisioning step shells out to an external CLI (`aws`,
//! `dehydrated`, `lexicon`). This module provides the single seam through
//! which those processes are driven: a [`CommandRunner`] trait with a real
//! [`SystemRunner`] implementation, and helpers for exit-status checking and
//! JSON response parsing.
//!
//! Invoked processes inherit the parent environment; credentials for the
//! AWS CLI and the lexicon DNS hook are passed that way, never as arguments.

use std::process::Command;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors from driving an external command
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}: {stderr}")]
    NonZero {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} produced malformed JSON: {source}")]
    Json {
        program: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A fully specified external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name, resolved via PATH
    pub program: String,
    /// Arguments in order
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured result of a completed command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Seam for external process execution
///
/// The pipeline only ever talks to external CLIs through this trait, so
/// tests can substitute a scripted runner and exercise every step without
/// touching real cloud resources.
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing stdout and stderr
    ///
    /// A non-zero exit is NOT an error at this level; callers that need to
    /// distinguish "resource not found" from transport failures inspect the
    /// returned output themselves. Use [`run_checked`] when any non-zero
    /// exit is fatal.
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError>;
}

/// Real command execution via `std::process::Command`
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        debug!(command = %spec, "Running external command");

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .output()
            .map_err(|source| ExecError::Spawn {
                program: spec.program.clone(),
                source,
            })?;

        let result = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        trace!(
            command = %spec.program,
            code = ?result.code,
            stdout_bytes = result.stdout.len(),
            "External command completed"
        );

        Ok(result)
    }
}

/// Run a command and fail on any non-zero exit
pub fn run_checked(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> Result<CommandOutput, ExecError> {
    let output = runner.run(spec)?;
    if !output.success() {
        return Err(ExecError::NonZero {
            program: spec.program.clone(),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}

/// Run a command and deserialize its stdout as JSON
pub fn run_json<T: DeserializeOwned>(
    runner: &dyn CommandRunner,
    spec: &CommandSpec,
) -> Result<T, ExecError> {
    let output = run_checked(runner, spec)?;
    serde_json::from_str(&output.stdout).map_err(|source| ExecError::Json {
        program: spec.program.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn spec_builds_in_order() {
        let spec = CommandSpec::new("aws")
            .arg("acm")
            .arg("list-certificates")
            .args(["--region", "us-east-1"]);
        assert_eq!(spec.program, "aws");
        assert_eq!(
            spec.args,
            vec!["acm", "list-certificates", "--region", "us-east-1"]
        );
        assert_eq!(spec.to_string(), "aws acm list-certificates --region us-east-1");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_stdout() {
        let output = SystemRunner
            .run(&CommandSpec::new("echo").arg("hello"))
            .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn run_checked_rejects_nonzero_exit() {
        let err = run_checked(&SystemRunner, &CommandSpec::new("false")).unwrap_err();
        match err {
            ExecError::NonZero { program, code, .. } => {
                assert_eq!(program, "false");
                assert_eq!(code, Some(1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn spawn_failure_is_reported() {
        let err = SystemRunner
            .run(&CommandSpec::new("edgebind-no-such-binary"))
            .unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn run_json_parses_stdout() {
        #[derive(Deserialize)]
        struct Reply {
            ok: bool,
        }

        let spec = CommandSpec::new("echo").arg(r#"{"ok": true}"#);
        let reply: Reply = run_json(&SystemRunner, &spec).unwrap();
        assert!(reply.ok);
    }

    #[cfg(unix)]
    #[test]
    fn run_json_flags_malformed_output() {
        let spec = CommandSpec::new("echo").arg("not json");
        let err = run_json::<serde_json::Value>(&SystemRunner, &spec).unwrap_err();
        assert!(matches!(err, ExecError::Json { .. }));
    }
}

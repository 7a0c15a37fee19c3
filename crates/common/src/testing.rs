//! Scripted command runner for tests
//!
//! Lets dependent crates script external-CLI conversations: each expected
//! command is keyed by program (and, for `aws`, service and operation) and
//! yields canned outputs in FIFO order. Running a command with no scripted
//! response panics, which keeps tests honest about exactly which external
//! calls a code path makes.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::exec::{CommandOutput, CommandRunner, CommandSpec, ExecError};

/// Scripted [`CommandRunner`] that records every invocation
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, VecDeque<CommandOutput>>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the given command key
    ///
    /// Keys are `"aws <service> <operation>"` for the AWS CLI and the bare
    /// program name for everything else (see [`command_key`]).
    pub fn expect(self, key: &str, output: CommandOutput) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(output);
        self
    }

    /// All commands run so far, in order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any recorded command matches the key
    pub fn was_called(&self, key: &str) -> bool {
        self.calls().iter().any(|spec| command_key(spec) == key)
    }

    /// The recorded invocations matching the key
    pub fn calls_for(&self, key: &str) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|spec| command_key(spec) == key)
            .collect()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, ExecError> {
        self.calls.lock().unwrap().push(spec.clone());

        let key = command_key(spec);
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(output) => Ok(output),
            None => panic!("unscripted command: {spec}"),
        }
    }
}

/// Key identifying a command for scripting purposes
///
/// The AWS CLI multiplexes many operations behind one binary, so its key
/// includes the service and operation arguments.
pub fn command_key(spec: &CommandSpec) -> String {
    if spec.program == "aws" && spec.args.len() >= 2 {
        format!("aws {} {}", spec.args[0], spec.args[1])
    } else {
        spec.program.clone()
    }
}

/// Successful invocation producing the given stdout
pub fn ok_output(stdout: &str) -> CommandOutput {
    CommandOutput {
        code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

/// Failed invocation with the given stderr, as the AWS CLI reports errors
pub fn error_output(stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(254),
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// AWS CLI failure for a resource that does not exist
pub fn not_found_output(resource: &str) -> CommandOutput {
    error_output(&format!(
        "An error occurred (NotFoundException) when calling the operation: {resource} not found"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_are_served_in_order() {
        let runner = ScriptedRunner::new()
            .expect("aws acm list-certificates", ok_output("first"))
            .expect("aws acm list-certificates", ok_output("second"));

        let spec = CommandSpec::new("aws").args(["acm", "list-certificates"]);
        assert_eq!(runner.run(&spec).unwrap().stdout, "first");
        assert_eq!(runner.run(&spec).unwrap().stdout, "second");
        assert_eq!(runner.calls_for("aws acm list-certificates").len(), 2);
    }

    #[test]
    #[should_panic(expected = "unscripted command")]
    fn unscripted_command_panics() {
        let runner = ScriptedRunner::new();
        let _ = runner.run(&CommandSpec::new("lexicon"));
    }
}

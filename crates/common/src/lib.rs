//! Common utilities for Edgebind
//!
//! Provides the external-command execution seam used by every provisioning
//! step, plus small filesystem helpers shared across crates.

pub mod exec;
pub mod path;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use exec::{run_checked, run_json, CommandOutput, CommandRunner, CommandSpec, ExecError, SystemRunner};
pub use path::find_executable;

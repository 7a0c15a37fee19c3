//! Preflight checks
//!
//! Validates that every external executable the pipeline shells out to is
//! present on the PATH before anything else runs. Environment variables are
//! validated separately by `edgebind_config`.

use edgebind_common::find_executable;
use thiserror::Error;
use tracing::debug;

/// Executables the pipeline invokes
pub const REQUIRED_EXECUTABLES: [&str; 3] = ["aws", "dehydrated", "lexicon"];

#[derive(Debug, Error)]
pub enum PreflightError {
    #[error("{0} executable is not available on the PATH")]
    MissingExecutable(String),
}

/// Verify all required executables are installed
///
/// Fails on the first missing executable; there is no point continuing
/// without any one of them.
pub fn check_executables() -> Result<(), PreflightError> {
    for name in REQUIRED_EXECUTABLES {
        match find_executable(name) {
            Some(path) => debug!(executable = name, path = %path.display(), "Found executable"),
            None => return Err(PreflightError::MissingExecutable(name.to_string())),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_set_is_stable() {
        assert_eq!(REQUIRED_EXECUTABLES, ["aws", "dehydrated", "lexicon"]);
    }

    #[test]
    fn error_names_the_missing_executable() {
        let err = PreflightError::MissingExecutable("dehydrated".to_string());
        assert_eq!(
            err.to_string(),
            "dehydrated executable is not available on the PATH"
        );
    }
}

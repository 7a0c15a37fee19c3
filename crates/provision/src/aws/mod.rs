//! AWS CLI wrappers
//!
//! Drives `aws acm` and `aws apigateway` through the command-runner seam
//! and parses their JSON responses into typed structs.
//!
//! Lookups that probe for existence ([`AwsCli::get_domain_name`],
//! [`AwsCli::get_base_path_mapping`]) return `Ok(None)` only when the CLI
//! reports a `NotFoundException`; any other failure propagates as an error
//! so transport faults are never masked as "does not exist".

mod acm;
mod apigateway;

pub use acm::CertificateSummary;
pub use apigateway::{BasePathMapping, DomainNameInfo, RestApi};

use edgebind_common::{CommandOutput, CommandRunner, CommandSpec, ExecError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwsError {
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Wrapper over the `aws` CLI
pub struct AwsCli<'a> {
    runner: &'a dyn CommandRunner,
    region: String,
}

impl<'a> AwsCli<'a> {
    pub fn new(runner: &'a dyn CommandRunner, region: impl Into<String>) -> Self {
        Self {
            runner,
            region: region.into(),
        }
    }

    pub(crate) fn runner(&self) -> &dyn CommandRunner {
        self.runner
    }

    /// Base invocation for a service operation, with the region applied
    pub(crate) fn command(&self, service: &str, operation: &str) -> CommandSpec {
        CommandSpec::new("aws")
            .arg(service)
            .arg(operation)
            .args(["--region", self.region.as_str()])
    }
}

/// Whether a failed CLI call means the resource does not exist
pub(crate) fn is_not_found(output: &CommandOutput) -> bool {
    output.stderr.contains("NotFoundException")
}

/// Map a failed lookup to either "absent" or a real error
pub(crate) fn absent_or_error(
    spec: &CommandSpec,
    output: &CommandOutput,
) -> Result<(), AwsError> {
    if is_not_found(output) {
        return Ok(());
    }
    Err(AwsError::Exec(ExecError::NonZero {
        program: spec.program.clone(),
        code: output.code,
        stderr: output.stderr.trim().to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgebind_common::testing::{error_output, not_found_output};

    #[test]
    fn not_found_is_recognized() {
        assert!(is_not_found(&not_found_output("domain")));
        assert!(!is_not_found(&error_output("connection timed out")));
    }

    #[test]
    fn transport_errors_are_not_absence() {
        let spec = CommandSpec::new("aws").args(["apigateway", "get-domain-name"]);
        let output = error_output("Could not connect to the endpoint URL");
        assert!(absent_or_error(&spec, &output).is_err());
        assert!(absent_or_error(&spec, &not_found_output("domain")).is_ok());
    }
}

//! Pipeline error type

use thiserror::Error;

use crate::aws::AwsError;
use crate::dns::DnsError;
use crate::issuer::IssueError;

/// Errors that abort a provisioning run
///
/// All variants map to a non-zero process exit. Logical mismatches
/// ([`ProvisionError::MappingMismatch`]) are detected and reported rather
/// than silently overwritten.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("API gateway '{0}' does not exist")]
    GatewayNotFound(String),

    #[error("certificate import returned no ARN")]
    ImportFailed,

    #[error("no distribution endpoint returned for '{0}'")]
    MissingEndpoint(String),

    #[error(
        "custom domain '{domain}' is mapped to gateway '{found}', expected '{expected}'"
    )]
    MappingMismatch {
        domain: String,
        found: String,
        expected: String,
    },

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error(transparent)]
    Issue(#[from] IssueError),

    #[error(transparent)]
    Dns(#[from] DnsError),

    #[error("cleanup failed: {0}")]
    Cleanup(#[from] std::io::Error),
}

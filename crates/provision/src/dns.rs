//! DNS publication via lexicon
//!
//! Publishes the CNAME that points the custom domain at the gateway's
//! distribution endpoint. Lexicon reads its provider credentials from the
//! inherited environment. The invocation is awaited and its exit status
//! checked; record propagation remains the provider's concern.

use edgebind_common::{run_checked, CommandRunner, CommandSpec, ExecError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DnsError {
    #[error("lexicon CNAME publication failed: {0}")]
    Exec(#[from] ExecError),
}

/// CNAME upsert through the lexicon CLI
pub struct DnsPublisher<'a> {
    runner: &'a dyn CommandRunner,
    provider: &'a str,
}

impl<'a> DnsPublisher<'a> {
    pub fn new(runner: &'a dyn CommandRunner, provider: &'a str) -> Self {
        Self { runner, provider }
    }

    /// Create or update the CNAME record for the domain
    pub fn publish_cname(&self, domain: &str, target: &str) -> Result<(), DnsError> {
        info!(
            domain = %domain,
            target = %target,
            provider = %self.provider,
            "Publishing CNAME record"
        );

        let spec = CommandSpec::new("lexicon")
            .arg(self.provider)
            .arg("create")
            .arg(domain)
            .arg("CNAME")
            .arg(format!("--name={domain}"))
            .arg(format!("--content={target}"));

        run_checked(self.runner, &spec)?;
        Ok(())
    }
}

//! The provisioning pipeline
//!
//! A single linear pass over the provisioning steps. Each step shells out
//! through the command-runner seam and the whole run aborts on the first
//! failure; nothing is retried.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use edgebind_common::CommandRunner;
use edgebind_config::{Config, Workspace};

use crate::aws::AwsCli;
use crate::cleanup;
use crate::dns::DnsPublisher;
use crate::error::ProvisionError;
use crate::issuer::Issuer;

/// Certificates expiring within this window are renewed
pub const RENEWAL_WINDOW_DAYS: i64 = 10;

/// Reuse rule: keep the certificate only while it outlives the renewal window
pub fn should_reuse(not_after: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    not_after > now + Duration::days(RENEWAL_WINDOW_DAYS)
}

/// Orchestrates one provisioning run
pub struct Provisioner<'a> {
    config: &'a Config,
    workspace: &'a Workspace,
    runner: &'a dyn CommandRunner,
}

impl<'a> Provisioner<'a> {
    pub fn new(
        config: &'a Config,
        workspace: &'a Workspace,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            workspace,
            runner,
        }
    }

    /// Run the full pipeline
    pub fn run(&self) -> Result<(), ProvisionError> {
        let domain = &self.config.domain;
        let aws = AwsCli::new(self.runner, &self.config.region);

        // Nothing else matters if the gateway is absent.
        info!(gateway = %self.config.gateway_name, "Resolving API gateway");
        let api = aws
            .find_rest_api(&self.config.gateway_name)?
            .ok_or_else(|| ProvisionError::GatewayNotFound(self.config.gateway_name.clone()))?;

        let existing = aws.find_certificate(domain)?;
        let reuse_arn = self.resolve_reusable(&aws, existing.as_ref())?;

        let issuer = Issuer::new(self.runner, self.workspace);
        issuer.write_acme_config()?;

        let certificate_arn = match reuse_arn {
            Some(arn) => {
                info!(domain = %domain, arn = %arn, "Certificate valid beyond renewal window, skipping issuance");
                arn
            }
            None => {
                issuer.issue(domain)?;
                let material = issuer.load_material(domain)?;
                let prior_arn = existing.as_ref().map(|c| c.certificate_arn.as_str());
                aws.import_certificate(&material, prior_arn)?
                    .ok_or(ProvisionError::ImportFailed)?
            }
        };

        let endpoint = self.register_domain(&aws, domain, &certificate_arn)?;

        DnsPublisher::new(self.runner, &self.config.provider).publish_cname(domain, &endpoint)?;

        self.verify_base_path_mapping(&aws, domain, &api.id)?;

        if self.config.cleanup {
            cleanup::remove_transients(self.workspace, domain)?;
        } else {
            info!(domain = %domain, "Cleanup disabled, keeping transient files");
        }

        info!(
            domain = %domain,
            gateway_id = %api.id,
            endpoint = %endpoint,
            "Custom domain provisioned"
        );
        Ok(())
    }

    /// Decide whether the existing certificate can be reused
    fn resolve_reusable(
        &self,
        aws: &AwsCli<'_>,
        existing: Option<&crate::aws::CertificateSummary>,
    ) -> Result<Option<String>, ProvisionError> {
        let Some(cert) = existing else {
            info!(domain = %self.config.domain, "No existing certificate, issuance required");
            return Ok(None);
        };

        match aws.certificate_expiry(&cert.certificate_arn)? {
            Some(not_after) if should_reuse(not_after, Utc::now()) => {
                Ok(Some(cert.certificate_arn.clone()))
            }
            Some(not_after) => {
                info!(
                    domain = %self.config.domain,
                    expires = %not_after,
                    "Certificate expires within {RENEWAL_WINDOW_DAYS} days, renewing"
                );
                Ok(None)
            }
            None => {
                warn!(
                    domain = %self.config.domain,
                    arn = %cert.certificate_arn,
                    "Certificate reports no expiry, renewing"
                );
                Ok(None)
            }
        }
    }

    /// Create or update the custom domain and return its endpoint hostname
    fn register_domain(
        &self,
        aws: &AwsCli<'_>,
        domain: &str,
        certificate_arn: &str,
    ) -> Result<String, ProvisionError> {
        let endpoint = match aws.get_domain_name(domain)? {
            Some(info) => {
                info!(domain = %domain, "Domain already registered, updating certificate reference");
                let updated = aws.update_domain_name(domain, certificate_arn)?;
                updated
                    .endpoint()
                    .or(info.endpoint())
                    .map(str::to_string)
            }
            None => {
                info!(domain = %domain, "Registering domain with API gateway");
                let created = aws.create_domain_name(domain, certificate_arn)?;
                created.endpoint().map(str::to_string)
            }
        };

        endpoint.ok_or_else(|| ProvisionError::MissingEndpoint(domain.to_string()))
    }

    /// Ensure the root base-path mapping points at the resolved gateway
    ///
    /// An existing mapping to a different gateway fails the run instead of
    /// being overwritten.
    fn verify_base_path_mapping(
        &self,
        aws: &AwsCli<'_>,
        domain: &str,
        gateway_id: &str,
    ) -> Result<(), ProvisionError> {
        match aws.get_base_path_mapping(domain)? {
            Some(mapping) if mapping.rest_api_id == gateway_id => {
                info!(domain = %domain, gateway_id = %gateway_id, "Domain already mapped to gateway");
                Ok(())
            }
            Some(mapping) => Err(ProvisionError::MappingMismatch {
                domain: domain.to_string(),
                found: mapping.rest_api_id,
                expected: gateway_id.to_string(),
            }),
            None => {
                info!(domain = %domain, gateway_id = %gateway_id, "Creating base-path mapping");
                aws.create_base_path_mapping(domain, gateway_id)?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reuse_boundary_is_strict() {
        let now = Utc::now();
        assert!(!should_reuse(now + Duration::days(RENEWAL_WINDOW_DAYS), now));
        assert!(should_reuse(
            now + Duration::days(RENEWAL_WINDOW_DAYS) + Duration::seconds(1),
            now
        ));
        assert!(!should_reuse(now - Duration::days(1), now));
    }

    proptest! {
        #[test]
        fn reuse_iff_beyond_window(offset_secs in -400i64 * 86_400..400 * 86_400) {
            let now = Utc::now();
            let not_after = now + Duration::seconds(offset_secs);
            let expected = offset_secs > RENEWAL_WINDOW_DAYS * 86_400;
            prop_assert_eq!(should_reuse(not_after, now), expected);
        }
    }
}

//! API Gateway operations: REST API lookup, custom domains, base-path mappings

use edgebind_common::run_json;
use serde::Deserialize;
use tracing::debug;

use super::{absent_or_error, AwsCli, AwsError};

/// One entry from `apigateway get-rest-apis`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestApi {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestApisPage {
    #[serde(default)]
    items: Vec<RestApi>,
    position: Option<String>,
}

/// Custom domain resource as returned by the domain-name operations
///
/// Edge-optimized domains report `distributionDomainName`; regional ones
/// report `regionalDomainName`. [`DomainNameInfo::endpoint`] takes whichever
/// is present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainNameInfo {
    pub domain_name: Option<String>,
    pub distribution_domain_name: Option<String>,
    pub regional_domain_name: Option<String>,
}

impl DomainNameInfo {
    /// Hostname the custom domain must be pointed at via DNS
    pub fn endpoint(&self) -> Option<&str> {
        self.distribution_domain_name
            .as_deref()
            .or(self.regional_domain_name.as_deref())
    }
}

/// Base-path binding of a custom domain to a REST API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePathMapping {
    pub rest_api_id: String,
    #[serde(default)]
    pub base_path: Option<String>,
}

/// Base path value for the root mapping
const ROOT_BASE_PATH: &str = "(none)";

impl AwsCli<'_> {
    /// Resolve a REST API by name, walking `position` pages
    pub fn find_rest_api(&self, name: &str) -> Result<Option<RestApi>, AwsError> {
        let mut position: Option<String> = None;

        loop {
            let mut spec = self.command("apigateway", "get-rest-apis");
            if let Some(ref p) = position {
                spec = spec.args(["--position", p.as_str()]);
            }

            let page: RestApisPage = run_json(self.runner(), &spec)?;

            if let Some(api) = page.items.into_iter().find(|api| api.name == name) {
                debug!(name = %name, id = %api.id, "Resolved API gateway");
                return Ok(Some(api));
            }

            match page.position {
                Some(next) => position = Some(next),
                None => return Ok(None),
            }
        }
    }

    /// Look up an existing custom domain registration
    pub fn get_domain_name(&self, domain: &str) -> Result<Option<DomainNameInfo>, AwsError> {
        let spec = self
            .command("apigateway", "get-domain-name")
            .args(["--domain-name", domain]);

        let output = self.runner().run(&spec)?;
        if !output.success() {
            absent_or_error(&spec, &output)?;
            return Ok(None);
        }

        let info: DomainNameInfo =
            serde_json::from_str(&output.stdout).map_err(|source| {
                edgebind_common::ExecError::Json {
                    program: spec.program.clone(),
                    source,
                }
            })?;
        Ok(Some(info))
    }

    /// Register a new custom domain with the certificate reference
    pub fn create_domain_name(
        &self,
        domain: &str,
        certificate_arn: &str,
    ) -> Result<DomainNameInfo, AwsError> {
        let spec = self
            .command("apigateway", "create-domain-name")
            .args(["--domain-name", domain])
            .args(["--certificate-name", domain])
            .args(["--certificate-arn", certificate_arn]);

        let info = run_json(self.runner(), &spec)?;
        Ok(info)
    }

    /// Patch the certificate reference of an existing custom domain
    pub fn update_domain_name(
        &self,
        domain: &str,
        certificate_arn: &str,
    ) -> Result<DomainNameInfo, AwsError> {
        let patch = format!("op=replace,path=/certificateArn,value={certificate_arn}");
        let spec = self
            .command("apigateway", "update-domain-name")
            .args(["--domain-name", domain])
            .args(["--patch-operations", patch.as_str()]);

        let info = run_json(self.runner(), &spec)?;
        Ok(info)
    }

    /// Look up the root base-path mapping for a custom domain
    pub fn get_base_path_mapping(
        &self,
        domain: &str,
    ) -> Result<Option<BasePathMapping>, AwsError> {
        let spec = self
            .command("apigateway", "get-base-path-mapping")
            .args(["--domain-name", domain])
            .args(["--base-path", ROOT_BASE_PATH]);

        let output = self.runner().run(&spec)?;
        if !output.success() {
            absent_or_error(&spec, &output)?;
            return Ok(None);
        }

        let mapping: BasePathMapping =
            serde_json::from_str(&output.stdout).map_err(|source| {
                edgebind_common::ExecError::Json {
                    program: spec.program.clone(),
                    source,
                }
            })?;
        Ok(Some(mapping))
    }

    /// Bind the custom domain root path to a REST API
    pub fn create_base_path_mapping(
        &self,
        domain: &str,
        rest_api_id: &str,
    ) -> Result<(), AwsError> {
        let spec = self
            .command("apigateway", "create-base-path-mapping")
            .args(["--domain-name", domain])
            .args(["--rest-api-id", rest_api_id]);

        edgebind_common::run_checked(self.runner(), &spec)?;
        Ok(())
    }
}

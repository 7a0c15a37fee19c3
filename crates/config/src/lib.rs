//! Environment-derived configuration for Edgebind
//!
//! Behavior is fully driven by environment variables so the binary can run
//! with no arguments inside CI jobs. The variables are deserialized into an
//! explicit [`Config`] struct up front; nothing downstream reads the
//! environment directly.
//!
//! # Variables
//!
//! | Variable | Required | Default |
//! |----------|----------|---------|
//! | `DOMAIN` | yes | — |
//! | `API_GATEWAY_NAME` | yes | — |
//! | `AWS_ACCESS_KEY_ID` | yes | — |
//! | `AWS_SECRET_ACCESS_KEY` | yes | — |
//! | `PROVIDER` | no | `cloudflare` |
//! | `LEXICON_<PROVIDER>_USERNAME` | yes | — |
//! | `LEXICON_<PROVIDER>_TOKEN` | yes | — |
//! | `AWS_DEFAULT_REGION` | no | `us-east-1` |
//! | `CLEANUP` | no | `true` |
//!
//! The AWS and lexicon credentials are presence-checked only; they are
//! consumed by the invoked CLIs, which inherit the process environment.

mod workspace;

use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub use workspace::Workspace;

/// Default DNS provider for lexicon
pub const DEFAULT_PROVIDER: &str = "cloudflare";

/// Default AWS region; edge-optimized custom domains require us-east-1 certificates
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be specified")]
    MissingVar(String),

    #[error("invalid value for {var}: {message}")]
    InvalidVar { var: String, message: String },
}

/// Raw environment shape as envy sees it
#[derive(Debug, Deserialize)]
struct RawEnv {
    domain: String,
    api_gateway_name: String,
    #[serde(default = "default_provider")]
    provider: String,
    #[serde(default = "default_region")]
    aws_default_region: String,
    #[serde(default = "default_cleanup")]
    cleanup: bool,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_cleanup() -> bool {
    true
}

/// Resolved run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Custom hostname being provisioned
    pub domain: String,
    /// API gateway name to resolve
    pub gateway_name: String,
    /// Lexicon DNS provider name, lower case
    pub provider: String,
    /// AWS region for all CLI calls
    pub region: String,
    /// Whether to remove transient certificate files after a run
    pub cleanup: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit variable set
    ///
    /// Separated from [`Config::from_env`] so tests can supply variables
    /// without mutating process-global state.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();

        let raw: RawEnv = envy::from_iter(vars.clone()).map_err(|e| match e {
            envy::Error::MissingValue(field) => ConfigError::MissingVar(field.to_uppercase()),
            envy::Error::Custom(message) => ConfigError::InvalidVar {
                var: "environment".to_string(),
                message,
            },
        })?;

        // Credentials consumed by the invoked CLIs; presence-checked here so
        // the run fails before any external call.
        for var in ["AWS_ACCESS_KEY_ID", "AWS_SECRET_ACCESS_KEY"] {
            if !vars.contains_key(var) {
                return Err(ConfigError::MissingVar(var.to_string()));
            }
        }

        let provider = raw.provider.to_lowercase();
        for var in lexicon_credential_vars(&provider) {
            if !vars.contains_key(&var) {
                return Err(ConfigError::MissingVar(var));
            }
        }

        let config = Self {
            domain: raw.domain,
            gateway_name: raw.api_gateway_name,
            provider,
            region: raw.aws_default_region,
            cleanup: raw.cleanup,
        };

        debug!(
            domain = %config.domain,
            gateway = %config.gateway_name,
            provider = %config.provider,
            region = %config.region,
            cleanup = config.cleanup,
            "Loaded configuration"
        );

        Ok(config)
    }
}

/// Credential variable names for a lexicon provider
///
/// Lexicon keys its credentials by provider, e.g. `LEXICON_CLOUDFLARE_USERNAME`
/// and `LEXICON_CLOUDFLARE_TOKEN` for the default provider.
pub fn lexicon_credential_vars(provider: &str) -> [String; 2] {
    let upper = provider.to_uppercase();
    [
        format!("LEXICON_{upper}_USERNAME"),
        format!("LEXICON_{upper}_TOKEN"),
    ]
}

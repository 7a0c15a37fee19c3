//! ACME certificate issuance via dehydrated
//!
//! Issuance itself is owned by the `dehydrated` client: it performs the
//! ACME exchange and drives the DNS-01 challenge through its hook script
//! (which in turn calls lexicon). This module writes the ephemeral keysize
//! config, runs dehydrated to completion, and reads the resulting PEM
//! material from `certs/<domain>/`.

use std::fs;
use std::path::PathBuf;

use edgebind_common::{run_checked, CommandRunner, CommandSpec, ExecError};
use edgebind_config::Workspace;
use thiserror::Error;
use tracing::info;

/// Dehydrated keysize config; ACM only accepts 2048-bit RSA keys
const ACME_CONFIG: &str = "KEYSIZE=\"2048\"";

#[derive(Debug, Error)]
pub enum IssueError {
    #[error("dehydrated invocation failed: {0}")]
    Exec(#[from] ExecError),

    #[error("failed to write ACME config {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing certificate material {path}: {source}")]
    Material {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Issued certificate material read from the per-domain directory
#[derive(Debug, Clone)]
pub struct CertificateMaterial {
    pub cert_pem: String,
    pub privkey_pem: String,
    pub chain_pem: String,
}

/// Drives dehydrated and collects the issued material
pub struct Issuer<'a> {
    runner: &'a dyn CommandRunner,
    workspace: &'a Workspace,
}

impl<'a> Issuer<'a> {
    pub fn new(runner: &'a dyn CommandRunner, workspace: &'a Workspace) -> Self {
        Self { runner, workspace }
    }

    /// Write the ephemeral dehydrated config
    ///
    /// Written on every run, whether or not issuance happens, and removed
    /// again by cleanup.
    pub fn write_acme_config(&self) -> Result<(), IssueError> {
        let path = self.workspace.dehydrated_config();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| IssueError::WriteConfig {
                path: path.clone(),
                source,
            })?;
        }
        fs::write(&path, ACME_CONFIG).map_err(|source| IssueError::WriteConfig {
            path: path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Run dehydrated to issue a certificate for the domain
    ///
    /// Blocks until the ACME exchange completes; a non-zero exit is fatal.
    pub fn issue(&self, domain: &str) -> Result<(), IssueError> {
        info!(domain = %domain, "Issuing certificate via dehydrated (dns-01)");

        let spec = CommandSpec::new("dehydrated")
            .arg("--config")
            .arg(self.workspace.dehydrated_config().to_string_lossy())
            .args(["--domain", domain])
            .arg("--cron")
            .arg("--accept-terms")
            .arg("--out")
            .arg(self.workspace.certs_dir.to_string_lossy())
            .arg("--hook")
            .arg(self.workspace.hook_script().to_string_lossy())
            .args(["--challenge", "dns-01"]);

        run_checked(self.runner, &spec)?;
        Ok(())
    }

    /// Read the issued PEM files for the domain
    pub fn load_material(&self, domain: &str) -> Result<CertificateMaterial, IssueError> {
        let read = |path: PathBuf| {
            fs::read_to_string(&path).map_err(|source| IssueError::Material { path, source })
        };

        Ok(CertificateMaterial {
            cert_pem: read(self.workspace.cert_path(domain))?,
            privkey_pem: read(self.workspace.privkey_path(domain))?,
            chain_pem: read(self.workspace.chain_path(domain))?,
        })
    }
}

//! Removal of transient provisioning files
//!
//! After a successful run the ACME config and the issued PEM files have no
//! further use; the certificate lives in ACM. The per-domain directory
//! itself is kept, only its contents are removed.

use std::fs;

use edgebind_config::Workspace;
use tracing::{debug, info};

/// Delete the dehydrated config and all files under `certs/<domain>/`
pub fn remove_transients(workspace: &Workspace, domain: &str) -> std::io::Result<()> {
    info!(domain = %domain, "Removing transient certificate files");

    let config = workspace.dehydrated_config();
    if config.exists() {
        fs::remove_file(&config)?;
        debug!(path = %config.display(), "Removed ACME config");
    }

    let domain_dir = workspace.domain_dir(domain);
    if domain_dir.is_dir() {
        for entry in fs::read_dir(&domain_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                debug!(path = %entry.path().display(), "Removed certificate file");
            }
        }
    }

    Ok(())
}

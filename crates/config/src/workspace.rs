//! Working-directory layout for transient provisioning files
//!
//! ```text
//! <root>/
//! ├── config/
//! │   ├── dehydrated_config.txt   # ephemeral keysize config, written per run
//! │   └── dehydrated.hook.sh      # DNS-01 challenge hook, provided by the operator
//! └── certs/
//!     └── <domain>/
//!         ├── cert.pem
//!         ├── privkey.pem
//!         └── chain.pem
//! ```

use std::path::{Path, PathBuf};

/// Paths used for dehydrated configuration and issued certificate material
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Directory holding the dehydrated config and hook script
    pub config_dir: PathBuf,
    /// Output directory for issued certificates
    pub certs_dir: PathBuf,
}

impl Workspace {
    /// Layout rooted at the current working directory
    pub fn current() -> Self {
        Self::rooted_at(Path::new("."))
    }

    /// Layout rooted at an arbitrary directory, used by tests
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            certs_dir: root.join("certs"),
        }
    }

    /// Ephemeral dehydrated config file, removed by cleanup
    pub fn dehydrated_config(&self) -> PathBuf {
        self.config_dir.join("dehydrated_config.txt")
    }

    /// DNS-01 challenge hook script; not generated here
    pub fn hook_script(&self) -> PathBuf {
        self.config_dir.join("dehydrated.hook.sh")
    }

    /// Per-domain certificate directory
    pub fn domain_dir(&self, domain: &str) -> PathBuf {
        self.certs_dir.join(domain)
    }

    pub fn cert_path(&self, domain: &str) -> PathBuf {
        self.domain_dir(domain).join("cert.pem")
    }

    pub fn privkey_path(&self, domain: &str) -> PathBuf {
        self.domain_dir(domain).join("privkey.pem")
    }

    pub fn chain_path(&self, domain: &str) -> PathBuf {
        self.domain_dir(domain).join("chain.pem")
    }

    /// Create the config and certs directories if missing
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.certs_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_follows_domain() {
        let ws = Workspace::rooted_at(Path::new("/work"));
        assert_eq!(
            ws.cert_path("api.example.com"),
            PathBuf::from("/work/certs/api.example.com/cert.pem")
        );
        assert_eq!(
            ws.dehydrated_config(),
            PathBuf::from("/work/config/dehydrated_config.txt")
        );
    }

    #[test]
    fn ensure_dirs_creates_layout() {
        let temp = TempDir::new().unwrap();
        let ws = Workspace::rooted_at(temp.path());
        ws.ensure_dirs().unwrap();
        assert!(ws.config_dir.is_dir());
        assert!(ws.certs_dir.is_dir());
    }
}

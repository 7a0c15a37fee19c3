//! Edgebind provisioning library
//!
//! Provisions a TLS-secured custom domain for an AWS API Gateway by
//! orchestrating three external CLIs:
//!
//! - **aws** — certificate store (ACM) and API Gateway operations
//! - **dehydrated** — ACME certificate issuance via DNS-01 challenge
//! - **lexicon** — CNAME publication at the DNS provider
//!
//! The pipeline is a single linear pass: gateway lookup, certificate
//! resolution and (re)issuance, import into ACM, custom-domain
//! registration, CNAME publication, base-path mapping, cleanup. Every
//! external call is attempted exactly once; there are no retries and no
//! concurrency.

pub mod aws;
pub mod cleanup;
pub mod dns;
pub mod error;
pub mod issuer;
pub mod pipeline;
pub mod preflight;

pub use error::ProvisionError;
pub use pipeline::{Provisioner, RENEWAL_WINDOW_DAYS};

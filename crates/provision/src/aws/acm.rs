//! ACM certificate store operations
//!
//! Certificate listing follows `NextToken` continuation tokens as an
//! explicit loop; the listing is finite and walked at most once per run.

use chrono::{DateTime, TimeZone, Utc};
use edgebind_common::run_json;
use serde::Deserialize;
use tracing::debug;

use super::{AwsCli, AwsError};
use crate::issuer::CertificateMaterial;

/// One entry from `acm list-certificates`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateSummary {
    pub certificate_arn: String,
    pub domain_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListCertificatesResponse {
    #[serde(default)]
    certificate_summary_list: Vec<CertificateSummary>,
    next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeCertificateResponse {
    certificate: CertificateDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CertificateDetail {
    not_after: Option<AwsTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ImportCertificateResponse {
    certificate_arn: Option<String>,
}

/// Timestamp as the AWS CLI emits it: epoch seconds (v1) or RFC 3339 (v2)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AwsTimestamp {
    Epoch(f64),
    Text(String),
}

impl AwsTimestamp {
    fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(secs) => Utc.timestamp_opt(*secs as i64, 0).single(),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl AwsCli<'_> {
    /// Find the certificate whose domain matches, walking all pages
    pub fn find_certificate(
        &self,
        domain: &str,
    ) -> Result<Option<CertificateSummary>, AwsError> {
        let mut token: Option<String> = None;

        loop {
            let mut spec = self.command("acm", "list-certificates");
            if let Some(ref t) = token {
                spec = spec.args(["--starting-token", t.as_str()]);
            }

            let page: ListCertificatesResponse = run_json(self.runner(), &spec)?;

            if let Some(found) = page
                .certificate_summary_list
                .into_iter()
                .find(|cert| cert.domain_name == domain)
            {
                debug!(domain = %domain, arn = %found.certificate_arn, "Found existing certificate");
                return Ok(Some(found));
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(None),
            }
        }
    }

    /// Expiry of a certificate, if ACM reports one
    pub fn certificate_expiry(&self, arn: &str) -> Result<Option<DateTime<Utc>>, AwsError> {
        let spec = self
            .command("acm", "describe-certificate")
            .args(["--certificate-arn", arn]);

        let response: DescribeCertificateResponse = run_json(self.runner(), &spec)?;
        Ok(response
            .certificate
            .not_after
            .as_ref()
            .and_then(AwsTimestamp::to_datetime))
    }

    /// Import certificate material, re-importing against an existing ARN
    ///
    /// Returns the certificate ARN from the response, or `None` when ACM
    /// did not hand one back (treated as fatal by the pipeline).
    pub fn import_certificate(
        &self,
        material: &CertificateMaterial,
        existing_arn: Option<&str>,
    ) -> Result<Option<String>, AwsError> {
        let mut spec = self.command("acm", "import-certificate");
        if let Some(arn) = existing_arn {
            spec = spec.args(["--certificate-arn", arn]);
        }
        spec = spec
            .args(["--certificate", material.cert_pem.as_str()])
            .args(["--private-key", material.privkey_pem.as_str()])
            .args(["--certificate-chain", material.chain_pem.as_str()]);

        let response: ImportCertificateResponse = run_json(self.runner(), &spec)?;
        Ok(response.certificate_arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgebind_common::testing::{ok_output, ScriptedRunner};

    #[test]
    fn listing_follows_continuation_tokens() {
        let runner = ScriptedRunner::new()
            .expect(
                "aws acm list-certificates",
                ok_output(
                    r#"{"CertificateSummaryList":
                        [{"CertificateArn":"arn:one","DomainName":"other.example.com"}],
                       "NextToken":"page-2"}"#,
                ),
            )
            .expect(
                "aws acm list-certificates",
                ok_output(
                    r#"{"CertificateSummaryList":
                        [{"CertificateArn":"arn:two","DomainName":"api.example.com"}]}"#,
                ),
            );

        let aws = AwsCli::new(&runner, "us-east-1");
        let found = aws.find_certificate("api.example.com").unwrap().unwrap();
        assert_eq!(found.certificate_arn, "arn:two");

        let calls = runner.calls_for("aws acm list-certificates");
        assert_eq!(calls.len(), 2);
        assert!(calls[1].args.iter().any(|a| a == "--starting-token"));
        assert!(calls[1].args.iter().any(|a| a == "page-2"));
    }

    #[test]
    fn no_match_after_all_pages() {
        let runner = ScriptedRunner::new().expect(
            "aws acm list-certificates",
            ok_output(r#"{"CertificateSummaryList": []}"#),
        );
        let aws = AwsCli::new(&runner, "us-east-1");
        assert!(aws.find_certificate("api.example.com").unwrap().is_none());
    }

    #[test]
    fn expiry_parses_epoch_seconds() {
        let runner = ScriptedRunner::new().expect(
            "aws acm describe-certificate",
            ok_output(r#"{"Certificate": {"NotAfter": 1767225600.0}}"#),
        );
        let aws = AwsCli::new(&runner, "us-east-1");
        let expiry = aws.certificate_expiry("arn:one").unwrap().unwrap();
        assert_eq!(expiry.timestamp(), 1_767_225_600);
    }

    #[test]
    fn expiry_parses_rfc3339() {
        let runner = ScriptedRunner::new().expect(
            "aws acm describe-certificate",
            ok_output(r#"{"Certificate": {"NotAfter": "2026-01-01T00:00:00+00:00"}}"#),
        );
        let aws = AwsCli::new(&runner, "us-east-1");
        let expiry = aws.certificate_expiry("arn:one").unwrap().unwrap();
        assert_eq!(expiry.timestamp(), 1_767_225_600);
    }

    #[test]
    fn expiry_absent_when_not_reported() {
        let runner = ScriptedRunner::new().expect(
            "aws acm describe-certificate",
            ok_output(r#"{"Certificate": {}}"#),
        );
        let aws = AwsCli::new(&runner, "us-east-1");
        assert!(aws.certificate_expiry("arn:one").unwrap().is_none());
    }

    #[test]
    fn reimport_carries_existing_arn() {
        let runner = ScriptedRunner::new().expect(
            "aws acm import-certificate",
            ok_output(r#"{"CertificateArn": "arn:renewed"}"#),
        );
        let aws = AwsCli::new(&runner, "us-east-1");

        let material = CertificateMaterial {
            cert_pem: "CERT".to_string(),
            privkey_pem: "KEY".to_string(),
            chain_pem: "CHAIN".to_string(),
        };
        let arn = aws
            .import_certificate(&material, Some("arn:old"))
            .unwrap()
            .unwrap();
        assert_eq!(arn, "arn:renewed");

        let call = &runner.calls_for("aws acm import-certificate")[0];
        assert!(call.args.iter().any(|a| a == "--certificate-arn"));
        assert!(call.args.iter().any(|a| a == "arn:old"));
        assert!(call.args.iter().any(|a| a == "CERT"));
    }

    #[test]
    fn fresh_import_has_no_arn_argument() {
        let runner = ScriptedRunner::new().expect(
            "aws acm import-certificate",
            ok_output(r#"{"CertificateArn": "arn:new"}"#),
        );
        let aws = AwsCli::new(&runner, "us-east-1");

        let material = CertificateMaterial {
            cert_pem: "CERT".to_string(),
            privkey_pem: "KEY".to_string(),
            chain_pem: "CHAIN".to_string(),
        };
        aws.import_certificate(&material, None).unwrap();

        let call = &runner.calls_for("aws acm import-certificate")[0];
        assert!(!call.args.iter().any(|a| a == "--certificate-arn"));
    }
}

use crate::{Error, ErrorContext, Result};
use rustls::pki_types::CertificateDer;
use serde::{Deserialize, Serialize};

/// TLS settings. Each field is projected on its own; an engine that cannot
/// honor one of them keeps its default for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfiguration {
    /// Extra trust anchors (PEM).
    pub root_certificates: Vec<Certificate>,
    /// `Some(false)` accepts any server certificate.
    pub validate_server_certificate: Option<bool>,
    /// `Some(false)` skips matching the certificate against the host name.
    pub verify_hostname: Option<bool>,
}

impl TlsConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_certificate(mut self, certificate: Certificate) -> Self {
        self.root_certificates.push(certificate);
        self
    }

    pub fn with_validate_server_certificate(mut self, enabled: bool) -> Self {
        self.validate_server_certificate = Some(enabled);
        self
    }

    pub fn with_verify_hostname(mut self, enabled: bool) -> Self {
        self.verify_hostname = Some(enabled);
        self
    }
}

/// PEM-encoded certificate bundle (one or more certificates).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Certificate {
    pem: Vec<u8>,
}

impl Certificate {
    pub fn from_pem(pem: impl Into<Vec<u8>>) -> Result<Self> {
        let pem = pem.into();
        let count = parse_pem(&pem)?.len();
        if count == 0 {
            return Err(Error::invalid_argument(
                "no certificate found in PEM input",
                ErrorContext::new()
                    .with_field_path("tls.root_certificates")
                    .with_source("configuration"),
            ));
        }
        Ok(Self { pem })
    }

    pub fn pem(&self) -> &[u8] {
        &self.pem
    }

    /// DER form of every certificate in the bundle.
    pub fn der_certificates(&self) -> Result<Vec<CertificateDer<'static>>> {
        parse_pem(&self.pem)
    }
}

fn parse_pem(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = pem;
    rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            Error::invalid_argument(
                "malformed PEM certificate",
                ErrorContext::new()
                    .with_field_path("tls.root_certificates")
                    .with_details(e.to_string())
                    .with_source("configuration"),
            )
        })
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("pem_len", &self.pem.len())
            .finish()
    }
}

impl TryFrom<String> for Certificate {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Certificate::from_pem(value.into_bytes())
    }
}

impl From<Certificate> for String {
    fn from(value: Certificate) -> Self {
        String::from_utf8_lossy(&value.pem).into_owned()
    }
}
